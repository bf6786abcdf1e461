use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use wgpu::naga;
use wgpu::naga::ShaderStage;

use crate::program::ProgramBackend;
use crate::synth::SynthesizedProgram;

/// A parsed and validated shader stage.
#[derive(Debug)]
pub struct ValidatedStage {
    pub module: naga::Module,
    pub info: naga::valid::ModuleInfo,
}

/// Both stages of a synthesized program after validation.
#[derive(Debug)]
pub struct ValidatedProgram {
    pub vertex: ValidatedStage,
    pub fragment: ValidatedStage,
}

/// Runs GLSL through naga's frontend and validator, the same path wgpu takes
/// for `ShaderSource::Glsl`.
pub fn validate_glsl(source: &str, stage: ShaderStage) -> Result<ValidatedStage, String> {
    let mut frontend = naga::front::glsl::Frontend::default();
    let options = naga::front::glsl::Options::from(stage);
    let module = frontend
        .parse(&options, source)
        .map_err(|err| format!("{stage:?} parse error: {err}"))?;
    let info = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|err| format!("{stage:?} validation error: {err}"))?;
    Ok(ValidatedStage { module, info })
}

/// Headless backend: a program "compiles" when naga accepts both stages.
#[derive(Debug, Default)]
pub struct NagaBackend;

impl ProgramBackend for NagaBackend {
    type Program = ValidatedProgram;

    fn compile(&mut self, program: &SynthesizedProgram) -> Result<Self::Program, String> {
        Ok(ValidatedProgram {
            vertex: validate_glsl(program.vertex(), ShaderStage::Vertex)?,
            fragment: validate_glsl(&program.fragment, ShaderStage::Fragment)?,
        })
    }
}

/// Writes the generated fragment source for inspection. Failures only warn.
pub(crate) fn dump_source(path: &Path, source: &str) {
    match fs::write(path, source) {
        Ok(()) => debug!(path = %path.display(), "dumped filter program"),
        Err(err) => warn!(path = %path.display(), error = %err, "failed to dump filter program"),
    }
}
