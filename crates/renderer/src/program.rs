//! The clean/dirty program cache.
//!
//! [`ShaderSynthesizer`] owns at most one compiled program. Assigning a filter
//! sequence that differs from the last one marks it dirty; only
//! [`ShaderSynthesizer::rebuild_if_needed`] makes it clean again. Control
//! values and visibility travel through uniforms and never dirty the cache.

use std::sync::Arc;

use huechain::{FilterChain, FilterRegistry};
use tracing::{debug, error, info};

use crate::compile::dump_source;
use crate::synth::{synthesize, SynthError, SynthesizedProgram};
use crate::types::{RebuildOutcome, SynthesizerConfig};
use crate::uniforms::FilterUniforms;

/// Turns synthesized GLSL into something drawable.
pub trait ProgramBackend {
    type Program;

    /// Compiles both stages. On failure nothing may be retained and the
    /// message is reported to the caller alongside the full source.
    fn compile(&mut self, program: &SynthesizedProgram) -> Result<Self::Program, String>;

    /// Called with the outgoing program before its replacement is installed.
    fn release(&mut self, program: Self::Program) {
        drop(program);
    }
}

/// The single live program and the source it was built from.
#[derive(Debug)]
pub struct ActiveProgram<P> {
    pub program: P,
    pub source: SynthesizedProgram,
}

pub struct ShaderSynthesizer<B: ProgramBackend> {
    backend: B,
    registry: Arc<FilterRegistry>,
    config: SynthesizerConfig,
    ids: Vec<String>,
    dirty: bool,
    active: Option<ActiveProgram<B::Program>>,
    rebuilds: u64,
}

impl<B: ProgramBackend> ShaderSynthesizer<B> {
    /// Starts dirty with an empty sequence so the first rebuild produces the
    /// seed-only program.
    pub fn new(backend: B, registry: Arc<FilterRegistry>, config: SynthesizerConfig) -> Self {
        Self {
            backend,
            registry,
            config,
            ids: Vec::new(),
            dirty: true,
            active: None,
            rebuilds: 0,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    pub fn filter_ids(&self) -> &[String] {
        &self.ids
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of compiles attempted so far, failed ones included.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Records the structural sequence. Returns whether it changed.
    pub fn set_filter_ids<S: AsRef<str>>(&mut self, ids: &[S]) -> bool {
        let same = self.ids.len() == ids.len()
            && self.ids.iter().zip(ids).all(|(old, new)| old == new.as_ref());
        if same {
            return false;
        }
        self.ids = ids.iter().map(|id| id.as_ref().to_string()).collect();
        self.dirty = true;
        true
    }

    pub fn sync(&mut self, chain: &FilterChain) -> bool {
        self.set_filter_ids(&chain.filter_ids())
    }

    /// Compiles a new program if the sequence changed since the last attempt.
    ///
    /// A failed attempt still leaves the cache clean: the cause is static
    /// program text, so the same sequence is not retried. The previously
    /// active program, if any, stays in place.
    pub fn rebuild_if_needed(&mut self) -> Result<RebuildOutcome, SynthError> {
        if !self.dirty {
            return Ok(RebuildOutcome::Unchanged);
        }
        self.dirty = false;
        self.rebuilds += 1;

        let source = synthesize(&self.registry, &self.ids, &self.config)?;
        debug!(filters = ?source.ids, glsl = %source.fragment, "synthesized filter program");
        if let Some(path) = &self.config.dump_path {
            dump_source(path, &source.fragment);
        }

        match self.backend.compile(&source) {
            Ok(program) => {
                if let Some(previous) = self.active.take() {
                    self.backend.release(previous.program);
                }
                info!(
                    filters = source.ids.len(),
                    slots = source.layout.slot_count,
                    rebuild = self.rebuilds,
                    "rebuilt filter program"
                );
                self.active = Some(ActiveProgram { program, source });
                Ok(RebuildOutcome::Rebuilt)
            }
            Err(message) => {
                error!(filters = ?source.ids, %message, "filter program failed to compile");
                Err(SynthError::Compile {
                    message,
                    glsl: source.fragment,
                })
            }
        }
    }

    pub fn active(&self) -> Option<&ActiveProgram<B::Program>> {
        self.active.as_ref()
    }

    pub fn program(&self) -> Option<&B::Program> {
        self.active.as_ref().map(|active| &active.program)
    }

    /// Packs the chain's current values for the active program.
    pub fn uniforms(&self, chain: &FilterChain) -> Result<Option<FilterUniforms>, SynthError> {
        let Some(active) = &self.active else {
            return Ok(None);
        };
        let mut uniforms = FilterUniforms::new(&active.source.layout);
        uniforms.write(&chain.parameter_slots(), &chain.visibility())?;
        Ok(Some(uniforms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recording {
        compiled: Vec<Vec<String>>,
        released: Vec<usize>,
    }

    impl ProgramBackend for Recording {
        type Program = usize;

        fn compile(&mut self, program: &SynthesizedProgram) -> Result<usize, String> {
            self.compiled.push(program.ids.clone());
            Ok(self.compiled.len())
        }

        fn release(&mut self, program: usize) {
            self.released.push(program);
        }
    }

    fn synthesizer() -> ShaderSynthesizer<Recording> {
        ShaderSynthesizer::new(
            Recording::default(),
            FilterRegistry::builtin(),
            SynthesizerConfig::default(),
        )
    }

    #[test]
    fn starts_dirty_and_builds_the_empty_program() {
        let mut synth = synthesizer();
        assert!(synth.is_dirty());
        assert_eq!(synth.rebuild_if_needed().unwrap(), RebuildOutcome::Rebuilt);
        assert!(!synth.is_dirty());
        assert_eq!(synth.program(), Some(&1));
        assert_eq!(synth.rebuild_if_needed().unwrap(), RebuildOutcome::Unchanged);
    }

    #[test]
    fn old_program_is_released_before_replacement() {
        let mut synth = synthesizer();
        synth.rebuild_if_needed().unwrap();
        synth.set_filter_ids(&["posterize"]);
        synth.rebuild_if_needed().unwrap();
        assert_eq!(synth.backend().released, vec![1]);
        assert_eq!(synth.program(), Some(&2));
        assert_eq!(
            synth.active().map(|active| active.source.ids.clone()),
            Some(vec!["posterize".to_string()])
        );
    }

    #[test]
    fn identical_sequence_stays_clean() {
        let mut synth = synthesizer();
        assert!(synth.set_filter_ids(&["posterize", "blend_xor"]));
        synth.rebuild_if_needed().unwrap();
        assert!(!synth.set_filter_ids(&["posterize", "blend_xor"]));
        assert!(!synth.is_dirty());
        assert!(synth.set_filter_ids(&["posterize"]));
        assert!(synth.set_filter_ids(&["blend_xor", "posterize"]));
        assert!(synth.is_dirty());
    }

    #[test]
    fn unknown_ids_fail_without_retry() {
        let mut synth = synthesizer();
        synth.rebuild_if_needed().unwrap();
        synth.set_filter_ids(&["sparkle"]);
        assert!(matches!(
            synth.rebuild_if_needed(),
            Err(SynthError::UnknownFilter(_))
        ));
        assert_eq!(synth.rebuild_if_needed().unwrap(), RebuildOutcome::Unchanged);
        assert_eq!(synth.program(), Some(&1));
        assert_eq!(synth.rebuild_count(), 2);
    }
}
