//! Shader synthesis for huechain filter chains.
//!
//! The GPU preview runs the same chain as [`huechain::FilterChain::computed_color`],
//! compiled into one fragment program:
//!
//! ```text
//!   FilterChain::filter_ids ──▶ ShaderSynthesizer::set_filter_ids ──▶ dirty?
//!                                          │
//!                          rebuild_if_needed() ──▶ synth::synthesize ──▶ ProgramBackend::compile
//!                                          │
//!   FilterChain::parameter_slots ──▶ FilterUniforms ──▶ GpuProgram::upload (every frame)
//! ```
//!
//! Only the structural id sequence triggers a rebuild. Values and visibility
//! are uniforms. [`NagaBackend`] validates programs without a device;
//! [`WgpuBackend`] turns them into render pipelines.

mod compile;
mod gpu;
mod program;
mod synth;
mod types;
mod uniforms;

pub use compile::{validate_glsl, NagaBackend, ValidatedProgram, ValidatedStage};
pub use gpu::{spectrum_quad, GpuProgram, SpectrumVertex, WgpuBackend};
pub use program::{ActiveProgram, ProgramBackend, ShaderSynthesizer};
pub use synth::{
    layout_for, synthesize, FilterSlots, ProgramLayout, SynthError, SynthesizedProgram,
    VERTEX_GLSL,
};
pub use types::{RebuildOutcome, SynthesizerConfig, DEFAULT_MAX_SLOTS};
pub use uniforms::FilterUniforms;
