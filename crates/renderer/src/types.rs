use std::path::PathBuf;

/// Uniform slots a synthesized program may use by default. Together with the
/// visibility words this stays far below the 16 KiB uniform binding limit.
pub const DEFAULT_MAX_SLOTS: usize = 256;

/// Settings shared by every rebuild of a [`crate::ShaderSynthesizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizerConfig {
    /// When set, each generated fragment program is written here before it
    /// is compiled. Useful when a driver rejects a program.
    pub dump_path: Option<PathBuf>,
    /// Debug label attached to shader modules and pipelines.
    pub label: String,
    /// Upper bound on `vec4` parameter slots across the whole chain.
    pub max_slots: usize,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            dump_path: None,
            label: "huechain filters".to_string(),
            max_slots: DEFAULT_MAX_SLOTS,
        }
    }
}

/// Result of [`crate::ShaderSynthesizer::rebuild_if_needed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    /// The active program already matched the filter sequence.
    Unchanged,
    /// A new program was compiled and replaced the previous one.
    Rebuilt,
}
