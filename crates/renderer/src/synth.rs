//! GLSL generation for a filter-id sequence.
//!
//! Every filter gets a contiguous run of global slots in `_params`, in chain
//! order. Its template is rewritten from local `$n` to `_p[base + n]`, wrapped
//! in a visibility guard, and followed by a clamp of the running color. The
//! guard for filter `i` reads component `i % 4` of `_visible[i / 4]`.
//!
//! ```text
//!   ids:    posterize   hsl_adjust   blend_screen
//!   slots:  _p[0]       _p[1]        _p[2]
//!   guard:  _visible[0].x  .y        .z
//! ```

use huechain::math::HSL_GLSL;
use huechain::template::rewrite_placeholders;
use huechain::FilterRegistry;
use thiserror::Error;

use crate::types::SynthesizerConfig;

const COMPONENTS: [char; 4] = ['x', 'y', 'z', 'w'];

#[derive(Debug, Error)]
pub enum SynthError {
    #[error("unknown filter '{0}'")]
    UnknownFilter(String),
    #[error("chain needs {needed} parameter slots, the limit is {max}")]
    TooManySlots { needed: usize, max: usize },
    #[error("failed to compile filter program: {message}\n{glsl}")]
    Compile { message: String, glsl: String },
    #[error("uniform data does not match the program: expected {expected} {what}, found {found}")]
    UniformMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Global slot range owned by one filter of the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSlots {
    pub id: String,
    pub base: usize,
    pub count: usize,
}

impl FilterSlots {
    pub fn indices(&self) -> std::ops::Range<usize> {
        self.base..self.base + self.count
    }
}

/// Uniform block shape of a synthesized program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramLayout {
    pub filters: Vec<FilterSlots>,
    pub slot_count: usize,
}

impl ProgramLayout {
    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// Declared length of `_params`; GLSL arrays cannot be empty.
    pub fn param_len(&self) -> usize {
        self.slot_count.max(1)
    }

    /// Declared length of `_visible`, four filters per `vec4`.
    pub fn visible_len(&self) -> usize {
        self.filters.len().div_ceil(4).max(1)
    }

    /// std140 size of the uniform block in bytes.
    pub fn byte_size(&self) -> usize {
        (self.param_len() + self.visible_len()) * 16
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedProgram {
    pub ids: Vec<String>,
    pub layout: ProgramLayout,
    pub fragment: String,
}

impl SynthesizedProgram {
    pub fn vertex(&self) -> &'static str {
        VERTEX_GLSL
    }
}

/// Passes the per-vertex HSL (normalized hue) through to the fragment stage.
pub const VERTEX_GLSL: &str = r"#version 450
layout(location = 0) in vec2 a_position;
layout(location = 1) in vec3 a_hsl;
layout(location = 0) out vec3 v_hsl;

void main() {
    v_hsl = a_hsl;
    gl_Position = vec4(a_position, 0.0, 1.0);
}
";

/// Assigns slots to `ids`, resolving each against `registry`.
pub fn layout_for<S: AsRef<str>>(
    registry: &FilterRegistry,
    ids: &[S],
) -> Result<ProgramLayout, SynthError> {
    let mut layout = ProgramLayout::default();
    for id in ids {
        let id = id.as_ref();
        let definition = registry
            .get(id)
            .ok_or_else(|| SynthError::UnknownFilter(id.to_string()))?;
        layout.filters.push(FilterSlots {
            id: id.to_string(),
            base: layout.slot_count,
            count: definition.slot_count(),
        });
        layout.slot_count += definition.slot_count();
    }
    Ok(layout)
}

/// Generates the fragment program for `ids`.
pub fn synthesize<S: AsRef<str>>(
    registry: &FilterRegistry,
    ids: &[S],
    config: &SynthesizerConfig,
) -> Result<SynthesizedProgram, SynthError> {
    let layout = layout_for(registry, ids)?;
    if layout.slot_count > config.max_slots {
        return Err(SynthError::TooManySlots {
            needed: layout.slot_count,
            max: config.max_slots,
        });
    }

    let mut body = String::new();
    for (position, slots) in layout.filters.iter().enumerate() {
        // Resolved above.
        let Some(definition) = registry.get(&slots.id) else {
            return Err(SynthError::UnknownFilter(slots.id.clone()));
        };
        let template = rewrite_placeholders(definition.template(), slots.base);
        body.push_str(&format!(
            "    // {position}: {id}\n    if (filter_params._visible[{word}].{component} > 0.5) {{\n",
            id = slots.id,
            word = position / 4,
            component = COMPONENTS[position % 4],
        ));
        for line in template.lines() {
            body.push_str("        ");
            body.push_str(line);
            body.push('\n');
        }
        body.push_str("        color = clamp(color, 0.0, 1.0);\n    }\n");
    }

    let fragment = format!(
        "{header}\n{HSL_GLSL}\nvoid main() {{\n    vec3 color = hsl2rgb(v_hsl);\n{body}    outColor = vec4(color, 1.0);\n}}\n",
        header = fragment_header(&layout),
    );

    Ok(SynthesizedProgram {
        ids: ids.iter().map(|id| id.as_ref().to_string()).collect(),
        layout,
        fragment,
    })
}

fn fragment_header(layout: &ProgramLayout) -> String {
    format!(
        r"#version 450
layout(location = 0) in vec3 v_hsl;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform FilterParams {{
    vec4 _params[{params}];
    vec4 _visible[{visible}];
}} filter_params;

#define _p filter_params._params
",
        params = layout.param_len(),
        visible = layout.visible_len(),
    )
}
