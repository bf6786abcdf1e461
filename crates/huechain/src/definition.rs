//! Filter definitions: controls, slot conversion, host math and GLSL text.
//!
//! Every definition exposes the same ordered-slot contract: `vectorize` turns
//! the control values into exactly `slot_count` `vec4` slots, `apply` reads
//! exactly those slots, and the template references `$0..$slot_count-1`.
//! [`FilterDefinition::validate`] checks the contract once, when the
//! definition is registered.
//!
//! Blend filters are produced by [`FilterDefinition::blend`] from a single
//! [`BlendOptions`] record. The per-channel expression text drives the GLSL
//! template and the paired scalar function drives host evaluation.

use std::collections::HashSet;
use std::fmt;

use crate::control::{Control, ControlValue, NumericRange};
use crate::math::{mix, Vec3, Vec4, Vector};
use crate::registry::RegistryError;
use crate::template::placeholder_indices;

/// Converts control values into parameter slots.
pub type VectorizeFn = fn(&[ControlValue]) -> Vec<Vec4>;
/// Host evaluation of a direct filter.
pub type ApplyFn = fn(Vec3, &[Vec4]) -> Vec3;
/// Per-channel blend of base `a` with blend color `b`.
pub type BlendFn = fn(f32, f32) -> f32;

#[derive(Clone, Copy)]
enum Kernel {
    Direct(ApplyFn),
    Blend(BlendFn),
}

/// Declarative description of one blend mode.
#[derive(Debug, Clone, Copy)]
pub struct BlendOptions {
    pub id: &'static str,
    pub name: &'static str,
    pub default_color: Vec3,
    /// Percent, `0..=100`.
    pub default_opacity: f32,
    /// GLSL expression over floats `a` (base) and `b` (blend color).
    pub expression: &'static str,
    pub blend: BlendFn,
}

pub struct FilterDefinition {
    id: String,
    name: String,
    controls: Vec<Control>,
    slot_count: usize,
    vectorize: VectorizeFn,
    kernel: Kernel,
    template: String,
}

impl fmt::Debug for FilterDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterDefinition")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("controls", &self.controls)
            .field("slot_count", &self.slot_count)
            .finish_non_exhaustive()
    }
}

impl FilterDefinition {
    pub fn direct(
        id: impl Into<String>,
        name: impl Into<String>,
        controls: Vec<Control>,
        slot_count: usize,
        vectorize: VectorizeFn,
        apply: ApplyFn,
        template: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            controls,
            slot_count,
            vectorize,
            kernel: Kernel::Direct(apply),
            template: template.into(),
        }
    }

    pub fn blend(options: BlendOptions) -> Self {
        let controls = vec![
            Control::color("color", "Color", options.default_color),
            Control::slider(
                "opacity",
                "Opacity",
                options.default_opacity,
                NumericRange::new(0.0, 100.0, 1.0, 0),
            ),
        ];
        Self {
            id: options.id.to_string(),
            name: options.name.to_string(),
            controls,
            slot_count: 1,
            vectorize: vectorize_blend,
            kernel: Kernel::Blend(options.blend),
            template: blend_template(options.expression),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// GLSL body operating on `vec3 color`, with `$<n>` slot placeholders.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn is_blend(&self) -> bool {
        matches!(self.kernel, Kernel::Blend(_))
    }

    pub fn default_values(&self) -> Vec<ControlValue> {
        self.controls.iter().map(Control::default_value).collect()
    }

    pub fn vectorize(&self, values: &[ControlValue]) -> Vec<Vec4> {
        (self.vectorize)(values)
    }

    /// Host evaluation over already-vectorized slots. The result is not clamped.
    pub fn apply(&self, color: Vec3, slots: &[Vec4]) -> Vec3 {
        debug_assert_eq!(slots.len(), self.slot_count, "slot arity for '{}'", self.id);
        match self.kernel {
            Kernel::Direct(apply) => apply(color, slots),
            Kernel::Blend(blend) => {
                let top = slot(slots, 0);
                let blended = color.zip(top.rgb(), blend);
                mix(color, blended, top.a())
            }
        }
    }

    pub fn evaluate(&self, color: Vec3, values: &[ControlValue]) -> Vec3 {
        self.apply(color, &self.vectorize(values))
    }

    /// Checks the slot contract between controls, `vectorize`, `apply` and the template.
    pub fn validate(&self) -> Result<(), RegistryError> {
        let invalid = |reason: String| RegistryError::InvalidDefinition {
            id: self.id.clone(),
            reason,
        };

        if self.id.is_empty() || !self.id.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
            return Err(invalid("id must be non-empty ASCII alphanumerics or '_'".into()));
        }

        let mut seen = HashSet::new();
        for control in &self.controls {
            if !seen.insert(control.id) {
                return Err(invalid(format!("duplicate control id '{}'", control.id)));
            }
            if let Some(range) = control.range() {
                if range.min > range.max {
                    return Err(invalid(format!("control '{}' has min > max", control.id)));
                }
            }
        }

        let produced = self.vectorize(&self.default_values()).len();
        if produced != self.slot_count {
            return Err(invalid(format!(
                "vectorize produced {produced} slots, expected {}",
                self.slot_count
            )));
        }

        let referenced = placeholder_indices(&self.template)
            .into_iter()
            .max()
            .map_or(0, |max| max + 1);
        if referenced != self.slot_count {
            return Err(invalid(format!(
                "template references {referenced} slots, expected {}",
                self.slot_count
            )));
        }

        Ok(())
    }
}

/// Slot `index`, or zero when absent.
pub fn slot(slots: &[Vec4], index: usize) -> Vec4 {
    slots.get(index).copied().unwrap_or_default()
}

/// Numeric value at `index`, or 0 when absent.
pub fn number_at(values: &[ControlValue], index: usize) -> f32 {
    values.get(index).map_or(0.0, |value| value.number())
}

/// Color value at `index`, or black when absent.
pub fn color_at(values: &[ControlValue], index: usize) -> Vec3 {
    values.get(index).map_or(Vec3::ZERO, |value| value.color())
}

fn vectorize_blend(values: &[ControlValue]) -> Vec<Vec4> {
    vec![color_at(values, 0).extend(number_at(values, 1) / 100.0)]
}

fn blend_template(expression: &str) -> String {
    let mut body = String::from("vec3 base = color;\nvec3 top = $0.rgb;\n");
    for channel in ["r", "g", "b"] {
        body.push_str(&format!(
            "float blend_{channel} = 0.0;\n{{ float a = base.{channel}; float b = top.{channel}; blend_{channel} = ({expression}); }}\n"
        ));
    }
    body.push_str("color = mix(base, vec3(blend_r, blend_g, blend_b), $0.a);");
    body
}
