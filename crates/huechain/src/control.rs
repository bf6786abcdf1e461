//! Control descriptors and the values bound to them.
//!
//! A control governs how a value is edited and how precisely it is
//! serialized. It has no say in the filter math: kernels only ever see the
//! slots produced by `vectorize`.

use thiserror::Error;

use crate::math::Vec3;

#[derive(Debug, Error, PartialEq)]
pub enum ControlError {
    #[error("control '{control}' expects a {expected} value")]
    WrongKind {
        control: String,
        expected: &'static str,
    },
    #[error("control '{control}' received a non-finite number")]
    NonFinite { control: String },
    #[error("invalid color '{0}'")]
    InvalidColor(String),
    #[error("no control at index {0}")]
    UnknownControl(usize),
}

/// Numeric range and display precision shared by number and slider controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
    /// Decimal places kept when the value is serialized.
    pub precision: u32,
}

impl NumericRange {
    pub const fn new(min: f32, max: f32, step: f32, precision: u32) -> Self {
        Self {
            min,
            max,
            step,
            precision,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlKind {
    /// Free numeric entry.
    Number { default: f32, range: NumericRange },
    /// Bounded drag slider.
    Slider { default: f32, range: NumericRange },
    /// RGB color picker.
    Color { default: Vec3 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: ControlKind,
}

impl Control {
    pub const fn number(
        id: &'static str,
        label: &'static str,
        default: f32,
        range: NumericRange,
    ) -> Self {
        Self {
            id,
            label,
            kind: ControlKind::Number { default, range },
        }
    }

    pub const fn slider(
        id: &'static str,
        label: &'static str,
        default: f32,
        range: NumericRange,
    ) -> Self {
        Self {
            id,
            label,
            kind: ControlKind::Slider { default, range },
        }
    }

    pub const fn color(id: &'static str, label: &'static str, default: Vec3) -> Self {
        Self {
            id,
            label,
            kind: ControlKind::Color { default },
        }
    }

    pub fn default_value(&self) -> ControlValue {
        match self.kind {
            ControlKind::Number { default, .. } | ControlKind::Slider { default, .. } => {
                ControlValue::Number(default)
            }
            ControlKind::Color { default } => ControlValue::Color(default),
        }
    }

    pub fn range(&self) -> Option<NumericRange> {
        match self.kind {
            ControlKind::Number { range, .. } | ControlKind::Slider { range, .. } => Some(range),
            ControlKind::Color { .. } => None,
        }
    }

    pub fn is_color(&self) -> bool {
        matches!(self.kind, ControlKind::Color { .. })
    }

    /// Checks `value` against this control, clamping numbers into range.
    pub fn accept(&self, value: ControlValue) -> Result<ControlValue, ControlError> {
        match (self.kind, value) {
            (
                ControlKind::Number { range, .. } | ControlKind::Slider { range, .. },
                ControlValue::Number(number),
            ) => {
                if !number.is_finite() {
                    return Err(ControlError::NonFinite {
                        control: self.id.to_string(),
                    });
                }
                Ok(ControlValue::Number(number.clamp(range.min, range.max)))
            }
            (ControlKind::Color { .. }, ControlValue::Color(color)) => Ok(ControlValue::Color(
                crate::math::clamp(color, 0.0, 1.0),
            )),
            (ControlKind::Color { .. }, _) => Err(ControlError::WrongKind {
                control: self.id.to_string(),
                expected: "color",
            }),
            (_, _) => Err(ControlError::WrongKind {
                control: self.id.to_string(),
                expected: "numeric",
            }),
        }
    }
}

/// Current value of one control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlValue {
    Number(f32),
    Color(Vec3),
}

impl ControlValue {
    /// Numeric payload; colors read as 0.
    pub fn number(self) -> f32 {
        match self {
            ControlValue::Number(value) => value,
            ControlValue::Color(_) => 0.0,
        }
    }

    /// Color payload; numbers read as black.
    pub fn color(self) -> Vec3 {
        match self {
            ControlValue::Color(value) => value,
            ControlValue::Number(_) => Vec3::ZERO,
        }
    }
}

/// Rounds to `precision` decimal places the way values are displayed.
pub fn round_to_precision(value: f32, precision: u32) -> f64 {
    let scale = 10f64.powi(precision as i32);
    let rounded = (f64::from(value) * scale).round() / scale;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Formats a number with at most `precision` decimals and no trailing zeros.
pub fn format_number(value: f32, precision: u32) -> String {
    let rounded = round_to_precision(value, precision);
    let mut text = format!("{rounded:.prec$}", prec = precision as usize);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    text
}

/// Encodes a color as six lowercase hex digits, without a leading `#`.
pub fn color_to_hex(color: Vec3) -> String {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "{:02x}{:02x}{:02x}",
        channel(color.x),
        channel(color.y),
        channel(color.z)
    )
}

/// Parses `rrggbb`, `rgb`, optionally prefixed with `#`.
pub fn parse_hex_color(text: &str) -> Result<Vec3, ControlError> {
    let invalid = || ControlError::InvalidColor(text.to_string());
    let digits = text.strip_prefix('#').unwrap_or(text);
    if !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let expanded: String = match digits.len() {
        6 => digits.to_string(),
        3 => digits.chars().flat_map(|ch| [ch, ch]).collect(),
        _ => return Err(invalid()),
    };
    let channel = |index: usize| {
        u8::from_str_radix(&expanded[index..index + 2], 16)
            .map(|v| f32::from(v) / 255.0)
            .map_err(|_| invalid())
    };
    Ok(Vec3::new(channel(0)?, channel(2)?, channel(4)?))
}
