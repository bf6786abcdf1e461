//! The compiled-in filter catalog.
//!
//! Direct filters pair a hand-written GLSL body with a host function that
//! performs the same operations in the same order. Blend filters come from
//! [`BLEND_MODES`] through [`FilterDefinition::blend`].

use crate::control::{Control, NumericRange};
use crate::definition::{number_at, slot, BlendOptions, FilterDefinition};
use crate::math::{floor, hsl2rgb, rgb2hsl, vec::scalar, Vec3, Vec4};

/// Order of the "add filter" menu.
pub const MENU_ORDER: &[&str] = &[
    "posterize",
    "brightness_contrast",
    "hsl_adjust",
    "hsl_multiply",
    "blend_normal",
    "blend_multiply",
    "blend_additive",
    "blend_subtract",
    "blend_screen",
    "blend_overlay",
    "blend_difference",
    "blend_dodge",
    "blend_burn",
    "blend_darken",
    "blend_lighten",
    "blend_xor",
    "blend_negation",
];

pub const BLEND_MODES: &[BlendOptions] = &[
    BlendOptions {
        id: "blend_normal",
        name: "Blend Normal",
        default_color: Vec3::new(1.0, 0.0, 0.0),
        default_opacity: 100.0,
        expression: "b",
        blend: |_, b| b,
    },
    BlendOptions {
        id: "blend_multiply",
        name: "Blend Multiply",
        default_color: Vec3::new(1.0, 0.5, 0.0),
        default_opacity: 100.0,
        expression: "a * b",
        blend: |a, b| a * b,
    },
    BlendOptions {
        id: "blend_additive",
        name: "Blend Additive",
        default_color: Vec3::new(0.2, 0.2, 0.2),
        default_opacity: 100.0,
        expression: "a + b",
        blend: |a, b| a + b,
    },
    BlendOptions {
        id: "blend_subtract",
        name: "Blend Subtract",
        default_color: Vec3::new(0.2, 0.2, 0.2),
        default_opacity: 100.0,
        expression: "a - b",
        blend: |a, b| a - b,
    },
    BlendOptions {
        id: "blend_screen",
        name: "Blend Screen",
        default_color: Vec3::new(0.0, 0.0, 1.0),
        default_opacity: 100.0,
        expression: "1.0 - (1.0 - a) * (1.0 - b)",
        blend: |a, b| 1.0 - (1.0 - a) * (1.0 - b),
    },
    BlendOptions {
        id: "blend_overlay",
        name: "Blend Overlay",
        default_color: Vec3::new(0.5, 0.5, 1.0),
        default_opacity: 100.0,
        expression: "a < 0.5 ? 2.0 * a * b : 1.0 - 2.0 * (1.0 - a) * (1.0 - b)",
        blend: |a, b| {
            if a < 0.5 {
                2.0 * a * b
            } else {
                1.0 - 2.0 * (1.0 - a) * (1.0 - b)
            }
        },
    },
    BlendOptions {
        id: "blend_difference",
        name: "Blend Difference",
        default_color: Vec3::new(1.0, 1.0, 1.0),
        default_opacity: 100.0,
        expression: "abs(a - b)",
        blend: |a, b| (a - b).abs(),
    },
    BlendOptions {
        id: "blend_dodge",
        name: "Blend Dodge",
        default_color: Vec3::new(0.5, 0.5, 0.5),
        default_opacity: 100.0,
        expression: "b >= 1.0 ? 1.0 : min(a / (1.0 - b), 1.0)",
        blend: |a, b| {
            if b >= 1.0 {
                1.0
            } else {
                (a / (1.0 - b)).min(1.0)
            }
        },
    },
    BlendOptions {
        id: "blend_burn",
        name: "Blend Burn",
        default_color: Vec3::new(0.5, 0.5, 0.5),
        default_opacity: 100.0,
        expression: "b <= 0.0 ? 0.0 : max(1.0 - (1.0 - a) / b, 0.0)",
        blend: |a, b| {
            if b <= 0.0 {
                0.0
            } else {
                (1.0 - (1.0 - a) / b).max(0.0)
            }
        },
    },
    BlendOptions {
        id: "blend_darken",
        name: "Blend Darken",
        default_color: Vec3::new(0.5, 0.5, 0.5),
        default_opacity: 100.0,
        expression: "min(a, b)",
        blend: |a, b| a.min(b),
    },
    BlendOptions {
        id: "blend_lighten",
        name: "Blend Lighten",
        default_color: Vec3::new(0.5, 0.5, 0.5),
        default_opacity: 100.0,
        expression: "max(a, b)",
        blend: |a, b| a.max(b),
    },
    BlendOptions {
        id: "blend_xor",
        name: "Blend XOR",
        default_color: Vec3::new(1.0, 1.0, 1.0),
        default_opacity: 100.0,
        expression: "float(int(a * 255.0 + 0.5) ^ int(b * 255.0 + 0.5)) / 255.0",
        blend: |a, b| ((a * 255.0 + 0.5) as i32 ^ (b * 255.0 + 0.5) as i32) as f32 / 255.0,
    },
    BlendOptions {
        id: "blend_negation",
        name: "Blend Negation",
        default_color: Vec3::new(1.0, 1.0, 1.0),
        default_opacity: 100.0,
        expression: "1.0 - abs(1.0 - a - b)",
        blend: |a, b| 1.0 - (1.0 - a - b).abs(),
    },
];

const POSTERIZE_GLSL: &str = "color = floor(color * $0.x) / $0.y;";

const BRIGHTNESS_CONTRAST_GLSL: &str = "color = (color - 0.5) * (1.0 + $0.y) + 0.5 + $0.x;";

const HSL_ADJUST_GLSL: &str = "vec3 hsl = rgb2hsl(color);
color = hsl2rgb(vec3(
    fract(hsl.x + $0.x),
    clamp(hsl.y + $0.y, 0.0, 1.0),
    clamp(hsl.z + $0.z, 0.0, 1.0)
));";

const HSL_MULTIPLY_GLSL: &str = "vec3 hsl = rgb2hsl(color);
color = hsl2rgb(vec3(
    fract(hsl.x * $0.x),
    clamp(hsl.y * $0.y, 0.0, 1.0),
    clamp(hsl.z * $0.z, 0.0, 1.0)
));";

fn posterize() -> FilterDefinition {
    FilterDefinition::direct(
        "posterize",
        "Posterize",
        vec![Control::number(
            "levels",
            "Levels",
            5.0,
            NumericRange::new(2.0, 64.0, 1.0, 0),
        )],
        1,
        |values| {
            let levels = number_at(values, 0);
            vec![Vec4::new(levels, levels - 1.0, 0.0, 0.0)]
        },
        |color, slots| {
            let factor = slot(slots, 0);
            floor(color * factor.x) / factor.y
        },
        POSTERIZE_GLSL,
    )
}

fn brightness_contrast() -> FilterDefinition {
    let percent = NumericRange::new(-100.0, 100.0, 1.0, 0);
    FilterDefinition::direct(
        "brightness_contrast",
        "Brightness / Contrast",
        vec![
            Control::slider("brightness", "Brightness", 0.0, percent),
            Control::slider("contrast", "Contrast", 0.0, percent),
        ],
        1,
        |values| {
            vec![Vec4::new(
                number_at(values, 0) / 100.0,
                number_at(values, 1) / 100.0,
                0.0,
                0.0,
            )]
        },
        |color, slots| {
            let params = slot(slots, 0);
            (color - 0.5) * (1.0 + params.y) + 0.5 + params.x
        },
        BRIGHTNESS_CONTRAST_GLSL,
    )
}

fn hsl_adjust() -> FilterDefinition {
    let percent = NumericRange::new(-100.0, 100.0, 1.0, 0);
    FilterDefinition::direct(
        "hsl_adjust",
        "HSL Adjust",
        vec![
            Control::slider("hue", "Hue", 0.0, NumericRange::new(-180.0, 180.0, 1.0, 0)),
            Control::slider("saturation", "Saturation", 0.0, percent),
            Control::slider("lightness", "Lightness", 0.0, percent),
        ],
        1,
        |values| {
            vec![Vec4::new(
                number_at(values, 0) / 360.0,
                number_at(values, 1) / 100.0,
                number_at(values, 2) / 100.0,
                0.0,
            )]
        },
        |color, slots| {
            let shift = slot(slots, 0);
            let hsl = rgb2hsl(color);
            hsl2rgb(Vec3::new(
                scalar::fract(hsl.x + shift.x),
                scalar::clamp(hsl.y + shift.y, 0.0, 1.0),
                scalar::clamp(hsl.z + shift.z, 0.0, 1.0),
            ))
        },
        HSL_ADJUST_GLSL,
    )
}

fn hsl_multiply() -> FilterDefinition {
    let factor = NumericRange::new(0.0, 10.0, 0.05, 2);
    FilterDefinition::direct(
        "hsl_multiply",
        "HSL Multiply",
        vec![
            Control::number("hue", "Hue", 1.0, factor),
            Control::number("saturation", "Saturation", 1.0, factor),
            Control::number("lightness", "Lightness", 1.0, factor),
        ],
        1,
        |values| {
            vec![Vec4::new(
                number_at(values, 0),
                number_at(values, 1),
                number_at(values, 2),
                0.0,
            )]
        },
        |color, slots| {
            let scale = slot(slots, 0);
            let hsl = rgb2hsl(color);
            hsl2rgb(Vec3::new(
                scalar::fract(hsl.x * scale.x),
                scalar::clamp(hsl.y * scale.y, 0.0, 1.0),
                scalar::clamp(hsl.z * scale.z, 0.0, 1.0),
            ))
        },
        HSL_MULTIPLY_GLSL,
    )
}

/// Every built-in definition, direct filters first.
pub fn builtin_definitions() -> Vec<FilterDefinition> {
    let mut definitions = vec![posterize(), brightness_contrast(), hsl_adjust(), hsl_multiply()];
    definitions.extend(BLEND_MODES.iter().copied().map(FilterDefinition::blend));
    definitions
}
