//! HSL <-> RGB conversion, once for host evaluation and once as GLSL source.
//!
//! Both versions work on normalized values: hue, saturation and lightness all
//! live in `[0, 1]` and hue wraps modulo 1. The GLSL in [`HSL_GLSL`] is spliced
//! verbatim into every synthesized fragment program, so any change here must
//! be mirrored there statement for statement.

use super::vec::{scalar, Vec3};

/// GLSL definitions of `hue2rgb`, `hsl2rgb` and `rgb2hsl`.
pub const HSL_GLSL: &str = r"float hue2rgb(float p, float q, float hue) {
    float t = hue;
    if (t < 0.0) t += 1.0;
    if (t > 1.0) t -= 1.0;
    if (t < 1.0 / 6.0) return p + (q - p) * 6.0 * t;
    if (t < 1.0 / 2.0) return q;
    if (t < 2.0 / 3.0) return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    return p;
}

vec3 hsl2rgb(vec3 c) {
    float h = c.x - floor(c.x);
    float s = c.y;
    float l = c.z;
    if (s == 0.0) {
        return vec3(l, l, l);
    }
    float q = l < 0.5 ? l * (1.0 + s) : l + s - l * s;
    float p = 2.0 * l - q;
    return vec3(
        hue2rgb(p, q, h + 1.0 / 3.0),
        hue2rgb(p, q, h),
        hue2rgb(p, q, h - 1.0 / 3.0)
    );
}

vec3 rgb2hsl(vec3 c) {
    float mn = min(c.r, min(c.g, c.b));
    float mx = max(c.r, max(c.g, c.b));
    float l = (mx + mn) / 2.0;
    float s = 0.0;
    float h = 0.0;
    if (mx != mn) {
        float d = mx - mn;
        s = l < 0.5 ? d / (mx + mn) : d / (2.0 - mx - mn);
        if (c.r == mx) {
            h = (c.g - c.b) / d;
        } else if (c.g == mx) {
            h = 2.0 + (c.b - c.r) / d;
        } else {
            h = 4.0 + (c.r - c.g) / d;
        }
        h = h / 6.0;
        if (h < 0.0) h += 1.0;
    }
    return vec3(h, s, l);
}
";

fn hue2rgb(p: f32, q: f32, t: f32) -> f32 {
    let mut t = t;
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

/// Converts normalized HSL (`x` = hue, `y` = saturation, `z` = lightness) to RGB.
pub fn hsl2rgb(c: Vec3) -> Vec3 {
    let h = scalar::fract(c.x);
    let s = c.y;
    let l = c.z;
    if s == 0.0 {
        return Vec3::new(l, l, l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Vec3::new(
        hue2rgb(p, q, h + 1.0 / 3.0),
        hue2rgb(p, q, h),
        hue2rgb(p, q, h - 1.0 / 3.0),
    )
}

/// Converts RGB to normalized HSL. Achromatic input yields hue and saturation 0.
pub fn rgb2hsl(c: Vec3) -> Vec3 {
    let mn = c.x.min(c.y.min(c.z));
    let mx = c.x.max(c.y.max(c.z));
    let l = (mx + mn) / 2.0;
    let mut s = 0.0;
    let mut h = 0.0;
    if mx != mn {
        let d = mx - mn;
        s = if l < 0.5 {
            d / (mx + mn)
        } else {
            d / (2.0 - mx - mn)
        };
        h = if c.x == mx {
            (c.y - c.z) / d
        } else if c.y == mx {
            2.0 + (c.z - c.x) / d
        } else {
            4.0 + (c.x - c.y) / d
        };
        h /= 6.0;
        if h < 0.0 {
            h += 1.0;
        }
    }
    Vec3::new(h, s, l)
}

/// Converts a hue in degrees plus saturation/lightness to RGB.
pub fn hsl_degrees_to_rgb(hue: f32, saturation: f32, lightness: f32) -> Vec3 {
    hsl2rgb(Vec3::new(hue / 360.0, saturation, lightness))
}
