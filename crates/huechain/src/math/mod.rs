pub mod hsl;
pub mod vec;

pub use hsl::{hsl2rgb, hsl_degrees_to_rgb, rgb2hsl, HSL_GLSL};
pub use vec::{abs, clamp, floor, fract, max, min, mix, Operand, Vec3, Vec4, Vector};
