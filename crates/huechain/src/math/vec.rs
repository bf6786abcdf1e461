use std::ops::{Add, Div, Mul, Neg, Sub};

use bytemuck::{Pod, Zeroable};

/// Fixed-arity float vector with component-wise combinators.
///
/// `zip` only accepts a value of the same type, so combining a `Vec3` with a
/// `Vec4` is rejected at compile time rather than coerced.
pub trait Vector: Copy + PartialEq + std::fmt::Debug {
    fn splat(value: f32) -> Self;
    fn map(self, f: impl Fn(f32) -> f32) -> Self;
    fn zip(self, other: Self, f: impl Fn(f32, f32) -> f32) -> Self;
}

/// Right-hand side of a broadcastable operation: a scalar or a same-arity vector.
pub trait Operand<V: Vector>: Copy {
    fn broadcast(self) -> V;
}

impl<V: Vector> Operand<V> for f32 {
    fn broadcast(self) -> V {
        V::splat(self)
    }
}

/// Three components, read as RGB or HSL depending on the caller.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Four components; filter parameter slots are always `Vec4`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn r(self) -> f32 {
        self.x
    }

    pub fn g(self) -> f32 {
        self.y
    }

    pub fn b(self) -> f32 {
        self.z
    }

    pub fn extend(self, w: f32) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, w)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl Vec4 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn rgb(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn a(self) -> f32 {
        self.w
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(value: [f32; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

impl From<[f32; 4]> for Vec4 {
    fn from(value: [f32; 4]) -> Self {
        Self::new(value[0], value[1], value[2], value[3])
    }
}

impl Vector for Vec3 {
    fn splat(value: f32) -> Self {
        Self::new(value, value, value)
    }

    fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Self::new(f(self.x), f(self.y), f(self.z))
    }

    fn zip(self, other: Self, f: impl Fn(f32, f32) -> f32) -> Self {
        Self::new(f(self.x, other.x), f(self.y, other.y), f(self.z, other.z))
    }
}

impl Vector for Vec4 {
    fn splat(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Self::new(f(self.x), f(self.y), f(self.z), f(self.w))
    }

    fn zip(self, other: Self, f: impl Fn(f32, f32) -> f32) -> Self {
        Self::new(
            f(self.x, other.x),
            f(self.y, other.y),
            f(self.z, other.z),
            f(self.w, other.w),
        )
    }
}

impl Operand<Vec3> for Vec3 {
    fn broadcast(self) -> Vec3 {
        self
    }
}

impl Operand<Vec4> for Vec4 {
    fn broadcast(self) -> Vec4 {
        self
    }
}

macro_rules! impl_binary_ops {
    (@op $ty:ty, $trait:ident, $method:ident, $op:tt) => {
        impl $trait<$ty> for $ty {
            type Output = $ty;

            fn $method(self, rhs: $ty) -> $ty {
                self.zip(rhs, |a, b| a $op b)
            }
        }

        impl $trait<f32> for $ty {
            type Output = $ty;

            fn $method(self, rhs: f32) -> $ty {
                self.map(|a| a $op rhs)
            }
        }
    };
    ($ty:ty) => {
        impl_binary_ops!(@op $ty, Add, add, +);
        impl_binary_ops!(@op $ty, Sub, sub, -);
        impl_binary_ops!(@op $ty, Mul, mul, *);
        impl_binary_ops!(@op $ty, Div, div, /);

        impl Neg for $ty {
            type Output = $ty;

            fn neg(self) -> $ty {
                self.map(|v| -v)
            }
        }
    };
}

impl_binary_ops!(Vec3);
impl_binary_ops!(Vec4);

pub fn floor<V: Vector>(value: V) -> V {
    value.map(f32::floor)
}

/// GLSL `fract`: `x - floor(x)`.
pub fn fract<V: Vector>(value: V) -> V {
    value.map(|v| v - v.floor())
}

pub fn abs<V: Vector>(value: V) -> V {
    value.map(f32::abs)
}

pub fn min<V: Vector>(value: V, other: impl Operand<V>) -> V {
    value.zip(other.broadcast(), |a, b| if b < a { b } else { a })
}

pub fn max<V: Vector>(value: V, other: impl Operand<V>) -> V {
    value.zip(other.broadcast(), |a, b| if b > a { b } else { a })
}

/// Component-wise clamp with scalar or per-component bounds.
pub fn clamp<V: Vector>(value: V, low: impl Operand<V>, high: impl Operand<V>) -> V {
    min(max(value, low), high)
}

/// GLSL `mix`: `x * (1 - t) + y * t`.
pub fn mix<V>(x: V, y: V, t: f32) -> V
where
    V: Vector + Add<Output = V> + Mul<f32, Output = V>,
{
    x * (1.0 - t) + y * t
}

/// Scalar counterparts of the GLSL builtins used by filter kernels.
pub mod scalar {
    pub fn fract(value: f32) -> f32 {
        value - value.floor()
    }

    pub fn clamp(value: f32, low: f32, high: f32) -> f32 {
        if value < low {
            low
        } else if value > high {
            high
        } else {
            value
        }
    }

    pub fn mix(x: f32, y: f32, t: f32) -> f32 {
        x * (1.0 - t) + y * t
    }
}
