use crate::Real;
use cgmath::{self, InnerSpace};

// 2D
pub type Vec2 = cgmath::Vector2<Real>;
pub type Vec2u = cgmath::Vector2<u32>;

// 3D and color
pub type Vec3 = cgmath::Vector3<Real>;
pub type Point3 = cgmath::Point3<Real>;
pub type Color3 = cgmath::Vector3<Real>;

// 4D and color with alpha
pub type Vec4 = cgmath::Vector4<Real>;
pub type Color4 = cgmath::Vector4<Real>;

// Matrices
pub type Mat4 = cgmath::Matrix4<Real>;

/// Check if the color vector contains a NaN/Inf value
#[must_use]
pub fn is_valid_color(c: &Color3) -> bool {
    (0..3).all(|i| c[i].is_finite())
}

/// Mirror `d` around the plane of normal `n` (`n` is expected to be unit length)
#[must_use]
pub fn reflect(d: &Vec3, n: &Vec3) -> Vec3 {
    *d - 2.0 * d.dot(*n) * *n
}

/// Linear interpolation between `x` and `y`
#[must_use]
pub fn mix<T>(x: T, y: T, a: Real) -> T
where
    T: std::ops::Mul<Real, Output = T> + std::ops::Add<Output = T>,
{
    x * (1.0 - a) + y * a
}

/// Hermite interpolation of `x` between the two edges, saturated to [0, 1].
/// A NaN input saturates to 0 (`max`/`min` drop NaN operands).
#[must_use]
pub fn smoothstep(edge0: Real, edge1: Real, x: Real) -> Real {
    let t = ((x - edge0) / (edge1 - edge0)).max(0.0).min(1.0);
    t * t * 2.0f64.mul_add(-t, 3.0)
}

/// Fractional part, always in [0, 1) for finite input
#[must_use]
pub fn fract(x: Real) -> Real {
    x - x.floor()
}

/// Component-wise maximum with zero
#[must_use]
pub fn max_zero(v: Vec3) -> Vec3 {
    Vec3::new(v.x.max(0.0), v.y.max(0.0), v.z.max(0.0))
}

/// Component-wise absolute value
#[must_use]
pub fn abs(v: Vec3) -> Vec3 {
    Vec3::new(v.x.abs(), v.y.abs(), v.z.abs())
}
