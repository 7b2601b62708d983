//! Signed distance functions of the base primitives, expressed in the
//! primitive's local frame (centered at the origin).
//!
//! Formulas follow <https://iquilezles.org/articles/distfunctions/>.

use cgmath::InnerSpace;

use crate::vec::{Vec2, Vec3, abs, max_zero};

#[must_use]
pub fn sd_sphere(p: Vec3, radius: f64) -> f64 {
    p.magnitude() - radius
}

#[must_use]
pub fn sd_box(p: Vec3, half_extent: Vec3) -> f64 {
    let q = abs(p) - half_extent;
    max_zero(q).magnitude() + q.x.max(q.y.max(q.z)).min(0.0)
}

/// Edges of a box of half extents `half_extent`, each edge being a bar of
/// thickness `edge`
#[must_use]
pub fn sd_box_frame(p: Vec3, half_extent: Vec3, edge: f64) -> f64 {
    let p = abs(p) - half_extent;
    let e = Vec3::new(edge, edge, edge);
    let q = abs(p + e) - e;

    let bar = |a: f64, b: f64, c: f64| {
        max_zero(Vec3::new(a, b, c)).magnitude() + a.max(b.max(c)).min(0.0)
    };
    bar(p.x, q.y, q.z)
        .min(bar(q.x, p.y, q.z))
        .min(bar(q.x, q.y, p.z))
}

/// Torus lying in the xz plane: `radii.x` is the ring radius, `radii.y` the tube radius
#[must_use]
pub fn sd_torus(p: Vec3, radii: Vec2) -> f64 {
    let q = Vec2::new(Vec2::new(p.x, p.z).magnitude() - radii.x, p.y);
    q.magnitude() - radii.y
}

/// Cone with its apex at the origin opening downward, cut by the plane `y = -height`.
/// `slope` is not normalized, the field is only a bound near the slanted side.
#[must_use]
pub fn sd_cone(p: Vec3, slope: Vec2, height: f64) -> f64 {
    let q = Vec2::new(p.x, p.z).magnitude();
    slope.dot(Vec2::new(q, p.y)).max(-height - p.y)
}
