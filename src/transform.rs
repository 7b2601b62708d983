use std::collections::HashMap;

use cgmath::{InnerSpace, SquareMatrix};
use tinyjson::JsonValue;

use crate::{
    Error,
    json::json_to_mat4,
    ray::Ray,
    vec::{Mat4, Point3, Vec3, Vec4},
};

/// Camera-to-world matrix looking from `from` toward `at`.
///
/// Columns are (left, up, back, origin): the camera looks down its local -z axis.
#[must_use]
pub fn look_at_matrix(from: Vec3, at: Vec3, up: Vec3) -> Mat4 {
    let dir = (from - at).normalize();
    let left = up.cross(dir).normalize();
    let up = dir.cross(left).normalize();

    Mat4::from_cols(
        Vec4::new(left.x, left.y, left.z, 0.0),
        Vec4::new(up.x, up.y, up.z, 0.0),
        Vec4::new(dir.x, dir.y, dir.z, 0.0),
        Vec4::new(from.x, from.y, from.z, 1.0),
    )
}

// Note: cannot be called "Transform", it is a trait defined in cgmath.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub m: Mat4,
}

impl ViewTransform {
    /// Transform from a matrix, fails if the matrix cannot be inverted
    pub fn new(m: Mat4) -> crate::Result<Self> {
        let finite = (0..4).all(|c| (0..4).all(|r| m[c][r].is_finite()));
        if !finite {
            return Err(Error::SingularTransform);
        }
        if m.invert().is_none() {
            return Err(Error::SingularTransform);
        }
        Ok(Self { m })
    }

    /// Apply the homogenous transformation to a 3D direction vector
    #[must_use]
    pub fn vector(&self, v: &Vec3) -> Vec3 {
        let homogeneous = self.m * Vec4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(homogeneous.x, homogeneous.y, homogeneous.z)
    }

    /// Apply transformation to a 3D point
    #[must_use]
    pub fn point(&self, p: &Point3) -> Point3 {
        Point3::from_homogeneous(self.m * p.to_homogeneous())
    }

    /// Image of the local origin
    #[must_use]
    pub fn origin(&self) -> Point3 {
        Point3::new(self.m.w.x, self.m.w.y, self.m.w.z)
    }

    /// Map a local ray, keeping the direction unit length
    #[must_use]
    pub fn ray(&self, r: &Ray) -> Ray {
        Ray::new(&self.point(&r.o), &self.vector(&r.d).normalize()).with_range(r.tmin, r.tmax)
    }
}

/// Empty transformation
impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            m: Mat4::identity(),
        }
    }
}

/// Read the JSON given transform or use the identity transform
pub fn json_to_transform(
    json: &HashMap<String, JsonValue>,
    name: &str,
) -> crate::Result<ViewTransform> {
    match json_to_mat4(json, name)? {
        Some(m) => ViewTransform::new(m),
        None => Ok(ViewTransform::default()),
    }
}
