use std::collections::HashMap;

use cgmath::InnerSpace;
use log::{debug, warn};
use tinyjson::JsonValue;

use crate::{
    Error, deg2rad,
    json::{json_to_f64, json_to_vec2u},
    rad2deg,
    ray::Ray,
    transform::{ViewTransform, json_to_transform, look_at_matrix},
    vec::{Point3, Vec2, Vec2u, Vec3},
};

/// Vertical field of view, in degrees
pub const DEFAULT_VFOV: f64 = 75.0;

/// Camera-space direction of the fragment `frag` of a viewport of size `size`.
///
/// The camera looks down -z; `frag` has its origin at the bottom-left corner.
#[must_use]
pub fn ray_direction(fov_deg: f64, size: Vec2, frag: Vec2) -> Vec3 {
    let xy = frag - size / 2.0;
    let z = size.y / (deg2rad(fov_deg) / 2.0).tan();
    Vec3::new(xy.x, xy.y, -z).normalize()
}

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub resolution: Vec2u,
    /// Vertical field of view in degrees
    pub vfov: f64,
    /// Camera to world
    pub transform: ViewTransform,
}

impl Camera {
    pub fn new(transform: ViewTransform, resolution: Vec2u, vfov: f64) -> crate::Result<Self> {
        if resolution.x == 0 || resolution.y == 0 {
            return Err(Error::InvalidViewport(resolution.x, resolution.y));
        }
        Ok(Self {
            resolution,
            vfov,
            transform,
        })
    }

    /// Camera placed at `eye` and looking at `target`
    pub fn look_at(eye: Point3, target: Point3, up: Vec3, resolution: Vec2u) -> crate::Result<Self> {
        let m = look_at_matrix(
            Vec3::new(eye.x, eye.y, eye.z),
            Vec3::new(target.x, target.y, target.z),
            up,
        );
        Self::new(ViewTransform::new(m)?, resolution, DEFAULT_VFOV)
    }

    pub fn from_json(json: &HashMap<String, JsonValue>) -> crate::Result<Self> {
        let transform = json_to_transform(json, "transform")?;
        let resolution = json_to_vec2u(json, "resolution", Vec2u::new(800, 600));
        let mut vfov = json_to_f64(json, "vfov", DEFAULT_VFOV);
        if !(vfov > 0.0 && vfov < 180.0) {
            warn!("Field of view out of range ({vfov} deg), using {DEFAULT_VFOV} deg");
            vfov = DEFAULT_VFOV;
        }
        Self::new(transform, resolution, vfov)
    }

    /// Same camera with another pose
    #[must_use]
    pub const fn with_transform(&self, transform: ViewTransform) -> Self {
        Self {
            resolution: self.resolution,
            vfov: self.vfov,
            transform,
        }
    }

    #[must_use]
    pub fn position(&self) -> Point3 {
        self.transform.origin()
    }

    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(f64::from(self.resolution.x), f64::from(self.resolution.y))
    }

    /// Fragment coordinate of the center of pixel (`x`, `row`), rows counted from the top
    #[must_use]
    pub fn frag_coord(&self, x: u32, row: u32) -> Vec2 {
        Vec2::new(
            f64::from(x) + 0.5,
            f64::from(self.resolution.y) - f64::from(row) - 0.5,
        )
    }

    /// World-space ray through the fragment `frag`
    #[must_use]
    pub fn generate_ray(&self, frag: &Vec2) -> Ray {
        let direction = ray_direction(self.vfov, self.size(), *frag);
        self.transform
            .ray(&Ray::new(&Point3::new(0.0, 0.0, 0.0), &direction))
    }

    pub fn scale(&mut self, factor: f32) {
        self.resolution.x = (((self.resolution.x as f32) * factor) as u32).max(1);
        self.resolution.y = (((self.resolution.y as f32) * factor) as u32).max(1);
    }
}

/// Smallest polar angle, keeps the view direction away from the up axis
const MIN_POLAR: f64 = 1.0e-6;

/// Orbit around a target, with the polar angle measured from +y and capped at
/// the horizon so the camera never goes below the ground
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub target: Point3,
    pub radius: f64,
    /// Angle around +y, zero toward +z
    pub azimuth: f64,
    pub polar: f64,
}

impl Orbit {
    #[must_use]
    pub fn new(target: Point3, radius: f64, azimuth: f64, polar: f64) -> Self {
        Self {
            target,
            radius,
            azimuth,
            polar: polar.clamp(MIN_POLAR, crate::constants::FRAC_PI_2),
        }
    }

    /// Orbit passing through `eye`
    #[must_use]
    pub fn from_eye(eye: Point3, target: Point3) -> Self {
        let offset = eye - target;
        let radius = offset.magnitude();
        let polar = if radius > 0.0 {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };
        Self::new(target, radius, offset.x.atan2(offset.z), polar)
    }

    /// Turn by the given angles (radians)
    #[must_use]
    pub fn rotate(&self, d_azimuth: f64, d_polar: f64) -> Self {
        let orbit = Self::new(
            self.target,
            self.radius,
            self.azimuth + d_azimuth,
            self.polar + d_polar,
        );
        debug!(
            "Orbit: azimuth {:.2} deg, polar {:.2} deg",
            rad2deg(orbit.azimuth),
            rad2deg(orbit.polar)
        );
        orbit
    }

    #[must_use]
    pub fn eye(&self) -> Point3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();
        self.target
            + self.radius * Vec3::new(sin_polar * sin_azimuth, cos_polar, sin_polar * cos_azimuth)
    }

    /// Camera-to-world transform of the orbiting camera
    pub fn transform(&self) -> crate::Result<ViewTransform> {
        let eye = self.eye();
        ViewTransform::new(look_at_matrix(
            Vec3::new(eye.x, eye.y, eye.z),
            Vec3::new(self.target.x, self.target.y, self.target.z),
            Vec3::unit_y(),
        ))
    }
}
