use crate::{
    modulo,
    vec::{Vec2, Vec3, mix},
};

use super::primitives::{sd_box, sd_box_frame, sd_cone, sd_sphere, sd_torus};

/// Length of a full morph cycle, in seconds
pub const MORPH_CYCLE_LENGTH: f64 = 5.0;

const BOX_HALF_EXTENT: f64 = 0.9;
const BOX_FRAME_EDGE: f64 = 0.25;
const TORUS_RADII: (f64, f64) = (1.0, 0.2);
const SPHERE_RADIUS: f64 = 1.0;
const CONE_SLOPE: (f64, f64) = (0.5, 0.5);
const CONE_HEIGHT: f64 = 1.0;

/// The five shapes a shifter morphs through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    BoxFrame,
    Torus,
    Sphere,
    Cone,
    Box,
}

impl Primitive {
    /// Order in which the shapes are visited, one stage per time unit
    pub const CYCLE: [Self; 5] = [
        Self::BoxFrame,
        Self::Torus,
        Self::Sphere,
        Self::Cone,
        Self::Box,
    ];

    /// Shape this one blends into
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::BoxFrame => Self::Torus,
            Self::Torus => Self::Sphere,
            Self::Sphere => Self::Cone,
            Self::Cone => Self::Box,
            Self::Box => Self::BoxFrame,
        }
    }

    /// Signed distance from `p`, given relative to the shape center
    #[must_use]
    pub fn distance(self, p: Vec3) -> f64 {
        let half_extent = Vec3::new(BOX_HALF_EXTENT, BOX_HALF_EXTENT, BOX_HALF_EXTENT);
        match self {
            Self::BoxFrame => sd_box_frame(p, half_extent, BOX_FRAME_EDGE),
            Self::Torus => sd_torus(p, Vec2::new(TORUS_RADII.0, TORUS_RADII.1)),
            Self::Sphere => sd_sphere(p, SPHERE_RADIUS),
            Self::Cone => sd_cone(p, Vec2::new(CONE_SLOPE.0, CONE_SLOPE.1), CONE_HEIGHT),
            Self::Box => sd_box(p, half_extent),
        }
    }
}

/// Position inside the morph cycle: the stage being played and how far the
/// blend toward the next shape has progressed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MorphPhase {
    pub from: Primitive,
    pub weight: f64,
}

impl MorphPhase {
    /// Phase of a shifter at `time_ms`, shifted by its own offset (in seconds)
    #[must_use]
    pub fn at(time_ms: f64, time_offset: f64) -> Self {
        Self::from_tau(modulo(time_ms / 1000.0 + time_offset, MORPH_CYCLE_LENGTH))
    }

    /// Phase from a cycle position `tau` in [0, 5)
    #[must_use]
    pub fn from_tau(tau: f64) -> Self {
        // `modulo` may round up to exactly 5.0, keep it as the end of the last stage
        let stage = (tau.floor().max(0.0) as usize).min(Primitive::CYCLE.len() - 1);
        Self {
            from: Primitive::CYCLE[stage],
            weight: tau - stage as f64,
        }
    }

    /// Shape the current stage blends into
    #[must_use]
    pub const fn to(&self) -> Primitive {
        self.from.next()
    }

    /// Signed distance of the blended shape at `p`, relative to the shape center
    #[must_use]
    pub fn distance(&self, p: Vec3) -> f64 {
        mix(self.from.distance(p), self.to().distance(p), self.weight)
    }
}
