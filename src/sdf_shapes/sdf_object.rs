use crate::vec::{Color3, Point3};

/// Value of the scene field at a point: the signed distance to the closest
/// surface and the base color of that surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneSample {
    pub distance: f64,
    pub color: Color3,
}

impl SceneSample {
    #[must_use]
    pub const fn new(distance: f64, color: Color3) -> Self {
        Self { distance, color }
    }
}

/// Trait implemented by anything that can be sphere traced.
///
/// The distance is negative inside a solid. It is not required to be an exact
/// Euclidean distance, only a bound the marcher can step by.
pub trait DistanceField: Send + Sync {
    /// Evaluate the field at a world-space point.
    fn sample(&self, world_p: Point3) -> SceneSample;

    /// Signed distance only, for callers that do not need the color.
    fn signed_distance(&self, world_p: Point3) -> f64 {
        self.sample(world_p).distance
    }
}
