use crate::{
    constants::MAX_TRACE_DISTANCE,
    vec::{Point3, Vec3},
};

#[derive(Clone, Copy, Debug)]
pub struct Ray {
    /// ray origin
    pub o: Point3,
    /// ray direction (normalized)
    pub d: Vec3,
    /// distance already travelled, marching resumes from here
    pub tmin: f64,
    /// distance after which the ray is considered escaped
    pub tmax: f64,
}

impl Ray {
    #[must_use]
    pub const fn new(origin: &Point3, direction: &Vec3) -> Self {
        Self {
            o: *origin,
            d: *direction,
            tmin: 0.0,
            tmax: MAX_TRACE_DISTANCE,
        }
    }

    #[must_use]
    pub const fn with_range(mut self, tmin: f64, tmax: f64) -> Self {
        self.tmax = tmax;
        self.tmin = tmin;
        self
    }

    #[must_use]
    pub const fn with_distance_min(mut self, tmin: f64) -> Self {
        self.tmin = tmin;
        self
    }

    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3 {
        self.o + t * self.d
    }

    /// New ray leaving `origin` along `direction`, nudged by `bias` to avoid
    /// hitting the surface it starts on
    #[must_use]
    pub fn spawn(origin: &Point3, direction: &Vec3, bias: f64) -> Self {
        Self::new(&(*origin + *direction * bias), direction)
    }
}
