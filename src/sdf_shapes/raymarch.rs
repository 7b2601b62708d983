use std::collections::HashMap;

use cgmath::InnerSpace;
use tinyjson::JsonValue;

use crate::{
    NUMBER_MARCH_STEPS, NUMBER_TRACED_RAYS,
    constants::{HIT_EPSILON, MAX_TRACE_DISTANCE},
    ray::Ray,
    vec::{Point3, Vec3},
};

use super::sdf_object::{DistanceField, SceneSample};

/// Step used by the central differences of [`compute_normal`]
pub const NORMAL_EPSILON: f64 = 1.0e-3;

/// User-tunable parameters that control ray marching behaviour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaymarchSettings {
    /// Hard cap on the number of sphere-tracing steps.
    pub max_steps: u32,
    /// Field value under which we consider the surface "hit".
    pub hit_epsilon: f64,
    /// Traveled distance after which the ray escapes.
    pub max_travel_distance: f64,
}

impl RaymarchSettings {
    /// Camera rays
    pub const PRIMARY: Self = Self::with_steps(2048);
    /// Occlusion rays toward the light
    pub const SHADOW: Self = Self::with_steps(32);
    /// One bounce of a reflection ray
    pub const REFLECTION: Self = Self::with_steps(64);

    #[must_use]
    pub const fn with_steps(max_steps: u32) -> Self {
        Self {
            max_steps,
            hit_epsilon: HIT_EPSILON,
            max_travel_distance: MAX_TRACE_DISTANCE,
        }
    }

    /// Merge JSON overrides into the current settings.
    #[must_use]
    pub fn with_overrides(&self, json: &HashMap<String, JsonValue>) -> Self {
        let mut merged = *self;

        if let Some(v) = json.get("max_steps").and_then(|v| v.get::<f64>()) {
            merged.max_steps = v.max(1.0) as u32;
        }
        if let Some(v) = json.get("hit_epsilon").and_then(|v| v.get::<f64>()) {
            merged.hit_epsilon = v.max(1.0e-8);
        }
        if let Some(v) = json.get("max_travel_distance").and_then(|v| v.get::<f64>()) {
            merged.max_travel_distance = v.max(0.0);
        }

        merged
    }
}

impl Default for RaymarchSettings {
    fn default() -> Self {
        Self::PRIMARY
    }
}

/// Payload returned once a surface hit is confirmed.
#[derive(Debug, Clone, Copy)]
pub struct RaymarchHit {
    /// Ray parameter at the hit.
    pub t: f64,
    /// World-space impact point.
    pub position: Point3,
    /// Field value and surface color at the impact point.
    pub sample: SceneSample,
}

/// Status of the marching attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaymarchStatus {
    /// Surface detected under the hit epsilon.
    Hit,
    /// Traveled distance went past the maximum.
    Escaped,
    /// Step budget exhausted before either of the above.
    MaxStepsExceeded,
}

/// Aggregated result returned by the marching routine.
#[derive(Debug, Clone, Copy)]
pub struct RaymarchResult {
    pub status: RaymarchStatus,
    pub hit: Option<RaymarchHit>,
    /// Ray parameter where marching stopped, can be used to resume the ray.
    pub t: f64,
    /// Number of field evaluations.
    pub steps: u32,
}

impl RaymarchResult {
    /// Helper for miss cases.
    #[must_use]
    pub const fn miss(status: RaymarchStatus, t: f64, steps: u32) -> Self {
        Self {
            status,
            hit: None,
            t,
            steps,
        }
    }

    /// Helper for successful hits.
    #[must_use]
    pub const fn success(hit: RaymarchHit, steps: u32) -> Self {
        Self {
            status: RaymarchStatus::Hit,
            hit: Some(hit),
            t: hit.t,
            steps,
        }
    }
}

/// Sphere trace `field` along `ray`, starting at `ray.tmin`.
///
/// Each step advances by the field value at the current point.
pub fn raymarch(ray: &Ray, field: &dyn DistanceField, settings: RaymarchSettings) -> RaymarchResult {
    let max_travel = settings.max_travel_distance.min(ray.tmax);
    let mut t = ray.tmin;
    let mut steps = 0_u32;

    let result = loop {
        if steps >= settings.max_steps {
            break RaymarchResult::miss(RaymarchStatus::MaxStepsExceeded, t, steps);
        }

        let position = ray.point_at(t);
        let sample = field.sample(position);
        steps += 1;

        if !sample.distance.is_finite() {
            break RaymarchResult::miss(RaymarchStatus::Escaped, t, steps);
        }

        if sample.distance < settings.hit_epsilon {
            break RaymarchResult::success(
                RaymarchHit {
                    t,
                    position,
                    sample,
                },
                steps,
            );
        }

        t += sample.distance;
        if t > max_travel {
            break RaymarchResult::miss(RaymarchStatus::Escaped, t, steps);
        }
    };

    NUMBER_TRACED_RAYS.with(|f| *f.borrow_mut() += 1);
    NUMBER_MARCH_STEPS.with(|f| *f.borrow_mut() += result.steps as usize);
    result
}

/// Estimate the normal direction using central differences on the field.
///
/// A zero gradient gives a non-finite normal, it is left as is.
pub fn compute_normal(world_p: Point3, field: &dyn DistanceField, eps: f64) -> Vec3 {
    let offset_x = Vec3::new(eps, 0.0, 0.0);
    let offset_y = Vec3::new(0.0, eps, 0.0);
    let offset_z = Vec3::new(0.0, 0.0, eps);

    let dx = field.signed_distance(world_p + offset_x) - field.signed_distance(world_p - offset_x);
    let dy = field.signed_distance(world_p + offset_y) - field.signed_distance(world_p - offset_y);
    let dz = field.signed_distance(world_p + offset_z) - field.signed_distance(world_p - offset_z);

    Vec3::new(dx, dy, dz).normalize()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use cgmath::{EuclideanSpace, InnerSpace, assert_abs_diff_eq};
    use tinyjson::JsonValue;

    use super::{
        DistanceField, NORMAL_EPSILON, RaymarchSettings, RaymarchStatus, SceneSample,
        compute_normal, raymarch,
    };
    use crate::{
        ray::Ray,
        vec::{Color3, Point3, Vec3},
    };

    /// Floor at y = -1
    struct Floor;
    impl DistanceField for Floor {
        fn sample(&self, p: Point3) -> SceneSample {
            SceneSample::new(p.y + 1.0, Color3::new(0.5, 0.5, 0.5))
        }
    }

    /// Unit sphere at the origin
    struct Ball;
    impl DistanceField for Ball {
        fn sample(&self, p: Point3) -> SceneSample {
            SceneSample::new(p.to_vec().magnitude() - 1.0, Color3::new(1.0, 0.0, 0.0))
        }
    }

    /// Field that always lets the ray advance by the same amount
    struct Constant(f64);
    impl DistanceField for Constant {
        fn sample(&self, _p: Point3) -> SceneSample {
            SceneSample::new(self.0, Color3::new(0.0, 0.0, 0.0))
        }
    }

    #[test]
    fn hit_floor() {
        let ray = Ray::new(&Point3::new(0.0, 0.0, 0.0), &Vec3::new(0.0, -1.0, 0.0));
        let res = raymarch(&ray, &Floor, RaymarchSettings::PRIMARY);
        assert_eq!(res.status, RaymarchStatus::Hit);
        let hit = res.hit.unwrap();
        assert_abs_diff_eq!(hit.t, 1.0);
        assert_abs_diff_eq!(hit.position.y, -1.0);
        assert_eq!(res.steps, 2);
    }

    #[test]
    fn escape_away_from_floor() {
        let ray = Ray::new(&Point3::new(0.0, 0.0, 0.0), &Vec3::new(0.0, 1.0, 0.0));
        let res = raymarch(&ray, &Floor, RaymarchSettings::PRIMARY);
        assert_eq!(res.status, RaymarchStatus::Escaped);
        assert!(res.hit.is_none());
        assert!(res.t > 1000.0);
        assert!(res.steps < 2048);
    }

    #[test]
    fn step_budget_is_respected() {
        let ray = Ray::new(&Point3::new(0.0, 0.0, 0.0), &Vec3::new(0.0, 0.0, 1.0));
        let res = raymarch(&ray, &Constant(0.5), RaymarchSettings::SHADOW);
        assert_eq!(res.status, RaymarchStatus::MaxStepsExceeded);
        assert_eq!(res.steps, 32);
        assert_abs_diff_eq!(res.t, 16.0);

        // camera rays stop after 2048 steps, well before the escape distance
        let res = raymarch(&ray, &Constant(0.25), RaymarchSettings::PRIMARY);
        assert_eq!(res.status, RaymarchStatus::MaxStepsExceeded);
        assert_eq!(res.steps, 2048);
        assert!(res.hit.is_none());
        assert_abs_diff_eq!(res.t, 512.0);
    }

    #[test]
    fn marching_resumes_from_tmin() {
        let ray = Ray::new(&Point3::new(0.0, 0.0, 0.0), &Vec3::new(0.0, 0.0, 1.0));
        let first = raymarch(&ray, &Constant(0.5), RaymarchSettings::SHADOW);
        let resumed = raymarch(
            &ray.with_distance_min(first.t),
            &Constant(0.5),
            RaymarchSettings::SHADOW,
        );
        assert_abs_diff_eq!(resumed.t, 32.0);
    }

    #[test]
    fn start_inside_counts_as_hit() {
        let ray = Ray::new(&Point3::new(0.0, 0.0, 0.0), &Vec3::new(1.0, 0.0, 0.0));
        let res = raymarch(&ray, &Ball, RaymarchSettings::PRIMARY);
        assert_eq!(res.status, RaymarchStatus::Hit);
        assert_abs_diff_eq!(res.t, 0.0);
    }

    #[test]
    fn normals_from_gradient() {
        let n = compute_normal(Point3::new(0.3, -1.0, 2.0), &Floor, NORMAL_EPSILON);
        assert_abs_diff_eq!(n, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-9);

        let n = compute_normal(Point3::new(0.0, 0.0, 1.0), &Ball, NORMAL_EPSILON);
        assert_abs_diff_eq!(n, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn overrides_from_json() {
        let mut json = HashMap::new();
        json.insert("max_steps".to_string(), JsonValue::Number(100.0));
        json.insert("hit_epsilon".to_string(), JsonValue::Number(0.01));
        let settings = RaymarchSettings::PRIMARY.with_overrides(&json);
        assert_eq!(settings.max_steps, 100);
        assert_abs_diff_eq!(settings.hit_epsilon, 0.01);
        assert_abs_diff_eq!(settings.max_travel_distance, 1000.0);
    }
}
