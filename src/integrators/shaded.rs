use std::collections::HashMap;

use cgmath::InnerSpace;
use tinyjson::JsonValue;

use crate::{
    animation::FrameState,
    array2d::Array2d,
    json::json_to_f64,
    ray::Ray,
    scene::{Scene, SceneSnapshot},
    sdf::{
        DistanceField, NORMAL_EPSILON, RaymarchHit, RaymarchSettings, RaymarchStatus,
        compute_normal, raymarch,
    },
    sky::sky,
    vec::{Color3, Point3, Vec3, mix, reflect},
};

use super::{Integrator, PixelIntegrator, json_to_settings, render};

/// Point light, the light direction at `p` is `normalize(p - LIGHT_POSITION)`
const LIGHT_POSITION: [f64; 3] = [200.0, -500.0, 150.0];
/// Lowest direct lighting factor
const MIN_INTENSITY: f64 = 0.2;
/// Lighting factor of a shadowed point
const SHADOW_INTENSITY: f64 = 0.15;
const AMBIENT: f64 = 0.2;
/// Offsets of the secondary ray origins along their direction, reflections
/// are only offset when leaving the primary hit
const SHADOW_BIAS: f64 = 0.01;
const REFLECTION_BIAS: f64 = 0.002;
const REFLECTION_BOUNCES: u32 = 3;
/// Share of the sky in a reflected color
const REFLECTED_SKY_WEIGHT: f64 = 0.6;

/// Direction used for lighting at `p`
#[must_use]
pub fn light_direction(p: Point3) -> Vec3 {
    (p - Point3::from(LIGHT_POSITION)).normalize()
}

/// Lambert shading with a hard shadow and a few mirror bounces, rays that
/// miss everything show the sky
#[derive(Debug, Clone, Copy)]
pub struct ShadedIntegrator {
    primary: RaymarchSettings,
    shadow: RaymarchSettings,
    reflection: RaymarchSettings,
    /// Number of mirror bounces, each weighted half the previous one
    bounces: u32,
}

impl Default for ShadedIntegrator {
    fn default() -> Self {
        Self {
            primary: RaymarchSettings::PRIMARY,
            shadow: RaymarchSettings::SHADOW,
            reflection: RaymarchSettings::REFLECTION,
            bounces: REFLECTION_BOUNCES,
        }
    }
}

impl ShadedIntegrator {
    #[must_use]
    pub fn from_json(json: &HashMap<String, JsonValue>) -> Self {
        Self {
            primary: json_to_settings(json, "primary", RaymarchSettings::PRIMARY),
            shadow: json_to_settings(json, "shadow", RaymarchSettings::SHADOW),
            reflection: json_to_settings(json, "reflection", RaymarchSettings::REFLECTION),
            bounces: json_to_f64(json, "bounces", f64::from(REFLECTION_BOUNCES)).max(0.0) as u32,
        }
    }

    /// Camera ray marching
    pub fn trace_primary(&self, ray: &Ray, field: &dyn DistanceField) -> Option<RaymarchHit> {
        raymarch(ray, field, self.primary).hit
    }

    /// True if something is hit marching from `origin` along `direction`.
    ///
    /// Running out of steps counts as unoccluded.
    pub fn in_shadow(&self, origin: &Point3, direction: &Vec3, field: &dyn DistanceField) -> bool {
        let res = raymarch(&Ray::new(origin, direction), field, self.shadow);
        res.status == RaymarchStatus::Hit
    }

    /// Follow the mirror bounces of `ray`, blending the colors of the hit
    /// surfaces into `color`. Returns the last ray and the blended color.
    ///
    /// The traveled distance is kept across bounces: after a hit the next
    /// bounce leaves the hit point but resumes at the distance reached so far.
    pub fn reflect_path(
        &self,
        ray: &Ray,
        color: Color3,
        field: &dyn DistanceField,
    ) -> (Ray, Color3) {
        let mut ray = *ray;
        let mut color = color;
        let mut weight = 1.0;
        for _ in 0..self.bounces {
            weight *= 0.5;
            let res = raymarch(&ray, field, self.reflection);
            match (res.status, res.hit) {
                (_, Some(hit)) => {
                    color = mix(color, hit.sample.color, weight);
                    let n = compute_normal(hit.position, field, NORMAL_EPSILON);
                    ray = Ray::new(&hit.position, &reflect(&ray.d, &n)).with_distance_min(hit.t);
                }
                (RaymarchStatus::Escaped, None) => break,
                // out of steps, the next bounce continues the same ray
                (_, None) => ray = ray.with_distance_min(res.t),
            }
        }
        (ray, color)
    }

    /// Color seen along a reflected ray, `color` being the color of the
    /// surface the ray leaves
    pub fn reflect_color(
        &self,
        ray: &Ray,
        color: Color3,
        field: &dyn DistanceField,
        time_ms: f64,
    ) -> Color3 {
        let (last, color) = self.reflect_path(ray, color, field);
        REFLECTED_SKY_WEIGHT * sky(&last.o, &last.d, time_ms) + (1.0 - REFLECTED_SKY_WEIGHT) * color
    }

    /// Color of a primary hit
    pub fn shade(&self, ray: &Ray, hit: &RaymarchHit, scene: &SceneSnapshot) -> Color3 {
        let p = hit.position;
        let n = compute_normal(p, scene, NORMAL_EPSILON);
        let l = light_direction(p);
        let mut intensity = n.dot(l).max(MIN_INTENSITY);

        let reflected = Ray::spawn(&p, &reflect(&ray.d, &n), REFLECTION_BIAS);
        let bounced = self.reflect_color(&reflected, hit.sample.color, scene, scene.time_ms);

        if self.in_shadow(&(p + l * SHADOW_BIAS), &l, scene) {
            intensity = SHADOW_INTENSITY;
        }

        bounced / 2.0 * intensity + Color3::new(AMBIENT, AMBIENT, AMBIENT)
    }
}

impl Integrator for ShadedIntegrator {
    fn render(&self, scene: &Scene, frame: &FrameState) -> Array2d<Color3> {
        render(self, scene, frame)
    }
}

impl PixelIntegrator for ShadedIntegrator {
    fn li(&self, ray: &Ray, scene: &SceneSnapshot) -> Color3 {
        self.trace_primary(ray, scene).map_or_else(
            || sky(&ray.o, &ray.d, scene.time_ms),
            |hit| self.shade(ray, &hit, scene),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use cgmath::{InnerSpace, assert_abs_diff_eq};
    use tinyjson::JsonValue;

    use super::ShadedIntegrator;
    use crate::{
        camera::Camera,
        integrators::{PixelIntegrator, evaluate_pixel},
        ray::Ray,
        scene::Scene,
        sdf::{DistanceField, SceneSample},
        sky::sky,
        vec::{Color3, Point3, Vec2, Vec2u, Vec3, is_valid_color},
    };

    /// Free space until `z = 32.5`, then solid
    struct Wall;
    impl DistanceField for Wall {
        fn sample(&self, p: Point3) -> SceneSample {
            let d = if p.z < 32.5 { 1.0 } else { 0.0 };
            SceneSample::new(d, Color3::new(1.0, 1.0, 1.0))
        }
    }

    /// Nothing at all
    struct Empty;
    impl DistanceField for Empty {
        fn sample(&self, _p: Point3) -> SceneSample {
            SceneSample::new(100.0, Color3::new(0.0, 0.0, 0.0))
        }
    }

    /// Red floor at y = 0 and blue ceiling at y = 2
    struct Corridor;
    impl DistanceField for Corridor {
        fn sample(&self, p: Point3) -> SceneSample {
            let color = if p.y < 1.0 {
                Color3::new(1.0, 0.0, 0.0)
            } else {
                Color3::new(0.0, 0.0, 1.0)
            };
            SceneSample::new(p.y.min(2.0 - p.y), color)
        }
    }

    fn camera(eye: Point3, target: Point3, up: Vec3) -> Camera {
        Camera::look_at(eye, target, up, Vec2u::new(800, 600)).unwrap()
    }

    #[test]
    fn centre_pixel_hits_a_shifter() {
        let scene = Scene::default();
        let snapshot = scene.at(0.0);
        let camera = camera(
            Point3::new(0.0, 0.0, -7.5),
            Point3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let int = ShadedIntegrator::default();
        let frag = Vec2::new(400.0, 300.0);

        // the torus of the shifter at (0, 0, -5) stands between the camera and the origin
        let ray = camera.generate_ray(&frag);
        let hit = int.trace_primary(&ray, &snapshot).unwrap();
        assert_eq!(hit.sample.color, Color3::new(1.25, 1.25, 0.0));
        assert_abs_diff_eq!(hit.position.z, -6.2, epsilon = 0.01);

        let c = evaluate_pixel(&int, &snapshot, &camera, &frag);
        assert_abs_diff_eq!(c.w, 1.0);
        let rgb = Color3::new(c.x, c.y, c.z);
        assert!(is_valid_color(&rgb));
        assert!((rgb - sky(&ray.o, &ray.d, 0.0)).magnitude() > 1e-3);
        // the surface is yellow, blue stays under red and green
        assert!(rgb.z < rgb.x && rgb.z < rgb.y);
    }

    #[test]
    fn elevated_view_hits_the_central_shifter() {
        let scene = Scene::default();
        let camera = camera(
            Point3::new(0.0, 3.0, -3.0),
            Point3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let int = ShadedIntegrator::default();
        let ray = camera.generate_ray(&Vec2::new(400.0, 300.0));
        let hit = int.trace_primary(&ray, &scene.at(0.0)).unwrap();
        assert_eq!(hit.sample.color, Color3::new(1.25, 0.0, 0.0));
    }

    #[test]
    fn top_down_view_sees_the_checkerboard() {
        let scene = Scene::default();
        let camera = camera(
            Point3::new(2.2, 50.0, 2.8),
            Point3::new(2.2, -1.0, 2.8),
            Vec3::new(0.0, 0.0, 1.0),
        );
        let int = ShadedIntegrator::default();
        let ray = camera.generate_ray(&Vec2::new(400.0, 300.0));
        let hit = int.trace_primary(&ray, &scene.at(2500.0)).unwrap();
        assert_abs_diff_eq!(hit.position.y, -1.0, epsilon = 1e-3);
        assert_eq!(hit.sample.color, Color3::new(0.75, 0.75, 0.75));
    }

    #[test]
    fn missed_rays_show_the_sky() {
        let int = ShadedIntegrator::default();
        let ray = Ray::new(&Point3::new(0.0, 2.0, 0.0), &Vec3::new(0.1, 0.8, 0.3).normalize());
        let scene = Scene::default();
        let snapshot = scene.at(300.0);
        assert_abs_diff_eq!(int.li(&ray, &snapshot), sky(&ray.o, &ray.d, 300.0));
    }

    #[test]
    fn shadow_unobstructed() {
        let int = ShadedIntegrator::default();
        let scene = Scene::default();
        // between four shifters, nothing above
        let p = Point3::new(2.5, -0.99, 2.5);
        assert!(!int.in_shadow(&p, &Vec3::new(0.0, 1.0, 0.0), &scene.at(0.0)));
    }

    #[test]
    fn shadow_blocked_by_shifter() {
        let int = ShadedIntegrator::default();
        let scene = Scene::default();
        // the shifter at the origin is a sphere at 2 s
        let p = Point3::new(0.0, 3.0, 0.0);
        assert!(int.in_shadow(&p, &Vec3::new(0.0, -1.0, 0.0), &scene.at(2000.0)));
    }

    #[test]
    fn shadow_step_budget() {
        let int = ShadedIntegrator::default();
        let origin = Point3::new(0.0, 0.0, 0.0);
        let d = Vec3::new(0.0, 0.0, 1.0);
        // the wall is 33 steps away, one more than a shadow ray may take
        assert!(!int.in_shadow(&origin, &d, &Wall));
        assert!(int.trace_primary(&Ray::new(&origin, &d), &Wall).is_some());
    }

    #[test]
    fn reflection_without_hit_is_sky_weighted() {
        let int = ShadedIntegrator::default();
        let ray = Ray::new(&Point3::new(0.0, 0.0, 0.0), &Vec3::new(0.0, 1.0, 0.0));
        let c = int.reflect_color(&ray, Color3::new(1.0, 0.0, 0.0), &Empty, 0.0);
        let expected = 0.6 * sky(&ray.o, &ray.d, 0.0) + 0.4 * Color3::new(1.0, 0.0, 0.0);
        assert_abs_diff_eq!(c, expected, epsilon = 1e-12);
    }

    #[test]
    fn reflection_blends_hit_color() {
        let int = ShadedIntegrator::default();
        let scene = Scene::default();
        let snapshot = scene.at(2000.0);
        // straight down onto the sphere at the origin, the bounce goes straight up
        let ray = Ray::new(&Point3::new(0.0, 3.0, 0.0), &Vec3::new(0.0, -1.0, 0.0));
        let c = int.reflect_color(&ray, Color3::new(0.0, 0.0, 0.0), &snapshot, 0.0);

        let bounce_origin = Point3::new(0.0, 1.0, 0.0);
        let up = Vec3::new(0.0, 1.0, 0.0);
        let expected =
            0.6 * sky(&bounce_origin, &up, 0.0) + 0.4 * 0.5 * Color3::new(1.25, 0.0, 0.0);
        assert_abs_diff_eq!(c, expected, epsilon = 1e-12);
    }

    #[test]
    fn bounces_keep_traveled_distance() {
        let ray = Ray::new(&Point3::new(0.0, 1.0, 0.0), &Vec3::new(0.0, 1.0, 0.0));
        let black = Color3::new(0.0, 0.0, 0.0);

        // ceiling at t = 1, then the floor two units further, then the
        // ceiling again, reached right away since t is already 2
        let (last, c) = ShadedIntegrator::default().reflect_path(&ray, black, &Corridor);
        assert_abs_diff_eq!(c, Color3::new(0.21875, 0.0, 0.453125), epsilon = 1e-12);
        assert_abs_diff_eq!(last.o, Point3::new(0.0, 2.0, 0.0));
        assert_abs_diff_eq!(last.d, Vec3::new(0.0, -1.0, 0.0));
        assert_abs_diff_eq!(last.tmin, 2.0);

        let json: JsonValue = r#"{ "bounces": 2 }"#.parse().unwrap();
        let json: HashMap<String, JsonValue> = json.try_into().unwrap();
        let (last, c) = ShadedIntegrator::from_json(&json).reflect_path(&ray, black, &Corridor);
        assert_abs_diff_eq!(c, Color3::new(0.25, 0.0, 0.375), epsilon = 1e-12);
        assert_abs_diff_eq!(last.o, Point3::new(0.0, 0.0, 0.0));
        assert_abs_diff_eq!(last.d, Vec3::new(0.0, 1.0, 0.0));
        assert_abs_diff_eq!(last.tmin, 2.0);

        let c = ShadedIntegrator::default().reflect_color(&ray, black, &Corridor, 0.0);
        let expected =
            0.6 * sky(&Point3::new(0.0, 2.0, 0.0), &Vec3::new(0.0, -1.0, 0.0), 0.0)
                + 0.4 * Color3::new(0.21875, 0.0, 0.453125);
        assert_abs_diff_eq!(c, expected, epsilon = 1e-12);
    }

    #[test]
    fn overrides_from_json() {
        let json: JsonValue = r#"{ "type": "shaded", "shadow": { "max_steps": 64 } }"#
            .parse()
            .unwrap();
        let json: HashMap<String, JsonValue> = json.try_into().unwrap();
        let int = ShadedIntegrator::from_json(&json);
        // 64 steps are enough to reach the wall
        assert!(int.in_shadow(&Point3::new(0.0, 0.0, 0.0), &Vec3::new(0.0, 0.0, 1.0), &Wall));
    }
}
