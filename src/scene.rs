use std::collections::HashMap;

use log::info;
use tinyjson::JsonValue;

use crate::{
    animation::Animation,
    camera::Camera,
    integrators::{Integrator, json_to_integrator},
    json::json_to_object,
    modulo,
    sdf::{
        DistanceField, SHIFTER_COUNT, SceneSample, Shifter, default_shifters, nearest_shifter,
        primitives::sd_box,
    },
    vec::{Color3, Point3, Vec3},
};

/// Height of the ground surface
const GROUND_LEVEL: f64 = -1.0;
/// Half size of the ground along x and z
const GROUND_HALF_SIZE: f64 = 9.5;
const GROUND_DARK: f64 = 0.1;
const GROUND_LIGHT: f64 = 0.75;

/// Render configuration used when none is given
pub const DEFAULT_CONFIG: &str = r#"{
    "camera": {
        "transform": { "from": [0, 0, -7.5], "at": [0, 0, 0], "up": [0, 1, 0] },
        "resolution": [800, 600],
        "vfov": 75
    },
    "integrator": { "type": "shaded" },
    "animation": { "start_ms": 0, "frame_ms": 16.6667, "frames": 1, "orbit_deg_per_s": 0 }
}"#;

/// Signed distance to the ground slab
#[must_use]
pub fn ground_distance(p: Point3) -> f64 {
    sd_box(
        p - Point3::new(0.0, GROUND_LEVEL, 0.0),
        Vec3::new(GROUND_HALF_SIZE, 0.0, GROUND_HALF_SIZE),
    )
}

/// Checkerboard of unit tiles centered on integer coordinates
#[must_use]
pub fn ground_color(p: Point3) -> Color3 {
    let v = if modulo(p.x.round(), 2.0) == modulo(p.z.round(), 2.0) {
        GROUND_DARK
    } else {
        GROUND_LIGHT
    };
    Color3::new(v, v, v)
}

/// The static content of the scene: nine shifters above a checkered ground
#[derive(Debug, Clone)]
pub struct Scene {
    pub shifters: [Shifter; SHIFTER_COUNT],
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            shifters: default_shifters(),
        }
    }
}

impl Scene {
    /// Scene frozen at `time_ms`
    #[must_use]
    pub fn at(&self, time_ms: f64) -> SceneSnapshot<'_> {
        SceneSnapshot {
            shifters: &self.shifters,
            time_ms,
        }
    }
}

/// Distance field of the scene at a given time
#[derive(Debug, Clone, Copy)]
pub struct SceneSnapshot<'a> {
    shifters: &'a [Shifter],
    pub time_ms: f64,
}

impl DistanceField for SceneSnapshot<'_> {
    fn sample(&self, world_p: Point3) -> SceneSample {
        // only the shifter with the nearest center is evaluated
        let shape = nearest_shifter(self.shifters, world_p).map_or(
            SceneSample::new(f64::INFINITY, Color3::new(0.0, 0.0, 0.0)),
            |i| {
                let shifter = &self.shifters[i];
                SceneSample::new(
                    shifter.signed_distance(world_p, self.time_ms),
                    shifter.color,
                )
            },
        );

        let ground = ground_distance(world_p);
        if ground < shape.distance {
            SceneSample::new(ground, ground_color(world_p))
        } else {
            shape
        }
    }
}

/// Everything needed to render: the scene, the base camera, the frame
/// timeline and the integrator
pub struct RenderSetup {
    pub scene: Scene,
    pub camera: Camera,
    pub animation: Animation,
    pub integrator: Box<dyn Integrator>,
}

impl RenderSetup {
    pub fn from_json(json: &HashMap<String, JsonValue>) -> crate::Result<Self> {
        let camera = Camera::from_json(&json_to_object(json, "camera")?)?;
        info!(
            "Camera: {}x{}, vfov {} deg, at {:?}",
            camera.resolution.x,
            camera.resolution.y,
            camera.vfov,
            camera.position()
        );

        let integrator = json_to_integrator(&json_to_object(json, "integrator")?)?;
        let animation = Animation::from_json(&json_to_object(json, "animation")?)?;
        info!(
            "Animation: {} frame(s) from {} ms, every {} ms",
            animation.frames, animation.start_ms, animation.frame_ms
        );

        Ok(Self {
            scene: Scene::default(),
            camera,
            animation,
            integrator,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use cgmath::assert_abs_diff_eq;
    use tinyjson::JsonValue;

    use super::{DEFAULT_CONFIG, RenderSetup, Scene, ground_color};
    use crate::{
        sdf::DistanceField,
        vec::{Color3, Point3, Vec2u},
    };

    fn probes() -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.5, 0.2, -0.3),
            Point3::new(4.2, 1.0, -4.4),
            Point3::new(-6.0, -0.5, 5.5),
            Point3::new(2.2, -1.0, 2.2),
            Point3::new(20.0, 3.0, -30.0),
        ]
    }

    #[test]
    fn inside_solid_is_negative() {
        let scene = Scene::default();
        // shifter at the origin is a torus at 1.5 s, halfway toward the sphere
        assert!(scene.at(1500.0).signed_distance(Point3::new(1.0, 0.0, 0.0)) < 0.0);
        // pure sphere at 2 s and pure box at 4 s
        assert!(scene.at(2000.0).signed_distance(Point3::new(0.0, 0.0, 0.0)) < 0.0);
        assert!(scene.at(4000.0).signed_distance(Point3::new(0.5, 0.5, 0.5)) < 0.0);
        // the shifter at (5, 0, 0) is a sphere at 4 s
        assert!(scene.at(4000.0).signed_distance(Point3::new(5.2, 0.1, 0.0)) < 0.0);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let scene = Scene::default();
        for time in [0.0, 1234.5, 7999.0] {
            let snapshot = scene.at(time);
            for p in probes() {
                assert_eq!(snapshot.sample(p), snapshot.sample(p));
            }
        }
    }

    #[test]
    fn continuity_across_cycle_seams() {
        let scene = Scene::default();
        for k in 1..=5 {
            let seam = f64::from(k) * 1000.0;
            for p in probes() {
                let before = scene.at(seam - 1.0e-6).signed_distance(p);
                let after = scene.at(seam + 1.0e-6).signed_distance(p);
                assert_abs_diff_eq!(before, after, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn shape_color_does_not_change_with_morph() {
        let scene = Scene::default();
        let p = Point3::new(0.3, 0.2, 0.1);
        for time in [0.0, 800.0, 2600.0, 4100.0] {
            assert_eq!(scene.at(time).sample(p).color, Color3::new(1.25, 0.0, 0.0));
        }
    }

    #[test]
    fn checkerboard() {
        let dark = Color3::new(0.1, 0.1, 0.1);
        let light = Color3::new(0.75, 0.75, 0.75);
        assert_eq!(ground_color(Point3::new(2.2, -1.0, 2.2)), dark);
        assert_eq!(ground_color(Point3::new(2.2, -1.0, 3.2)), light);
        assert_eq!(ground_color(Point3::new(-1.2, -1.0, 0.9)), dark);
        assert_eq!(ground_color(Point3::new(-1.2, -1.0, 0.2)), light);

        let scene = Scene::default();
        let snapshot = scene.at(2500.0);
        let s = snapshot.sample(Point3::new(2.2, -1.0, 2.2));
        assert_abs_diff_eq!(s.distance, 0.0);
        assert_eq!(s.color, dark);
        assert_eq!(snapshot.sample(Point3::new(2.2, -1.0, 3.2)).color, light);
    }

    #[test]
    fn default_config_parses() {
        let json: JsonValue = DEFAULT_CONFIG.parse().unwrap();
        let json: HashMap<String, JsonValue> = json.try_into().unwrap();
        let setup = RenderSetup::from_json(&json).unwrap();
        assert_eq!(setup.camera.resolution, Vec2u::new(800, 600));
        assert_abs_diff_eq!(setup.camera.vfov, 75.0);
        assert_abs_diff_eq!(
            setup.camera.position(),
            Point3::new(0.0, 0.0, -7.5),
            epsilon = 1e-12
        );
        assert_eq!(setup.animation.frames, 1);
    }

    #[test]
    fn unknown_integrator_is_an_error() {
        let json: JsonValue = r#"{ "integrator": { "type": "path" } }"#.parse().unwrap();
        let json: HashMap<String, JsonValue> = json.try_into().unwrap();
        assert!(matches!(
            RenderSetup::from_json(&json),
            Err(crate::Error::UnknownIntegrator(_))
        ));
    }
}
