use std::collections::HashMap;

use tinyjson::JsonValue;

use crate::{
    animation::FrameState,
    array2d::Array2d,
    json::json_to_f64,
    ray::Ray,
    scene::{Scene, SceneSnapshot},
    sdf::{RaymarchSettings, RaymarchStatus, raymarch},
    vec::{Color3, mix},
};

use super::{Integrator, PixelIntegrator, json_to_settings, render};

/// Heat map of the number of marching steps taken by camera rays: dark blue
/// for cheap rays up to white for rays that use `scale` steps or more.
/// Rays that run out of steps are red.
#[derive(Debug, Clone, Copy)]
pub struct StepsIntegrator {
    primary: RaymarchSettings,
    scale: f64,
}

impl Default for StepsIntegrator {
    fn default() -> Self {
        Self {
            primary: RaymarchSettings::PRIMARY,
            scale: 128.0,
        }
    }
}

impl StepsIntegrator {
    #[must_use]
    pub fn from_json(json: &HashMap<String, JsonValue>) -> Self {
        let default = Self::default();
        Self {
            primary: json_to_settings(json, "primary", default.primary),
            scale: json_to_f64(json, "scale", default.scale).max(1.0),
        }
    }

    fn heat(&self, steps: u32) -> Color3 {
        let v = (f64::from(steps) / self.scale).min(1.0);
        let cold = Color3::new(0.0, 0.0, 0.2);
        let warm = Color3::new(1.0, 0.6, 0.0);
        if v < 0.5 {
            mix(cold, warm, v * 2.0)
        } else {
            mix(warm, Color3::new(1.0, 1.0, 1.0), v.mul_add(2.0, -1.0))
        }
    }
}

impl Integrator for StepsIntegrator {
    fn render(&self, scene: &Scene, frame: &FrameState) -> Array2d<Color3> {
        render(self, scene, frame)
    }
}

impl PixelIntegrator for StepsIntegrator {
    fn li(&self, ray: &Ray, scene: &SceneSnapshot) -> Color3 {
        let res = raymarch(ray, scene, self.primary);
        match res.status {
            RaymarchStatus::MaxStepsExceeded => Color3::new(1.0, 0.0, 0.0),
            _ => self.heat(res.steps),
        }
    }
}
