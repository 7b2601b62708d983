use std::collections::HashMap;

use cgmath::{ElementWise, Zero};
use tinyjson::JsonValue;

use crate::{
    animation::FrameState,
    array2d::Array2d,
    ray::Ray,
    scene::{Scene, SceneSnapshot},
    sdf::{NORMAL_EPSILON, RaymarchSettings, compute_normal, raymarch},
    vec::Color3,
};

use super::{Integrator, PixelIntegrator, json_to_settings, render};

/// Shows the surface normals mapped to [0, 1], black where nothing is hit
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalIntegrator {
    primary: RaymarchSettings,
}

impl NormalIntegrator {
    #[must_use]
    pub fn from_json(json: &HashMap<String, JsonValue>) -> Self {
        Self {
            primary: json_to_settings(json, "primary", RaymarchSettings::PRIMARY),
        }
    }
}

impl Integrator for NormalIntegrator {
    fn render(&self, scene: &Scene, frame: &FrameState) -> Array2d<Color3> {
        render(self, scene, frame)
    }
}

impl PixelIntegrator for NormalIntegrator {
    fn li(&self, ray: &Ray, scene: &SceneSnapshot) -> Color3 {
        raymarch(ray, scene, self.primary)
            .hit
            .map(|hit| compute_normal(hit.position, scene, NORMAL_EPSILON))
            // flat spots of the field have no normal
            .filter(|n| n.x.is_finite() && n.y.is_finite() && n.z.is_finite())
            .map_or_else(Color3::zero, |n| n.add_element_wise(1.0) * 0.5)
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Zero, assert_abs_diff_eq};

    use super::NormalIntegrator;
    use crate::{
        integrators::PixelIntegrator,
        ray::Ray,
        scene::Scene,
        vec::{Color3, Point3, Vec3},
    };

    #[test]
    fn ground_faces_up() {
        let scene = Scene::default();
        // slanted ray between the shifters, lands around (2.5, -1, 3.5)
        let ray = Ray::new(
            &Point3::new(2.5, 1.0, 1.5),
            &Vec3::new(0.0, -1.0, 1.0).normalize(),
        );
        let c = NormalIntegrator::default().li(&ray, &scene.at(0.0));
        assert_abs_diff_eq!(c, Color3::new(0.5, 1.0, 0.5), epsilon = 1e-6);
    }

    #[test]
    fn miss_is_black() {
        let scene = Scene::default();
        let ray = Ray::new(&Point3::new(0.0, 5.0, 0.0), &Vec3::new(0.0, 1.0, 0.0));
        let c = NormalIntegrator::default().li(&ray, &scene.at(0.0));
        assert_eq!(c, Color3::zero());
    }
}
