use std::{collections::HashMap, fmt::Write};

use cgmath::Zero;
use indicatif::{ProgressBar, ProgressState, ProgressStyle};
use itertools::Itertools;
use log::info;
use rayon::prelude::*;
use tinyjson::JsonValue;

use crate::{
    Error, NUMBER_MARCH_STEPS, NUMBER_TRACED_RAYS,
    animation::FrameState,
    array2d::Array2d,
    camera::Camera,
    json::json_to_string,
    ray::Ray,
    scene::{Scene, SceneSnapshot},
    sdf::RaymarchSettings,
    vec::{Color3, Color4, Vec2, Vec2u},
};

use self::normal::NormalIntegrator;
use self::shaded::ShadedIntegrator;
use self::steps::StepsIntegrator;

/// Abstract trait for integrating
pub trait Integrator: Send + Sync {
    /// Generate the image of one frame
    fn render(&self, scene: &Scene, frame: &FrameState) -> Array2d<Color3>;
}

/// Abstract trait for an integrator that computes one pixel at a time
pub trait PixelIntegrator: Send + Sync {
    /// Color seen along a camera ray
    fn li(&self, ray: &Ray, scene: &SceneSnapshot) -> Color3;
}

/// Color of the fragment `frag` (bottom-left origin), alpha is always one
pub fn evaluate_pixel<T: PixelIntegrator + ?Sized>(
    int: &T,
    scene: &SceneSnapshot,
    camera: &Camera,
    frag: &Vec2,
) -> Color4 {
    let ray = camera.generate_ray(frag);
    let c = int.li(&ray, scene);
    Color4::new(c.x, c.y, c.z, 1.0)
}

fn progress_bar(len: u64) -> ProgressBar {
    let progress = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar}] {pos:>7}/{len:7} ({eta})",
    ) {
        progress.set_style(
            style
                .with_key("eta", |state: &ProgressState, w: &mut dyn Write| {
                    let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                })
                .progress_chars("#>-"),
        );
    }
    progress
}

/// Default implementation of render for pixel integrators
fn render<T: PixelIntegrator>(int: &T, scene: &Scene, frame: &FrameState) -> Array2d<Color3> {
    const BLOCKSIZE: u32 = 32;

    pub struct RenderBlock {
        pub pos: Vec2u,
        pub im: Array2d<Color3>,
        // Statistics (after rendering done)
        pub nb_steps: usize,
        pub nb_rays: usize,
    }

    let camera = &frame.camera;
    let resolution = camera.resolution;
    let snapshot = scene.at(frame.time_ms);

    let mut tasks = (0..resolution.x)
        .step_by(BLOCKSIZE as usize)
        .cartesian_product((0..resolution.y).step_by(BLOCKSIZE as usize))
        .map(|(x, y)| {
            let size_x = (resolution.x - x).min(BLOCKSIZE);
            let size_y = (resolution.y - y).min(BLOCKSIZE);
            RenderBlock {
                pos: Vec2u::new(x, y),
                im: Array2d::with_size(size_x, size_y, Color3::zero()),
                nb_steps: 0,
                nb_rays: 0,
            }
        })
        .collect::<Vec<_>>();

    let progress = progress_bar(tasks.len() as u64);

    info!("Rendering frame at {} ms... ", frame.time_ms);
    tasks.par_iter_mut().for_each(|task| {
        NUMBER_MARCH_STEPS.with(|f| *f.borrow_mut() = 0);
        NUMBER_TRACED_RAYS.with(|f| *f.borrow_mut() = 0);

        // Rendering the local block
        for lx in 0..task.im.size_x() {
            for ly in 0..task.im.size_y() {
                // Compute the absolute pixel position on the image
                let x = lx + task.pos.x;
                let y = ly + task.pos.y;

                let c = evaluate_pixel(int, &snapshot, camera, &camera.frag_coord(x, y));
                *task.im.at_mut(lx, ly) = Color3::new(c.x, c.y, c.z);
            }
        }

        NUMBER_MARCH_STEPS.with(|f| task.nb_steps = *f.borrow());
        NUMBER_TRACED_RAYS.with(|f| task.nb_rays = *f.borrow());

        progress.inc(1);
    });
    progress.finish_and_clear();

    //  Assemble the final image and compute stats
    let mut im = Array2d::with_size(resolution.x, resolution.y, Color3::zero());

    let mut total_steps = 0;
    let mut total_rays = 0;
    for task in tasks {
        total_steps += task.nb_steps;
        total_rays += task.nb_rays;
        im.blit(task.pos, &task.im);
    }

    info!("Stats: ");
    info!(" - #march steps  : {total_steps}");
    info!(" - #rays(traced) : {total_rays}");
    info!(
        " - #steps/#ray(traced): {}",
        total_steps as f64 / total_rays as f64
    );

    im
}

/// Marching settings named `name`, `default` patched with the JSON overrides
fn json_to_settings(
    json: &HashMap<String, JsonValue>,
    name: &str,
    default: RaymarchSettings,
) -> RaymarchSettings {
    json.get(name)
        .and_then(|v| v.get::<HashMap<String, JsonValue>>())
        .map_or(default, |cfg| default.with_overrides(cfg))
}

pub mod normal;
pub mod shaded;
pub mod steps;

pub fn json_to_integrator(json: &HashMap<String, JsonValue>) -> crate::Result<Box<dyn Integrator>> {
    let t = json_to_string(json, "type", "shaded");
    info!("Integrator: {t}");
    match t.as_str() {
        "shaded" => Ok(Box::new(ShadedIntegrator::from_json(json))),
        "normal" => Ok(Box::new(NormalIntegrator::from_json(json))),
        "steps" => Ok(Box::new(StepsIntegrator::from_json(json))),
        _ => Err(Error::UnknownIntegrator(t)),
    }
}
