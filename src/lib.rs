use std::{cell::RefCell, collections::HashMap};

use tinyjson::JsonValue;

#[macro_use]
extern crate quick_error;

pub type Real = f64;

pub mod constants {
    use std::f64;

    use crate::Real;
    pub const M_PI: Real = f64::consts::PI;
    pub const FRAC_PI_2: Real = f64::consts::FRAC_PI_2;
    /// Distance below which a sphere-traced sample counts as a surface hit
    pub const HIT_EPSILON: Real = 0.001;
    /// Accumulated distance after which a marched ray is considered escaped
    pub const MAX_TRACE_DISTANCE: Real = 1000.0;
}

/// Convert radians to degrees
#[must_use]
pub fn rad2deg(value: Real) -> Real {
    value * (180.0 / constants::M_PI)
}

/// Convert degrees to radians
#[must_use]
pub fn deg2rad(value: Real) -> Real {
    value * (constants::M_PI / 180.0)
}

quick_error! {
    #[derive(Debug)]
    pub enum Error {
        /// Viewport with an empty dimension
        InvalidViewport(width: u32, height: u32) {
            display("Viewport must have a positive size (got {}x{})", width, height)
        }
        /// Frame time that is negative or not finite
        InvalidTime(time_ms: f64) {
            display("Frame time must be finite and non-negative (got {} ms)", time_ms)
        }
        /// Frame step that would make time go backward
        InvalidFrameStep(step_ms: f64) {
            display("Frame step must be finite and non-negative (got {} ms)", step_ms)
        }
        /// Camera transform without inverse
        SingularTransform {
            display("Camera transform is not invertible")
        }
        /// Unknown integrator name
        UnknownIntegrator(name: String) {
            display("Unknown integrator type: {}", name)
        }
        /// Output path without extension
        MissingExtension(path: String) {
            display("No file extension provided for output {:?}", path)
        }
        /// Uncovered case
        UncoveredCase(name: &'static str, json: HashMap<String, JsonValue>) {
            display("Impossible to construct {}, case is not covered {:?}", name, json)
        }
        /// Uncovered case
        UncoveredCaseJson(name: &'static str, json: JsonValue) {
            display("Impossible to construct {}, JSON object case non unhandled {:?}", name, json)
        }
        /// Wrong dimension
        WrongDimensionJson(name: &'static str, json: Vec<JsonValue>, dim_expected: usize) {
            display("Impossible to construct {}, Wrong dimension provided (expected: {}, got {}) {:?}", name, dim_expected, json.len(), json)
        }
        /// Fuse two json failed
        FailedPatchJson(json: JsonValue, target: JsonValue) {
            display("Impossible to patch this JSON part {:?} to this one {:?}", json, target)
        }
        /// Other error
        Other(err: Box<dyn std::error::Error>) {
            source(&**err)
        }
    }
}
pub type Result<T> = std::result::Result<T, Error>;

/// Modulo function, always return a positive number
/// a: number to modulo
/// b: modulo value
/// Return a modulo b
#[must_use]
pub fn modulo(a: Real, b: Real) -> Real {
    let r = a % b;
    if r < 0.0 { r + b } else { r }
}

// For statistics computations
thread_local! {
    pub static NUMBER_MARCH_STEPS: RefCell<usize> = const { RefCell::new(0) };
    pub static NUMBER_TRACED_RAYS: RefCell<usize> = const { RefCell::new(0) };
}

pub mod animation;
pub mod array2d;
pub mod camera;
pub mod image;
pub mod integrators;
pub mod json;
pub mod ray;
pub mod scene;
pub mod sdf_shapes;
pub use sdf_shapes as sdf;
pub mod sky;
pub mod transform;
pub mod vec;
