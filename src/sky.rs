//! Procedural sky: gradient, sun glow and an animated layer of fbm clouds
//! projected on a far horizontal plane.

use cgmath::{ElementWise, InnerSpace};

use crate::vec::{Color3, Point3, Vec2, Vec3, fract, mix, smoothstep};

/// Height of the cloud plane
const CLOUD_HEIGHT: f64 = 1.0e5;
/// Scale applied to the cloud plane coordinates
const CLOUD_SCALE: f64 = 1.2;
/// Cloud drift, per millisecond
const CLOUD_SPEED: f64 = 1.0e-4;
const FBM_OCTAVES: usize = 8;

/// Pseudo-random value in [0, 1) attached to a lattice point
#[must_use]
pub fn hash(n: Vec2) -> f64 {
    fract(n.dot(Vec2::new(12.9898, 4.1414)).sin() * 43758.5453)
}

/// Value noise: smooth interpolation of the hashes of the four surrounding
/// lattice points
#[must_use]
pub fn value_noise(uv: Vec2) -> f64 {
    let i = Vec2::new(uv.x.floor(), uv.y.floor());
    let f = uv - i;
    let f = f.mul_element_wise(f).mul_element_wise(Vec2::new(3.0, 3.0) - 2.0 * f);

    let lb = hash(i);
    let rb = hash(i + Vec2::new(1.0, 0.0));
    let lt = hash(i + Vec2::new(0.0, 1.0));
    let rt = hash(i + Vec2::new(1.0, 1.0));

    mix(mix(lb, rb, f.x), mix(lt, rt, f.x), f.y)
}

/// Fractal sum of value noise octaves, in [0, 1)
#[must_use]
pub fn fbm(uv: Vec2) -> f64 {
    let mut value = 0.0;
    let mut amplitude = 0.5;
    let mut uv = uv;
    for _ in 0..FBM_OCTAVES {
        value += value_noise(uv) * amplitude;
        amplitude *= 0.5;
        uv *= 2.0;
    }
    value
}

fn sun_direction() -> Vec3 {
    Vec3::new(-0.8, 0.15, -0.3).normalize()
}

/// Sky tone without sun nor clouds
#[must_use]
pub fn sky_gradient(rd: &Vec3) -> Color3 {
    let zenith = Color3::new(0.3, 0.5, 0.85) - Color3::new(1.0, 1.0, 1.0) * (rd.y * rd.y * 0.5);
    let low = 0.85 * Color3::new(0.7, 0.75, 0.85);
    mix(zenith, low, (1.0 - rd.y.max(0.0)).powi(4))
}

/// Glow around the sun direction
#[must_use]
pub fn sun_glow(rd: &Vec3) -> Color3 {
    let sundot = rd.dot(sun_direction()).clamp(0.0, 1.0);
    0.25 * Color3::new(1.0, 0.7, 0.4) * sundot.powi(5)
        + 0.25 * Color3::new(1.0, 0.8, 0.6) * sundot.powi(64)
        + 0.2 * Color3::new(1.0, 0.8, 0.6) * sundot.powi(512)
}

/// Cloud density where the ray crosses the cloud plane.
///
/// NaN for horizontal rays (`rd.y == 0`), which then get no clouds.
#[must_use]
pub fn cloud_density(ro: &Point3, rd: &Vec3, time_ms: f64) -> f64 {
    let dist = (CLOUD_HEIGHT - ro.y) / rd.y;
    let p = *ro + *rd * dist;
    let uv = Vec2::new(p.x, p.z) * (CLOUD_SCALE / CLOUD_HEIGHT);
    let t = time_ms * CLOUD_SPEED;
    fbm(uv - Vec2::new(t, t))
}

/// Color of the sky seen from `ro` in the direction `rd`
#[must_use]
pub fn sky(ro: &Point3, rd: &Vec3, time_ms: f64) -> Color3 {
    let mut color = sky_gradient(rd) + sun_glow(rd);

    let den = cloud_density(ro, rd, time_ms);
    color = mix(color, Color3::new(1.0, 1.0, 1.0), smoothstep(0.4, 0.8, den));

    let haze = Color3::new(0.45, 0.55, 0.75);
    mix(color, haze, (1.0 - rd.y.max(0.0)).powi(16))
}
