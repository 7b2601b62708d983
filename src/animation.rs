use std::collections::HashMap;

use tinyjson::JsonValue;

use crate::{
    Error,
    camera::{Camera, Orbit},
    deg2rad,
    json::json_to_f64,
    vec::Point3,
};

/// What the host hands over for one frame: the time and the camera pose
#[derive(Debug, Clone, Copy)]
pub struct FrameState {
    /// Milliseconds since the start of the animation
    pub time_ms: f64,
    pub camera: Camera,
}

impl FrameState {
    pub fn new(time_ms: f64, camera: Camera) -> crate::Result<Self> {
        if !time_ms.is_finite() || time_ms < 0.0 {
            return Err(Error::InvalidTime(time_ms));
        }
        Ok(Self { time_ms, camera })
    }
}

/// Timeline of the rendered frames, optionally spinning the camera around
/// the scene center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    pub start_ms: f64,
    /// Time between two frames
    pub frame_ms: f64,
    pub frames: u32,
    /// Orbit speed around the vertical axis, in degrees per second
    pub orbit_deg_per_s: f64,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            start_ms: 0.0,
            frame_ms: 1000.0 / 60.0,
            frames: 1,
            orbit_deg_per_s: 0.0,
        }
    }
}

impl Animation {
    pub fn new(start_ms: f64, frame_ms: f64, frames: u32) -> crate::Result<Self> {
        if !start_ms.is_finite() || start_ms < 0.0 {
            return Err(Error::InvalidTime(start_ms));
        }
        if !frame_ms.is_finite() || frame_ms < 0.0 {
            return Err(Error::InvalidFrameStep(frame_ms));
        }
        Ok(Self {
            start_ms,
            frame_ms,
            frames,
            orbit_deg_per_s: 0.0,
        })
    }

    pub fn from_json(json: &HashMap<String, JsonValue>) -> crate::Result<Self> {
        let default = Self::default();
        let mut animation = Self::new(
            json_to_f64(json, "start_ms", default.start_ms),
            json_to_f64(json, "frame_ms", default.frame_ms),
            json_to_f64(json, "frames", f64::from(default.frames)).max(1.0) as u32,
        )?;
        animation.orbit_deg_per_s = json_to_f64(json, "orbit_deg_per_s", 0.0);
        Ok(animation)
    }

    /// Time of the frame `index`
    #[must_use]
    pub fn time_at(&self, index: u32) -> f64 {
        f64::from(index).mul_add(self.frame_ms, self.start_ms)
    }

    /// State of frame `index`, `base` being the camera at time zero
    pub fn frame(&self, index: u32, base: &Camera) -> crate::Result<FrameState> {
        let time_ms = self.time_at(index);
        let camera = if self.orbit_deg_per_s == 0.0 {
            *base
        } else {
            let orbit = Orbit::from_eye(base.position(), Point3::new(0.0, 0.0, 0.0));
            let turn = deg2rad(self.orbit_deg_per_s * time_ms / 1000.0);
            base.with_transform(orbit.rotate(turn, 0.0).transform()?)
        };
        FrameState::new(time_ms, camera)
    }
}
