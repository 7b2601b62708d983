use cgmath::MetricSpace;

use crate::vec::{Color3, Point3};

use super::morph::MorphPhase;

/// Number of shifters placed in the scene
pub const SHIFTER_COUNT: usize = 9;

/// A scene object cycling through the morph shapes at a fixed location
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shifter {
    pub position: Point3,
    pub color: Color3,
    /// Phase offset inside the morph cycle, in seconds
    pub time_offset: f64,
}

impl Shifter {
    #[must_use]
    pub const fn new(position: Point3, color: Color3, time_offset: f64) -> Self {
        Self {
            position,
            color,
            time_offset,
        }
    }

    #[must_use]
    pub fn phase(&self, time_ms: f64) -> MorphPhase {
        MorphPhase::at(time_ms, self.time_offset)
    }

    /// Signed distance from `p` to the shape this shifter has at `time_ms`
    #[must_use]
    pub fn signed_distance(&self, p: Point3, time_ms: f64) -> f64 {
        self.phase(time_ms).distance(p - self.position)
    }

    /// Distance from `p` to the center, used to pick which shifter a point belongs to
    #[must_use]
    pub fn center_distance(&self, p: Point3) -> f64 {
        p.distance(self.position)
    }
}

/// The fixed 3x3 layout of shifters: five units apart on the xz plane,
/// each with its own color and phase offset
#[must_use]
pub fn default_shifters() -> [Shifter; SHIFTER_COUNT] {
    let s = |x: f64, z: f64, color: [f64; 3], offset: f64| {
        Shifter::new(Point3::new(x, 0.0, z), Color3::from(color), offset)
    };
    [
        s(0.0, 0.0, [1.25, 0.0, 0.0], 0.0),
        s(5.0, 0.0, [0.0, 0.0, 1.25], 3.0),
        s(-5.0, 0.0, [0.0, 1.25, 0.0], 6.0),
        s(0.0, -5.0, [1.25, 1.25, 0.0], 1.0),
        s(5.0, -5.0, [0.0, 1.25, 1.25], 2.0),
        s(-5.0, -5.0, [1.25, 0.0, 1.25], 4.0),
        s(0.0, 5.0, [1.25, 0.65, 0.0], 5.0),
        s(5.0, 5.0, [0.0, 0.65, 1.25], 2.5),
        s(-5.0, 5.0, [0.0, 1.25, 0.65], 3.5),
    ]
}

/// Index of the shifter whose center is nearest to `p`; ties keep the first one
#[must_use]
pub fn nearest_shifter(shifters: &[Shifter], p: Point3) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, shifter) in shifters.iter().enumerate() {
        let d = shifter.center_distance(p);
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}
