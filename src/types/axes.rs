//! Three-axis reading used for motion deltas.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Axes {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Axes {
    pub const ZERO: Axes = Axes {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Component-wise |self - other|
    pub fn abs_diff(&self, other: &Axes) -> Axes {
        Axes {
            x: (self.x - other.x).abs(),
            y: (self.y - other.y).abs(),
            z: (self.z - other.z).abs(),
        }
    }

    /// True if any single component is strictly above `threshold`
    pub fn any_exceeds(&self, threshold: f64) -> bool {
        self.x > threshold || self.y > threshold || self.z > threshold
    }
}
