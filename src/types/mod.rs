pub mod axes;

pub use axes::*;

use serde::{Deserialize, Serialize};

/// Raw acceleration (including gravity) as the browser reports it.
/// Any axis may be null on devices that only expose part of the vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Acceleration {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub z: Option<f64>,
}

impl Acceleration {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.z.is_none()
    }
}

/// One devicemotion delivery
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub timestamp_ms: f64,
    #[serde(default)]
    pub acceleration: Option<Acceleration>,
}

impl MotionSample {
    pub fn new(x: f64, y: f64, z: f64, timestamp_ms: f64) -> Self {
        Self {
            timestamp_ms,
            acceleration: Some(Acceleration::new(x, y, z)),
        }
    }

    /// Sample without any acceleration payload
    pub fn empty(timestamp_ms: f64) -> Self {
        Self {
            timestamp_ms,
            acceleration: None,
        }
    }

    /// Resolve to concrete axes, absent axes reading as 0.
    /// Returns `None` when there is no acceleration data at all.
    pub fn axes(&self) -> Option<Axes> {
        let accel = self.acceleration.filter(|a| !a.is_empty())?;
        Some(Axes::new(
            accel.x.unwrap_or(0.0),
            accel.y.unwrap_or(0.0),
            accel.z.unwrap_or(0.0),
        ))
    }
}

/// One deviceorientation delivery (degrees)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrientationSample {
    #[serde(default)]
    pub beta: Option<f64>,
    #[serde(default)]
    pub gamma: Option<f64>,
}

impl OrientationSample {
    pub fn new(beta: f64, gamma: f64) -> Self {
        Self {
            beta: Some(beta),
            gamma: Some(gamma),
        }
    }

    /// Largest absolute tilt across beta (front/back) and gamma (left/right)
    pub fn max_tilt(&self) -> f64 {
        self.beta
            .unwrap_or(0.0)
            .abs()
            .max(self.gamma.unwrap_or(0.0).abs())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TapKind {
    Click,
    Touch,
}

impl TapKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TapKind::Click => "Click",
            TapKind::Touch => "Touch",
        }
    }
}
