// Shake Redirect
// Redirects a page once the device has been shaken (or tilted, or tapped
// when motion sensing is unavailable).

pub mod config;
pub mod console;
pub mod controller;
pub mod error;
pub mod gate;
pub mod platform;
pub mod status;
pub mod types;

pub use config::{GateConfig, Preset};
pub use controller::{PageEvent, Redirect, RedirectController, RunSummary};
pub use error::{GateError, GateResult};
pub use gate::{Action, GateState, GateStatus, MotionGate, Phase, TriggerSource};
pub use types::{Acceleration, Axes, MotionSample, OrientationSample, TapKind};
