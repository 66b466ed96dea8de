//! User-visible status lines.

use std::fmt;

use crate::error::GateError;

pub const MOTION_STATUS_ID: &str = "motion-status";
pub const PERMISSION_STATUS_ID: &str = "permission-status";

pub const COLOR_ERROR: &str = "#ff6b6b";
pub const COLOR_DETECTED: &str = "#4ecdc4";
pub const COLOR_REDIRECTING: &str = "#45b7d1";
pub const COLOR_PENDING: &str = "#f9ca24";
pub const COLOR_OK: &str = "#00b894";
pub const COLOR_INFO: &str = "#6c5ce7";

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Starting,
    MotionSupported,
    MotionUnsupported,
    NoPermissionRequired,
    TapToEnable,
    PressButtonToEnable,
    TapRequestingPermission { tap: &'static str },
    RequestingPermission,
    PermissionResult { granted: bool, state: &'static str },
    PermissionError(String),
    /// No prompt needed, listener about to be attached
    SensingStarting,
    SensingReady,
    /// Motion granted through the prompt
    SensingStarted,
    OrientationStarted,
    PermissionDeniedFallback,
    SettingUpFallback,
    NoData,
    MotionDetected { count: u32 },
    MotionThresholdReached,
    OrientationRedirect,
    TapRedirect { tap: &'static str },
    WindowLoaded,
}

impl Status {
    /// Element the line is written into
    pub fn element_id(&self) -> &'static str {
        match self {
            Status::NoPermissionRequired
            | Status::TapToEnable
            | Status::PressButtonToEnable
            | Status::TapRequestingPermission { .. }
            | Status::RequestingPermission
            | Status::PermissionResult { .. }
            | Status::PermissionError(_) => PERMISSION_STATUS_ID,
            _ => MOTION_STATUS_ID,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Status::Starting
            | Status::TapToEnable
            | Status::PressButtonToEnable
            | Status::TapRequestingPermission { .. }
            | Status::RequestingPermission
            | Status::SettingUpFallback
            | Status::WindowLoaded => COLOR_PENDING,
            Status::MotionSupported | Status::SensingStarting => COLOR_INFO,
            Status::NoPermissionRequired
            | Status::SensingReady
            | Status::SensingStarted
            | Status::OrientationStarted => COLOR_OK,
            Status::PermissionResult { granted: true, .. } => COLOR_OK,
            Status::MotionUnsupported
            | Status::PermissionResult { granted: false, .. }
            | Status::PermissionError(_)
            | Status::PermissionDeniedFallback
            | Status::NoData => COLOR_ERROR,
            Status::MotionDetected { .. } => COLOR_DETECTED,
            Status::MotionThresholdReached
            | Status::OrientationRedirect
            | Status::TapRedirect { .. } => COLOR_REDIRECTING,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Starting => write!(f, "Starting motion detection..."),
            Status::MotionSupported => write!(f, "DeviceMotion is supported"),
            Status::MotionUnsupported => write!(f, "DeviceMotion not supported, using fallback"),
            Status::NoPermissionRequired => write!(f, "No permission required"),
            Status::TapToEnable => write!(f, "Tap anywhere to enable motion detection"),
            Status::PressButtonToEnable => write!(f, "Press the button to enable motion detection"),
            Status::TapRequestingPermission { tap } => {
                write!(f, "{tap} detected, requesting permission...")
            }
            Status::RequestingPermission => write!(f, "Requesting motion permission..."),
            Status::PermissionResult { state, .. } => write!(f, "Permission state: {state}"),
            Status::PermissionError(message) => write!(f, "Error: {message}"),
            Status::SensingStarting => write!(f, "Starting motion detection..."),
            Status::SensingReady => write!(f, "Motion detection started!"),
            Status::SensingStarted => write!(f, "Motion detection started! Shake your phone!"),
            Status::OrientationStarted => write!(f, "Orientation detection also started!"),
            Status::PermissionDeniedFallback => {
                write!(f, "Motion permission denied, using fallback")
            }
            Status::SettingUpFallback => write!(f, "Setting up click/touch fallback"),
            Status::NoData => write!(f, "No acceleration data available"),
            Status::MotionDetected { count } => write!(f, "Motion detected! Count: {count}"),
            Status::MotionThresholdReached => {
                write!(f, "Motion threshold reached! Redirecting...")
            }
            Status::OrientationRedirect => {
                write!(f, "Orientation change detected! Redirecting...")
            }
            Status::TapRedirect { tap } => write!(f, "{tap} detected! Redirecting..."),
            Status::WindowLoaded => write!(f, "Window loaded, checking motion detection..."),
        }
    }
}

/// Line shown when an error surfaces on the page
impl From<&GateError> for Status {
    fn from(err: &GateError) -> Self {
        match err {
            GateError::MissingSampleData => Status::NoData,
            GateError::PermissionDenied => Status::PermissionDeniedFallback,
            GateError::CapabilityUnavailable => Status::MotionUnsupported,
            GateError::PermissionRequestFailure(message) => {
                Status::PermissionError(message.clone())
            }
            other => Status::PermissionError(other.to_string()),
        }
    }
}
