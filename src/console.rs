//! Terminal stand-ins for the browser page, used by the binaries.

use chrono::Utc;
use clap::ValueEnum;
use log::info;
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Duration};

use crate::error::GateError;
use crate::gate::PermissionState;
use crate::platform::{
    ButtonHandle, MotionCapability, MotionSupport, Navigator, OrientationCapability,
    StatusSurface, TapInput, TapPurpose,
};

pub fn ts_now() -> String {
    Utc::now().format("%H:%M:%S%.3f").to_string()
}

/// How the simulated permission prompt answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptAnswer {
    Grant,
    Deny,
    /// The request itself throws
    Fail,
}

/// Device profile for simulation and replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceProfile {
    pub motion: bool,
    pub requires_permission: bool,
    pub orientation: bool,
    pub prompt_answer: PromptAnswer,
    pub prompt_latency_ms: u64,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            motion: true,
            requires_permission: false,
            orientation: true,
            prompt_answer: PromptAnswer::Grant,
            prompt_latency_ms: 150,
        }
    }
}

/// Listeners the page attached to the simulated device
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Attached {
    pub motion: bool,
    pub orientation: bool,
    pub tap_listeners: Vec<TapPurpose>,
}

pub struct SimulatedDevice {
    profile: DeviceProfile,
    attached: Attached,
}

impl SimulatedDevice {
    pub fn new(profile: DeviceProfile) -> Self {
        Self {
            profile,
            attached: Attached::default(),
        }
    }

    pub fn attached(&self) -> &Attached {
        &self.attached
    }
}

impl MotionCapability for SimulatedDevice {
    fn motion_support(&self) -> MotionSupport {
        if self.profile.motion {
            MotionSupport::Available {
                requires_permission: self.profile.requires_permission,
            }
        } else {
            MotionSupport::Unavailable
        }
    }

    async fn request_permission(&mut self) -> Result<PermissionState, GateError> {
        sleep(Duration::from_millis(self.profile.prompt_latency_ms)).await;
        match self.profile.prompt_answer {
            PromptAnswer::Grant => Ok(PermissionState::Granted),
            PromptAnswer::Deny => Ok(PermissionState::Denied),
            PromptAnswer::Fail => Err(GateError::PermissionRequestFailure(
                "requestPermission is not allowed here".to_string(),
            )),
        }
    }

    fn subscribe_motion(&mut self) {
        info!("[device] devicemotion listener attached");
        self.attached.motion = true;
    }
}

impl OrientationCapability for SimulatedDevice {
    fn orientation_available(&self) -> bool {
        self.profile.orientation
    }

    fn subscribe_orientation(&mut self) {
        info!("[device] deviceorientation listener attached");
        self.attached.orientation = true;
    }
}

impl TapInput for SimulatedDevice {
    fn register_tap_listener(&mut self, purpose: TapPurpose) {
        info!("[device] click/touchstart listener attached ({purpose:?})");
        self.attached.tap_listeners.push(purpose);
    }
}

/// Prints status lines instead of writing them into the DOM
#[derive(Default)]
pub struct ConsoleSurface {
    next_button: u32,
    quiet: bool,
}

impl ConsoleSurface {
    pub fn new(quiet: bool) -> Self {
        Self {
            next_button: 0,
            quiet,
        }
    }
}

impl StatusSurface for ConsoleSurface {
    fn set_status_text(&mut self, id: &str, text: &str, color: &str) {
        if !self.quiet {
            println!("[{}] {:<17} {} ({})", ts_now(), id, text, color);
        }
    }

    fn create_button(&mut self, label: &str) -> ButtonHandle {
        self.next_button += 1;
        if !self.quiet {
            println!("[{}] [button #{}] {}", ts_now(), self.next_button, label);
        }
        ButtonHandle(self.next_button)
    }

    fn hide(&mut self, handle: ButtonHandle) {
        if !self.quiet {
            println!("[{}] [button #{}] hidden", ts_now(), handle.0);
        }
    }
}

#[derive(Default)]
pub struct ConsoleNavigator {
    visited: Option<String>,
}

impl ConsoleNavigator {
    pub fn visited(&self) -> Option<&str> {
        self.visited.as_deref()
    }
}

impl Navigator for ConsoleNavigator {
    fn navigate(&mut self, url: &str) {
        println!("[{}] -> navigating to {}", ts_now(), url);
        self.visited = Some(url.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_support_mapping() {
        let device = SimulatedDevice::new(DeviceProfile {
            motion: false,
            ..DeviceProfile::default()
        });
        assert_eq!(device.motion_support(), MotionSupport::Unavailable);

        let device = SimulatedDevice::new(DeviceProfile {
            requires_permission: true,
            ..DeviceProfile::default()
        });
        assert_eq!(
            device.motion_support(),
            MotionSupport::Available {
                requires_permission: true
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_prompt_answers() {
        let mut device = SimulatedDevice::new(DeviceProfile {
            prompt_answer: PromptAnswer::Fail,
            ..DeviceProfile::default()
        });
        assert!(matches!(
            device.request_permission().await,
            Err(GateError::PermissionRequestFailure(_))
        ));

        let mut device = SimulatedDevice::new(DeviceProfile {
            prompt_answer: PromptAnswer::Deny,
            ..DeviceProfile::default()
        });
        assert_eq!(
            device.request_permission().await,
            Ok(PermissionState::Denied)
        );
    }

    #[test]
    fn test_profile_json_defaults() {
        let profile: DeviceProfile =
            serde_json::from_str(r#"{"requires_permission": true, "prompt_answer": "deny"}"#)
                .unwrap();
        assert!(profile.motion);
        assert!(profile.requires_permission);
        assert_eq!(profile.prompt_answer, PromptAnswer::Deny);
    }

    #[test]
    fn test_attached_listeners_are_recorded() {
        let mut device = SimulatedDevice::new(DeviceProfile::default());
        device.subscribe_motion();
        device.register_tap_listener(TapPurpose::Fallback);
        assert_eq!(
            device.attached(),
            &Attached {
                motion: true,
                orientation: false,
                tap_listeners: vec![TapPurpose::Fallback],
            }
        );

        let mut navigator = ConsoleNavigator::default();
        assert_eq!(navigator.visited(), None);
        navigator.navigate("letter.html");
        assert_eq!(navigator.visited(), Some("letter.html"));
    }

    #[test]
    fn test_buttons_get_distinct_handles() {
        let mut surface = ConsoleSurface::new(true);
        let a = surface.create_button("Enable Motion");
        let b = surface.create_button("Enable Motion");
        assert_ne!(a, b);
    }
}
