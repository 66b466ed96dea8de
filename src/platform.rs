//! Seams to the host page: sensors, permission prompt, DOM and navigation.

use serde::{Deserialize, Serialize};

use crate::error::GateError;
use crate::gate::PermissionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionSupport {
    Unavailable,
    Available { requires_permission: bool },
}

/// Why a click/touch listener is being attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TapPurpose {
    RequestPermission,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ButtonHandle(pub u32);

#[allow(async_fn_in_trait)]
pub trait MotionCapability {
    fn motion_support(&self) -> MotionSupport;

    /// Resolves exactly once; there is no way to cancel a prompt
    async fn request_permission(&mut self) -> Result<PermissionState, GateError>;

    fn subscribe_motion(&mut self);
}

pub trait OrientationCapability {
    fn orientation_available(&self) -> bool;

    fn subscribe_orientation(&mut self);
}

pub trait TapInput {
    /// Attach click and touchstart listeners to the document
    fn register_tap_listener(&mut self, purpose: TapPurpose);
}

/// Everything the controller needs from the device side
pub trait Device: MotionCapability + OrientationCapability + TapInput {}

impl<T: MotionCapability + OrientationCapability + TapInput> Device for T {}

pub trait StatusSurface {
    fn set_status_text(&mut self, id: &str, text: &str, color: &str);

    fn create_button(&mut self, label: &str) -> ButtonHandle;

    fn hide(&mut self, handle: ButtonHandle);
}

pub trait Navigator {
    fn navigate(&mut self, url: &str);
}
