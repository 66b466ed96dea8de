//! Motion trigger decision logic.
//!
//! `MotionGate` owns all mutable detection state for one page lifetime and
//! turns motion, orientation and fallback taps into at most one trigger.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::GateConfig;
use crate::error::{GateError, GateResult};
use crate::types::{Axes, MotionSample, OrientationSample, TapKind};

/// Gate lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Page loaded, nothing probed yet
    Idle,
    /// Waiting for the user to grant motion access
    AwaitingPermission,
    /// Motion samples are flowing
    Sensing,
    /// Click/touch substitutes for motion
    FallbackActive,
    /// Trigger emitted; terminal
    Fired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionStatus {
    NotRequested,
    Pending,
    Granted,
    Denied,
    NotRequired,
}

/// Answer from the platform permission prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Granted,
    Denied,
}

impl PermissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionState::Granted => "granted",
            PermissionState::Denied => "denied",
        }
    }
}

/// Detection state, one per gate
#[derive(Debug, Clone, Serialize)]
pub struct GateState {
    pub last_sample: Axes,
    pub trigger_count: u32,
    pub last_trigger_ms: Option<f64>,
    pub has_fired: bool,
    pub permission: PermissionStatus,
}

impl Default for GateState {
    fn default() -> Self {
        Self {
            last_sample: Axes::ZERO,
            trigger_count: 0,
            last_trigger_ms: None,
            has_fired: false,
            permission: PermissionStatus::NotRequested,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "source")]
pub enum TriggerSource {
    Motion { count: u32 },
    Orientation,
    Fallback { tap: TapKind },
}

/// Non-terminal progress worth showing to the user
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateStatus {
    MotionDetected { count: u32 },
    NoData,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    None,
    StatusUpdate(GateStatus),
    Trigger(TriggerSource),
}

/// Outcome of a resolved permission request
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Sensing,
    Fallback {
        reason: GateError,
        /// True only the first time the fallback is switched on
        newly_active: bool,
    },
    /// The gate fired while the prompt was open
    Ignored,
}

pub struct MotionGate {
    config: GateConfig,
    state: GateState,
    phase: Phase,
}

impl MotionGate {
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            state: GateState::default(),
            phase: Phase::Idle,
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn has_fired(&self) -> bool {
        self.state.has_fired
    }

    /// Feed one motion sample through the shake counter
    pub fn ingest(&mut self, sample: &MotionSample) -> Action {
        let Some(current) = sample.axes() else {
            if self.state.has_fired {
                return Action::None;
            }
            return Action::StatusUpdate(GateStatus::NoData);
        };

        let delta = current.abs_diff(&self.state.last_sample);
        self.state.last_sample = current;

        if self.state.has_fired {
            return Action::None;
        }

        debug!(
            "Motion: X={:.2}, Y={:.2}, Z={:.2}",
            delta.x, delta.y, delta.z
        );

        if !delta.any_exceeds(self.config.motion_threshold) {
            return Action::None;
        }

        if let Some(last) = self.state.last_trigger_ms {
            if sample.timestamp_ms - last <= self.config.debounce_ms as f64 {
                return Action::None;
            }
        }

        self.state.trigger_count += 1;
        self.state.last_trigger_ms = Some(sample.timestamp_ms);
        let count = self.state.trigger_count;

        if count >= self.config.required_trigger_count {
            self.fire();
            return Action::Trigger(TriggerSource::Motion { count });
        }

        Action::StatusUpdate(GateStatus::MotionDetected { count })
    }

    /// Single-shot tilt trigger, independent of the shake counter
    pub fn ingest_orientation(&mut self, sample: &OrientationSample) -> Action {
        if self.state.has_fired {
            return Action::None;
        }

        if sample.max_tilt() > self.config.orientation_threshold_deg {
            self.fire();
            return Action::Trigger(TriggerSource::Orientation);
        }

        Action::None
    }

    /// Click or touch while the fallback is active
    pub fn fallback_tap(&mut self, tap: TapKind) -> Action {
        if self.phase != Phase::FallbackActive || self.state.has_fired {
            return Action::None;
        }
        self.fire();
        Action::Trigger(TriggerSource::Fallback { tap })
    }

    /// Idle | AwaitingPermission → Sensing
    pub fn start_sensing(&mut self) -> GateResult<()> {
        match self.phase {
            Phase::Idle => {
                self.state.permission = PermissionStatus::NotRequired;
                self.phase = Phase::Sensing;
                Ok(())
            }
            Phase::AwaitingPermission => {
                self.state.permission = PermissionStatus::Granted;
                self.phase = Phase::Sensing;
                Ok(())
            }
            other => Err(GateError::InvalidState(format!(
                "cannot start sensing from {other:?}"
            ))),
        }
    }

    /// Idle → AwaitingPermission
    pub fn await_permission(&mut self) -> GateResult<()> {
        match self.phase {
            Phase::Idle => {
                self.phase = Phase::AwaitingPermission;
                Ok(())
            }
            other => Err(GateError::InvalidState(format!(
                "cannot wait for permission from {other:?}"
            ))),
        }
    }

    /// Mark the permission prompt as issued. Returns false if it already was.
    pub fn begin_permission_request(&mut self) -> GateResult<bool> {
        if self.phase != Phase::AwaitingPermission {
            return Err(GateError::InvalidState(format!(
                "permission request outside AwaitingPermission ({:?})",
                self.phase
            )));
        }
        if self.state.permission != PermissionStatus::NotRequested {
            return Ok(false);
        }
        self.state.permission = PermissionStatus::Pending;
        Ok(true)
    }

    pub fn resolve_permission(
        &mut self,
        answer: Result<PermissionState, GateError>,
    ) -> GateResult<Resolution> {
        if self.phase == Phase::Fired {
            return Ok(Resolution::Ignored);
        }
        if self.state.permission != PermissionStatus::Pending {
            return Err(GateError::InvalidState(format!(
                "no pending permission request ({:?})",
                self.state.permission
            )));
        }

        let reason = match answer {
            Ok(PermissionState::Granted) => {
                self.start_sensing()?;
                info!("Motion permission granted");
                return Ok(Resolution::Sensing);
            }
            Ok(PermissionState::Denied) => GateError::PermissionDenied,
            Err(e) if e.falls_back() => e,
            // Whatever the prompt threw, the page still needs a way out
            Err(e) => GateError::PermissionRequestFailure(e.to_string()),
        };

        self.state.permission = PermissionStatus::Denied;
        let newly_active = self.activate_fallback()?;
        Ok(Resolution::Fallback {
            reason,
            newly_active,
        })
    }

    /// Switch to click/touch. True only on the first activation.
    pub fn activate_fallback(&mut self) -> GateResult<bool> {
        match self.phase {
            Phase::Idle | Phase::AwaitingPermission => {
                self.phase = Phase::FallbackActive;
                Ok(true)
            }
            Phase::FallbackActive | Phase::Fired => Ok(false),
            Phase::Sensing => Err(GateError::InvalidState(
                "motion sensing already active".to_string(),
            )),
        }
    }

    fn fire(&mut self) {
        self.state.has_fired = true;
        self.phase = Phase::Fired;
    }
}
