//! Page lifecycle around the gate: capability probing, the permission
//! prompt, listener registration, status lines and the one navigation.

use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Receiver;
use tokio::time::sleep;

use crate::config::GateConfig;
use crate::error::GateError;
use crate::gate::{
    Action, GateStatus, MotionGate, PermissionState, PermissionStatus, Phase, Resolution,
    TriggerSource,
};
use crate::platform::{ButtonHandle, Device, MotionSupport, Navigator, StatusSurface, TapPurpose};
use crate::status::Status;
use crate::types::{MotionSample, OrientationSample, TapKind};

pub const ENABLE_BUTTON_LABEL: &str = "Enable Motion";

/// Everything the page can deliver to the controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageEvent {
    Motion(MotionSample),
    Orientation(OrientationSample),
    Tap { tap: TapKind },
    ButtonPressed,
    /// window `load`, a second chance to bootstrap
    Loaded,
}

/// Which listeners have been attached so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Listeners {
    pub motion: bool,
    pub orientation: bool,
    pub permission_tap: bool,
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Redirect {
    pub url: String,
    pub delay: Duration,
    pub source: TriggerSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub phase: Phase,
    pub permission: PermissionStatus,
    pub trigger_count: u32,
    pub fired_by: Option<TriggerSource>,
    pub navigated_to: Option<String>,
    pub events_processed: u64,
}

pub struct RedirectController<D, U, N> {
    gate: MotionGate,
    device: D,
    surface: U,
    navigator: N,
    listeners: Listeners,
    started: bool,
    enable_button: Option<ButtonHandle>,
    fired_by: Option<TriggerSource>,
    navigated_to: Option<String>,
    events_processed: u64,
}

impl<D: Device, U: StatusSurface, N: Navigator> RedirectController<D, U, N> {
    pub fn new(config: GateConfig, device: D, surface: U, navigator: N) -> Self {
        Self {
            gate: MotionGate::new(config),
            device,
            surface,
            navigator,
            listeners: Listeners::default(),
            started: false,
            enable_button: None,
            fired_by: None,
            navigated_to: None,
            events_processed: 0,
        }
    }

    pub fn gate(&self) -> &MotionGate {
        &self.gate
    }

    pub fn listeners(&self) -> Listeners {
        self.listeners
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn surface(&self) -> &U {
        &self.surface
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Probe capabilities and attach listeners. Only the first call does anything.
    pub fn start(&mut self) {
        if self.started || self.gate.has_fired() {
            debug!("Motion detection already bootstrapped");
            return;
        }
        self.started = true;
        self.report(Status::Starting);

        match self.device.motion_support() {
            MotionSupport::Unavailable => {
                let reason = GateError::CapabilityUnavailable;
                self.report(Status::from(&reason));
                self.enter_fallback(&reason);
                return;
            }
            MotionSupport::Available {
                requires_permission: true,
            } => {
                self.report(Status::MotionSupported);
                self.prepare_permission_prompt();
            }
            MotionSupport::Available {
                requires_permission: false,
            } => {
                self.report(Status::MotionSupported);
                self.report(Status::NoPermissionRequired);
                self.report(Status::SensingStarting);
                match self.gate.start_sensing() {
                    Ok(()) => self.subscribe_motion(Status::SensingReady),
                    Err(e) => warn!("Cannot start sensing: {e}"),
                }
            }
        }

        if self.device.orientation_available() && !self.listeners.orientation {
            self.device.subscribe_orientation();
            self.listeners.orientation = true;
            self.report(Status::OrientationStarted);
        }
    }

    /// Process one page event; returns the redirect once the gate fires
    pub async fn handle(&mut self, event: PageEvent) -> Option<Redirect> {
        self.events_processed += 1;

        match event {
            PageEvent::Motion(sample) => {
                if !self.listeners.motion {
                    return None;
                }
                let action = self.gate.ingest(&sample);
                self.apply(action)
            }
            PageEvent::Orientation(sample) => {
                if !self.listeners.orientation {
                    return None;
                }
                let action = self.gate.ingest_orientation(&sample);
                self.apply(action)
            }
            PageEvent::Tap { tap } => self.on_tap(tap).await,
            PageEvent::ButtonPressed => {
                if self.enable_button.is_some() {
                    self.request_permission().await;
                }
                None
            }
            PageEvent::Loaded => {
                self.report(Status::WindowLoaded);
                if !self.gate.has_fired() {
                    self.start();
                }
                None
            }
        }
    }

    /// Wait out the redirect delay, then navigate
    pub async fn complete(&mut self, redirect: Redirect) {
        if !redirect.delay.is_zero() {
            sleep(redirect.delay).await;
        }
        self.navigate(&redirect.url);
    }

    /// Bootstrap, then consume events in delivery order until a redirect
    /// happens or the sender side goes away.
    pub async fn run(&mut self, mut events: Receiver<PageEvent>) -> RunSummary {
        self.start();

        while let Some(event) = events.recv().await {
            if let Some(redirect) = self.handle(event).await {
                self.complete(redirect).await;
                break;
            }
        }

        self.summary()
    }

    pub fn summary(&self) -> RunSummary {
        let state = self.gate.state();
        RunSummary {
            phase: self.gate.phase(),
            permission: state.permission,
            trigger_count: state.trigger_count,
            fired_by: self.fired_by,
            navigated_to: self.navigated_to.clone(),
            events_processed: self.events_processed,
        }
    }

    async fn on_tap(&mut self, tap: TapKind) -> Option<Redirect> {
        if self.gate.has_fired() {
            return None;
        }

        if self.listeners.fallback && self.gate.phase() == Phase::FallbackActive {
            let action = self.gate.fallback_tap(tap);
            return self.apply(action);
        }

        if self.listeners.permission_tap
            && self.gate.state().permission == PermissionStatus::NotRequested
        {
            self.report(Status::TapRequestingPermission { tap: tap.as_str() });
            self.request_permission().await;
        }

        None
    }

    fn prepare_permission_prompt(&mut self) {
        if let Err(e) = self.gate.await_permission() {
            warn!("Cannot prepare permission prompt: {e}");
            return;
        }

        if self.gate.config().enable_button {
            let handle = self.surface.create_button(ENABLE_BUTTON_LABEL);
            self.enable_button = Some(handle);
            self.report(Status::PressButtonToEnable);
        } else {
            self.device.register_tap_listener(TapPurpose::RequestPermission);
            self.listeners.permission_tap = true;
            self.report(Status::TapToEnable);
        }
    }

    async fn request_permission(&mut self) {
        match self.gate.begin_permission_request() {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => {
                warn!("Ignoring permission request: {e}");
                return;
            }
        }

        self.report(Status::RequestingPermission);
        let answer = self.device.request_permission().await;

        match &answer {
            Ok(state) => self.report(Status::PermissionResult {
                granted: *state == PermissionState::Granted,
                state: state.as_str(),
            }),
            Err(e) => {
                warn!("Error requesting motion permission: {e}");
                self.report(Status::from(e));
            }
        }

        if let Some(handle) = self.enable_button.take() {
            self.surface.hide(handle);
        }

        match self.gate.resolve_permission(answer) {
            Ok(Resolution::Sensing) => self.subscribe_motion(Status::SensingStarted),
            Ok(Resolution::Fallback {
                reason,
                newly_active,
            }) => {
                // Request failures already went to the permission line
                if !matches!(reason, GateError::PermissionRequestFailure(_)) {
                    self.report(Status::from(&reason));
                }
                if newly_active {
                    self.register_fallback(&reason);
                }
            }
            Ok(Resolution::Ignored) => debug!("Permission resolved after trigger, ignoring"),
            Err(e) => warn!("Unexpected permission resolution: {e}"),
        }
    }

    fn subscribe_motion(&mut self, started: Status) {
        if !self.listeners.motion {
            self.device.subscribe_motion();
            self.listeners.motion = true;
        }
        self.report(started);
    }

    fn enter_fallback(&mut self, reason: &GateError) {
        if !reason.falls_back() {
            warn!("Not switching to fallback for: {reason}");
            return;
        }
        match self.gate.activate_fallback() {
            Ok(true) => self.register_fallback(reason),
            Ok(false) => debug!("Fallback already active"),
            Err(e) => warn!("Cannot fall back: {e}"),
        }
    }

    fn register_fallback(&mut self, reason: &GateError) {
        info!("Using click/touch fallback ({reason})");
        self.report(Status::SettingUpFallback);
        self.device.register_tap_listener(TapPurpose::Fallback);
        self.listeners.fallback = true;
    }

    fn apply(&mut self, action: Action) -> Option<Redirect> {
        let source = match action {
            Action::None => return None,
            Action::StatusUpdate(GateStatus::NoData) => {
                self.report(Status::from(&GateError::MissingSampleData));
                return None;
            }
            Action::StatusUpdate(GateStatus::MotionDetected { count }) => {
                self.report(Status::MotionDetected { count });
                return None;
            }
            Action::Trigger(source) => source,
        };

        let config_delay = Duration::from_millis(self.gate.config().redirect_delay_ms);
        let delay = match source {
            TriggerSource::Motion { count } => {
                self.report(Status::MotionDetected { count });
                self.report(Status::MotionThresholdReached);
                config_delay
            }
            TriggerSource::Orientation => {
                self.report(Status::OrientationRedirect);
                config_delay
            }
            TriggerSource::Fallback { tap } => {
                self.report(Status::TapRedirect { tap: tap.as_str() });
                Duration::ZERO
            }
        };

        self.fired_by = Some(source);
        let url = self.gate.config().target_url.clone();
        info!(
            "Triggered by {:?}, redirecting to {} in {} ms",
            source,
            url,
            delay.as_millis()
        );
        Some(Redirect { url, delay, source })
    }

    fn navigate(&mut self, url: &str) {
        if let Some(previous) = &self.navigated_to {
            warn!("Already navigated to {previous}, dropping {url}");
            return;
        }
        self.navigator.navigate(url);
        self.navigated_to = Some(url.to_string());
    }

    fn report(&mut self, status: Status) {
        let id = status.element_id();
        let text = status.to_string();
        info!("{id}: {text}");
        self.surface.set_status_text(id, &text, status.color());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use crate::platform::{MotionCapability, OrientationCapability, TapInput};
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    struct FakeDevice {
        support: MotionSupport,
        answer: Result<PermissionState, GateError>,
        orientation: bool,
        permission_requests: u32,
        motion_subscriptions: u32,
        orientation_subscriptions: u32,
        tap_listeners: Vec<TapPurpose>,
    }

    impl FakeDevice {
        fn new(support: MotionSupport) -> Self {
            Self {
                support,
                answer: Ok(PermissionState::Granted),
                orientation: true,
                permission_requests: 0,
                motion_subscriptions: 0,
                orientation_subscriptions: 0,
                tap_listeners: Vec::new(),
            }
        }

        fn needing_permission(answer: Result<PermissionState, GateError>) -> Self {
            let mut device = Self::new(MotionSupport::Available {
                requires_permission: true,
            });
            device.answer = answer;
            device
        }

        fn fallback_registrations(&self) -> usize {
            self.tap_listeners
                .iter()
                .filter(|p| **p == TapPurpose::Fallback)
                .count()
        }
    }

    impl MotionCapability for FakeDevice {
        fn motion_support(&self) -> MotionSupport {
            self.support
        }

        async fn request_permission(&mut self) -> Result<PermissionState, GateError> {
            self.permission_requests += 1;
            self.answer.clone()
        }

        fn subscribe_motion(&mut self) {
            self.motion_subscriptions += 1;
        }
    }

    impl OrientationCapability for FakeDevice {
        fn orientation_available(&self) -> bool {
            self.orientation
        }

        fn subscribe_orientation(&mut self) {
            self.orientation_subscriptions += 1;
        }
    }

    impl TapInput for FakeDevice {
        fn register_tap_listener(&mut self, purpose: TapPurpose) {
            self.tap_listeners.push(purpose);
        }
    }

    #[derive(Default)]
    struct FakeSurface {
        lines: Vec<(String, String, String)>,
        buttons: Vec<String>,
        hidden: Vec<ButtonHandle>,
    }

    impl FakeSurface {
        fn texts(&self) -> Vec<&str> {
            self.lines.iter().map(|(_, text, _)| text.as_str()).collect()
        }
    }

    impl StatusSurface for FakeSurface {
        fn set_status_text(&mut self, id: &str, text: &str, color: &str) {
            self.lines
                .push((id.to_string(), text.to_string(), color.to_string()));
        }

        fn create_button(&mut self, label: &str) -> ButtonHandle {
            self.buttons.push(label.to_string());
            ButtonHandle(self.buttons.len() as u32)
        }

        fn hide(&mut self, handle: ButtonHandle) {
            self.hidden.push(handle);
        }
    }

    #[derive(Default)]
    struct FakeNavigator {
        visits: Vec<String>,
    }

    impl Navigator for FakeNavigator {
        fn navigate(&mut self, url: &str) {
            self.visits.push(url.to_string());
        }
    }

    type TestController = RedirectController<FakeDevice, FakeSurface, FakeNavigator>;

    fn controller(preset: Preset, device: FakeDevice) -> TestController {
        RedirectController::new(
            preset.config(),
            device,
            FakeSurface::default(),
            FakeNavigator::default(),
        )
    }

    fn shake(x: f64, t: f64) -> PageEvent {
        PageEvent::Motion(MotionSample::new(x, 0.0, 0.0, t))
    }

    fn tap() -> PageEvent {
        PageEvent::Tap { tap: TapKind::Click }
    }

    #[tokio::test]
    async fn test_denied_permission_registers_fallback_once() {
        let mut ctl = controller(
            Preset::Classic,
            FakeDevice::needing_permission(Ok(PermissionState::Denied)),
        );
        ctl.start();
        assert_eq!(ctl.gate().phase(), Phase::AwaitingPermission);
        assert!(ctl.listeners().permission_tap);

        // First tap opens the prompt, which is denied
        assert!(ctl.handle(tap()).await.is_none());
        assert_eq!(ctl.gate().phase(), Phase::FallbackActive);
        assert_eq!(ctl.device().fallback_registrations(), 1);

        // window load bootstraps again; nothing new may be attached
        assert!(ctl.handle(PageEvent::Loaded).await.is_none());
        assert_eq!(ctl.device().fallback_registrations(), 1);
        assert_eq!(ctl.device().permission_requests, 1);

        let redirect = ctl.handle(PageEvent::Tap { tap: TapKind::Touch }).await.unwrap();
        assert_eq!(redirect.delay, Duration::ZERO);
        assert_eq!(
            redirect.source,
            TriggerSource::Fallback { tap: TapKind::Touch }
        );

        let texts = ctl.surface().texts();
        assert!(texts.contains(&"Permission state: denied"));
        assert!(texts.contains(&"Motion permission denied, using fallback"));
        assert!(texts.contains(&"Touch detected! Redirecting..."));
    }

    #[tokio::test]
    async fn test_request_failure_falls_back_with_error_line() {
        let failure = GateError::PermissionRequestFailure("NotAllowedError".to_string());
        let mut ctl = controller(Preset::Classic, FakeDevice::needing_permission(Err(failure)));
        ctl.start();
        ctl.handle(tap()).await;

        assert_eq!(ctl.gate().phase(), Phase::FallbackActive);
        assert_eq!(ctl.device().fallback_registrations(), 1);
        let errors: Vec<_> = ctl
            .surface()
            .lines
            .iter()
            .filter(|(id, text, _)| id == "permission-status" && text == "Error: NotAllowedError")
            .collect();
        assert_eq!(errors.len(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_motion_uses_fallback_only() {
        let mut ctl = controller(Preset::Classic, FakeDevice::new(MotionSupport::Unavailable));
        ctl.start();

        assert_eq!(ctl.gate().phase(), Phase::FallbackActive);
        assert_eq!(ctl.device().fallback_registrations(), 1);
        assert_eq!(ctl.device().orientation_subscriptions, 0);
        assert_eq!(ctl.device().motion_subscriptions, 0);

        // Samples for listeners that were never attached are dropped
        assert!(ctl.handle(shake(50.0, 0.0)).await.is_none());
        assert!(ctl
            .handle(PageEvent::Orientation(OrientationSample::new(90.0, 0.0)))
            .await
            .is_none());

        let redirect = ctl.handle(tap()).await.unwrap();
        ctl.complete(redirect).await;
        assert!(ctl.handle(tap()).await.is_none());
        assert_eq!(ctl.navigator().visits, vec!["letter.html".to_string()]);
    }

    #[tokio::test]
    async fn test_motion_ignored_until_permission_granted() {
        let mut ctl = controller(
            Preset::Classic,
            FakeDevice::needing_permission(Ok(PermissionState::Granted)),
        );
        ctl.start();
        assert!(ctl.handle(shake(30.0, 0.0)).await.is_none());
        assert_eq!(ctl.gate().state().trigger_count, 0);

        ctl.handle(tap()).await;
        assert_eq!(ctl.gate().phase(), Phase::Sensing);
        assert_eq!(ctl.device().motion_subscriptions, 1);
        assert!(ctl.surface().texts().contains(&"Motion detection started! Shake your phone!"));

        // Further taps neither re-prompt nor fire
        assert!(ctl.handle(tap()).await.is_none());
        assert_eq!(ctl.device().permission_requests, 1);
    }

    #[tokio::test]
    async fn test_enable_button_flow() {
        let mut ctl = controller(
            Preset::Button,
            FakeDevice::needing_permission(Ok(PermissionState::Granted)),
        );
        ctl.start();
        assert_eq!(ctl.surface().buttons, vec![ENABLE_BUTTON_LABEL.to_string()]);
        assert!(!ctl.listeners().permission_tap);

        // Tapping elsewhere does not open the prompt in this version
        ctl.handle(tap()).await;
        assert_eq!(ctl.device().permission_requests, 0);

        ctl.handle(PageEvent::ButtonPressed).await;
        assert_eq!(ctl.device().permission_requests, 1);
        assert_eq!(ctl.surface().hidden, vec![ButtonHandle(1)]);
        assert_eq!(ctl.gate().phase(), Phase::Sensing);

        ctl.handle(PageEvent::ButtonPressed).await;
        assert_eq!(ctl.device().permission_requests, 1);
    }

    #[tokio::test]
    async fn test_enable_button_hidden_when_denied() {
        let mut ctl = controller(
            Preset::Button,
            FakeDevice::needing_permission(Ok(PermissionState::Denied)),
        );
        ctl.start();
        ctl.handle(PageEvent::ButtonPressed).await;

        assert_eq!(ctl.surface().hidden, vec![ButtonHandle(1)]);
        assert_eq!(ctl.gate().phase(), Phase::FallbackActive);
        assert_eq!(ctl.device().fallback_registrations(), 1);

        // Pressing again changes nothing
        ctl.handle(PageEvent::ButtonPressed).await;
        assert_eq!(ctl.surface().hidden, vec![ButtonHandle(1)]);
        assert_eq!(ctl.device().fallback_registrations(), 1);
        assert_eq!(ctl.device().permission_requests, 1);
    }

    #[tokio::test]
    async fn test_enable_button_hidden_when_request_fails() {
        let failure = GateError::PermissionRequestFailure("NotAllowedError".to_string());
        let mut ctl = controller(Preset::Button, FakeDevice::needing_permission(Err(failure)));
        ctl.start();
        ctl.handle(PageEvent::ButtonPressed).await;

        assert_eq!(ctl.surface().hidden, vec![ButtonHandle(1)]);
        assert_eq!(ctl.device().fallback_registrations(), 1);
        let texts = ctl.surface().texts();
        assert!(texts.contains(&"Error: NotAllowedError"));
        assert!(!texts.contains(&"Motion permission denied, using fallback"));
    }

    #[tokio::test]
    async fn test_start_without_prompt_status_lines() {
        let mut ctl = controller(
            Preset::Classic,
            FakeDevice::new(MotionSupport::Available {
                requires_permission: false,
            }),
        );
        ctl.start();

        let lines: Vec<(&str, &str)> = ctl
            .surface()
            .lines
            .iter()
            .map(|(_, text, color)| (text.as_str(), color.as_str()))
            .collect();
        assert_eq!(
            lines,
            vec![
                ("Starting motion detection...", "#f9ca24"),
                ("DeviceMotion is supported", "#6c5ce7"),
                ("No permission required", "#00b894"),
                ("Starting motion detection...", "#6c5ce7"),
                ("Motion detection started!", "#00b894"),
                ("Orientation detection also started!", "#00b894"),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_shakes_redirect_after_delay() {
        let mut ctl = controller(
            Preset::Button,
            FakeDevice::new(MotionSupport::Available {
                requires_permission: false,
            }),
        );
        let (tx, rx) = mpsc::channel(16);
        for event in [shake(25.0, 0.0), shake(0.0, 50.0), shake(25.0, 400.0), shake(0.0, 900.0)] {
            tx.send(event).await.unwrap();
        }
        drop(tx);

        let begin = Instant::now();
        let summary = ctl.run(rx).await;

        assert!(begin.elapsed() >= Duration::from_millis(300));
        assert_eq!(summary.trigger_count, 2);
        assert_eq!(summary.phase, Phase::Fired);
        assert_eq!(summary.fired_by, Some(TriggerSource::Motion { count: 2 }));
        assert_eq!(summary.navigated_to.as_deref(), Some("letter.html"));
        // The fourth sample is never read once the redirect is under way
        assert_eq!(summary.events_processed, 3);
        assert_eq!(ctl.navigator().visits.len(), 1);

        let texts = ctl.surface().texts();
        assert!(texts.contains(&"Motion detected! Count: 1"));
        assert!(texts.contains(&"Motion threshold reached! Redirecting..."));
    }

    #[tokio::test(start_paused = true)]
    async fn test_orientation_and_motion_race_navigates_once() {
        let mut ctl = controller(
            Preset::Button,
            FakeDevice::new(MotionSupport::Available {
                requires_permission: false,
            }),
        );
        ctl.start();
        assert!(ctl.listeners().orientation);

        assert!(ctl.handle(shake(25.0, 0.0)).await.is_none());
        let redirect = ctl
            .handle(PageEvent::Orientation(OrientationSample::new(25.0, 0.0)))
            .await
            .unwrap();
        assert_eq!(redirect.source, TriggerSource::Orientation);
        assert_eq!(redirect.delay, Duration::from_millis(300));

        // The motion path would have reached its count here
        assert!(ctl.handle(shake(0.0, 1000.0)).await.is_none());
        ctl.complete(redirect.clone()).await;
        ctl.complete(redirect).await;
        assert_eq!(ctl.navigator().visits.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_data_reports_status() {
        let mut ctl = controller(
            Preset::Classic,
            FakeDevice::new(MotionSupport::Available {
                requires_permission: false,
            }),
        );
        ctl.start();
        assert!(ctl.handle(PageEvent::Motion(MotionSample::empty(5.0))).await.is_none());

        let (id, text, color) = ctl.surface().lines.last().unwrap();
        assert_eq!(id, "motion-status");
        assert_eq!(text, "No acceleration data available");
        assert_eq!(color, "#ff6b6b");
        assert_eq!(ctl.gate().state().last_trigger_ms, None);
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let mut ctl = controller(
            Preset::Classic,
            FakeDevice::new(MotionSupport::Available {
                requires_permission: false,
            }),
        );
        ctl.start();
        ctl.start();
        ctl.handle(PageEvent::Loaded).await;

        assert_eq!(ctl.device().motion_subscriptions, 1);
        assert_eq!(ctl.device().orientation_subscriptions, 1);
        assert_eq!(ctl.gate().phase(), Phase::Sensing);
    }

    #[tokio::test]
    async fn test_run_without_trigger_does_not_navigate() {
        let mut ctl = controller(
            Preset::Vigorous,
            FakeDevice::new(MotionSupport::Available {
                requires_permission: false,
            }),
        );
        let (tx, rx) = mpsc::channel(8);
        tx.send(shake(1.0, 0.0)).await.unwrap();
        tx.send(shake(2.0, 20.0)).await.unwrap();
        drop(tx);

        let summary = ctl.run(rx).await;
        assert_eq!(summary.phase, Phase::Sensing);
        assert_eq!(summary.navigated_to, None);
        assert!(ctl.navigator().visits.is_empty());
    }

    async fn replay(ctl: &mut TestController, json: &str) -> RunSummary {
        let trace: serde_json::Value = serde_json::from_str(json).unwrap();
        let events: Vec<PageEvent> = serde_json::from_value(trace["events"].clone()).unwrap();
        let (tx, rx) = mpsc::channel(events.len());
        for event in events {
            tx.send(event).await.unwrap();
        }
        drop(tx);
        ctl.run(rx).await
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_two_shakes_trace() {
        let mut ctl = controller(
            Preset::Classic,
            FakeDevice::new(MotionSupport::Available {
                requires_permission: false,
            }),
        );
        let summary = replay(&mut ctl, include_str!("../demos/traces/two_shakes.json")).await;

        assert_eq!(summary.fired_by, Some(TriggerSource::Motion { count: 2 }));
        assert_eq!(summary.events_processed, 7);
        assert!(ctl.surface().texts().contains(&"No acceleration data available"));
        assert_eq!(ctl.navigator().visits.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_permission_denied_trace() {
        let mut ctl = controller(
            Preset::Classic,
            FakeDevice::needing_permission(Ok(PermissionState::Denied)),
        );
        let summary =
            replay(&mut ctl, include_str!("../demos/traces/permission_denied.json")).await;

        assert_eq!(
            summary.fired_by,
            Some(TriggerSource::Fallback { tap: TapKind::Click })
        );
        assert_eq!(summary.trigger_count, 0);
        assert_eq!(summary.permission, PermissionStatus::Denied);
        assert_eq!(ctl.device().fallback_registrations(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_tilt_trace() {
        let mut ctl = controller(
            Preset::Button,
            FakeDevice::new(MotionSupport::Available {
                requires_permission: false,
            }),
        );
        let summary = replay(&mut ctl, include_str!("../demos/traces/tilt.json")).await;

        assert_eq!(summary.fired_by, Some(TriggerSource::Orientation));
        assert_eq!(summary.events_processed, 3);
        assert!(ctl
            .surface()
            .texts()
            .contains(&"Orientation change detected! Redirecting..."));
    }

    #[test]
    fn test_page_event_json() {
        let event: PageEvent = serde_json::from_str(
            r#"{"type": "motion", "timestamp_ms": 40.0, "acceleration": {"x": 12.0}}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            PageEvent::Motion(MotionSample {
                timestamp_ms: 40.0,
                acceleration: Some(crate::types::Acceleration {
                    x: Some(12.0),
                    y: None,
                    z: None,
                }),
            })
        );

        let tap: PageEvent = serde_json::from_str(r#"{"type": "tap", "tap": "touch"}"#).unwrap();
        assert_eq!(tap, PageEvent::Tap { tap: TapKind::Touch });

        let loaded: PageEvent = serde_json::from_str(r#"{"type": "loaded"}"#).unwrap();
        assert_eq!(loaded, PageEvent::Loaded);
    }
}
