use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{GateError, GateResult};

// Shared by every page version
pub const ORIENTATION_THRESHOLD_DEG: f64 = 20.0;
pub const REDIRECT_DELAY_MS: u64 = 300;
pub const TARGET_URL: &str = "letter.html";

/// Tuning for one deployed page version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Per-axis delta (m/s^2) a sample must exceed to count
    pub motion_threshold: f64,
    /// Counted motion events needed before redirecting
    pub required_trigger_count: u32,
    /// Minimum gap between two counted events
    pub debounce_ms: u64,
    /// |beta| or |gamma| above this fires immediately
    pub orientation_threshold_deg: f64,
    /// Pause between a motion/orientation trigger and navigation
    pub redirect_delay_ms: u64,
    pub target_url: String,
    /// Show an "Enable Motion" button instead of tap-anywhere to request permission
    pub enable_button: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Preset::Classic.config()
    }
}

impl GateConfig {
    /// Load a JSON config; absent fields keep the classic values
    pub fn load(path: &Path) -> GateResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            GateError::InvalidConfig(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> GateResult<Self> {
        let config: GateConfig = serde_json::from_str(text)
            .map_err(|e| GateError::InvalidConfig(format!("malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> GateResult<()> {
        if !self.motion_threshold.is_finite() || self.motion_threshold <= 0.0 {
            return Err(GateError::InvalidConfig(format!(
                "motion_threshold must be positive, got {}",
                self.motion_threshold
            )));
        }
        if !self.orientation_threshold_deg.is_finite() || self.orientation_threshold_deg <= 0.0 {
            return Err(GateError::InvalidConfig(format!(
                "orientation_threshold_deg must be positive, got {}",
                self.orientation_threshold_deg
            )));
        }
        if self.required_trigger_count == 0 {
            return Err(GateError::InvalidConfig(
                "required_trigger_count must be at least 1".to_string(),
            ));
        }
        if self.target_url.trim().is_empty() {
            return Err(GateError::InvalidConfig("target_url is empty".to_string()));
        }
        Ok(())
    }
}

/// The page versions that shipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Low threshold, tap anywhere to grant permission
    Classic,
    /// Explicit enable button, faster debounce
    Button,
    /// Four hard shakes required
    Vigorous,
}

impl Preset {
    pub fn config(self) -> GateConfig {
        let (motion_threshold, required_trigger_count, debounce_ms, enable_button) = match self {
            Preset::Classic => (10.0, 2, 500, false),
            Preset::Button => (20.0, 2, 300, true),
            Preset::Vigorous => (25.0, 4, 300, true),
        };
        GateConfig {
            motion_threshold,
            required_trigger_count,
            debounce_ms,
            orientation_threshold_deg: ORIENTATION_THRESHOLD_DEG,
            redirect_delay_ms: REDIRECT_DELAY_MS,
            target_url: TARGET_URL.to_string(),
            enable_button,
        }
    }
}
