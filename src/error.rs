use thiserror::Error;

/// Shake redirect error types
///
/// None of these are fatal at runtime: the controller turns every one of
/// them into a status line and, where it makes sense, the click/touch fallback.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GateError {
    #[error("No acceleration data available")]
    MissingSampleData,

    #[error("Motion permission denied")]
    PermissionDenied,

    #[error("{0}")]
    PermissionRequestFailure(String),

    #[error("DeviceMotion not supported")]
    CapabilityUnavailable,

    #[error("Invalid gate state: {0}")]
    InvalidState(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GateError {
    /// Whether this error should switch the page over to the click/touch fallback
    pub fn falls_back(&self) -> bool {
        matches!(
            self,
            GateError::PermissionDenied
                | GateError::PermissionRequestFailure(_)
                | GateError::CapabilityUnavailable
        )
    }
}

/// Result type for gate operations
pub type GateResult<T> = Result<T, GateError>;
