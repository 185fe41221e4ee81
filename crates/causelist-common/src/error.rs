/// Failures raised by a browser backend while driving the portal.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    // ============================================================
    // Lifecycle Errors
    // ============================================================
    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Not ready")]
    NotReady,

    #[error("Connection lost")]
    ConnectionLost,

    // ============================================================
    // Navigation Errors
    // ============================================================
    #[error("Navigation failed: {0}")]
    Navigation(String),

    // ============================================================
    // Element Errors
    // ============================================================
    #[error("Element {target} not found")]
    ElementNotFound { target: String },

    #[error("Option {value} not found in {target}")]
    OptionNotFound { target: String, value: String },

    #[error("Screenshot of {target} failed: {reason}")]
    Screenshot { target: String, reason: String },

    // ============================================================
    // Execution Errors
    // ============================================================
    #[error("Script execution error: {0}")]
    Script(String),

    #[error("Timeout: {operation}")]
    Timeout { operation: String },

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Other: {0}")]
    Other(String),
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Serialization(err.to_string())
    }
}

impl BackendError {
    pub fn element_not_found(target: impl Into<String>) -> Self {
        BackendError::ElementNotFound {
            target: target.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        BackendError::Timeout {
            operation: operation.into(),
        }
    }

    /// Stable code attached to log lines.
    pub fn code(&self) -> &'static str {
        match self {
            BackendError::Launch(_) => "LAUNCH_ERROR",
            BackendError::NotReady => "NOT_READY",
            BackendError::ConnectionLost => "CONNECTION_LOST",
            BackendError::Navigation(_) => "NAVIGATION_ERROR",
            BackendError::ElementNotFound { .. } => "ELEMENT_NOT_FOUND",
            BackendError::OptionNotFound { .. } => "OPTION_NOT_FOUND",
            BackendError::Screenshot { .. } => "SCREENSHOT_ERROR",
            BackendError::Script(_) => "SCRIPT_ERROR",
            BackendError::Timeout { .. } => "TIMEOUT",
            BackendError::Io(_) => "IO_ERROR",
            BackendError::Serialization(_) => "SERIALIZATION_ERROR",
            BackendError::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the session itself is unusable after this error.
    pub fn is_session_fatal(&self) -> bool {
        matches!(
            self,
            BackendError::Launch(_) | BackendError::NotReady | BackendError::ConnectionLost
        )
    }
}
