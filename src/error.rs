//! Error types for the SDF driver.

use thiserror::Error;

/// Process session errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Executable not found: {program}")]
    ExecutableNotFound { program: String },

    #[error("Failed to start process: {0}")]
    Spawn(std::io::Error),

    #[error("Process I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Process exited with status {}", code.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string()))]
    ExitStatus { code: Option<i32> },

    #[error("Process stdin is closed")]
    StdinClosed,
}

impl SessionError {
    /// Classify a spawn failure: a missing executable is reported distinctly.
    pub fn from_spawn(program: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            SessionError::ExecutableNotFound {
                program: program.to_string(),
            }
        } else {
            SessionError::Spawn(err)
        }
    }
}

/// Deployment manifest errors
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Manifest I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse manifest: {0}")]
    Parse(String),

    #[error("Failed to write manifest: {0}")]
    Serialize(String),
}

/// Top-level errors surfaced by orchestrator operations
#[derive(Debug, Error)]
pub enum SdfError {
    #[error("The SDF CLI could not be found. Install it and make sure it is on PATH, then restart.")]
    ToolUnavailable,

    #[error("No authids found. Run `authenticate` to add one.")]
    NoEnvironments,

    #[error("Environment '{0}' is no longer available. Run `authenticate` again.")]
    StaleSelection(String),

    #[error("No environment selected")]
    NoEnvironmentSelected,

    #[error("Cancelled")]
    Cancelled,

    #[error("{0}")]
    Validation(String),

    #[error("Command failed: {0}")]
    Session(#[from] SessionError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Staging failed: {0}")]
    Staging(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to get user input: {0}")]
    Ui(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for SdfError {
    fn from(err: config::ConfigError) -> Self {
        SdfError::Config(err.to_string())
    }
}

impl SdfError {
    /// True when the external executable is missing.
    pub fn is_tool_unavailable(&self) -> bool {
        matches!(
            self,
            SdfError::ToolUnavailable
                | SdfError::Session(SessionError::ExecutableNotFound { .. })
        )
    }
}
