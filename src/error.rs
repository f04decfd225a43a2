//! Error types for display configuration operations.

use crate::apply::ApplyResult;
use crate::mode::DisplayMode;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for screenconfig operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving, mapping or applying a display mode.
#[derive(Debug, Error)]
pub enum Error {
    /// No attached monitor has a friendly name containing the requested name.
    #[error("could not find monitor {0}")]
    MonitorNotFound(String),

    /// Unknown client profile, or missing/non-positive custom values.
    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    /// A mode with a zero field was handed to the applicator.
    #[error("invalid display mode {0}")]
    InvalidMode(DisplayMode),

    /// The primary reconfiguration call returned something other than success.
    #[error("display settings were not applied: {0}")]
    PrimaryApplyFailed(ApplyResult),

    /// The automation channel could not see the target monitor.
    #[error("fallback could not reach monitor {0}")]
    FallbackUnreachable(String),

    /// The child process reported an error and produced no output.
    #[error("child process error: {0}")]
    ChildProcess(String),

    /// The child process did not exit within the configured timeout.
    #[error("child process timed out after {0:?}")]
    TimedOut(Duration),

    /// The child process could not be started or waited on.
    #[error("failed to run child process: {0}")]
    Spawn(#[from] std::io::Error),

    /// Child process output did not match the expected JSON shape.
    #[error("malformed script output: {0}")]
    Json(#[from] serde_json::Error),

    /// Platform-specific error.
    #[error("platform error: {0}")]
    Platform(String),

    /// The requested feature is not supported on this platform.
    #[error("not supported: {0}")]
    NotSupported(String),
}
