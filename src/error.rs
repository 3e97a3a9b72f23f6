//! Error types for the render engine.
//!
//! This module provides two error enums:
//!
//! - [`PoolError`]: faults local to browser-pool construction, health
//!   checking and shutdown (kept close to the browser pool this crate is
//!   built around).
//! - [`RenderError`]: the taxonomy a single [`crate::coordinator::RenderCoordinator::render`]
//!   call reports to its caller, matching the error categories a caller needs
//!   to map onto HTTP status codes at the outer API boundary.
//!
//! # Example
//!
//! ```rust
//! use zpt_render::{PoolError, Result};
//!
//! fn process_pdf() -> Result<Vec<u8>> {
//!     Err(PoolError::Configuration("example error".to_string()))
//! }
//!
//! match process_pdf() {
//!     Ok(pdf) => println!("Generated {} bytes", pdf.len()),
//!     Err(PoolError::ShuttingDown) => println!("Pool is shutting down"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use crate::package::PackageError;

/// Errors that can occur during browser pool operations.
///
/// Each variant includes context about what went wrong.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// Failed to create a new browser instance.
    ///
    /// Typically indicates Chrome/Chromium binary issues or launch flag problems.
    #[error("Failed to create browser: {0}")]
    BrowserCreation(String),

    /// Browser failed a health check operation.
    ///
    /// Triggered when ping operations (new_tab, navigate, close) fail.
    #[error("Browser health check failed: {0}")]
    HealthCheckFailed(String),

    /// Operation attempted during pool shutdown.
    ///
    /// All operations are rejected once shutdown begins.
    #[error("Pool is shutting down")]
    ShuttingDown,

    /// Invalid configuration provided.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<String> for PoolError {
    fn from(msg: String) -> Self {
        PoolError::Configuration(msg)
    }
}

impl From<&str> for PoolError {
    fn from(msg: &str) -> Self {
        PoolError::Configuration(msg.to_string())
    }
}

/// Result type alias using [`PoolError`].
pub type Result<T> = std::result::Result<T, PoolError>;

/// The error taxonomy reported by a single render job.
///
/// Every terminating path of [`crate::coordinator::RenderCoordinator::render`]
/// reports one of these variants inside the job's [`crate::job::JobResult`];
/// none of them ever panic up through the coordinator or either pool. The
/// outer HTTP layer (out of scope for this crate) maps these onto response
/// status codes using [`RenderError::status_code`].
#[derive(Debug, thiserror::Error, Clone)]
pub enum RenderError {
    /// Caller-side mistake: invalid enum, unparsable number, missing
    /// report, negative margin. Never produced by the coordinator itself —
    /// reserved for an API layer that validates a `Job` before submission.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Path-traversal attempt inside the package. Only ever raised by the
    /// asset server (C2), never by the coordinator directly.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Requested package entry does not exist. Only ever raised by the
    /// asset server (C2).
    #[error("not found: {0}")]
    NotFound(String),

    /// A server slot could not be allocated or its asset server failed to
    /// start.
    #[error("server unavailable: {0}")]
    ServerUnavailable(String),

    /// A browser could not be leased or constructed.
    #[error("browser unavailable: {0}")]
    BrowserUnavailable(String),

    /// Navigation or PDF capture failed inside the browser protocol.
    #[error("render failed: {0}")]
    RenderFailure(String),

    /// The job's context was cancelled during execution.
    #[error("job cancelled: {0}")]
    JobCancelled(String),
}

impl RenderError {
    /// HTTP status code an outer API layer should map this error onto:
    /// `BadRequest` is the only variant distinguished from the rest, which
    /// all surface as a plain `success=false` failure.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            _ => 500,
        }
    }

    /// Stable machine-readable error code for the `{"error": ...}` body.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::ServerUnavailable(_) => "SERVER_UNAVAILABLE",
            Self::BrowserUnavailable(_) => "BROWSER_UNAVAILABLE",
            Self::RenderFailure(_) => "RENDER_FAILURE",
            Self::JobCancelled(_) => "JOB_CANCELLED",
        }
    }
}

impl From<PoolError> for RenderError {
    fn from(err: PoolError) -> Self {
        RenderError::BrowserUnavailable(err.to_string())
    }
}

impl From<PackageError> for RenderError {
    fn from(err: PackageError) -> Self {
        match err {
            PackageError::Forbidden(_) => RenderError::Forbidden(err.to_string()),
            PackageError::NotFound(_) => RenderError::NotFound(err.to_string()),
            other => RenderError::ServerUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let error: PoolError = "test error".into();
        match error {
            PoolError::Configuration(msg) => assert_eq!(msg, "test error"),
            _ => panic!("expected Configuration variant"),
        }
    }

    #[test]
    fn test_render_error_status_codes() {
        assert_eq!(RenderError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(RenderError::Forbidden("x".into()).status_code(), 500);
        assert_eq!(RenderError::NotFound("x".into()).status_code(), 500);
        assert_eq!(
            RenderError::ServerUnavailable("x".into()).status_code(),
            500
        );
        assert_eq!(
            RenderError::BrowserUnavailable("x".into()).status_code(),
            500
        );
        assert_eq!(RenderError::RenderFailure("x".into()).status_code(), 500);
        assert_eq!(RenderError::JobCancelled("x".into()).status_code(), 500);
    }

    #[test]
    fn test_render_error_codes() {
        assert_eq!(
            RenderError::BadRequest("x".into()).error_code(),
            "BAD_REQUEST"
        );
        assert_eq!(
            RenderError::ServerUnavailable("x".into()).error_code(),
            "SERVER_UNAVAILABLE"
        );
    }

    #[test]
    fn test_pool_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PoolError>();
        assert_send_sync::<RenderError>();
    }
}
