//! Error handling module for server-setup
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Package operation failures are values here, not panics: the installer
//! records them and moves on to the next package.

use thiserror::Error;

/// Main error type for server-setup
#[derive(Error, Debug)]
pub enum SetupError {
    /// IO errors (log file, terminal, process spawning)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors (loading, unknown backend, bad paths)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors (catalog contents, package names)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Process is not running with administrative rights
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Tools required by the package backend are not on PATH
    #[error("Missing required binaries: {}", .0.join(", "))]
    MissingBinaries(Vec<String>),

    /// A single install/remove call failed
    #[error("Failed to {operation} {package}: {reason}")]
    PackageOperation {
        operation: String,
        package: String,
        reason: String,
    },

    /// Refreshing the package index or upgrading the system failed
    #[error("System update failed: {0}")]
    SystemUpdate(String),

    /// Terminal/UI errors
    #[error("Terminal error: {0}")]
    Terminal(String),
}

/// Result type alias for server-setup operations
pub type Result<T> = std::result::Result<T, SetupError>;

// Convenient error constructors
impl SetupError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a permission error
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Create a package operation error
    pub fn package_operation(
        operation: impl Into<String>,
        package: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::PackageOperation {
            operation: operation.into(),
            package: package.into(),
            reason: reason.into(),
        }
    }

    /// Create a system update error
    pub fn system_update(msg: impl Into<String>) -> Self {
        Self::SystemUpdate(msg.into())
    }

    /// Create a terminal error
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }
}
