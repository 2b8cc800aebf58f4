//! Pre-flight checks for the runtime environment
//!
//! Runs before anything else touches the system:
//! - Running with root privileges (EUID 0)
//! - The chosen package backend's binaries are present
//!
//! Failures are printed as a framed message on stderr before the menu is
//! ever shown, and the process exits non-zero.

use crate::backend::BackendKind;
use crate::error::{Result, SetupError};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Set to `1` or `true` to skip the root check (development only)
pub const SKIP_ROOT_ENV: &str = "SERVER_SETUP_SKIP_ROOT_CHECK";

/// Check if a binary is available in PATH
pub fn binary_exists(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Check if running as root (EUID 0)
pub fn is_running_as_root() -> bool {
    nix::unistd::geteuid().is_root()
}

/// Whether the root check was disabled through the environment
pub fn should_skip_root_check() -> bool {
    std::env::var(SKIP_ROOT_ENV)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Fail with `PermissionDenied` unless running as root or `skip` is set
pub fn require_elevated_privilege(skip: bool) -> Result<()> {
    if skip {
        warn!("Root check skipped ({}=1)", SKIP_ROOT_ENV);
        return Ok(());
    }
    if !is_running_as_root() {
        return Err(SetupError::permission_denied(
            "This program must be run as root (use sudo).",
        ));
    }
    debug!("Running as root");
    Ok(())
}

/// Binaries of `kind` that are not on PATH
pub fn missing_binaries(kind: BackendKind) -> Vec<String> {
    kind.required_binaries()
        .iter()
        .filter(|binary| !binary_exists(binary))
        .map(|binary| (*binary).to_string())
        .collect()
}

/// Fail with `MissingBinaries` if the backend cannot run
pub fn verify_binaries(kind: BackendKind) -> Result<()> {
    let missing = missing_binaries(kind);
    if !missing.is_empty() {
        return Err(SetupError::MissingBinaries(missing));
    }
    debug!("All {} binaries present", kind);
    Ok(())
}

/// Print a framed error message to stderr. Only called outside the TUI.
pub fn print_error(error: &SetupError) {
    eprintln!();
    eprintln!("╔══════════════════════════════════════════════════════════════════╗");
    eprintln!("║                server-setup - Pre-flight Check Failed            ║");
    eprintln!("╚══════════════════════════════════════════════════════════════════╝");
    eprintln!();

    match error {
        SetupError::PermissionDenied(message) => {
            eprintln!("❌ ERROR: Root privileges required");
            eprintln!("   {}", message);
            eprintln!();
            eprintln!("   Solution: Run with sudo or as root user:");
            eprintln!("     sudo server-setup");
        }
        SetupError::MissingBinaries(binaries) => {
            eprintln!("❌ ERROR: Missing required binaries");
            eprintln!();
            for binary in binaries {
                eprintln!("   • {}", binary);
            }
            eprintln!();
            eprintln!("   Solution: pick another package backend with --backend");
        }
        other => eprintln!("❌ ERROR: {}", other),
    }
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_exists_sh() {
        assert!(binary_exists("sh"), "sh should be available");
    }

    #[test]
    fn test_binary_exists_nonexistent() {
        assert!(!binary_exists("this_binary_definitely_does_not_exist_12345"));
    }

    #[test]
    fn test_skip_always_passes() {
        assert!(require_elevated_privilege(true).is_ok());
    }

    #[test]
    fn test_privilege_check_matches_euid() {
        let result = require_elevated_privilege(false);
        if is_running_as_root() {
            assert!(result.is_ok());
        } else {
            assert!(matches!(result, Err(SetupError::PermissionDenied(_))));
        }
    }

    #[test]
    fn test_missing_binaries_error_lists_names() {
        // Whatever the host has, the error must only ever name backend binaries
        if let Err(SetupError::MissingBinaries(names)) = verify_binaries(BackendKind::Pacman) {
            assert_eq!(names, vec!["pacman".to_string()]);
        }
    }
}
