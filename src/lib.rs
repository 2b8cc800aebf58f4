//! server-setup library
//!
//! A checkbox menu over a catalog of package bundles. The user toggles rows,
//! confirms, and the selected bundles are installed or removed through the
//! system package manager one package at a time.

pub mod action_log;
pub mod backend;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod installer;
pub mod keymap;
pub mod preflight;
pub mod selector;
pub mod terminal;
pub mod theme;
pub mod ui;

// Re-export main types for convenience
pub use action_log::ActionLog;
pub use backend::{BackendKind, DryRunBackend, PackageBackend, PackageOperation, SystemBackend};
pub use catalog::{BundleAction, BundleEntry, Catalog, InstalledStatus};
pub use config::Settings;
pub use error::{Result, SetupError};
pub use installer::{apply_selection, run_menu, update_system, ApplyReport, PackageOutcome};
pub use selector::{InputSource, SelectionState, Selector, SelectorEvent, SelectorStatus};
pub use terminal::{TerminalHandle, TerminalSession};
