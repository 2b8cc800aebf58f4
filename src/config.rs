//! Runtime settings
//!
//! [`Settings`] is built once from the command line and passed to whatever
//! needs it; there is no global configuration state.

use crate::backend::{BackendKind, DryRunBackend, PackageBackend, SystemBackend};
use crate::catalog::Catalog;
use crate::cli::Cli;
use crate::error::{Result, SetupError};
use std::path::PathBuf;
use tracing::debug;

/// Default outcome log, relative to the working directory
pub const DEFAULT_LOG_FILE: &str = "server-setup.log";

/// Everything a run needs to know
#[derive(Debug, Clone)]
pub struct Settings {
    pub catalog: Catalog,
    pub backend: BackendKind,
    pub log_path: PathBuf,
    pub dry_run: bool,
    pub skip_update: bool,
    pub repeat: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog: Catalog::default(),
            backend: BackendKind::default(),
            log_path: PathBuf::from(DEFAULT_LOG_FILE),
            dry_run: false,
            skip_update: false,
            repeat: false,
        }
    }
}

impl Settings {
    /// Build settings from parsed arguments, loading the catalog file if given
    /// and detecting the backend if none was named
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let catalog = match &cli.catalog {
            Some(path) => {
                debug!("Loading catalog from {}", path.display());
                Catalog::load_from_file(path)?
            }
            None => Catalog::default(),
        };
        // Keys cannot cancel the menu, so repeated rounds need an exit row
        if cli.repeat && !catalog.has_exit_row() {
            return Err(SetupError::config(
                "--repeat needs a catalog with an exit row to leave the menu",
            ));
        }
        let backend = cli.backend.unwrap_or_else(BackendKind::detect);
        debug!("Using {} backend", backend);

        Ok(Self {
            catalog,
            backend,
            log_path: cli.log_file.clone(),
            dry_run: cli.dry_run,
            skip_update: cli.skip_update,
            repeat: cli.repeat,
        })
    }

    /// The backend these settings describe, wrapped for dry-run if requested
    pub fn build_backend(&self) -> Box<dyn PackageBackend> {
        let system = SystemBackend::new(self.backend);
        if self.dry_run {
            Box::new(DryRunBackend::new(system))
        } else {
            Box::new(system)
        }
    }
}
