use crate::backend::BackendKind;
use crate::config::DEFAULT_LOG_FILE;
use clap::Parser;
use std::path::PathBuf;

/// server-setup - pick bundles of system packages from a checkbox menu
#[derive(Parser, Debug)]
#[command(name = "server-setup")]
#[command(about = "Interactive checkbox menu for installing and removing package bundles")]
#[command(version)]
pub struct Cli {
    /// JSON catalog replacing the built-in bundle table
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Package manager to drive (apt, dnf, pacman). Detected when omitted.
    #[arg(long, env = "SERVER_SETUP_BACKEND")]
    pub backend: Option<BackendKind>,

    /// Append-only log of every action's outcome
    #[arg(long, value_name = "FILE", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Show what would be executed without changing anything.
    ///
    /// Installed-status queries still run so the menu is accurate.
    #[arg(long)]
    pub dry_run: bool,

    /// Do not refresh the package index and upgrade before the menu
    #[arg(long)]
    pub skip_update: bool,

    /// Show the menu again after applying a selection, until Exit is chosen
    #[arg(long)]
    pub repeat: bool,

    /// Debug-level diagnostics on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
