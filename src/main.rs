//! server-setup - main entry point
//!
//! Order of a run: privilege check, settings, backend check, system update,
//! then the menu. A confirmed selection is applied outside the alternate
//! screen so package manager output stays visible.

use anyhow::{Context, Result};
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use server_setup::cli::Cli;
use server_setup::selector::CrosstermInput;
use server_setup::{installer, preflight, ActionLog, SetupError, Settings, TerminalSession};

/// Diagnostics go to stderr; RUST_LOG overrides the default level
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);
    debug!("server-setup starting up");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            match e.downcast_ref::<SetupError>() {
                Some(err @ (SetupError::PermissionDenied(_) | SetupError::MissingBinaries(_))) => {
                    preflight::print_error(err)
                }
                _ => eprintln!("✗ {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    preflight::require_elevated_privilege(preflight::should_skip_root_check())?;

    let settings = Settings::from_cli(cli).context("Invalid configuration")?;
    preflight::verify_binaries(settings.backend)?;

    let backend = settings.build_backend();
    let mut log = ActionLog::open(&settings.log_path)?;

    if settings.skip_update {
        log.info("System update skipped.");
    } else {
        installer::update_system(backend.as_ref(), &mut log)
            .context("Could not update the system")?;
    }

    installer::run_menu(&settings, backend.as_ref(), &mut log, TerminalSession::enter, &mut CrosstermInput)?;
    Ok(())
}
