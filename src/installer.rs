//! Applying a confirmed selection
//!
//! Selected rows are processed in catalog order and every package is handled
//! on its own: one install/remove call at a time, logged and printed, and a
//! failure only marks that package as failed. There is no rollback; a bundle
//! can end up partially applied and the report says exactly which parts.
//!
//! [`run_menu`] ties the rounds together: probe, select, apply, repeat.

use crate::action_log::ActionLog;
use crate::backend::{PackageBackend, PackageOperation};
use crate::catalog::{BundleAction, Catalog, InstalledStatus};
use crate::config::Settings;
use crate::error::{Result, SetupError};
use crate::selector::{InputSource, Selector};
use crate::terminal::TerminalHandle;
use tracing::{debug, warn};

/// Result of one install/remove call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOutcome {
    pub operation: PackageOperation,
    pub package: String,
    /// Failure reason, `None` on success
    pub error: Option<String>,
    /// Nothing was executed; the commands were only printed and logged
    pub dry_run: bool,
}

impl PackageOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && !self.dry_run
    }
}

/// Everything that happened while applying one selection snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub outcomes: Vec<PackageOutcome>,
    /// An exit row was selected
    pub exit_requested: bool,
}

impl ApplyReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_some()).count()
    }

    pub fn simulated(&self) -> usize {
        self.outcomes.iter().filter(|o| o.dry_run).count()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Refresh the package index, then upgrade everything. Either failing is fatal.
pub fn update_system<B: PackageBackend + ?Sized>(backend: &B, log: &mut ActionLog) -> Result<()> {
    println!("Updating system...");

    if backend.is_dry_run() {
        announce_dry_run(backend.preview_update(), log);
        log.info("System update simulated, nothing was changed.");
        println!();
        return Ok(());
    }

    log.info(format!("Refreshing package index with {}...", backend.name()));
    if let Err(e) = backend.refresh_index() {
        log.error(format!("Error occurred while refreshing package index: {}", e));
        return Err(e);
    }

    log.info("Upgrading installed packages...");
    if let Err(e) = backend.upgrade_all() {
        log.error(format!("Error occurred while upgrading packages: {}", e));
        return Err(e);
    }

    log.info("System update completed.");
    println!("System update completed.\n");
    Ok(())
}

fn announce_dry_run(lines: Vec<String>, log: &mut ActionLog) {
    for line in lines {
        let message = format!("[dry-run] would run: {}", line);
        println!("{}", message);
        log.info(message);
    }
}

fn failure_reason(error: &SetupError) -> String {
    match error {
        SetupError::PackageOperation { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}

/// Install or remove a single package, recording the outcome
pub fn apply_package<B: PackageBackend + ?Sized>(
    backend: &B,
    operation: PackageOperation,
    package: &str,
    log: &mut ActionLog,
) -> PackageOutcome {
    log.info(format!("Attempting to {} {}...", operation, package));
    println!("{} {}...", operation.progressive(), package);

    if backend.is_dry_run() {
        announce_dry_run(backend.preview(operation, package), log);
        println!();
        return PackageOutcome {
            operation,
            package: package.to_string(),
            error: None,
            dry_run: true,
        };
    }

    let error = match backend.apply(operation, package) {
        Ok(()) => {
            log.info(format!("{} {} successfully.", package, operation.past()));
            println!("✓ {} {} successfully.\n", package, operation.past());
            None
        }
        Err(e) => {
            let reason = failure_reason(&e);
            log.error(format!(
                "Error occurred while {} {}: {}",
                operation.gerund(),
                package,
                reason
            ));
            println!("✗ Error occurred while {} {}.\n", operation.gerund(), package);
            Some(reason)
        }
    };

    PackageOutcome {
        operation,
        package: package.to_string(),
        error,
        dry_run: false,
    }
}

/// Apply a selection snapshot to the backend.
///
/// `selection` holds one flag per catalog row. Rows run in catalog order; an
/// exit row stops the rows after it.
pub fn apply_selection<B: PackageBackend + ?Sized>(
    catalog: &Catalog,
    selection: &[bool],
    backend: &B,
    log: &mut ActionLog,
) -> ApplyReport {
    if selection.len() != catalog.len() {
        warn!(
            "Selection has {} flags for {} catalog rows",
            selection.len(),
            catalog.len()
        );
    }

    let mut report = ApplyReport::default();
    let chosen = catalog
        .entries()
        .iter()
        .zip(selection)
        .filter(|(_, selected)| **selected)
        .map(|(entry, _)| entry);

    for entry in chosen {
        debug!("Applying row '{}' ({:?})", entry.label, entry.action);
        match entry.action {
            BundleAction::Install => {
                for package in &entry.packages {
                    report
                        .outcomes
                        .push(apply_package(backend, PackageOperation::Install, package, log));
                }
            }
            BundleAction::RemoveAll => {
                for package in catalog.removal_targets(entry) {
                    report
                        .outcomes
                        .push(apply_package(backend, PackageOperation::Remove, &package, log));
                }
            }
            BundleAction::Exit => {
                log.info(format!("'{}' selected, stopping.", entry.label));
                report.exit_requested = true;
                break;
            }
        }
    }

    report
}

/// One-line summary printed after a selection is applied
pub fn print_summary(report: &ApplyReport) {
    if report.is_empty() {
        return;
    }
    if report.simulated() > 0 {
        println!("Dry run: {} operations simulated.", report.simulated());
        return;
    }
    println!(
        "Done: {} succeeded, {} failed.",
        report.succeeded(),
        report.failed()
    );
}

/// Run menu rounds until the user is done.
///
/// Every round probes installed status afresh, opens a terminal through
/// `open_terminal` for the selection only, then applies the selection with
/// the terminal already restored. Without `settings.repeat` there is exactly
/// one round; with it, rounds continue until an exit row is confirmed.
/// Package failures are in the reports, never in the returned error.
pub fn run_menu<P, H, F, I>(
    settings: &Settings,
    backend: &P,
    log: &mut ActionLog,
    mut open_terminal: F,
    input: &mut I,
) -> Result<Vec<ApplyReport>>
where
    P: PackageBackend + ?Sized,
    H: TerminalHandle,
    F: FnMut() -> Result<H>,
    I: InputSource,
{
    let catalog = &settings.catalog;
    let mut reports = Vec::new();

    loop {
        let installed = InstalledStatus::probe(catalog, backend);
        let selection = {
            let mut handle = open_terminal()?;
            Selector::new(catalog, installed).run(handle.terminal(), input)?
        };
        debug!(?selection, round = reports.len() + 1, "Selection confirmed");

        let report = apply_selection(catalog, &selection, backend, log);
        print_summary(&report);
        let done = !settings.repeat || report.exit_requested;
        reports.push(report);

        if done {
            break;
        }
    }

    println!("Exiting...");
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::FakeBackend;
    use crate::catalog::BundleEntry;

    fn catalog() -> Catalog {
        Catalog::new(
            "t",
            vec![
                BundleEntry::install("Dev", &["git", "make", "gcc"]),
                BundleEntry::install("Web", &["nginx"]),
                BundleEntry::remove_all("Remove All", &[]),
                BundleEntry::exit("Exit"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_failure_in_middle_of_bundle_continues() {
        let backend = FakeBackend::default().failing_on("make");
        let mut log = ActionLog::discard();
        let report = apply_selection(&catalog(), &[true, false, false, false], &backend, &mut log);

        assert_eq!(backend.calls(), vec!["install git", "install make", "install gcc"]);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.outcomes[1].error.as_deref(), Some("simulated failure"));
        assert!(!report.exit_requested);
    }

    #[test]
    fn test_rows_run_in_catalog_order() {
        let backend = FakeBackend::default();
        let mut log = ActionLog::discard();
        apply_selection(&catalog(), &[true, true, true, false], &backend, &mut log);

        assert_eq!(
            backend.calls(),
            vec![
                "install git",
                "install make",
                "install gcc",
                "install nginx",
                "remove git",
                "remove make",
                "remove gcc",
                "remove nginx",
            ]
        );
    }

    #[test]
    fn test_exit_row_stops_processing() {
        let catalog = Catalog::new(
            "t",
            vec![
                BundleEntry::install("A", &["a"]),
                BundleEntry::exit("Exit"),
                BundleEntry::install("B", &["b"]),
            ],
        )
        .unwrap();
        let backend = FakeBackend::default();
        let mut log = ActionLog::discard();
        let report = apply_selection(&catalog, &[true, true, true], &backend, &mut log);

        assert!(report.exit_requested);
        assert_eq!(backend.calls(), vec!["install a"]);
    }

    #[test]
    fn test_empty_selection_does_nothing() {
        let backend = FakeBackend::default();
        let mut log = ActionLog::discard();
        let report = apply_selection(&catalog(), &[false; 4], &backend, &mut log);
        assert!(report.is_empty());
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_update_system_runs_refresh_then_upgrade() {
        let backend = FakeBackend::default();
        let mut log = ActionLog::discard();
        update_system(&backend, &mut log).unwrap();
        assert_eq!(backend.calls(), vec!["refresh", "upgrade"]);
    }

    #[test]
    fn test_dry_run_skips_backend_calls() {
        struct Simulated(FakeBackend);
        impl PackageBackend for Simulated {
            fn name(&self) -> &str {
                "simulated"
            }
            fn is_installed(&self, package: &str) -> bool {
                self.0.is_installed(package)
            }
            fn install(&self, package: &str) -> Result<()> {
                self.0.install(package)
            }
            fn remove(&self, package: &str) -> Result<()> {
                self.0.remove(package)
            }
            fn refresh_index(&self) -> Result<()> {
                self.0.refresh_index()
            }
            fn upgrade_all(&self) -> Result<()> {
                self.0.upgrade_all()
            }
            fn is_dry_run(&self) -> bool {
                true
            }
        }

        let backend = Simulated(FakeBackend::default());
        let mut log = ActionLog::discard();
        update_system(&backend, &mut log).unwrap();
        let report = apply_selection(&catalog(), &[false, true, false, false], &backend, &mut log);

        assert!(backend.0.calls().is_empty());
        assert_eq!(report.simulated(), 1);
        assert_eq!(report.succeeded(), 0);
        assert_eq!(report.failed(), 0);
    }

    #[test]
    fn test_failure_reason_unwraps_package_errors() {
        let err = SetupError::package_operation("install", "x", "E: broken");
        assert_eq!(failure_reason(&err), "E: broken");
        let err = SetupError::system_update("apt update");
        assert_eq!(failure_reason(&err), "System update failed: apt update");
    }
}
