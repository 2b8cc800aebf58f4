//! Package backend abstraction
//!
//! The menu never talks to a package manager directly. Everything goes through
//! [`PackageBackend`], which has one production implementation per supported
//! package manager ([`SystemBackend`]) and a [`DryRunBackend`] decorator that
//! prints what would be executed instead of executing it.
//!
//! Backend calls are synchronous and blocking. Mutating commands inherit
//! stdout so the user sees the package manager's progress; stderr is captured
//! so its last line can be reported as the failure reason.

use crate::error::{Result, SetupError};
use std::fmt;
use std::process::{Command, Stdio};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::{debug, warn};

/// Operations applied to a single package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum PackageOperation {
    Install,
    Remove,
}

impl PackageOperation {
    /// "Installing" / "Removing"
    pub fn progressive(self) -> &'static str {
        match self {
            Self::Install => "Installing",
            Self::Remove => "Removing",
        }
    }

    /// "installed" / "removed"
    pub fn past(self) -> &'static str {
        match self {
            Self::Install => "installed",
            Self::Remove => "removed",
        }
    }

    /// "installing" / "removing", for sentences
    pub fn gerund(self) -> &'static str {
        match self {
            Self::Install => "installing",
            Self::Remove => "removing",
        }
    }
}

/// Operations every package backend supports
pub trait PackageBackend {
    /// Short name used in log lines
    fn name(&self) -> &str;

    /// Whether `package` is currently installed. Errors count as "not installed".
    fn is_installed(&self, package: &str) -> bool;

    /// Install a single package
    fn install(&self, package: &str) -> Result<()>;

    /// Remove a single package, including any backend-level cleanup of
    /// dependencies that are no longer needed
    fn remove(&self, package: &str) -> Result<()>;

    /// Refresh the package index
    fn refresh_index(&self) -> Result<()>;

    /// Upgrade every installed package
    fn upgrade_all(&self) -> Result<()>;

    /// True when mutating calls are only simulated
    fn is_dry_run(&self) -> bool {
        false
    }

    /// Command lines an install/remove of `package` would run
    fn preview(&self, operation: PackageOperation, package: &str) -> Vec<String> {
        vec![format!("{} {}", operation, package)]
    }

    /// Command lines a system update would run
    fn preview_update(&self) -> Vec<String> {
        vec!["refresh package index".to_string(), "upgrade all packages".to_string()]
    }

    /// Dispatch a per-package operation
    fn apply(&self, operation: PackageOperation, package: &str) -> Result<()> {
        match operation {
            PackageOperation::Install => self.install(package),
            PackageOperation::Remove => self.remove(package),
        }
    }
}

/// Supported package managers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BackendKind {
    #[default]
    Apt,
    Dnf,
    Pacman,
}

impl BackendKind {
    /// Binaries the backend shells out to
    pub fn required_binaries(self) -> &'static [&'static str] {
        match self {
            Self::Apt => &["apt", "dpkg-query"],
            Self::Dnf => &["dnf", "rpm"],
            Self::Pacman => &["pacman"],
        }
    }

    /// Pick the first backend whose binaries are all on PATH, falling back to apt
    pub fn detect() -> Self {
        Self::iter()
            .find(|kind| {
                kind.required_binaries()
                    .iter()
                    .all(|binary| crate::preflight::binary_exists(binary))
            })
            .unwrap_or_default()
    }
}

/// A single command line to run, kept as data so it can be printed,
/// compared in tests, or executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: &'static str,
    pub args: Vec<String>,
}

impl CommandSpec {
    fn new(program: &'static str, args: &[&str]) -> Self {
        Self {
            program,
            args: args.iter().map(|arg| (*arg).to_string()).collect(),
        }
    }

    fn with_package(program: &'static str, args: &[&str], package: &str) -> Self {
        let mut spec = Self::new(program, args);
        spec.args.push(package.to_string());
        spec
    }

    /// Build a `std::process::Command` for this spec
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(self.program);
        command.args(&self.args);
        command
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Package backend that shells out to the system package manager
#[derive(Debug, Clone)]
pub struct SystemBackend {
    kind: BackendKind,
}

impl SystemBackend {
    pub fn new(kind: BackendKind) -> Self {
        Self { kind }
    }

    /// Command that tells whether `package` is installed. For apt the answer
    /// is in stdout; the others answer through the exit status.
    pub fn query_command(&self, package: &str) -> CommandSpec {
        match self.kind {
            BackendKind::Apt => {
                CommandSpec::with_package("dpkg-query", &["-W", "--showformat=${Status}"], package)
            }
            BackendKind::Dnf => CommandSpec::with_package("rpm", &["-q"], package),
            BackendKind::Pacman => CommandSpec::with_package("pacman", &["-Q"], package),
        }
    }

    /// Commands run, in order, to install or remove `package`
    pub fn package_commands(&self, operation: PackageOperation, package: &str) -> Vec<CommandSpec> {
        match (self.kind, operation) {
            (BackendKind::Apt, PackageOperation::Install) => {
                vec![CommandSpec::with_package("apt", &["install", "-y"], package)]
            }
            (BackendKind::Apt, PackageOperation::Remove) => vec![
                CommandSpec::with_package("apt", &["remove", "-y"], package),
                CommandSpec::new("apt", &["autoremove", "-y"]),
            ],
            (BackendKind::Dnf, PackageOperation::Install) => {
                vec![CommandSpec::with_package("dnf", &["install", "-y"], package)]
            }
            (BackendKind::Dnf, PackageOperation::Remove) => vec![
                CommandSpec::with_package("dnf", &["remove", "-y"], package),
                CommandSpec::new("dnf", &["autoremove", "-y"]),
            ],
            (BackendKind::Pacman, PackageOperation::Install) => vec![CommandSpec::with_package(
                "pacman",
                &["-S", "--noconfirm", "--needed"],
                package,
            )],
            // -Rns already drops orphaned dependencies
            (BackendKind::Pacman, PackageOperation::Remove) => vec![CommandSpec::with_package(
                "pacman",
                &["-Rns", "--noconfirm"],
                package,
            )],
        }
    }

    pub fn refresh_command(&self) -> CommandSpec {
        match self.kind {
            BackendKind::Apt => CommandSpec::new("apt", &["update"]),
            BackendKind::Dnf => CommandSpec::new("dnf", &["makecache"]),
            BackendKind::Pacman => CommandSpec::new("pacman", &["-Sy"]),
        }
    }

    pub fn upgrade_command(&self) -> CommandSpec {
        match self.kind {
            BackendKind::Apt => CommandSpec::new("apt", &["upgrade", "-y"]),
            BackendKind::Dnf => CommandSpec::new("dnf", &["upgrade", "-y"]),
            BackendKind::Pacman => CommandSpec::new("pacman", &["-Su", "--noconfirm"]),
        }
    }

    fn run_package_commands(&self, operation: PackageOperation, package: &str) -> Result<()> {
        for spec in self.package_commands(operation, package) {
            run_visible(&spec)
                .map_err(|reason| SetupError::package_operation(operation.to_string(), package, reason))?;
        }
        Ok(())
    }
}

impl PackageBackend for SystemBackend {
    fn name(&self) -> &str {
        match self.kind {
            BackendKind::Apt => "apt",
            BackendKind::Dnf => "dnf",
            BackendKind::Pacman => "pacman",
        }
    }

    fn is_installed(&self, package: &str) -> bool {
        let spec = self.query_command(package);
        let output = spec
            .to_command()
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();
        match output {
            Ok(output) if output.status.success() => match self.kind {
                BackendKind::Apt => dpkg_status_installed(&String::from_utf8_lossy(&output.stdout)),
                BackendKind::Dnf | BackendKind::Pacman => true,
            },
            Ok(_) => false,
            Err(e) => {
                warn!("Failed to run {}: {}", spec, e);
                false
            }
        }
    }

    fn preview(&self, operation: PackageOperation, package: &str) -> Vec<String> {
        self.package_commands(operation, package)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn preview_update(&self) -> Vec<String> {
        vec![self.refresh_command().to_string(), self.upgrade_command().to_string()]
    }

    fn install(&self, package: &str) -> Result<()> {
        self.run_package_commands(PackageOperation::Install, package)
    }

    fn remove(&self, package: &str) -> Result<()> {
        self.run_package_commands(PackageOperation::Remove, package)
    }

    fn refresh_index(&self) -> Result<()> {
        run_visible(&self.refresh_command()).map_err(|reason| SetupError::system_update(reason))
    }

    fn upgrade_all(&self) -> Result<()> {
        run_visible(&self.upgrade_command()).map_err(|reason| SetupError::system_update(reason))
    }
}

/// dpkg keeps removed packages around in `deinstall ok config-files` state
/// until they are purged; only a current-state of `installed` counts.
fn dpkg_status_installed(status: &str) -> bool {
    status.split_whitespace().nth(2) == Some("installed")
}

/// Run a command with stdout shown to the user; on failure return the most
/// useful line of stderr, or the exit status when stderr was empty
fn run_visible(spec: &CommandSpec) -> std::result::Result<(), String> {
    debug!("Running backend command: {}", spec);

    let output = spec
        .to_command()
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| format!("failed to run {}: {}", spec.program, e))?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        eprint!("{}", stderr);
    }
    Err(failure_reason(&stderr, output.status))
}

/// Last non-empty stderr line, falling back to the exit status text
fn failure_reason(stderr: &str, status: impl fmt::Display) -> String {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| status.to_string())
}

/// Backend decorator for `--dry-run`: queries go to the real package manager,
/// mutating operations are skipped. The installer prints and logs the
/// [`PackageBackend::preview`] lines instead.
#[derive(Debug, Clone)]
pub struct DryRunBackend {
    inner: SystemBackend,
}

impl DryRunBackend {
    pub fn new(inner: SystemBackend) -> Self {
        Self { inner }
    }

    fn skip(&self, lines: Vec<String>) -> Result<()> {
        for line in lines {
            debug!("Dry-run skipped: {}", line);
        }
        Ok(())
    }
}

impl PackageBackend for DryRunBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_installed(&self, package: &str) -> bool {
        self.inner.is_installed(package)
    }

    fn install(&self, package: &str) -> Result<()> {
        self.skip(self.preview(PackageOperation::Install, package))
    }

    fn remove(&self, package: &str) -> Result<()> {
        self.skip(self.preview(PackageOperation::Remove, package))
    }

    fn refresh_index(&self) -> Result<()> {
        self.skip(vec![self.inner.refresh_command().to_string()])
    }

    fn upgrade_all(&self) -> Result<()> {
        self.skip(vec![self.inner.upgrade_command().to_string()])
    }

    fn is_dry_run(&self) -> bool {
        true
    }

    fn preview(&self, operation: PackageOperation, package: &str) -> Vec<String> {
        self.inner.preview(operation, package)
    }

    fn preview_update(&self) -> Vec<String> {
        self.inner.preview_update()
    }
}
