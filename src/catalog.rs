//! Bundle catalog
//!
//! The catalog is the ordered table of rows shown in the menu. Each row is a
//! label plus the packages it stands for. Rows whose action is not
//! [`BundleAction::Install`] are control rows (remove everything, exit) and
//! are never annotated as installed.
//!
//! The table is data: the built-in default mirrors the classic server setup
//! menu, and a JSON file can replace it without touching any control flow.

use crate::backend::PackageBackend;
use crate::error::{Result, SetupError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use unicode_width::UnicodeWidthStr;

/// Spaces between the widest label and the installed marker
pub const LABEL_GUTTER: usize = 2;

/// Marker appended to bundles whose packages are all present
pub const INSTALLED_MARKER: &str = "[Installed]";

/// Default menu title
pub const DEFAULT_TITLE: &str = "Server Setup Menu";

/// What confirming a row does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundleAction {
    /// Install every package of the bundle
    #[default]
    Install,
    /// Remove the listed packages, or every catalog package when the list is empty
    RemoveAll,
    /// Stop processing and leave the menu
    Exit,
}

/// One row of the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleEntry {
    pub label: String,
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default)]
    pub action: BundleAction,
}

impl BundleEntry {
    /// An installable bundle
    pub fn install(label: impl Into<String>, packages: &[&str]) -> Self {
        Self {
            label: label.into(),
            packages: packages.iter().map(|p| (*p).to_string()).collect(),
            action: BundleAction::Install,
        }
    }

    /// A remove-all control row
    pub fn remove_all(label: impl Into<String>, packages: &[&str]) -> Self {
        Self {
            action: BundleAction::RemoveAll,
            ..Self::install(label, packages)
        }
    }

    /// An exit control row
    pub fn exit(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            packages: Vec::new(),
            action: BundleAction::Exit,
        }
    }

    /// Installable bundles are the only rows that can carry the installed marker
    pub fn is_installable(&self) -> bool {
        self.action == BundleAction::Install && !self.packages.is_empty()
    }

    /// Rows that do something other than install a bundle
    pub fn is_control(&self) -> bool {
        !self.is_installable()
    }
}

/// Ordered, immutable list of bundles and control rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default = "default_title")]
    title: String,
    bundles: Vec<BundleEntry>,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            title: default_title(),
            bundles: vec![
                BundleEntry::install("Web Server", &["nginx", "ufw", "fail2ban", "certbot"]),
                BundleEntry::install("SSH Minimal", &["ufw", "ssh"]),
                BundleEntry::install("Nginx", &["nginx"]),
                BundleEntry::install("UFW (Uncomplicated Firewall)", &["ufw"]),
                BundleEntry::install("Fail2Ban", &["fail2ban"]),
                BundleEntry::install("All Packages", &["nginx", "ufw", "fail2ban"]),
                BundleEntry::remove_all("Remove All Packages", &["nginx", "ufw", "fail2ban"]),
                BundleEntry::exit("Exit"),
            ],
        }
    }
}

impl Catalog {
    /// Build a catalog from entries, validating it
    pub fn new(title: impl Into<String>, bundles: Vec<BundleEntry>) -> Result<Self> {
        let catalog = Self {
            title: title.into(),
            bundles,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Whether any row ends the menu
    pub fn has_exit_row(&self) -> bool {
        self.bundles.iter().any(|entry| entry.action == BundleAction::Exit)
    }

    /// Load a catalog from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SetupError::config(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate a catalog from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Validate the catalog
    pub fn validate(&self) -> Result<()> {
        if self.bundles.is_empty() {
            return Err(SetupError::validation("Catalog must contain at least one entry"));
        }

        for (index, entry) in self.bundles.iter().enumerate() {
            let row = index + 1;
            if entry.label.trim().is_empty() {
                return Err(SetupError::validation(format!("Row {} has an empty label", row)));
            }
            match entry.action {
                BundleAction::Install if entry.packages.is_empty() => {
                    return Err(SetupError::validation(format!(
                        "Bundle '{}' must list at least one package",
                        entry.label
                    )));
                }
                BundleAction::Exit if !entry.packages.is_empty() => {
                    return Err(SetupError::validation(format!(
                        "Exit row '{}' must not list packages",
                        entry.label
                    )));
                }
                _ => {}
            }
            for package in &entry.packages {
                validate_package_name(package)?;
            }
        }

        Ok(())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Entries in declaration order
    pub fn entries(&self) -> &[BundleEntry] {
        &self.bundles
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BundleEntry> {
        self.bundles.get(index)
    }

    /// Width of the label column: widest label plus the gutter
    pub fn label_width(&self) -> usize {
        self.bundles
            .iter()
            .map(|entry| entry.label.width())
            .max()
            .unwrap_or(0)
            + LABEL_GUTTER
    }

    /// Pad the label to the catalog's label column, appending the installed
    /// marker for installable bundles that are installed
    pub fn format_label(&self, entry: &BundleEntry, installed: bool) -> String {
        format_label(entry, installed, self.label_width())
    }

    /// Packages a remove-all row acts on. An explicit list wins; an empty list
    /// means every package of every installable bundle, deduplicated, in
    /// catalog order.
    pub fn removal_targets(&self, entry: &BundleEntry) -> Vec<String> {
        if !entry.packages.is_empty() {
            return entry.packages.clone();
        }
        let mut targets: Vec<String> = Vec::new();
        for bundle in self.bundles.iter().filter(|b| b.is_installable()) {
            for package in &bundle.packages {
                if !targets.contains(package) {
                    targets.push(package.clone());
                }
            }
        }
        targets
    }
}

/// Format a label padded to `width` display columns
pub fn format_label(entry: &BundleEntry, installed: bool, width: usize) -> String {
    let padding = width.saturating_sub(entry.label.width());
    let mut line = format!("{}{}", entry.label, " ".repeat(padding));
    if installed && entry.is_installable() {
        line.push_str(INSTALLED_MARKER);
    }
    line
}

/// True iff `packages` is non-empty and the backend reports every one present
pub fn is_bundle_installed<B: PackageBackend + ?Sized>(packages: &[String], backend: &B) -> bool {
    !packages.is_empty() && packages.iter().all(|package| backend.is_installed(package))
}

/// Package names are passed as process arguments; refuse anything that could
/// be read as an option or is not a plain package identifier
pub fn validate_package_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(SetupError::validation("Package name must not be empty"));
    }
    if name.starts_with('-') {
        return Err(SetupError::validation(format!(
            "Package name '{}' must not start with '-'",
            name
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.' | '_' | ':' | '@'))
    {
        return Err(SetupError::validation(format!(
            "Invalid characters in package name '{}'",
            name
        )));
    }
    Ok(())
}

/// Installed annotation for every row of one render pass.
///
/// Each unique package is queried once per probe, however many bundles share
/// it. Callers probe again after applying install/remove actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledStatus {
    rows: Vec<bool>,
}

impl InstalledStatus {
    pub fn probe<B: PackageBackend + ?Sized>(catalog: &Catalog, backend: &B) -> Self {
        let mut memo: HashMap<&str, bool> = HashMap::new();
        let rows = catalog
            .entries()
            .iter()
            .map(|entry| {
                entry.is_installable()
                    && entry.packages.iter().all(|package| {
                        *memo
                            .entry(package.as_str())
                            .or_insert_with(|| backend.is_installed(package))
                    })
            })
            .collect();
        Self { rows }
    }

    /// Status with every row reported as not installed
    pub fn none(rows: usize) -> Self {
        Self {
            rows: vec![false; rows],
        }
    }

    pub fn from_rows(rows: Vec<bool>) -> Self {
        Self { rows }
    }

    pub fn is_installed(&self, index: usize) -> bool {
        self.rows.get(index).copied().unwrap_or(false)
    }
}
