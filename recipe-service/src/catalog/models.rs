// Catalog Models
// Version catalogs, recipe locations, and the derived package kind

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Literal that marks a recipe as a header-only library
pub const HEADER_LIBRARY_MARKER: &str = "package_type = \"header-library\"";

/// One entry of a package's `versions` mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// Recipe subfolder, relative to the package directory
    pub folder: PathBuf,
    /// Any other per-version keys, kept verbatim
    #[serde(flatten)]
    pub overrides: BTreeMap<String, serde_yaml::Value>,
}

impl VersionEntry {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            overrides: BTreeMap::new(),
        }
    }
}

/// The ordered version list of one package.
///
/// Entries keep the order in which they appear in `config.yml`. "Latest" is
/// the last entry in that order, never the highest version number.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionCatalog {
    /// Package name (the directory name under the recipes root)
    pub package: String,
    /// Package directory that recipe folders are relative to
    pub package_dir: PathBuf,
    entries: Vec<(String, VersionEntry)>,
}

impl VersionCatalog {
    pub fn new(
        package: impl Into<String>,
        package_dir: impl Into<PathBuf>,
        entries: Vec<(String, VersionEntry)>,
    ) -> Self {
        Self {
            package: package.into(),
            package_dir: package_dir.into(),
            entries,
        }
    }

    /// Iterate versions in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VersionEntry)> {
        self.entries.iter().map(|(v, e)| (v.as_str(), e))
    }

    /// The last-inserted version
    pub fn latest(&self) -> Option<(&str, &VersionEntry)> {
        self.entries.last().map(|(v, e)| (v.as_str(), e))
    }

    /// Look up a version by its exact key
    pub fn get(&self, version: &str) -> Option<&VersionEntry> {
        self.entries
            .iter()
            .find(|(v, _)| v == version)
            .map(|(_, e)| e)
    }

    pub fn versions(&self) -> Vec<&str> {
        self.entries.iter().map(|(v, _)| v.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Absolute recipe directory for an entry
    pub fn recipe_dir(&self, entry: &VersionEntry) -> PathBuf {
        self.package_dir.join(&entry.folder)
    }
}

/// Whether a recipe builds a library binary or only ships headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageKind {
    HeaderOnly,
    Compiled,
}

impl PackageKind {
    /// Classify a recipe from its conanfile text
    pub fn detect(conanfile: &str) -> Self {
        if conanfile.contains(HEADER_LIBRARY_MARKER) {
            PackageKind::HeaderOnly
        } else {
            PackageKind::Compiled
        }
    }

    pub fn is_header_only(&self) -> bool {
        matches!(self, PackageKind::HeaderOnly)
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageKind::HeaderOnly => write!(f, "header-only"),
            PackageKind::Compiled => write!(f, "compiled"),
        }
    }
}

/// A recipe folder resolved for one version
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    /// Folder handed to the build tool
    pub dir: PathBuf,
    /// Kind derived from the conanfile's declared package type
    pub kind: PackageKind,
}

impl Recipe {
    pub fn new(dir: impl Into<PathBuf>, kind: PackageKind) -> Self {
        Self {
            dir: dir.into(),
            kind,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
