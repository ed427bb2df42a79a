// Matrix Expansion
// Expands a package's versions into concrete build cells (build type x linkage)

use crate::catalog::models::{PackageKind, Recipe, VersionCatalog, VersionEntry};
use crate::error::{CatalogError, CatalogResult};

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// CMake-style build configuration passed to the build tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildType {
    Release,
    Debug,
}

impl BuildType {
    /// Both build types in default expansion order
    pub const ALL: [BuildType; 2] = [BuildType::Release, BuildType::Debug];
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildType::Release => write!(f, "Release"),
            BuildType::Debug => write!(f, "Debug"),
        }
    }
}

impl FromStr for BuildType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "release" => Ok(BuildType::Release),
            "debug" => Ok(BuildType::Debug),
            _ => Err(format!(
                "Unknown build type '{}'. Valid build types: Release, Debug",
                s
            )),
        }
    }
}

/// Library linkage of a cell.
///
/// `HeaderOnly` is synthetic: it is never requested, it replaces the whole
/// linkage axis for header-library recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Linkage {
    Shared,
    Static,
    HeaderOnly,
}

impl Linkage {
    /// Both selectable linkages in default expansion order
    pub const SELECTABLE: [Linkage; 2] = [Linkage::Shared, Linkage::Static];

    /// Value of the recipe's `shared` option, if the option applies
    pub fn shared_option(&self) -> Option<bool> {
        match self {
            Linkage::Shared => Some(true),
            Linkage::Static => Some(false),
            Linkage::HeaderOnly => None,
        }
    }
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Linkage::Shared => write!(f, "shared"),
            Linkage::Static => write!(f, "static"),
            Linkage::HeaderOnly => write!(f, "header-only"),
        }
    }
}

/// Which build types and linkages a run covers.
///
/// Resolved once before expansion. An axis left empty by the caller expands
/// to both of its values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisSelection {
    build_types: Vec<BuildType>,
    linkages: Vec<Linkage>,
}

impl AxisSelection {
    /// Build a selection, keeping the given order and dropping duplicates
    pub fn new(
        build_types: impl IntoIterator<Item = BuildType>,
        linkages: impl IntoIterator<Item = Linkage>,
    ) -> Self {
        let mut selected_builds = Vec::new();
        for build_type in build_types {
            if !selected_builds.contains(&build_type) {
                selected_builds.push(build_type);
            }
        }
        if selected_builds.is_empty() {
            selected_builds = BuildType::ALL.to_vec();
        }

        let mut selected_linkages = Vec::new();
        for linkage in linkages {
            if linkage != Linkage::HeaderOnly && !selected_linkages.contains(&linkage) {
                selected_linkages.push(linkage);
            }
        }
        if selected_linkages.is_empty() {
            selected_linkages = Linkage::SELECTABLE.to_vec();
        }

        Self {
            build_types: selected_builds,
            linkages: selected_linkages,
        }
    }

    /// Resolve from on/off switches, as given on the command line
    pub fn from_flags(release: bool, debug: bool, shared: bool, static_: bool) -> Self {
        let build_types = [(release, BuildType::Release), (debug, BuildType::Debug)]
            .into_iter()
            .filter_map(|(on, value)| on.then_some(value));
        let linkages = [(shared, Linkage::Shared), (static_, Linkage::Static)]
            .into_iter()
            .filter_map(|(on, value)| on.then_some(value));
        Self::new(build_types, linkages)
    }

    pub fn build_types(&self) -> &[BuildType] {
        &self.build_types
    }

    pub fn linkages(&self) -> &[Linkage] {
        &self.linkages
    }

    /// Linkage axis for a recipe of the given kind
    pub fn linkages_for(&self, kind: PackageKind) -> Vec<Linkage> {
        match kind {
            PackageKind::HeaderOnly => vec![Linkage::HeaderOnly],
            PackageKind::Compiled => self.linkages.clone(),
        }
    }
}

impl Default for AxisSelection {
    fn default() -> Self {
        Self::new([], [])
    }
}

/// Which versions of a package a run covers
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionScope {
    /// Only the last version listed in the catalog
    #[default]
    Latest,
    /// Every version, in catalog order
    All,
    /// One pinned version
    Exact(String),
}

impl fmt::Display for VersionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionScope::Latest => write!(f, "latest version"),
            VersionScope::All => write!(f, "all versions"),
            VersionScope::Exact(v) => write!(f, "version {}", v),
        }
    }
}

/// One unit of work: a single build-tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixCell {
    pub package: String,
    pub version: String,
    pub recipe_dir: PathBuf,
    pub build_type: BuildType,
    pub linkage: Linkage,
    /// Whether the package's own unit tests are built and run
    pub run_tests: bool,
}

impl MatrixCell {
    /// `name/version`
    pub fn reference(&self) -> String {
        format!("{}/{}", self.package, self.version)
    }

    /// `name/version BuildType linkage`
    pub fn label(&self) -> String {
        format!("{} {} {}", self.reference(), self.build_type, self.linkage)
    }
}

/// Matrix expander for recipe versions
pub struct MatrixExpander;

impl MatrixExpander {
    /// Pick the versions a scope covers, in catalog order
    pub fn select_versions<'a>(
        catalog: &'a VersionCatalog,
        scope: &VersionScope,
    ) -> CatalogResult<Vec<(&'a str, &'a VersionEntry)>> {
        match scope {
            VersionScope::All => Ok(catalog.iter().collect()),
            VersionScope::Latest => Ok(catalog.latest().into_iter().collect()),
            VersionScope::Exact(version) => catalog
                .iter()
                .find(|(v, _)| *v == version.as_str())
                .map(|pair| vec![pair])
                .ok_or_else(|| CatalogError::UnknownVersion {
                    package: catalog.package.clone(),
                    version: version.clone(),
                }),
        }
    }

    /// Expand one version of a recipe.
    ///
    /// Build types form the outer loop and linkages the inner one, so cells
    /// of the same build type are contiguous.
    pub fn expand(
        package: &str,
        version: &str,
        recipe: &Recipe,
        axes: &AxisSelection,
        run_tests: bool,
    ) -> Vec<MatrixCell> {
        let linkages = axes.linkages_for(recipe.kind);

        axes.build_types()
            .iter()
            .flat_map(|&build_type| {
                linkages.iter().map(move |&linkage| MatrixCell {
                    package: package.to_string(),
                    version: version.to_string(),
                    recipe_dir: recipe.dir.clone(),
                    build_type,
                    linkage,
                    run_tests,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiled() -> Recipe {
        Recipe::new("/recipes/arba-hash/all", PackageKind::Compiled)
    }

    fn header_only() -> Recipe {
        Recipe::new("/recipes/arba-grid/all", PackageKind::HeaderOnly)
    }

    fn axes_of(cells: &[MatrixCell]) -> Vec<(BuildType, Linkage)> {
        cells.iter().map(|c| (c.build_type, c.linkage)).collect()
    }

    #[test]
    fn test_default_selection_is_both_axes() {
        let axes = AxisSelection::default();
        assert_eq!(axes.build_types(), &[BuildType::Release, BuildType::Debug]);
        assert_eq!(axes.linkages(), &[Linkage::Shared, Linkage::Static]);
        assert_eq!(AxisSelection::from_flags(false, false, false, false), axes);
    }

    #[test]
    fn test_from_flags_restricts_axes() {
        let axes = AxisSelection::from_flags(false, true, false, true);
        assert_eq!(axes.build_types(), &[BuildType::Debug]);
        assert_eq!(axes.linkages(), &[Linkage::Static]);

        let both = AxisSelection::from_flags(true, true, true, true);
        assert_eq!(both.build_types(), &[BuildType::Release, BuildType::Debug]);
        assert_eq!(both.linkages(), &[Linkage::Shared, Linkage::Static]);
    }

    #[test]
    fn test_new_preserves_given_order_and_dedups() {
        let axes = AxisSelection::new(
            [BuildType::Debug, BuildType::Release, BuildType::Debug],
            [Linkage::Static, Linkage::HeaderOnly, Linkage::Shared],
        );
        assert_eq!(axes.build_types(), &[BuildType::Debug, BuildType::Release]);
        assert_eq!(axes.linkages(), &[Linkage::Static, Linkage::Shared]);
    }

    #[test]
    fn test_compiled_expands_build_type_outer() {
        let cells = MatrixExpander::expand(
            "arba-hash",
            "0.4.0",
            &compiled(),
            &AxisSelection::default(),
            false,
        );

        assert_eq!(
            axes_of(&cells),
            vec![
                (BuildType::Release, Linkage::Shared),
                (BuildType::Release, Linkage::Static),
                (BuildType::Debug, Linkage::Shared),
                (BuildType::Debug, Linkage::Static),
            ]
        );
        assert!(cells.iter().all(|c| c.version == "0.4.0" && !c.run_tests));
    }

    #[test]
    fn test_header_only_collapses_linkage() {
        let axes = AxisSelection::from_flags(false, false, true, true);
        let cells = MatrixExpander::expand("arba-grid", "0.3.0", &header_only(), &axes, true);

        assert_eq!(
            axes_of(&cells),
            vec![
                (BuildType::Release, Linkage::HeaderOnly),
                (BuildType::Debug, Linkage::HeaderOnly),
            ]
        );
        assert!(cells.iter().all(|c| c.run_tests));
    }

    #[test]
    fn test_restricted_axes_cell_count() {
        let axes = AxisSelection::from_flags(true, false, false, true);
        let cells = MatrixExpander::expand("arba-hash", "0.4.0", &compiled(), &axes, false);
        assert_eq!(axes_of(&cells), vec![(BuildType::Release, Linkage::Static)]);
    }

    #[test]
    fn test_select_latest_is_last_inserted() {
        let catalog = VersionCatalog::new(
            "arba-core",
            "/recipes/arba-core",
            vec![
                ("1.0.0".to_string(), VersionEntry::new("all")),
                ("1.2.0".to_string(), VersionEntry::new("all")),
                ("0.9.0".to_string(), VersionEntry::new("all")),
            ],
        );

        let latest = MatrixExpander::select_versions(&catalog, &VersionScope::Latest).unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].0, "0.9.0");

        let all = MatrixExpander::select_versions(&catalog, &VersionScope::All).unwrap();
        let versions: Vec<_> = all.iter().map(|(v, _)| *v).collect();
        assert_eq!(versions, vec!["1.0.0", "1.2.0", "0.9.0"]);
    }

    #[test]
    fn test_select_exact_version() {
        let catalog = VersionCatalog::new(
            "arba-core",
            "/recipes/arba-core",
            vec![
                ("0.1.0".to_string(), VersionEntry::new("all")),
                ("0.2.0".to_string(), VersionEntry::new("all")),
            ],
        );

        let pinned =
            MatrixExpander::select_versions(&catalog, &VersionScope::Exact("0.1.0".into()))
                .unwrap();
        assert_eq!(pinned[0].0, "0.1.0");

        let err = MatrixExpander::select_versions(&catalog, &VersionScope::Exact("3.0.0".into()))
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownVersion { .. }));
    }

    #[test]
    fn test_build_type_from_str() {
        assert_eq!("release".parse::<BuildType>(), Ok(BuildType::Release));
        assert_eq!("Debug".parse::<BuildType>(), Ok(BuildType::Debug));
        assert!("RelWithDebInfo".parse::<BuildType>().is_err());
    }

    #[test]
    fn test_cell_label() {
        let cells = MatrixExpander::expand(
            "arba-grid",
            "0.3.0",
            &header_only(),
            &AxisSelection::from_flags(true, false, false, false),
            false,
        );
        assert_eq!(cells[0].label(), "arba-grid/0.3.0 Release header-only");
    }
}
