// Recipe Catalog Reader
// Loads per-package version catalogs and the default package list

use crate::catalog::models::{PackageKind, Recipe, VersionCatalog, VersionEntry};
use crate::error::{CatalogError, CatalogResult};

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Per-package version catalog file name
pub const CATALOG_FILE: &str = "config.yml";

/// Recipe file expected in every version folder
pub const CONANFILE: &str = "conanfile.py";

/// Where the recipe index keeps its recipes and its package list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexLayout {
    /// Directory holding one subdirectory per package
    pub recipes_dir: PathBuf,
    /// Whitespace-separated list of package names tested by default
    pub package_list: PathBuf,
}

impl IndexLayout {
    /// Standard layout: `<root>/recipes` and `<root>/test/all.txt`
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            recipes_dir: root.join("recipes"),
            package_list: root.join("test").join("all.txt"),
        }
    }

    pub fn with_recipes_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.recipes_dir = dir.into();
        self
    }

    pub fn with_package_list(mut self, path: impl Into<PathBuf>) -> Self {
        self.package_list = path.into();
        self
    }
}

/// How the default package list was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageListSource {
    /// Read from the package index file
    Index,
    /// The index file is absent; package directories were listed instead
    DirectoryListing,
}

/// Package names to test when the caller names none
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultPackages {
    pub source: PackageListSource,
    pub names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    versions: serde_yaml::Mapping,
}

/// Reader over a recipe index on disk
#[derive(Debug, Clone)]
pub struct RecipeCatalog {
    layout: IndexLayout,
}

impl RecipeCatalog {
    pub fn new(layout: IndexLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &IndexLayout {
        &self.layout
    }

    pub fn package_dir(&self, package: &str) -> PathBuf {
        self.layout.recipes_dir.join(package)
    }

    /// Load and parse `<recipes>/<package>/config.yml`
    pub fn load_versions(&self, package: &str) -> CatalogResult<VersionCatalog> {
        let package_dir = self.package_dir(package);
        let path = package_dir.join(CATALOG_FILE);

        if !path.is_file() {
            return Err(CatalogError::NotFound {
                package: package.to_string(),
                path,
            });
        }

        let content = fs::read_to_string(&path).map_err(|source| CatalogError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(package, path = %path.display(), "loading version catalog");
        Self::parse_versions(package, &package_dir, &content, &path)
    }

    /// Parse catalog text, keeping the order of the `versions` mapping
    pub fn parse_versions(
        package: &str,
        package_dir: &Path,
        content: &str,
        path: &Path,
    ) -> CatalogResult<VersionCatalog> {
        let malformed = |source| CatalogError::Malformed {
            path: path.to_path_buf(),
            source,
        };

        let raw: RawCatalog = serde_yaml::from_str(content).map_err(malformed)?;
        if raw.versions.is_empty() {
            return Err(CatalogError::NoVersions {
                path: path.to_path_buf(),
            });
        }

        let mut entries = Vec::with_capacity(raw.versions.len());
        for (key, value) in raw.versions {
            let version = match key {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                _ => {
                    return Err(CatalogError::InvalidVersionKey {
                        path: path.to_path_buf(),
                    })
                }
            };
            let entry: VersionEntry = serde_yaml::from_value(value).map_err(malformed)?;
            entries.push((version, entry));
        }

        Ok(VersionCatalog::new(package, package_dir, entries))
    }

    /// Resolve a version's recipe folder and classify its package kind
    pub fn load_recipe(
        &self,
        catalog: &VersionCatalog,
        entry: &VersionEntry,
    ) -> CatalogResult<Recipe> {
        let dir = catalog.recipe_dir(entry);
        let conanfile = dir.join(CONANFILE);

        if !conanfile.is_file() {
            return Err(CatalogError::RecipeNotFound { path: conanfile });
        }

        let content = fs::read_to_string(&conanfile).map_err(|source| CatalogError::Io {
            path: conanfile.clone(),
            source,
        })?;

        Ok(Recipe::new(dir, PackageKind::detect(&content)))
    }

    /// Package names used when none are given explicitly.
    ///
    /// Reads the package index file. When that file does not exist, lists the
    /// package directories of the recipes root instead (sorted by name).
    pub fn default_packages(&self) -> CatalogResult<DefaultPackages> {
        let index = &self.layout.package_list;

        if index.is_file() {
            let content = fs::read_to_string(index).map_err(|source| CatalogError::Io {
                path: index.clone(),
                source,
            })?;
            return Ok(DefaultPackages {
                source: PackageListSource::Index,
                names: content.split_whitespace().map(str::to_string).collect(),
            });
        }

        tracing::warn!(
            index = %index.display(),
            "package index missing, listing recipes directory"
        );
        Ok(DefaultPackages {
            source: PackageListSource::DirectoryListing,
            names: self.list_package_dirs()?,
        })
    }

    fn list_package_dirs(&self) -> CatalogResult<Vec<String>> {
        let dir = &self.layout.recipes_dir;
        let entries = fs::read_dir(dir).map_err(|e| CatalogError::PackageList {
            message: format!("cannot list {}: {}", dir.display(), e),
        })?;

        package_names(dir, entries.map(|entry| entry.map(|e| e.path())))
    }
}

/// Names of the package directories among `paths`, sorted.
///
/// Any unreadable entry fails the listing.
fn package_names(
    dir: &Path,
    paths: impl IntoIterator<Item = std::io::Result<PathBuf>>,
) -> CatalogResult<Vec<String>> {
    let mut names = Vec::new();
    for path in paths {
        let path = path.map_err(|e| CatalogError::PackageList {
            message: format!("cannot read an entry of {}: {}", dir.display(), e),
        })?;
        if !path.join(CATALOG_FILE).is_file() {
            continue;
        }
        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => names.push(name.to_string()),
            None => tracing::warn!(path = %path.display(), "skipping non UTF-8 package directory"),
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn catalog_in(dir: &Path) -> RecipeCatalog {
        RecipeCatalog::new(IndexLayout::from_root(dir))
    }

    #[test]
    fn test_parse_keeps_insertion_order() {
        let content = r#"
versions:
  "1.0.0":
    folder: all
  "1.2.0":
    folder: all
  "0.9.0":
    folder: legacy
"#;
        let catalog = RecipeCatalog::parse_versions(
            "arba-core",
            Path::new("/r/arba-core"),
            content,
            Path::new("/r/arba-core/config.yml"),
        )
        .unwrap();

        assert_eq!(catalog.versions(), vec!["1.0.0", "1.2.0", "0.9.0"]);
        let (latest, entry) = catalog.latest().unwrap();
        assert_eq!(latest, "0.9.0");
        assert_eq!(entry.folder, PathBuf::from("legacy"));
    }

    #[test]
    fn test_parse_numeric_key_and_overrides() {
        let content = r#"
versions:
  2:
    folder: all
    cmake_min: "3.26"
"#;
        let catalog = RecipeCatalog::parse_versions(
            "arba-rsce",
            Path::new("/r/arba-rsce"),
            content,
            Path::new("/r/arba-rsce/config.yml"),
        )
        .unwrap();

        assert_eq!(catalog.versions(), vec!["2"]);
        let entry = catalog.get("2").unwrap();
        assert_eq!(
            entry.overrides.get("cmake_min"),
            Some(&serde_yaml::Value::String("3.26".to_string()))
        );
    }

    #[test]
    fn test_parse_missing_folder_is_malformed() {
        let content = "versions:\n  \"0.1.0\":\n    url: nowhere\n";
        let err = RecipeCatalog::parse_versions(
            "arba-core",
            Path::new("/r/arba-core"),
            content,
            Path::new("/r/arba-core/config.yml"),
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::Malformed { .. }));
    }

    #[test]
    fn test_parse_empty_versions() {
        let err = RecipeCatalog::parse_versions(
            "arba-core",
            Path::new("/r/arba-core"),
            "versions: {}\n",
            Path::new("/r/arba-core/config.yml"),
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::NoVersions { .. }));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let err = RecipeCatalog::parse_versions(
            "arba-core",
            Path::new("/r/arba-core"),
            "versions: [unclosed",
            Path::new("/r/arba-core/config.yml"),
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::Malformed { .. }));
    }

    #[test]
    fn test_load_versions_not_found() {
        let temp = tempfile::tempdir().unwrap();
        let catalog = catalog_in(temp.path());

        let err = catalog.load_versions("arba-missing").unwrap_err();
        match err {
            CatalogError::NotFound { package, path } => {
                assert_eq!(package, "arba-missing");
                assert!(path.ends_with("recipes/arba-missing/config.yml"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_recipe_detects_kind() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        write(
            &root.join("recipes/arba-grid/config.yml"),
            "versions:\n  \"0.1.0\":\n    folder: all\n",
        );
        write(
            &root.join("recipes/arba-grid/all/conanfile.py"),
            "class C(ConanFile):\n    package_type = \"header-library\"\n",
        );

        let catalog = catalog_in(root);
        let versions = catalog.load_versions("arba-grid").unwrap();
        let (_, entry) = versions.latest().unwrap();
        let recipe = catalog.load_recipe(&versions, entry).unwrap();

        assert_eq!(recipe.kind, PackageKind::HeaderOnly);
        assert_eq!(recipe.dir, root.join("recipes/arba-grid/all"));
    }

    #[test]
    fn test_load_recipe_missing_conanfile() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        write(
            &root.join("recipes/arba-hash/config.yml"),
            "versions:\n  \"0.1.0\":\n    folder: all\n",
        );

        let catalog = catalog_in(root);
        let versions = catalog.load_versions("arba-hash").unwrap();
        let (_, entry) = versions.latest().unwrap();
        let err = catalog.load_recipe(&versions, entry).unwrap_err();
        assert!(matches!(err, CatalogError::RecipeNotFound { .. }));
    }

    #[test]
    fn test_default_packages_from_index() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        write(&root.join("test/all.txt"), "arba-hash\narba-grid  arba-appt\n");

        let defaults = catalog_in(root).default_packages().unwrap();
        assert_eq!(defaults.source, PackageListSource::Index);
        assert_eq!(defaults.names, vec!["arba-hash", "arba-grid", "arba-appt"]);
    }

    #[test]
    fn test_default_packages_falls_back_to_listing() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        write(&root.join("recipes/arba-hash/config.yml"), "versions: {}\n");
        write(&root.join("recipes/arba-appt/config.yml"), "versions: {}\n");
        fs::create_dir_all(root.join("recipes/not-a-package")).unwrap();
        write(&root.join("recipes/README.md"), "docs\n");

        let defaults = catalog_in(root).default_packages().unwrap();
        assert_eq!(defaults.source, PackageListSource::DirectoryListing);
        assert_eq!(defaults.names, vec!["arba-appt", "arba-hash"]);
    }

    #[test]
    fn test_default_packages_without_recipes_dir() {
        let temp = tempfile::tempdir().unwrap();
        let err = catalog_in(temp.path()).default_packages().unwrap_err();
        assert!(matches!(err, CatalogError::PackageList { .. }));
    }

    #[test]
    fn test_unreadable_entry_fails_listing() {
        let temp = tempfile::tempdir().unwrap();
        write(&temp.path().join("arba-core/config.yml"), "versions: {}\n");

        let entries = vec![
            Ok(temp.path().join("arba-core")),
            Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "permission denied",
            )),
        ];
        let result = package_names(temp.path(), entries);

        match result {
            Err(CatalogError::PackageList { message }) => {
                assert!(message.contains("permission denied"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_package_names_skip_dirs_without_catalog() {
        let temp = tempfile::tempdir().unwrap();
        write(&temp.path().join("arba-grid/config.yml"), "versions: {}\n");
        write(&temp.path().join("arba-core/config.yml"), "versions: {}\n");
        fs::create_dir_all(temp.path().join("docs")).unwrap();

        let entries = ["arba-grid", "docs", "arba-core"]
            .iter()
            .map(|name| Ok(temp.path().join(name)));

        assert_eq!(
            package_names(temp.path(), entries).unwrap(),
            vec!["arba-core", "arba-grid"]
        );
    }
}
