// Catalog Module
// Reads package version catalogs and recipe metadata from a recipe index

pub mod models;
pub mod parser;

// Re-export key types
pub use models::{PackageKind, Recipe, VersionCatalog, VersionEntry, HEADER_LIBRARY_MARKER};
pub use parser::{
    DefaultPackages, IndexLayout, PackageListSource, RecipeCatalog, CATALOG_FILE, CONANFILE,
};
