// Error types
// Catalog loading failures and per-cell run failures

use crate::execution::matrix::{BuildType, Linkage};

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while reading a package's version catalog or recipe
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The package has no `config.yml` under the recipes root
    #[error("catalog not found for package '{package}': {}", path.display())]
    NotFound { package: String, path: PathBuf },

    /// The catalog or recipe exists but could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog is not valid YAML or does not match the expected shape
    #[error("malformed catalog {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The `versions` mapping is empty
    #[error("catalog {} declares no versions", path.display())]
    NoVersions { path: PathBuf },

    /// A `versions` key is neither a string nor a number
    #[error("catalog {} has a version key that is not a scalar", path.display())]
    InvalidVersionKey { path: PathBuf },

    /// A pinned version is absent from the catalog
    #[error("version '{version}' is not listed in the catalog of '{package}'")]
    UnknownVersion { package: String, version: String },

    /// The version's recipe folder has no conanfile
    #[error("recipe not found: {}", path.display())]
    RecipeNotFound { path: PathBuf },

    /// Neither the package index nor the recipes directory could be listed
    #[error("cannot determine the default package list: {message}")]
    PackageList { message: String },
}

/// Errors that end a run (or, in keep-going mode, mark it failed)
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The build tool exceeded the wall-clock bound and was killed
    #[error("{package}/{version} {build_type} {linkage} timed out after {:.0}s", limit.as_secs_f64())]
    CellTimeout {
        package: String,
        version: String,
        build_type: BuildType,
        linkage: Linkage,
        limit: Duration,
    },

    /// The build tool ran to completion with a non-zero status
    #[error("{package}/{version} {build_type} {linkage} failed with {}", describe_exit(*exit_code))]
    CellFailed {
        package: String,
        version: String,
        build_type: BuildType,
        linkage: Linkage,
        exit_code: Option<i32>,
    },

    /// The build tool could not be started at all
    #[error("{package}/{version} {build_type} {linkage}: could not launch build tool: {reason}")]
    Launch {
        package: String,
        version: String,
        build_type: BuildType,
        linkage: Linkage,
        reason: String,
    },
}

impl RunError {
    /// Short category name used in reports
    pub fn kind(&self) -> &'static str {
        match self {
            RunError::Catalog(_) => "catalog",
            RunError::CellTimeout { .. } => "timeout",
            RunError::CellFailed { .. } => "failure",
            RunError::Launch { .. } => "launch",
        }
    }
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "termination by signal".to_string(),
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
