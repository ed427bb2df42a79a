// Recipe Service Library
// Build-matrix test orchestration for a native-library recipe index

pub mod catalog;
pub mod error;
pub mod execution;
pub mod reporting;
pub mod runners;

// Re-export commonly used types
pub use error::{CatalogError, CatalogResult, RunError};

// Re-export catalog types
pub use catalog::{
    DefaultPackages, IndexLayout, PackageKind, PackageListSource, Recipe, RecipeCatalog,
    VersionCatalog, VersionEntry,
};

// Re-export execution types
pub use execution::{
    progress_channel, AxisSelection, BuildType, Linkage, MatrixCell, MatrixExpander,
    MatrixRunner, ProgressReceiver, ProgressSender, RunConfig, RunEvent, RunReport, VersionScope,
};

// Re-export runner types
pub use runners::{
    CellOutcome, CellResult, CellRunner, ConanRunner, HostProfile, PlainHost, SystemHost,
    ToolCommand,
};

// Re-export reporting types
pub use reporting::{ReportFormat, RunReporter};
