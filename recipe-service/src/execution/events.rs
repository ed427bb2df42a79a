// Run Events
// Progress reporting for matrix runs

use crate::catalog::{PackageKind, PackageListSource};
use crate::execution::matrix::{BuildType, MatrixCell, VersionScope};
use crate::runners::{CellResult, ToolCommand};

use std::time::Duration;
use tokio::sync::mpsc;

/// Sender for run progress events
pub type ProgressSender = mpsc::UnboundedSender<RunEvent>;

/// Receiver for run progress events
pub type ProgressReceiver = mpsc::UnboundedReceiver<RunEvent>;

/// Create a new progress channel
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    mpsc::unbounded_channel()
}

/// Events emitted during a matrix run, in execution order
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// Package list resolved, nothing executed yet
    RunStarted {
        packages: Vec<String>,
        scope: VersionScope,
        /// Set when the list came from the default package sources
        source: Option<PackageListSource>,
    },

    /// Something the operator should know about that does not fail the run
    Warning { message: String },

    /// Package evaluation started
    PackageStarted { package: String },

    /// One version of a package is about to be expanded and run
    VersionStarted {
        package: String,
        version: String,
        kind: PackageKind,
        total_cells: usize,
    },

    /// First cell of a build type within a version
    BuildTypeStarted {
        package: String,
        version: String,
        build_type: BuildType,
    },

    /// A cell's command is about to run
    CellStarted {
        cell: MatrixCell,
        command: ToolCommand,
    },

    /// A cell finished (successfully or not)
    CellCompleted { result: CellResult },

    /// The package could not be evaluated (catalog or recipe problem)
    PackageFailed { package: String, message: String },

    /// The run could not start
    Error { message: String },

    /// The run is over
    RunCompleted {
        success: bool,
        duration: Duration,
        executed: usize,
        failed: usize,
    },
}
