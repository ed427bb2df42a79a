// Runners Module
// Executes matrix cells through the external build tool

pub mod command;
pub mod conan;
pub mod host;
pub mod process;

// Re-export key types
pub use command::{ToolCommand, DEFAULT_TOOL};
pub use conan::{ConanRunner, DEFAULT_TIMEOUT};
pub use host::{HostProfile, PlainHost, SystemHost, WRAPPER_ENV};
pub use process::{ProcessOutput, ProcessStatus};

use crate::error::RunError;
use crate::execution::matrix::MatrixCell;

use std::time::Duration;

use serde::Serialize;

/// Classified outcome of one cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum CellOutcome {
    /// Exit code zero within the time bound
    Succeeded,
    /// Non-zero exit (or death by signal)
    Failed { exit_code: Option<i32> },
    /// Killed after exceeding the time bound
    TimedOut { limit: Duration },
    /// The build tool could not be started
    LaunchFailed { reason: String },
}

impl CellOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CellOutcome::Succeeded)
    }
}

impl From<ProcessStatus> for CellOutcome {
    fn from(status: ProcessStatus) -> Self {
        match status {
            ProcessStatus::Exited(Some(0)) => CellOutcome::Succeeded,
            ProcessStatus::Exited(exit_code) => CellOutcome::Failed { exit_code },
            ProcessStatus::TimedOut(limit) => CellOutcome::TimedOut { limit },
            ProcessStatus::LaunchFailed(reason) => CellOutcome::LaunchFailed { reason },
        }
    }
}

/// Result of executing one matrix cell
#[derive(Debug, Clone)]
pub struct CellResult {
    pub cell: MatrixCell,
    pub command: ToolCommand,
    pub outcome: CellOutcome,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl CellResult {
    pub fn from_process(cell: MatrixCell, command: ToolCommand, output: ProcessOutput) -> Self {
        Self {
            cell,
            command,
            outcome: output.status.into(),
            stdout: output.stdout,
            stderr: output.stderr,
            duration: output.duration,
        }
    }

    pub fn success(&self) -> bool {
        self.outcome.is_success()
    }

    /// The run error this result stands for, if it failed
    pub fn error(&self) -> Option<RunError> {
        let cell = &self.cell;
        match &self.outcome {
            CellOutcome::Succeeded => None,
            CellOutcome::Failed { exit_code } => Some(RunError::CellFailed {
                package: cell.package.clone(),
                version: cell.version.clone(),
                build_type: cell.build_type,
                linkage: cell.linkage,
                exit_code: *exit_code,
            }),
            CellOutcome::TimedOut { limit } => Some(RunError::CellTimeout {
                package: cell.package.clone(),
                version: cell.version.clone(),
                build_type: cell.build_type,
                linkage: cell.linkage,
                limit: *limit,
            }),
            CellOutcome::LaunchFailed { reason } => Some(RunError::Launch {
                package: cell.package.clone(),
                version: cell.version.clone(),
                build_type: cell.build_type,
                linkage: cell.linkage,
                reason: reason.clone(),
            }),
        }
    }
}

/// Executes matrix cells one at a time
#[async_trait::async_trait]
pub trait CellRunner: Send + Sync {
    /// The command a cell will run; must be deterministic
    fn command(&self, cell: &MatrixCell) -> ToolCommand;

    /// Run a cell's command to completion and classify the outcome
    async fn execute(&self, cell: &MatrixCell, command: &ToolCommand) -> CellResult;
}
