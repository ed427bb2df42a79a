// Conan Runner
// Runs `conan create` for one matrix cell under the wall-clock bound

use crate::execution::matrix::MatrixCell;
use crate::runners::command::{ToolCommand, DEFAULT_TOOL};
use crate::runners::host::{HostProfile, SystemHost};
use crate::runners::process::{self, ProcessStatus};
use crate::runners::{CellResult, CellRunner};

use std::sync::Arc;
use std::time::Duration;

/// Wall-clock bound for a single cell
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Production cell runner backed by the external build tool
pub struct ConanRunner {
    program: String,
    timeout: Duration,
    host: Arc<dyn HostProfile>,
}

impl ConanRunner {
    /// Runner for `conan` on the current host
    pub fn new() -> Self {
        Self {
            program: DEFAULT_TOOL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            host: Arc::new(SystemHost::detect()),
        }
    }

    /// Use a different build tool executable
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_host(mut self, host: Arc<dyn HostProfile>) -> Self {
        self.host = host;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ConanRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CellRunner for ConanRunner {
    fn command(&self, cell: &MatrixCell) -> ToolCommand {
        ToolCommand::for_cell(&self.program, cell).wrapped(self.host.wrapper())
    }

    async fn execute(&self, cell: &MatrixCell, command: &ToolCommand) -> CellResult {
        tracing::debug!(cell = %cell.label(), %command, "running cell");
        let mut output = process::run_with_timeout(command, self.timeout).await;

        if let ProcessStatus::LaunchFailed(reason) = &mut output.status {
            if self.host.locate(&command.program).is_none() {
                reason.push_str(&format!(" ('{}' was not found on PATH)", command.program));
            }
        }

        CellResult::from_process(cell.clone(), command.clone(), output)
    }
}
