// Matrix Run Executor
// Sequences catalog loading, matrix expansion, and cell execution across packages

use crate::catalog::{PackageListSource, RecipeCatalog};
use crate::error::{CatalogError, RunError};
use crate::execution::events::{ProgressSender, RunEvent};
use crate::execution::matrix::{AxisSelection, MatrixCell, MatrixExpander, VersionScope};
use crate::runners::{CellResult, CellRunner, ToolCommand};

use std::ops::ControlFlow;
use std::time::{Duration, Instant};

// =============================================================================
// Configuration
// =============================================================================

/// Settings resolved once before a run starts
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Which versions of each package to build
    pub scope: VersionScope,
    /// Build types and linkages to expand
    pub axes: AxisSelection,
    /// Build and run each package's unit tests
    pub run_tests: bool,
    /// Stop the whole run at the first failure
    pub fail_fast: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            scope: VersionScope::Latest,
            axes: AxisSelection::default(),
            run_tests: false,
            fail_fast: true,
        }
    }
}

impl RunConfig {
    pub fn with_scope(mut self, scope: VersionScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_axes(mut self, axes: AxisSelection) -> Self {
        self.axes = axes;
        self
    }

    pub fn with_run_tests(mut self, run_tests: bool) -> Self {
        self.run_tests = run_tests;
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

// =============================================================================
// Report
// =============================================================================

/// Aggregate outcome of a whole run
#[derive(Debug)]
pub struct RunReport {
    /// Packages the run was asked to cover, in order
    pub packages: Vec<String>,
    /// Every executed cell, in execution order
    pub results: Vec<CellResult>,
    /// Every failure, in the order it happened
    pub failures: Vec<RunError>,
    /// Wall-clock time of the whole run
    pub duration: Duration,
}

impl RunReport {
    fn new() -> Self {
        Self {
            packages: Vec::new(),
            results: Vec::new(),
            failures: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Process exit status: 0 on full success, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.success() {
            0
        } else {
            1
        }
    }

    pub fn executed(&self) -> usize {
        self.results.len()
    }

    pub fn failed_cells(&self) -> usize {
        self.results.iter().filter(|r| !r.success()).count()
    }

    /// Sum of the executed cells' own durations
    pub fn cells_duration(&self) -> Duration {
        self.results.iter().map(|r| r.duration).sum()
    }
}

// =============================================================================
// Executor
// =============================================================================

/// Runs the build matrix of every requested package, one cell at a time
pub struct MatrixRunner<R: CellRunner> {
    catalog: RecipeCatalog,
    runner: R,
    config: RunConfig,
    progress: Option<ProgressSender>,
}

impl<R: CellRunner> MatrixRunner<R> {
    pub fn new(catalog: RecipeCatalog, runner: R) -> Self {
        Self {
            catalog,
            runner,
            config: RunConfig::default(),
            progress: None,
        }
    }

    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a progress sender for run events
    pub fn with_progress(mut self, sender: ProgressSender) -> Self {
        self.progress = Some(sender);
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn cell_runner(&self) -> &R {
        &self.runner
    }

    fn emit(&self, event: RunEvent) {
        if let Some(tx) = &self.progress {
            let _ = tx.send(event);
        }
    }

    /// Requested names, or the catalog's default list when none are given
    pub fn resolve_packages(
        &self,
        requested: &[String],
    ) -> Result<(Vec<String>, Option<PackageListSource>), CatalogError> {
        if !requested.is_empty() {
            return Ok((requested.to_vec(), None));
        }

        let defaults = self.catalog.default_packages()?;
        if defaults.source == PackageListSource::DirectoryListing {
            self.emit(RunEvent::Warning {
                message: format!(
                    "package index {} not found, testing every package under {}",
                    self.catalog.layout().package_list.display(),
                    self.catalog.layout().recipes_dir.display()
                ),
            });
        }
        Ok((defaults.names, Some(defaults.source)))
    }

    /// Expand every requested package without running anything
    pub fn plan(
        &self,
        requested: &[String],
    ) -> Result<Vec<(MatrixCell, ToolCommand)>, CatalogError> {
        let (packages, _) = self.resolve_packages(requested)?;
        let mut planned = Vec::new();

        for package in &packages {
            let versions = self.catalog.load_versions(package)?;
            for (version, entry) in MatrixExpander::select_versions(&versions, &self.config.scope)? {
                let recipe = self.catalog.load_recipe(&versions, entry)?;
                for cell in MatrixExpander::expand(
                    package,
                    version,
                    &recipe,
                    &self.config.axes,
                    self.config.run_tests,
                ) {
                    let command = self.runner.command(&cell);
                    planned.push((cell, command));
                }
            }
        }

        Ok(planned)
    }

    /// Run the matrix of every requested package, in order.
    ///
    /// With fail-fast on, the first failure of any kind ends the run: no
    /// further cell, version, or package is attempted.
    pub async fn run(&self, requested: &[String]) -> RunReport {
        let start = Instant::now();
        let mut report = RunReport::new();

        match self.resolve_packages(requested) {
            Ok((packages, source)) => {
                tracing::info!(count = packages.len(), scope = %self.config.scope, "starting run");
                self.emit(RunEvent::RunStarted {
                    packages: packages.clone(),
                    scope: self.config.scope.clone(),
                    source,
                });
                report.packages = packages.clone();

                for package in &packages {
                    if self.run_package(package, &mut report).await.is_break() {
                        break;
                    }
                }
            }
            Err(e) => {
                self.emit(RunEvent::Error {
                    message: e.to_string(),
                });
                report.failures.push(e.into());
            }
        }

        report.duration = start.elapsed();
        self.emit(RunEvent::RunCompleted {
            success: report.success(),
            duration: report.duration,
            executed: report.executed(),
            failed: report.failed_cells(),
        });
        report
    }

    async fn run_package(&self, package: &str, report: &mut RunReport) -> ControlFlow<()> {
        self.emit(RunEvent::PackageStarted {
            package: package.to_string(),
        });

        let versions = match self.catalog.load_versions(package) {
            Ok(versions) => versions,
            Err(e) => return self.package_failed(package, e, report),
        };

        let selected = match MatrixExpander::select_versions(&versions, &self.config.scope) {
            Ok(selected) => selected,
            Err(e) => return self.package_failed(package, e, report),
        };

        for (version, entry) in selected {
            let recipe = match self.catalog.load_recipe(&versions, entry) {
                Ok(recipe) => recipe,
                Err(e) => {
                    if self.package_failed(package, e, report).is_break() {
                        return ControlFlow::Break(());
                    }
                    continue;
                }
            };

            let cells = MatrixExpander::expand(
                package,
                version,
                &recipe,
                &self.config.axes,
                self.config.run_tests,
            );
            self.emit(RunEvent::VersionStarted {
                package: package.to_string(),
                version: version.to_string(),
                kind: recipe.kind,
                total_cells: cells.len(),
            });

            let mut current_build_type = None;
            for cell in cells {
                if current_build_type != Some(cell.build_type) {
                    current_build_type = Some(cell.build_type);
                    self.emit(RunEvent::BuildTypeStarted {
                        package: package.to_string(),
                        version: version.to_string(),
                        build_type: cell.build_type,
                    });
                }

                if self.run_cell(cell, report).await.is_break() {
                    return ControlFlow::Break(());
                }
            }
        }

        ControlFlow::Continue(())
    }

    async fn run_cell(&self, cell: MatrixCell, report: &mut RunReport) -> ControlFlow<()> {
        let command = self.runner.command(&cell);
        self.emit(RunEvent::CellStarted {
            cell: cell.clone(),
            command: command.clone(),
        });

        let result = self.runner.execute(&cell, &command).await;
        let error = result.error();
        self.emit(RunEvent::CellCompleted {
            result: result.clone(),
        });
        report.results.push(result);

        match error {
            None => ControlFlow::Continue(()),
            Some(e) => {
                tracing::debug!(error = %e, "cell failed");
                report.failures.push(e);
                self.stop_if_fail_fast()
            }
        }
    }

    fn package_failed(
        &self,
        package: &str,
        error: CatalogError,
        report: &mut RunReport,
    ) -> ControlFlow<()> {
        self.emit(RunEvent::PackageFailed {
            package: package.to_string(),
            message: error.to_string(),
        });
        report.failures.push(error.into());
        self.stop_if_fail_fast()
    }

    fn stop_if_fail_fast(&self) -> ControlFlow<()> {
        if self.config.fail_fast {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}
