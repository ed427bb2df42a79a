pub mod list;
pub mod plan;

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use recipe_service::runners::{DEFAULT_TIMEOUT, DEFAULT_TOOL};
use recipe_service::{
    AxisSelection, ConanRunner, IndexLayout, RecipeCatalog, RunConfig, VersionScope,
};

/// Where the recipe index lives
#[derive(Args, Debug, Clone)]
pub struct IndexArgs {
    /// Root of the recipe index (holds recipes/ and test/all.txt)
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Recipes directory (default: <root>/recipes)
    #[arg(long, value_name = "DIR")]
    pub recipes_dir: Option<PathBuf>,

    /// Default package list (default: <root>/test/all.txt)
    #[arg(long, value_name = "FILE")]
    pub package_list: Option<PathBuf>,
}

impl IndexArgs {
    pub fn catalog(&self) -> RecipeCatalog {
        let mut layout = IndexLayout::from_root(&self.root);
        if let Some(dir) = &self.recipes_dir {
            layout = layout.with_recipes_dir(dir);
        }
        if let Some(file) = &self.package_list {
            layout = layout.with_package_list(file);
        }
        RecipeCatalog::new(layout)
    }
}

/// Which cells of each package's matrix to cover
#[derive(Args, Debug, Clone)]
pub struct MatrixArgs {
    /// Packages to test (default: the package list)
    pub packages: Vec<String>,

    /// All versions of a package
    #[arg(long, short = 'V', conflicts_with = "pinned_version")]
    pub all_versions: bool,

    /// Only this version of each package
    #[arg(long = "version", value_name = "VERSION")]
    pub pinned_version: Option<String>,

    /// Build and run unit tests
    #[arg(long, short = 't')]
    pub test: bool,

    /// Test shared libraries
    #[arg(long, short = 's')]
    pub shared: bool,

    /// Test static libraries
    #[arg(long = "static", short = 'a')]
    pub static_lib: bool,

    /// Test debug
    #[arg(long, short = 'd')]
    pub debug: bool,

    /// Test release
    #[arg(long, short = 'r')]
    pub release: bool,

    /// Build tool executable
    #[arg(long, value_name = "PROGRAM", env = "RECIPE_TEST_TOOL", default_value = DEFAULT_TOOL)]
    pub tool: String,

    /// Per-cell timeout in seconds
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = DEFAULT_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,
}

impl MatrixArgs {
    pub fn scope(&self) -> VersionScope {
        match (&self.pinned_version, self.all_versions) {
            (Some(version), _) => VersionScope::Exact(version.clone()),
            (None, true) => VersionScope::All,
            (None, false) => VersionScope::Latest,
        }
    }

    pub fn config(&self) -> RunConfig {
        RunConfig::default()
            .with_scope(self.scope())
            .with_axes(AxisSelection::from_flags(
                self.release,
                self.debug,
                self.shared,
                self.static_lib,
            ))
            .with_run_tests(self.test)
    }

    pub fn cell_runner(&self) -> ConanRunner {
        ConanRunner::new()
            .with_program(self.tool.clone())
            .with_timeout(Duration::from_secs(self.timeout))
    }
}
