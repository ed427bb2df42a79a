mod commands;
mod output;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use commands::list::ListArgs;
use commands::plan::PlanArgs;
use commands::test::TestArgs;

/// Build the recipes of a package index across their build matrix
#[derive(Parser, Debug)]
#[command(name = "recipe-test", version, about, long_about = None)]
struct Cli {
    /// Print debug diagnostics to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create packages from recipes with every selected setting
    Test(TestArgs),
    /// Print the build-tool commands a test run would execute
    Plan(PlanArgs),
    /// List packages and their catalog versions
    List(ListArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Test(args) => commands::test::execute(args).await,
        Commands::Plan(args) => commands::plan::execute(args),
        Commands::List(args) => commands::list::execute(args),
    }
}
