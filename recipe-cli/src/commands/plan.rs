use crate::commands::{IndexArgs, MatrixArgs};
use crate::output;

use clap::Args;
use color_eyre::Result;

use recipe_service::MatrixRunner;

/// Print the build-tool commands a test run would execute, in order
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub index: IndexArgs,

    #[command(flatten)]
    pub matrix: MatrixArgs,
}

pub fn execute(args: PlanArgs) -> Result<()> {
    let runner = MatrixRunner::new(args.index.catalog(), args.matrix.cell_runner())
        .with_config(args.matrix.config());

    let planned = runner
        .plan(&args.matrix.packages)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to expand matrix: {}", e))?;

    if planned.is_empty() {
        output::warning("No cells to run.");
        return Ok(());
    }

    let mut current = String::new();
    for (cell, command) in &planned {
        let reference = cell.reference();
        if reference != current {
            println!("# {}", reference);
            current = reference;
        }
        println!("{}", command);
    }

    output::status("Planned", &format!("{} cell(s)", planned.len()));
    Ok(())
}
