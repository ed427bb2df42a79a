use crate::commands::IndexArgs;
use crate::output;

use clap::Args;
use color_eyre::Result;

use recipe_service::{PackageListSource, RecipeCatalog, VersionCatalog};

/// List packages with their catalog versions
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub index: IndexArgs,

    /// Packages to list (default: the package list)
    pub packages: Vec<String>,
}

pub fn execute(args: ListArgs) -> Result<()> {
    let catalog = args.index.catalog();

    let packages = if args.packages.is_empty() {
        let defaults = catalog
            .default_packages()
            .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
        if defaults.source == PackageListSource::DirectoryListing {
            output::warning(&format!(
                "{} not found, listing {}",
                catalog.layout().package_list.display(),
                catalog.layout().recipes_dir.display()
            ));
        }
        defaults.names
    } else {
        args.packages.clone()
    };

    let mut all_ok = true;
    for package in &packages {
        match catalog.load_versions(package) {
            Ok(versions) => println!("{}", describe(&catalog, &versions)),
            Err(e) => {
                all_ok = false;
                output::error(&e.to_string());
            }
        }
    }

    if !all_ok {
        std::process::exit(1);
    }

    Ok(())
}

/// `name  v1 v2 v3 (latest: v3, compiled)`
fn describe(catalog: &RecipeCatalog, versions: &VersionCatalog) -> String {
    let latest = versions.latest();
    let kind = latest
        .and_then(|(_, entry)| catalog.load_recipe(versions, entry).ok())
        .map(|recipe| recipe.kind.to_string())
        .unwrap_or_else(|| "recipe missing".to_string());

    format!(
        "{:<24} {} (latest: {}, {})",
        versions.package,
        versions.versions().join(" "),
        latest.map(|(v, _)| v).unwrap_or("-"),
        kind
    )
}
