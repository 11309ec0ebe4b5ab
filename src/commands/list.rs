//! @acp:module "List Command"
//! @acp:summary "Show the package table of the active manifest"
//! @acp:domain cli
//! @acp:layer handler

use anyhow::Result;
use console::style;

use crate::config::Config;

/// Options for the list command
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Print the whole manifest as YAML instead
    pub dump: bool,
}

/// Execute the list command
pub fn execute_list(options: ListOptions, config: Config) -> Result<()> {
    let manifest = config.manifest()?;

    if options.dump {
        print!("{}", manifest.to_yaml()?);
        return Ok(());
    }

    let package_rules = manifest.effective_package_rules();

    println!("{} {} packages:\n", style("→").cyan(), manifest.packages.len());
    for name in manifest.packages.keys() {
        println!("  {}", style(name).bold());

        let templates = manifest.templates_for(name);
        if !templates.is_empty() {
            println!("    references: {}", templates.join(", "));
        }
        let scripts = manifest.scripts_for(name);
        if !scripts.is_empty() {
            println!("    scripts:    {}", scripts.join(", "));
        }

        let rules: usize = package_rules
            .get(name)
            .map(|paths| paths.values().map(Vec::len).sum())
            .unwrap_or(0);
        if rules > 0 {
            println!("    {}", style(format!("{} package rules", rules)).dim());
        }
    }

    println!(
        "\n  {} common rules, {} forbidden patterns",
        manifest.common_rules.len(),
        manifest.forbidden.len()
    );

    Ok(())
}
