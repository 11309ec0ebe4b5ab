//! @acp:module "Generate Command"
//! @acp:summary "Run the full patch-and-assemble pipeline"
//! @acp:domain cli
//! @acp:layer handler

use anyhow::{Context, Result};
use console::style;

use crate::config::Config;
use crate::error::SkillgenError;
use crate::pipeline::{Pipeline, RunReport};

/// Options for the generate command
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Regenerate the source tree before assembling
    pub init: bool,
}

/// Execute the generate command
pub fn execute_generate(options: GenerateOptions, config: Config) -> Result<()> {
    if options.init {
        let command = config
            .init_command()
            .context("--init given but no init command is configured")?;
        println!("{} Running {}", style("→").cyan(), command);
        let stdout = command.run(&config.root)?;
        if !stdout.trim().is_empty() {
            println!("{}", stdout.trim_end());
        }
    }

    let manifest = config.manifest()?;
    let pipeline = Pipeline::new(manifest, config.layout(), config.output_root())
        .context("Failed to compile rule tables")?;

    println!(
        "{} Assembling {} skills into {}",
        style("→").cyan(),
        pipeline.manifest().packages.len(),
        pipeline.output_root().display()
    );

    match pipeline.run() {
        Ok(report) => {
            print_summary(&report);
            Ok(())
        }
        Err(SkillgenError::ForbiddenResidue(report)) => {
            eprintln!("{} {}", style("✗").red(), report);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

fn print_summary(report: &RunReport) {
    println!(
        "{} Verified output: {}",
        style("✓").green(),
        report.verification
    );
    println!(
        "{} Generated {} skills in {}/:",
        style("✓").green(),
        report.packages.len(),
        report.output_root.display()
    );

    for package in &report.packages {
        let mut parts = Vec::new();
        if package.references > 0 {
            parts.push(format!("{} refs", package.references));
        }
        if package.scripts > 0 {
            parts.push(format!("{} scripts", package.scripts));
        }
        let extra = if parts.is_empty() {
            String::new()
        } else {
            format!(" ({})", parts.join(", "))
        };
        println!("  {}/{}", package.name, extra);
    }
}
