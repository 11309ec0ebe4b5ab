//! @acp:module "Verify Command"
//! @acp:summary "Scan an existing output tree for forbidden residue"
//! @acp:domain cli
//! @acp:layer handler

use anyhow::Result;
use console::style;

use crate::config::Config;
use crate::pipeline::Pipeline;

/// Execute the verify command
pub fn execute_verify(config: Config) -> Result<()> {
    let pipeline = Pipeline::new(config.manifest()?, config.layout(), config.output_root())?;

    if !pipeline.output_root().exists() {
        eprintln!(
            "{} Output root not found: {}",
            style("✗").red(),
            pipeline.output_root().display()
        );
        eprintln!("  Run 'skillgen generate' first");
        std::process::exit(1);
    }

    let report = pipeline.verify()?;
    if report.is_clean() {
        println!("{} {}", style("✓").green(), report);
        Ok(())
    } else {
        eprintln!("{} {}", style("✗").red(), report);
        std::process::exit(1);
    }
}
