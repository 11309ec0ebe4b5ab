#![forbid(unsafe_code)]
//! skillgen Command Line Interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use skillgen::commands::{execute_generate, execute_list, execute_verify, GenerateOptions, ListOptions};
use skillgen::config::{Config, CONFIG_FILE};

#[derive(Parser)]
#[command(name = "skillgen")]
#[command(about = "Generate portable agent skills from spec-kit output")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Project root (overrides config)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Output root for generated skills (overrides config)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Rule manifest, JSON or YAML (overrides config)
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy, patch and verify every skill package (default)
    Generate {
        /// Run the configured init command (specify init) first
        #[arg(long)]
        init: bool,
    },

    /// Check an existing output tree for forbidden patterns
    Verify,

    /// Show packages, their references and scripts
    List {
        /// Print the active manifest as YAML
        #[arg(long)]
        dump: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load config
    let mut config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };

    if let Some(root) = cli.root {
        config.root = root;
    }
    if let Some(output) = cli.output {
        config.output = output;
    }
    if let Some(manifest) = cli.manifest {
        if !manifest.exists() {
            eprintln!("{} Manifest not found: {}", style("✗").red(), manifest.display());
            std::process::exit(1);
        }
        // Given relative to the working directory, not to the project root
        config.manifest = Some(std::env::current_dir()?.join(manifest));
    }

    match cli.command.unwrap_or(Commands::Generate { init: false }) {
        Commands::Generate { init } => {
            execute_generate(GenerateOptions { init }, config)?;
        }

        Commands::Verify => {
            execute_verify(config)?;
        }

        Commands::List { dump } => {
            execute_list(ListOptions { dump }, config)?;
        }
    }

    Ok(())
}
