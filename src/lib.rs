#![forbid(unsafe_code)]

//! @acp:module "skillgen Library"
//! @acp:summary "Convert spec-kit command definitions into portable agent skill packages"
//! @acp:domain cli
//! @acp:layer api
//! @acp:stability experimental
//!
//! # skillgen
//!
//! Copies spec-kit generated skills, templates and scripts into standalone
//! packages, rewriting every reference to the `.specify/` layout on the way.
//!
//! ## Pipeline
//!
//! - **Validate**: every mapped template, script and rule target exists
//! - **Clean**: the output root is wiped and recreated
//! - **Assemble**: each package is copied, its frontmatter stripped and every
//!   file patched with package rules followed by common rules
//! - **Verify**: the whole tree is scanned for forbidden residue
//!
//! ## Example
//!
//! ```rust,no_run
//! use skillgen::{Manifest, Pipeline, SourceLayout};
//!
//! fn main() -> anyhow::Result<()> {
//!     let pipeline = Pipeline::new(
//!         Manifest::builtin(),
//!         SourceLayout::speckit("."),
//!         "skills".into(),
//!     )?;
//!
//!     let report = pipeline.run()?;
//!     println!("{} packages", report.packages.len());
//!
//!     Ok(())
//! }
//! ```

pub mod assemble;
pub mod commands;
pub mod config;
pub mod error;
pub mod frontmatter;
pub mod manifest;
pub mod pipeline;
pub mod rules;
pub mod source;
pub mod verify;

// Re-exports
pub use assemble::{AssembledPackage, PackageAssembler};
pub use config::Config;
pub use error::{Result, SkillgenError, SourceKind};
pub use manifest::{Manifest, PackageSpec};
pub use pipeline::{Pipeline, RunReport, Stage};
pub use rules::{apply_rules, PatchRule, RuleSpec, RuleStore};
pub use source::{InitCommand, SourceLayout};
pub use verify::{verify_output, ForbiddenPattern, VerifyReport, Violation};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
