//! @acp:module "Pipeline"
//! @acp:summary "Validate, clean, assemble every package, verify"
//! @acp:domain cli
//! @acp:layer service
//!
//! A run moves through `Validating → Clean → Assembling → Verifying` and
//! ends in `Success` or `Failed`. Any error ends the run; there is no
//! partial success. Verification runs once, over the complete tree.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::assemble::{AssembledPackage, PackageAssembler};
use crate::error::{Result, SkillgenError};
use crate::manifest::Manifest;
use crate::rules::RuleStore;
use crate::source::SourceLayout;
use crate::verify::{verify_output, ForbiddenPattern, VerifyReport};

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Clean,
    Assembling,
    Verifying,
    Success,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validating => "validating",
            Stage::Clean => "clean",
            Stage::Assembling => "assembling",
            Stage::Verifying => "verifying",
            Stage::Success => "success",
            Stage::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Summary of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub output_root: PathBuf,
    pub packages: Vec<AssembledPackage>,
    pub verification: VerifyReport,
}

/// Compiled pipeline over one manifest and source layout
#[derive(Debug)]
pub struct Pipeline {
    manifest: Manifest,
    layout: SourceLayout,
    output_root: PathBuf,
    rules: RuleStore,
    forbidden: Vec<ForbiddenPattern>,
}

impl Pipeline {
    /// Compile rule tables and forbidden patterns
    pub fn new(manifest: Manifest, layout: SourceLayout, output_root: PathBuf) -> Result<Self> {
        let rules = RuleStore::from_manifest(&manifest)?;
        let forbidden = ForbiddenPattern::compile_all(&manifest.forbidden)?;
        Ok(Self {
            manifest,
            layout,
            output_root,
            rules,
            forbidden,
        })
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Run every stage
    pub fn run(&self) -> Result<RunReport> {
        let result = self.run_stages();
        match &result {
            Ok(report) => tracing::info!(
                "Pipeline {}: {} packages in {}",
                Stage::Success,
                report.packages.len(),
                self.output_root.display()
            ),
            Err(e) => tracing::debug!("Pipeline {}: {}", Stage::Failed, e),
        }
        result
    }

    fn run_stages(&self) -> Result<RunReport> {
        enter(Stage::Validating);
        self.manifest.validate(&self.layout)?;

        enter(Stage::Clean);
        self.clean()?;

        enter(Stage::Assembling);
        let assembler =
            PackageAssembler::new(&self.manifest, &self.layout, &self.rules, &self.output_root);
        let packages = self
            .manifest
            .packages
            .keys()
            .map(|package| assembler.assemble(package))
            .collect::<Result<Vec<_>>>()?;

        enter(Stage::Verifying);
        let verification = self.verify()?;
        if !verification.is_clean() {
            return Err(SkillgenError::ForbiddenResidue(verification));
        }

        Ok(RunReport {
            output_root: self.output_root.clone(),
            packages,
            verification,
        })
    }

    /// Scan the output root without assembling
    pub fn verify(&self) -> Result<VerifyReport> {
        verify_output(&self.output_root, &self.forbidden)
    }

    /// Remove and recreate the output root
    fn clean(&self) -> Result<()> {
        let out = &self.output_root;
        if out.exists() {
            let canonical = out.canonicalize().map_err(|e| SkillgenError::io(out, e))?;
            let root = self
                .layout
                .root
                .canonicalize()
                .map_err(|e| SkillgenError::io(&self.layout.root, e))?;
            if root.starts_with(&canonical) {
                return Err(SkillgenError::UnsafeOutputRoot(out.clone()));
            }
            for source in self.source_dirs() {
                let source = source
                    .canonicalize()
                    .map_err(|e| SkillgenError::io(source, e))?;
                if source.starts_with(&canonical) {
                    return Err(SkillgenError::UnsafeOutputRoot(out.clone()));
                }
            }
            fs::remove_dir_all(out).map_err(|e| SkillgenError::io(out, e))?;
        }
        fs::create_dir_all(out).map_err(|e| SkillgenError::io(out, e))?;
        Ok(())
    }

    /// Source directories that exist on disk
    fn source_dirs(&self) -> impl Iterator<Item = &PathBuf> {
        [
            &self.layout.skills_dir,
            &self.layout.templates_dir,
            &self.layout.scripts_dir,
        ]
        .into_iter()
        .filter(|dir| dir.exists())
    }
}

fn enter(stage: Stage) {
    tracing::info!("Pipeline stage: {}", stage);
}
