//! @acp:module "Source Layout"
//! @acp:summary "Locations of generated skills, templates and scripts, plus the init step"
//! @acp:domain cli
//! @acp:layer io

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Result, SkillgenError};

/// Where the pipeline reads its inputs from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    /// Project root
    pub root: PathBuf,
    /// Directory holding one subdirectory per generated skill
    pub skills_dir: PathBuf,
    /// Shared templates
    pub templates_dir: PathBuf,
    /// Shared scripts
    pub scripts_dir: PathBuf,
    /// Primary document file name inside each skill directory
    pub document: String,
}

impl SourceLayout {
    /// Default spec-kit layout under `root`
    pub fn speckit<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            skills_dir: root.join(".agents").join("skills"),
            templates_dir: root.join(".specify").join("templates"),
            scripts_dir: root.join(".specify").join("scripts").join("bash"),
            document: "SKILL.md".to_string(),
            root,
        }
    }

    pub fn document_path(&self, package: &str) -> PathBuf {
        self.skills_dir.join(package).join(&self.document)
    }

    pub fn template_path(&self, template: &str) -> PathBuf {
        self.templates_dir.join(template)
    }

    pub fn script_path(&self, script: &str) -> PathBuf {
        self.scripts_dir.join(script)
    }
}

/// External command that (re)generates the source tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl InitCommand {
    /// Build from an argv list; `None` when empty
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// `specify init` producing codex skills with POSIX scripts
    pub fn speckit_argv() -> Vec<String> {
        [
            "specify",
            "init",
            "--here",
            "--ai",
            "codex",
            "--ai-skills",
            "--force",
            "--ignore-agent-tools",
            "--script",
            "sh",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// Run in `cwd`, returning captured stdout
    pub fn run(&self, cwd: &Path) -> Result<String> {
        tracing::info!("Running init command: {}", self);

        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(cwd)
            .output()
            .map_err(|e| SkillgenError::InitFailed {
                command: self.to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(SkillgenError::InitFailed {
                command: self.to_string(),
                message: if stderr.is_empty() {
                    format!("exited with {}", output.status)
                } else {
                    stderr
                },
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl std::fmt::Display for InitCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
