//! @acp:module "Configuration"
//! @acp:summary "Project configuration loading and defaults"
//! @acp:domain cli
//! @acp:layer config

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SkillgenError};
use crate::manifest::Manifest;
use crate::source::{InitCommand, SourceLayout};

/// Default config file name
pub const CONFIG_FILE: &str = ".skillgen.config.json";

/// @acp:summary "Main skillgen configuration structure"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Project root; every other path is resolved against it
    #[serde(default = "default_root", skip_serializing_if = "is_default_root")]
    pub root: PathBuf,

    /// Source tree locations
    #[serde(default)]
    pub source: SourceConfig,

    /// Output root for generated packages
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Alternate rule manifest (JSON or YAML); built-in tables when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,

    /// Command line that regenerates the source tree
    #[serde(default = "InitCommand::speckit_argv")]
    pub init: Vec<String>,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn is_default_root(p: &Path) -> bool {
    p == Path::new(".")
}

fn default_output() -> PathBuf {
    PathBuf::from("skills")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: default_root(),
            source: SourceConfig::default(),
            output: default_output(),
            manifest: None,
            init: InitCommand::speckit_argv(),
        }
    }
}

impl Config {
    /// @acp:summary "Load config from a JSON file"
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SkillgenError::io(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// @acp:summary "Save config to a file"
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| SkillgenError::io(path, e))?;
        Ok(())
    }

    /// Source layout with every directory resolved against `root`
    pub fn layout(&self) -> SourceLayout {
        SourceLayout {
            root: self.root.clone(),
            skills_dir: self.root.join(&self.source.skills_dir),
            templates_dir: self.root.join(&self.source.templates_dir),
            scripts_dir: self.root.join(&self.source.scripts_dir),
            document: self.source.document.clone(),
        }
    }

    /// Output root resolved against `root`
    pub fn output_root(&self) -> PathBuf {
        self.root.join(&self.output)
    }

    /// Configured manifest, or the built-in tables
    pub fn manifest(&self) -> Result<Manifest> {
        match &self.manifest {
            Some(path) => Manifest::load(self.root.join(path)),
            None => Ok(Manifest::builtin()),
        }
    }

    pub fn init_command(&self) -> Option<InitCommand> {
        InitCommand::from_argv(&self.init)
    }
}

/// @acp:summary "Source tree locations, relative to the project root"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_skills_dir")]
    pub skills_dir: PathBuf,

    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,

    #[serde(default = "default_scripts_dir")]
    pub scripts_dir: PathBuf,

    /// Primary document name inside each skill directory
    #[serde(default = "default_document")]
    pub document: String,
}

fn default_skills_dir() -> PathBuf {
    PathBuf::from(".agents/skills")
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from(".specify/templates")
}

fn default_scripts_dir() -> PathBuf {
    PathBuf::from(".specify/scripts/bash")
}

fn default_document() -> String {
    "SKILL.md".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            skills_dir: default_skills_dir(),
            templates_dir: default_templates_dir(),
            scripts_dir: default_scripts_dir(),
            document: default_document(),
        }
    }
}
