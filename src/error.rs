//! @acp:module "Errors"
//! @acp:summary "Error types for the skill generation pipeline"
//! @acp:domain cli
//! @acp:layer model

use std::path::PathBuf;

use thiserror::Error;

use crate::verify::VerifyReport;

/// Errors raised while loading rule tables, assembling packages or verifying output
#[derive(Error, Debug)]
pub enum SkillgenError {
    /// Filesystem operation failed on a specific path
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed
    #[error("Failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A source file referenced by the manifest does not exist
    #[error("{kind} source not found: {}", path.display())]
    MissingSource { kind: SourceKind, path: PathBuf },

    /// A table refers to a package that is not defined
    #[error("Unknown package '{package}' referenced by {context}")]
    UnknownPackage { package: String, context: String },

    /// A package rule targets a file the package never ships
    #[error("Rule for package '{package}' targets '{path}', which the package does not contain")]
    UnknownRuleTarget { package: String, path: String },

    /// A regex in a rule or forbidden pattern failed to compile
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Manifest file could not be parsed
    #[error("Invalid manifest {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML (de)serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The source generator command failed
    #[error("Init command `{command}` failed: {message}")]
    InitFailed { command: String, message: String },

    /// Output root would contain the project root; cleaning it would delete the sources
    #[error("Refusing to clean output root {}: it contains the project root", .0.display())]
    UnsafeOutputRoot(PathBuf),

    /// Forbidden residue survived assembly
    #[error("{0}")]
    ForbiddenResidue(VerifyReport),
}

impl SkillgenError {
    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SkillgenError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Kind of source file a package pulls in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Document,
    Template,
    Script,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Document => write!(f, "Document"),
            SourceKind::Template => write!(f, "Template"),
            SourceKind::Script => write!(f, "Script"),
        }
    }
}

/// Result type for skillgen operations
pub type Result<T> = std::result::Result<T, SkillgenError>;
