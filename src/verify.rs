//! @acp:module "Output Verifier"
//! @acp:summary "Reject generated output that still contains forbidden residue"
//! @acp:domain cli
//! @acp:layer service
//!
//! Scans every file under the output root against every forbidden pattern
//! and collects all matches, so one run reports every leftover reference.

use std::fmt;
use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use crate::error::{Result, SkillgenError};

/// Regex whose presence in output is a build-breaking defect
#[derive(Debug, Clone)]
pub struct ForbiddenPattern {
    regex: Regex,
}

impl ForbiddenPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| SkillgenError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { regex })
    }

    pub fn compile_all(patterns: &[String]) -> Result<Vec<Self>> {
        patterns.iter().map(|p| Self::new(p)).collect()
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// One forbidden match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File path relative to the output root
    pub file: PathBuf,
    pub pattern: String,
    pub matched: String,
    /// 1-based line number
    pub line: usize,
    /// Full text of the offending line
    pub context: String,
}

/// Outcome of a verification scan
#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    pub files_scanned: usize,
    pub patterns_checked: usize,
    pub violations: Vec<Violation>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return write!(
                f,
                "{} patterns checked in {} files, 0 violations",
                self.patterns_checked, self.files_scanned
            );
        }

        write!(
            f,
            "forbidden patterns found in output ({} violations):",
            self.violations.len()
        )?;
        for v in &self.violations {
            write!(
                f,
                "\n  {}:{}: found '{}' (pattern /{}/)\n      {}",
                v.file.display(),
                v.line,
                v.matched,
                v.pattern,
                v.context.trim()
            )?;
        }
        Ok(())
    }
}

/// Match `text` against every pattern
pub fn scan_text(file: &Path, text: &str, patterns: &[ForbiddenPattern]) -> Vec<Violation> {
    let mut violations = Vec::new();

    for pattern in patterns {
        for m in pattern.regex.find_iter(text) {
            let line_start = text[..m.start()].rfind('\n').map(|i| i + 1).unwrap_or(0);
            let line_end = text[m.start()..]
                .find('\n')
                .map(|i| m.start() + i)
                .unwrap_or(text.len());

            violations.push(Violation {
                file: file.to_path_buf(),
                pattern: pattern.as_str().to_string(),
                matched: m.as_str().to_string(),
                line: text[..m.start()].matches('\n').count() + 1,
                context: text[line_start..line_end].to_string(),
            });
        }
    }

    violations
}

/// Scan every file under `root`
///
/// Files that are not valid UTF-8 are skipped.
pub fn verify_output(root: &Path, patterns: &[ForbiddenPattern]) -> Result<VerifyReport> {
    let mut report = VerifyReport {
        patterns_checked: patterns.len(),
        ..Default::default()
    };

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| SkillgenError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let bytes = std::fs::read(path).map_err(|e| SkillgenError::io(path, e))?;
        let Ok(text) = String::from_utf8(bytes) else {
            tracing::debug!("Skipping non-UTF-8 file {}", path.display());
            continue;
        };

        let relative = path.strip_prefix(root).unwrap_or(path);
        report
            .violations
            .extend(scan_text(relative, &text, patterns));
        report.files_scanned += 1;
    }

    Ok(report)
}
