//! @acp:module "Package Assembler"
//! @acp:summary "Copy and patch one skill package into the output tree"
//! @acp:domain cli
//! @acp:layer service
//!
//! Per package, in order:
//!
//! 1. Recreate `<output>/<package>/` and copy the primary document
//! 2. Copy mapped templates into `references/` and scripts into `scripts/`
//! 3. Strip the `metadata` key from the primary document's frontmatter
//! 4. Apply the merged rule list to every file in the package directory
//!
//! Step 4 walks the directory instead of reusing the copy list, so the rule
//! pass covers exactly what ends up on disk.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, SkillgenError, SourceKind};
use crate::frontmatter::{self, METADATA_KEY};
use crate::manifest::{Manifest, REFERENCES_DIR, SCRIPTS_DIR, SKILL_FILE};
use crate::rules::RuleStore;
use crate::source::SourceLayout;

/// Result of assembling one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPackage {
    pub name: String,
    pub output_dir: PathBuf,
    pub references: usize,
    pub scripts: usize,
    /// Relative paths whose content was changed by the rule pass
    pub patched: Vec<String>,
}

/// Assembles packages from a source layout into an output root
pub struct PackageAssembler<'a> {
    manifest: &'a Manifest,
    layout: &'a SourceLayout,
    rules: &'a RuleStore,
    output_root: &'a Path,
}

impl<'a> PackageAssembler<'a> {
    pub fn new(
        manifest: &'a Manifest,
        layout: &'a SourceLayout,
        rules: &'a RuleStore,
        output_root: &'a Path,
    ) -> Self {
        Self {
            manifest,
            layout,
            rules,
            output_root,
        }
    }

    /// Build `<output>/<package>/` from scratch
    pub fn assemble(&self, package: &str) -> Result<AssembledPackage> {
        let out_dir = self.output_root.join(package);
        if out_dir.exists() {
            fs::remove_dir_all(&out_dir).map_err(|e| SkillgenError::io(&out_dir, e))?;
        }
        fs::create_dir_all(&out_dir).map_err(|e| SkillgenError::io(&out_dir, e))?;

        let document = out_dir.join(SKILL_FILE);
        copy_source(
            &self.layout.document_path(package),
            &document,
            SourceKind::Document,
        )?;
        tracing::info!("Copied {}/{}", package, SKILL_FILE);

        let templates = self.manifest.templates_for(package);
        for template in &templates {
            copy_source(
                &self.layout.template_path(template),
                &out_dir.join(REFERENCES_DIR).join(template),
                SourceKind::Template,
            )?;
            tracing::info!("Copied {}/{}/{}", package, REFERENCES_DIR, template);
        }

        let scripts = self.manifest.scripts_for(package);
        for script in scripts {
            copy_source(
                &self.layout.script_path(script),
                &out_dir.join(SCRIPTS_DIR).join(script),
                SourceKind::Script,
            )?;
            tracing::info!("Copied {}/{}/{}", package, SCRIPTS_DIR, script);
        }

        strip_metadata(&document)?;

        let mut patched = Vec::new();
        for entry in WalkDir::new(&out_dir).sort_by_file_name() {
            let entry = entry.map_err(|source| SkillgenError::Walk {
                path: out_dir.clone(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = relative_path(entry.path(), &out_dir);
            if self.patch_file(package, &relative, entry.path())? {
                tracing::info!("Patched {}/{}", package, relative);
                patched.push(relative);
            }
        }

        Ok(AssembledPackage {
            name: package.to_string(),
            output_dir: out_dir,
            references: templates.len(),
            scripts: scripts.len(),
            patched,
        })
    }

    /// Apply merged rules in place; returns whether the content changed
    fn patch_file(&self, package: &str, relative: &str, path: &Path) -> Result<bool> {
        let bytes = fs::read(path).map_err(|e| SkillgenError::io(path, e))?;
        let Ok(original) = String::from_utf8(bytes) else {
            tracing::debug!("Skipping non-UTF-8 file {}/{}", package, relative);
            return Ok(false);
        };

        let specific = self.rules.package_rules(package, relative).len();
        let mut text = original.clone();
        for (index, rule) in self.rules.rules_for(package, relative).into_iter().enumerate() {
            let (next, count) = rule.apply(&text);
            if count == 0 && index < specific {
                tracing::debug!(
                    "Rule {} for {}/{} matched nothing",
                    rule.describe(),
                    package,
                    relative
                );
            }
            text = next;
        }

        if text == original {
            return Ok(false);
        }
        fs::write(path, text).map_err(|e| SkillgenError::io(path, e))?;
        Ok(true)
    }
}

/// Copy one source file, creating parent directories
fn copy_source(src: &Path, dst: &Path, kind: SourceKind) -> Result<()> {
    if !src.is_file() {
        return Err(SkillgenError::MissingSource {
            kind,
            path: src.to_path_buf(),
        });
    }
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| SkillgenError::io(parent, e))?;
    }
    fs::copy(src, dst).map_err(|e| SkillgenError::io(src, e))?;
    Ok(())
}

fn strip_metadata(document: &Path) -> Result<()> {
    let content = fs::read_to_string(document).map_err(|e| SkillgenError::io(document, e))?;
    let stripped = frontmatter::strip_key(&content, METADATA_KEY);
    if stripped != content {
        fs::write(document, stripped).map_err(|e| SkillgenError::io(document, e))?;
    }
    Ok(())
}

/// `/`-separated path of `path` below `base`
fn relative_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
