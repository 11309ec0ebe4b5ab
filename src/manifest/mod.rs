//! @acp:module "Manifest"
//! @acp:summary "Package table, template mapping, rule tables and forbidden patterns"
//! @acp:domain cli
//! @acp:layer config
//!
//! The manifest is the whole configuration surface of the pipeline. It is
//! plain data: rules stay uncompiled [`RuleSpec`]s until the
//! [`RuleStore`](crate::rules::RuleStore) is built.
//!
//! All maps are `BTreeMap`s so every traversal order is deterministic.

pub mod speckit;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkillgenError, SourceKind};
use crate::rules::RuleSpec;
use crate::source::SourceLayout;

/// Primary document name inside every package
pub const SKILL_FILE: &str = "SKILL.md";

/// Subdirectory for copied templates
pub const REFERENCES_DIR: &str = "references";

/// Subdirectory for copied scripts
pub const SCRIPTS_DIR: &str = "scripts";

/// Per-package resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageSpec {
    /// Shared scripts copied into `scripts/`
    pub scripts: Vec<String>,
}

/// Complete rule and mapping configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Known packages by name
    pub packages: BTreeMap<String, PackageSpec>,

    /// Template file name -> destination package
    pub templates: BTreeMap<String, String>,

    /// Rules applied to every file, after package rules
    pub common_rules: Vec<RuleSpec>,

    /// Package -> relative file path -> rules
    pub package_rules: BTreeMap<String, BTreeMap<String, Vec<RuleSpec>>>,

    /// Relative resource path -> rules, expanded to every package shipping it
    pub resource_rules: BTreeMap<String, Vec<RuleSpec>>,

    /// Regexes that must not match any output file
    pub forbidden: Vec<String>,
}

impl Manifest {
    /// Built-in spec-kit conversion tables
    pub fn builtin() -> Self {
        speckit::manifest()
    }

    /// Load a manifest from `.json`, `.yaml` or `.yml`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SkillgenError::io(path, e))?;

        let is_yaml = path
            .extension()
            .map(|ext| ext == "yaml" || ext == "yml")
            .unwrap_or(false);

        let parsed: std::result::Result<Manifest, String> = if is_yaml {
            serde_yaml::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| SkillgenError::Manifest {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Serialize as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Templates mapped to `package`, in name order
    pub fn templates_for(&self, package: &str) -> Vec<&str> {
        self.templates
            .iter()
            .filter(|(_, target)| target.as_str() == package)
            .map(|(template, _)| template.as_str())
            .collect()
    }

    /// Scripts shipped by `package`
    pub fn scripts_for(&self, package: &str) -> &[String] {
        self.packages
            .get(package)
            .map(|spec| spec.scripts.as_slice())
            .unwrap_or(&[])
    }

    /// Every relative path a package's output directory will contain
    pub fn package_files(&self, package: &str) -> Vec<String> {
        let mut files = vec![SKILL_FILE.to_string()];
        files.extend(
            self.templates_for(package)
                .into_iter()
                .map(|t| format!("{}/{}", REFERENCES_DIR, t)),
        );
        files.extend(
            self.scripts_for(package)
                .iter()
                .map(|s| format!("{}/{}", SCRIPTS_DIR, s)),
        );
        files
    }

    /// Package rules with resource rules expanded
    ///
    /// Explicit package rules for a path come before the resource rules for
    /// the same path.
    pub fn effective_package_rules(&self) -> BTreeMap<String, BTreeMap<String, Vec<RuleSpec>>> {
        let mut merged = self.package_rules.clone();

        for package in self.packages.keys() {
            for file in self.package_files(package) {
                if let Some(rules) = self.resource_rules.get(&file) {
                    merged
                        .entry(package.clone())
                        .or_default()
                        .entry(file)
                        .or_default()
                        .extend(rules.iter().cloned());
                }
            }
        }

        merged
    }

    /// Check the tables against each other and against the source tree
    ///
    /// Fails on the first mismatch; nothing is written.
    pub fn validate(&self, layout: &SourceLayout) -> Result<()> {
        for (template, package) in &self.templates {
            if !self.packages.contains_key(package) {
                return Err(SkillgenError::UnknownPackage {
                    package: package.clone(),
                    context: format!("template '{}'", template),
                });
            }
        }

        for (package, paths) in &self.package_rules {
            if !self.packages.contains_key(package) {
                return Err(SkillgenError::UnknownPackage {
                    package: package.clone(),
                    context: "package rules".to_string(),
                });
            }
            let files = self.package_files(package);
            for path in paths.keys() {
                if !files.contains(path) {
                    return Err(SkillgenError::UnknownRuleTarget {
                        package: package.clone(),
                        path: path.clone(),
                    });
                }
            }
        }

        for path in self.resource_rules.keys() {
            let shipped = self
                .packages
                .keys()
                .any(|package| self.package_files(package).contains(path));
            if !shipped {
                tracing::warn!("Resource rules for '{}' match no package", path);
            }
        }

        for package in self.packages.keys() {
            require(layout.document_path(package), SourceKind::Document)?;
            for template in self.templates_for(package) {
                require(layout.template_path(template), SourceKind::Template)?;
            }
            for script in self.scripts_for(package) {
                require(layout.script_path(script), SourceKind::Script)?;
            }
        }

        Ok(())
    }
}

fn require(path: std::path::PathBuf, kind: SourceKind) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(SkillgenError::MissingSource { kind, path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn small_manifest() -> Manifest {
        let mut manifest = Manifest::default();
        manifest.packages.insert(
            "alpha".into(),
            PackageSpec {
                scripts: vec!["common.sh".into()],
            },
        );
        manifest.packages.insert("beta".into(), PackageSpec::default());
        manifest.templates.insert("a-template.md".into(), "alpha".into());
        manifest
            .resource_rules
            .insert("scripts/common.sh".into(), vec![RuleSpec::literal("x", "y")]);
        manifest
    }

    fn layout_with_sources(temp: &TempDir) -> SourceLayout {
        let layout = SourceLayout::speckit(temp.path());
        for package in ["alpha", "beta"] {
            let dir = layout.skills_dir.join(package);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join(SKILL_FILE), "---\nname: x\n---\n").unwrap();
        }
        std::fs::create_dir_all(&layout.templates_dir).unwrap();
        std::fs::write(layout.templates_dir.join("a-template.md"), "t").unwrap();
        std::fs::create_dir_all(&layout.scripts_dir).unwrap();
        std::fs::write(layout.scripts_dir.join("common.sh"), "s").unwrap();
        layout
    }

    #[test]
    fn test_package_files() {
        let manifest = small_manifest();
        assert_eq!(
            manifest.package_files("alpha"),
            vec!["SKILL.md", "references/a-template.md", "scripts/common.sh"]
        );
        assert_eq!(manifest.package_files("beta"), vec!["SKILL.md"]);
    }

    #[test]
    fn test_resource_rules_expand_after_package_rules() {
        let mut manifest = small_manifest();
        manifest
            .package_rules
            .entry("alpha".into())
            .or_default()
            .insert("scripts/common.sh".into(), vec![RuleSpec::literal("p", "q")]);

        let rules = manifest.effective_package_rules();
        let alpha = &rules["alpha"]["scripts/common.sh"];
        assert_eq!(alpha[0], RuleSpec::literal("p", "q"));
        assert_eq!(alpha[1], RuleSpec::literal("x", "y"));
        assert!(!rules.contains_key("beta"));
    }

    #[test]
    fn test_validate_ok() {
        let temp = TempDir::new().unwrap();
        let layout = layout_with_sources(&temp);
        small_manifest().validate(&layout).unwrap();
    }

    #[test]
    fn test_validate_missing_template() {
        let temp = TempDir::new().unwrap();
        let layout = layout_with_sources(&temp);
        std::fs::remove_file(layout.templates_dir.join("a-template.md")).unwrap();

        let err = small_manifest().validate(&layout).unwrap_err();
        assert!(matches!(
            err,
            SkillgenError::MissingSource {
                kind: SourceKind::Template,
                ..
            }
        ));
    }

    #[test]
    fn test_validate_template_for_unknown_package() {
        let temp = TempDir::new().unwrap();
        let layout = layout_with_sources(&temp);
        let mut manifest = small_manifest();
        manifest.templates.insert("orphan.md".into(), "gamma".into());

        let err = manifest.validate(&layout).unwrap_err();
        assert!(matches!(err, SkillgenError::UnknownPackage { ref package, .. } if package == "gamma"));
    }

    #[test]
    fn test_validate_rules_for_unknown_package_and_path() {
        let temp = TempDir::new().unwrap();
        let layout = layout_with_sources(&temp);

        let mut manifest = small_manifest();
        manifest
            .package_rules
            .entry("gamma".into())
            .or_default()
            .insert(SKILL_FILE.into(), vec![]);
        assert!(matches!(
            manifest.validate(&layout).unwrap_err(),
            SkillgenError::UnknownPackage { .. }
        ));

        let mut manifest = small_manifest();
        manifest
            .package_rules
            .entry("beta".into())
            .or_default()
            .insert("scripts/common.sh".into(), vec![]);
        assert!(matches!(
            manifest.validate(&layout).unwrap_err(),
            SkillgenError::UnknownRuleTarget { .. }
        ));
    }

    #[test]
    fn test_load_yaml_and_json() {
        let temp = TempDir::new().unwrap();
        let manifest = small_manifest();

        let yaml_path = temp.path().join("rules.yaml");
        std::fs::write(&yaml_path, manifest.to_yaml().unwrap()).unwrap();
        assert_eq!(Manifest::load(&yaml_path).unwrap(), manifest);

        let json_path = temp.path().join("rules.json");
        std::fs::write(&json_path, serde_json::to_string(&manifest).unwrap()).unwrap();
        assert_eq!(Manifest::load(&json_path).unwrap(), manifest);
    }

    #[test]
    fn test_load_invalid_manifest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("rules.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Manifest::load(&path).unwrap_err(),
            SkillgenError::Manifest { .. }
        ));
    }
}
