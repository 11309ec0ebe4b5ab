//! @acp:module "Rule Store"
//! @acp:summary "Merged package-specific and common rule lists"
//! @acp:domain cli
//! @acp:layer service

use std::collections::BTreeMap;

use super::{PatchRule, RuleSpec};
use crate::error::Result;
use crate::manifest::Manifest;

/// Holds common rules and package/path scoped rules
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    common: Vec<PatchRule>,
    packages: BTreeMap<String, BTreeMap<String, Vec<PatchRule>>>,
}

impl RuleStore {
    /// Create a store with only common rules
    pub fn new(common: Vec<PatchRule>) -> Self {
        Self {
            common,
            packages: BTreeMap::new(),
        }
    }

    /// Compile all rule tables of a manifest
    pub fn from_manifest(manifest: &Manifest) -> Result<Self> {
        let common = compile_all(&manifest.common_rules)?;
        let mut store = Self::new(common);

        for (package, paths) in manifest.effective_package_rules() {
            for (path, specs) in paths {
                store.insert(&package, &path, compile_all(&specs)?);
            }
        }

        Ok(store)
    }

    /// Append rules for one package file
    pub fn insert(&mut self, package: &str, path: &str, rules: Vec<PatchRule>) {
        self.packages
            .entry(package.to_string())
            .or_default()
            .entry(path.to_string())
            .or_default()
            .extend(rules);
    }

    /// Common rules, applied to every file
    pub fn common(&self) -> &[PatchRule] {
        &self.common
    }

    /// Rules scoped to exactly this package and relative path
    pub fn package_rules(&self, package: &str, path: &str) -> &[PatchRule] {
        self.packages
            .get(package)
            .and_then(|paths| paths.get(path))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Merged rule list for one file: package rules first, then common rules
    pub fn rules_for(&self, package: &str, path: &str) -> Vec<&PatchRule> {
        self.package_rules(package, path)
            .iter()
            .chain(self.common.iter())
            .collect()
    }
}

fn compile_all(specs: &[RuleSpec]) -> Result<Vec<PatchRule>> {
    specs.iter().map(RuleSpec::compile).collect()
}
