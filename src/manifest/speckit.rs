//! @acp:module "spec-kit Tables"
//! @acp:summary "Built-in conversion tables for spec-kit generated skills"
//! @acp:domain cli
//! @acp:layer config
//!
//! Converts the `speckit-*` skills produced by `specify init --ai-skills`
//! into packages that no longer depend on a `.specify/` directory.
//!
//! Literal rules that share a prefix are listed longest first: a shorter
//! rule would otherwise rewrite the prefix and leave the longer one unmatched.

use std::collections::BTreeMap;

use super::{Manifest, PackageSpec, SKILL_FILE};
use crate::rules::RuleSpec;

/// Resolves a script's own directory at runtime
pub const SCRIPT_DIR_EXPR: &str = r#"$(cd "$(dirname "${BASH_SOURCE[0]}")" && pwd)"#;

const COMMON: &str = "common.sh";
const PREREQS: &str = "check-prerequisites.sh";

/// Packages, their shared scripts and their templates
const PACKAGES: &[(&str, &[&str], &[&str])] = &[
    ("speckit-analyze", &[COMMON, PREREQS], &[]),
    ("speckit-checklist", &[COMMON, PREREQS], &["checklist-template.md"]),
    ("speckit-clarify", &[COMMON, PREREQS], &[]),
    ("speckit-constitution", &[], &["constitution-template.md"]),
    ("speckit-implement", &[COMMON, PREREQS], &[]),
    (
        "speckit-plan",
        &[COMMON, "setup-plan.sh", "update-agent-context.sh"],
        &["plan-template.md", "agent-file-template.md"],
    ),
    (
        "speckit-specify",
        &[COMMON, "create-new-feature.sh"],
        &["spec-template.md"],
    ),
    ("speckit-tasks", &[COMMON, PREREQS], &["tasks-template.md"]),
    ("speckit-taskstoissues", &[COMMON, PREREQS], &[]),
];

/// Build the spec-kit manifest
pub fn manifest() -> Manifest {
    let mut packages = BTreeMap::new();
    let mut templates = BTreeMap::new();

    for (name, scripts, package_templates) in PACKAGES {
        packages.insert(
            name.to_string(),
            PackageSpec {
                scripts: scripts.iter().map(|s| s.to_string()).collect(),
            },
        );
        for template in *package_templates {
            templates.insert(template.to_string(), name.to_string());
        }
    }

    let package_rules = skill_rules()
        .into_iter()
        .map(|(package, rules)| {
            let mut paths = BTreeMap::new();
            paths.insert(SKILL_FILE.to_string(), rules);
            (package.to_string(), paths)
        })
        .collect();

    Manifest {
        packages,
        templates,
        common_rules: common_rules(),
        package_rules,
        resource_rules: resource_rules(),
        forbidden: vec![r"\.specify/".to_string(), r"\$ARGUMENTS".to_string()],
    }
}

/// Applied to every file; block deletions run before path rewrites
fn common_rules() -> Vec<RuleSpec> {
    vec![
        RuleSpec::regex(r"(?m)^compatibility: .*\.specify/.*\n", ""),
        RuleSpec::block(
            "## User Input\n\n```text\n$ARGUMENTS\n```\n",
            "You **MUST** consider the user input before proceeding (if not empty).\n\n",
            "",
        ),
        RuleSpec::literal(".specify/scripts/bash/", "scripts/"),
        RuleSpec::literal(".specify/templates/", "references/"),
        RuleSpec::literal(".specify/memory/constitution.md", "specs/constitution.md"),
    ]
}

/// `SKILL.md` rules per package
fn skill_rules() -> Vec<(&'static str, Vec<RuleSpec>)> {
    let feature_script = ".specify/scripts/bash/create-new-feature.sh";

    vec![
        (
            "speckit-analyze",
            vec![RuleSpec::literal("\n## Context\n\n$ARGUMENTS\n", "")],
        ),
        (
            "speckit-checklist",
            vec![
                RuleSpec::literal(
                    "already unambiguous in `$ARGUMENTS`",
                    "already unambiguous in the user's input",
                ),
                RuleSpec::literal(
                    "Combine `$ARGUMENTS` + clarifying answers",
                    "Combine the user's input + clarifying answers",
                ),
            ],
        ),
        (
            "speckit-clarify",
            vec![RuleSpec::literal("\nContext for prioritization: $ARGUMENTS\n", "")],
        ),
        (
            "speckit-constitution",
            vec![
                RuleSpec::literal(
                    ".specify/templates/plan-template.md",
                    "../speckit-plan/references/plan-template.md",
                ),
                RuleSpec::literal(
                    ".specify/templates/spec-template.md",
                    "../speckit-specify/references/spec-template.md",
                ),
                RuleSpec::literal(
                    ".specify/templates/tasks-template.md",
                    "../speckit-tasks/references/tasks-template.md",
                ),
                RuleSpec::literal(
                    "   - Read each command file in `.specify/templates/commands/*.md` (including this one) to verify no outdated references (agent-specific names like CLAUDE only) remain when generic guidance is required.",
                    "   - Review all other speckit skill definitions (SKILL.md files in sibling speckit-* directories) to verify no outdated references (agent-specific names like CLAUDE only) remain when generic guidance is required.",
                ),
            ],
        ),
        (
            "speckit-specify",
            vec![
                RuleSpec::literal(
                    "The text the user typed after `/speckit.specify` in the triggering message **is** the feature description. Assume you always have it available in this conversation even if `$ARGUMENTS` appears literally below. Do not ask the user to repeat it unless they provided an empty command.",
                    "The user's message that triggered this skill **is** the feature description. Do not ask the user to repeat it unless they provided no description.",
                ),
                RuleSpec::literal(
                    format!(
                        r#"{} --json "$ARGUMENTS" --json --number 5 --short-name "user-auth" "Add user authentication""#,
                        feature_script
                    ),
                    format!(
                        r#"{} --json --number 5 --short-name "user-auth" "Add user authentication""#,
                        feature_script
                    ),
                ),
                RuleSpec::literal(
                    format!(
                        r#"{} --json "$ARGUMENTS" -Json -Number 5 -ShortName "user-auth" "Add user authentication""#,
                        feature_script
                    ),
                    format!(
                        r#"{} --json -Number 5 -ShortName "user-auth" "Add user authentication""#,
                        feature_script
                    ),
                ),
                RuleSpec::literal(
                    format!(r#"{} --json "$ARGUMENTS""#, feature_script),
                    format!(r#"{} --json "<feature-description>""#, feature_script),
                ),
            ],
        ),
        (
            "speckit-tasks",
            vec![RuleSpec::literal("\nContext for task generation: $ARGUMENTS\n", "")],
        ),
    ]
}

/// Rules for shared templates and scripts, wherever they are shipped
fn resource_rules() -> BTreeMap<String, Vec<RuleSpec>> {
    let mut rules = BTreeMap::new();

    rules.insert(
        "references/spec-template.md".to_string(),
        vec![RuleSpec::literal(r#""$ARGUMENTS""#, r#""<user description>""#)],
    );

    // Non-git fallback walked up from the script location into .specify/
    rules.insert(
        "scripts/common.sh".to_string(),
        vec![RuleSpec::block(
            "\n    else\n        # Fall back to script location for non-git repos\n",
            "\n    fi",
            "\n    else\n        # Fall back to current directory for non-git repos\n        pwd\n    fi",
        )],
    );

    rules.insert(
        "scripts/create-new-feature.sh".to_string(),
        vec![
            RuleSpec::literal(
                r#"if [ -d "$dir/.git" ] || [ -d "$dir/.specify" ]; then"#,
                r#"if [ -d "$dir/.git" ]; then"#,
            ),
            template_path_rule("TEMPLATE", "spec-template.md"),
        ],
    );

    rules.insert(
        "scripts/setup-plan.sh".to_string(),
        vec![template_path_rule("TEMPLATE", "plan-template.md")],
    );

    rules.insert(
        "scripts/update-agent-context.sh".to_string(),
        vec![template_path_rule("TEMPLATE_FILE", "agent-file-template.md")],
    );

    rules
}

/// Point a `VAR="$REPO_ROOT/.specify/templates/<file>"` assignment at `../references/`
fn template_path_rule(var: &str, template: &str) -> RuleSpec {
    RuleSpec::literal(
        format!(r#"{}="$REPO_ROOT/.specify/templates/{}""#, var, template),
        format!(r#"{}="{}/../references/{}""#, var, SCRIPT_DIR_EXPR, template),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{apply_rules, RuleStore};

    fn patch(package: &str, path: &str, text: &str) -> String {
        let store = RuleStore::from_manifest(&manifest()).unwrap();
        apply_rules(text, store.rules_for(package, path))
    }

    #[test]
    fn test_package_table() {
        let manifest = manifest();
        assert_eq!(manifest.packages.len(), 9);
        assert_eq!(manifest.templates["plan-template.md"], "speckit-plan");
        assert_eq!(
            manifest.templates_for("speckit-plan"),
            vec!["agent-file-template.md", "plan-template.md"]
        );
        assert!(manifest.scripts_for("speckit-constitution").is_empty());
    }

    #[test]
    fn test_rule_targets_are_shipped() {
        let manifest = manifest();
        for (package, paths) in manifest.effective_package_rules() {
            let files = manifest.package_files(&package);
            for path in paths.keys() {
                assert!(files.contains(path), "{} does not ship {}", package, path);
            }
        }
    }

    #[test]
    fn test_common_sh_fallback() {
        let script = concat!(
            "# source .specify/scripts/bash/common.sh\n",
            "get_repo_root() {\n",
            "    if git rev-parse --show-toplevel >/dev/null 2>&1; then\n",
            "        git rev-parse --show-toplevel\n",
            "    else\n",
            "        # Fall back to script location for non-git repos\n",
            "        local script_dir=\"$(CDPATH=\"\" cd \"$(dirname \"${BASH_SOURCE[0]}\")\" && pwd)\"\n",
            "        (cd \"$script_dir/../../..\" && pwd)\n",
            "    fi\n",
            "}\n",
        );

        let out = patch("speckit-plan", "scripts/common.sh", script);
        assert_eq!(
            out,
            concat!(
                "# source scripts/common.sh\n",
                "get_repo_root() {\n",
                "    if git rev-parse --show-toplevel >/dev/null 2>&1; then\n",
                "        git rev-parse --show-toplevel\n",
                "    else\n",
                "        # Fall back to current directory for non-git repos\n",
                "        pwd\n",
                "    fi\n",
                "}\n",
            )
        );
        assert!(!out.contains("../../.."));
    }

    #[test]
    fn test_common_sh_fallback_with_nested_if() {
        let script = concat!(
            "    else\n",
            "        # Fall back to script location for non-git repos\n",
            "        if [ -n \"$SCRIPT_DIR\" ]; then\n",
            "            echo \"$SCRIPT_DIR\"\n",
            "        fi\n",
            "        (cd \"$script_dir/../../..\" && pwd)\n",
            "    fi\n",
            "}\n",
        );

        let out = patch("speckit-plan", "scripts/common.sh", &format!("x\n{}", script));
        assert_eq!(
            out,
            concat!(
                "x\n",
                "    else\n",
                "        # Fall back to current directory for non-git repos\n",
                "        pwd\n",
                "    fi\n",
                "}\n",
            )
        );
    }

    #[test]
    fn test_user_input_and_compatibility_removed() {
        let doc = concat!(
            "---\n",
            "name: speckit-implement\n",
            "compatibility: Requires spec-kit project structure with .specify/ directory\n",
            "---\n",
            "\n",
            "## User Input\n",
            "\n",
            "```text\n",
            "$ARGUMENTS\n",
            "```\n",
            "\n",
            "You **MUST** consider the user input before proceeding (if not empty).\n",
            "\n",
            "## Outline\n",
        );

        let out = patch("speckit-implement", SKILL_FILE, doc);
        assert_eq!(out, "---\nname: speckit-implement\n---\n\n## Outline\n");
    }

    #[test]
    fn test_specify_longest_command_first() {
        let doc = r#"Run `.specify/scripts/bash/create-new-feature.sh --json "$ARGUMENTS" --json --number 5 --short-name "user-auth" "Add user authentication"`"#;
        let out = patch("speckit-specify", SKILL_FILE, doc);
        assert_eq!(
            out,
            r#"Run `scripts/create-new-feature.sh --json --number 5 --short-name "user-auth" "Add user authentication"`"#
        );
    }

    #[test]
    fn test_constitution_sibling_references() {
        let doc = "Check .specify/templates/plan-template.md and .specify/templates/constitution-template.md";
        let out = patch("speckit-constitution", SKILL_FILE, doc);
        assert_eq!(
            out,
            "Check ../speckit-plan/references/plan-template.md and references/constitution-template.md"
        );
    }

    #[test]
    fn test_template_variable_rewrite() {
        let line = r#"TEMPLATE="$REPO_ROOT/.specify/templates/plan-template.md""#;
        let out = patch("speckit-plan", "scripts/setup-plan.sh", line);
        assert_eq!(
            out,
            r#"TEMPLATE="$(cd "$(dirname "${BASH_SOURCE[0]}")" && pwd)/../references/plan-template.md""#
        );
    }
}
