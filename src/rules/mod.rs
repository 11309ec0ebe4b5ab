//! @acp:module "Patch Rules"
//! @acp:summary "Ordered literal, regex and block substitution rules"
//! @acp:domain cli
//! @acp:layer service
//!
//! Rules come in two shapes: [`RuleSpec`] is the serializable table entry,
//! [`PatchRule`] is its compiled form. A list of rules is always applied in
//! order, each rule seeing the output of the previous one.

pub mod store;

pub use store::RuleStore;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SkillgenError};

/// Serializable rule table entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RuleSpec {
    /// Replace every occurrence of a literal substring
    Literal {
        find: String,
        #[serde(default)]
        replace: String,
    },
    /// Replace every regex match; `replace` may reference capture groups
    Regex {
        pattern: String,
        #[serde(default)]
        replace: String,
    },
    /// Replace everything from `start` through the next `end`, markers included
    Block {
        start: String,
        end: String,
        #[serde(default)]
        replace: String,
    },
}

impl RuleSpec {
    pub fn literal(find: impl Into<String>, replace: impl Into<String>) -> Self {
        RuleSpec::Literal {
            find: find.into(),
            replace: replace.into(),
        }
    }

    pub fn regex(pattern: impl Into<String>, replace: impl Into<String>) -> Self {
        RuleSpec::Regex {
            pattern: pattern.into(),
            replace: replace.into(),
        }
    }

    pub fn block(
        start: impl Into<String>,
        end: impl Into<String>,
        replace: impl Into<String>,
    ) -> Self {
        RuleSpec::Block {
            start: start.into(),
            end: end.into(),
            replace: replace.into(),
        }
    }

    /// Compile into an applicable rule
    pub fn compile(&self) -> Result<PatchRule> {
        Ok(match self {
            RuleSpec::Literal { find, replace } => PatchRule::Literal {
                find: find.clone(),
                replace: replace.clone(),
            },
            RuleSpec::Regex { pattern, replace } => PatchRule::Regex {
                regex: Regex::new(pattern).map_err(|source| SkillgenError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?,
                replace: replace.clone(),
            },
            RuleSpec::Block { start, end, replace } => PatchRule::Block {
                start: start.clone(),
                end: end.clone(),
                replace: replace.clone(),
            },
        })
    }
}

/// Compiled patch rule
#[derive(Debug, Clone)]
pub enum PatchRule {
    Literal { find: String, replace: String },
    Regex { regex: Regex, replace: String },
    Block { start: String, end: String, replace: String },
}

impl PatchRule {
    /// Apply this rule to `text`, returning the new text and the number of replacements
    pub fn apply(&self, text: &str) -> (String, usize) {
        match self {
            PatchRule::Literal { find, replace } => {
                if find.is_empty() {
                    return (text.to_string(), 0);
                }
                let count = text.matches(find.as_str()).count();
                if count == 0 {
                    (text.to_string(), 0)
                } else {
                    (text.replace(find.as_str(), replace), count)
                }
            }
            PatchRule::Regex { regex, replace } => {
                let count = regex.find_iter(text).count();
                if count == 0 {
                    (text.to_string(), 0)
                } else {
                    (regex.replace_all(text, replace.as_str()).into_owned(), count)
                }
            }
            PatchRule::Block { start, end, replace } => replace_blocks(text, start, end, replace),
        }
    }

    /// Short label for diagnostics
    pub fn describe(&self) -> String {
        match self {
            PatchRule::Literal { find, .. } => format!("literal {:?}", first_line(find)),
            PatchRule::Regex { regex, .. } => format!("regex /{}/", regex.as_str()),
            PatchRule::Block { start, end, .. } => {
                format!("block {:?}..{:?}", first_line(start), first_line(end))
            }
        }
    }
}

fn first_line(s: &str) -> &str {
    s.trim_start_matches('\n').lines().next().unwrap_or("")
}

/// Replace every non-overlapping `start..=end` section
fn replace_blocks(text: &str, start: &str, end: &str, replace: &str) -> (String, usize) {
    if start.is_empty() || end.is_empty() {
        return (text.to_string(), 0);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut count = 0;

    while let Some(start_pos) = rest.find(start) {
        let body_start = start_pos + start.len();
        let Some(end_offset) = rest[body_start..].find(end) else {
            break;
        };
        let block_end = body_start + end_offset + end.len();

        out.push_str(&rest[..start_pos]);
        out.push_str(replace);
        rest = &rest[block_end..];
        count += 1;
    }

    out.push_str(rest);
    (out, count)
}

/// Apply an ordered rule list to `text`
pub fn apply_rules<'a, I>(text: &str, rules: I) -> String
where
    I: IntoIterator<Item = &'a PatchRule>,
{
    rules
        .into_iter()
        .fold(text.to_string(), |current, rule| rule.apply(&current).0)
}
