//! @acp:module "Frontmatter"
//! @acp:summary "Remove a top-level key block from a document's YAML frontmatter"
//! @acp:domain cli
//! @acp:layer service
//!
//! Works on lines, not on a YAML tree, so everything outside the removed
//! block (key order, comments, quoting, the body) stays byte-identical.

use std::ops::Range;

/// Frontmatter delimiter line
pub const DELIMITER: &str = "---";

/// Key stripped from every primary document
pub const METADATA_KEY: &str = "metadata";

/// Byte range of the header content, between the two delimiter lines
///
/// Returns `None` if the document does not start with a delimiter line or
/// the header is never closed.
pub fn header_range(document: &str) -> Option<Range<usize>> {
    let mut lines = document.split_inclusive('\n');
    let first = lines.next()?;
    if trim_eol(first) != DELIMITER {
        return None;
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        if trim_eol(line) == DELIMITER {
            return Some(start..offset);
        }
        offset += line.len();
    }
    None
}

/// Header content without delimiters, if the document has one
pub fn header(document: &str) -> Option<&str> {
    header_range(document).map(|range| &document[range])
}

/// Whether the header declares `key` at the top level
pub fn has_key(document: &str, key: &str) -> bool {
    header(document)
        .map(|h| h.split_inclusive('\n').any(|line| is_key_line(line, key)))
        .unwrap_or(false)
}

/// Remove the top-level `key` and its nested block from the frontmatter
///
/// Documents without frontmatter, or whose frontmatter lacks the key, are
/// returned unchanged.
pub fn strip_key(document: &str, key: &str) -> String {
    let Some(range) = header_range(document) else {
        return document.to_string();
    };

    let header = &document[range.clone()];
    let mut kept = String::with_capacity(header.len());
    let mut pending_blank = String::new();
    let mut removing = false;

    for line in header.split_inclusive('\n') {
        if removing {
            if trim_eol(line).trim().is_empty() {
                pending_blank.push_str(line);
                continue;
            }
            if is_nested_line(line) {
                pending_blank.clear();
                continue;
            }
            removing = false;
            kept.push_str(&pending_blank);
            pending_blank.clear();
        }

        if is_key_line(line, key) {
            removing = true;
            continue;
        }
        kept.push_str(line);
    }
    kept.push_str(&pending_blank);

    let mut out = String::with_capacity(document.len());
    out.push_str(&document[..range.start]);
    out.push_str(&kept);
    out.push_str(&document[range.end..]);
    out
}

fn trim_eol(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

fn is_key_line(line: &str, key: &str) -> bool {
    let line = trim_eol(line);
    match line.strip_prefix(key).and_then(|rest| rest.strip_prefix(':')) {
        Some(rest) => rest.is_empty() || rest.starts_with([' ', '\t']),
        None => false,
    }
}

fn is_nested_line(line: &str) -> bool {
    line.starts_with([' ', '\t']) || line.starts_with("- ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKILL: &str = "---\nname: speckit-plan\ndescription: Plan the feature\nmetadata:\n  author: github-spec-kit\n  source: templates/commands/plan.md\ncompatibility: Requires spec-kit\n---\n\n# Plan\n\nmetadata:\n  not: frontmatter\n";

    fn parse_header(document: &str) -> serde_yaml::Mapping {
        serde_yaml::from_str(header(document).unwrap()).unwrap()
    }

    #[test]
    fn test_header_range() {
        let doc = "---\nname: x\n---\nbody\n";
        assert_eq!(header(doc), Some("name: x\n"));
        assert_eq!(header("no header\n"), None);
        assert_eq!(header("---\nname: x\nunterminated\n"), None);
    }

    #[test]
    fn test_strip_removes_exactly_the_block() {
        let out = strip_key(SKILL, METADATA_KEY);
        assert_eq!(
            out,
            "---\nname: speckit-plan\ndescription: Plan the feature\ncompatibility: Requires spec-kit\n---\n\n# Plan\n\nmetadata:\n  not: frontmatter\n"
        );

        let mapping = parse_header(&out);
        assert!(mapping.get("metadata").is_none());
        assert_eq!(mapping.len(), 3);
    }

    #[test]
    fn test_strip_absent_key_is_noop() {
        let doc = "---\nname: speckit-analyze\ndescription: Analyze\n---\nBody metadata:\n";
        assert_eq!(strip_key(doc, METADATA_KEY), doc);
        assert!(!has_key(doc, METADATA_KEY));
    }

    #[test]
    fn test_strip_without_frontmatter_is_noop() {
        let doc = "# Title\nmetadata:\n  a: b\n";
        assert_eq!(strip_key(doc, METADATA_KEY), doc);
    }

    #[test]
    fn test_strip_is_idempotent() {
        let once = strip_key(SKILL, METADATA_KEY);
        assert_eq!(strip_key(&once, METADATA_KEY), once);
    }

    #[test]
    fn test_strip_last_key_keeps_closing_delimiter() {
        let doc = "---\nname: x\nmetadata:\n  author: me\n---\nbody\n";
        assert_eq!(strip_key(doc, METADATA_KEY), "---\nname: x\n---\nbody\n");
    }

    #[test]
    fn test_strip_inline_value_and_crlf() {
        let doc = "---\r\nmetadata: {author: me}\r\nname: x\r\n---\r\nbody\r\n";
        assert_eq!(strip_key(doc, METADATA_KEY), "---\r\nname: x\r\n---\r\nbody\r\n");
    }

    #[test]
    fn test_strip_nested_block_with_blank_line() {
        let doc = "---\nmetadata:\n  author: me\n\n  source: x\n\nname: y\n---\n";
        let out = strip_key(doc, METADATA_KEY);
        assert_eq!(out, "---\n\nname: y\n---\n");
        assert_eq!(parse_header(&out).len(), 1);
    }

    #[test]
    fn test_similar_key_names_untouched() {
        let doc = "---\nmetadata_version: 2\nmetadatax:\n  a: b\n---\n";
        assert_eq!(strip_key(doc, METADATA_KEY), doc);
        assert!(!has_key(doc, METADATA_KEY));
    }

    #[test]
    fn test_has_key() {
        assert!(has_key(SKILL, "metadata"));
        assert!(has_key(SKILL, "compatibility"));
        assert!(!has_key(SKILL, "not"));
    }
}
