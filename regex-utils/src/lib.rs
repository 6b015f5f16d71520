//! Regex utilities for ds-export
//! Extracted to a separate crate for compilation optimization

use once_cell::sync::Lazy;
use regex::Regex;

/// Block header patterns used to classify `{ ... }` blocks in a .ds export
pub mod headers {
    use super::*;

    pub static FORM: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^form\s+(\w+)\s*$").expect("Invalid regex pattern")
    });

    pub static PAGE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^page\s+(\w+)\s*$").expect("Invalid regex pattern")
    });

    pub static REPORT: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"^(default\s+list|list|summary|pivotchart|pivot|chart|calendar|timeline|kanban|map|htmlview|tabular|matrix)\s+(\w+)\s*$",
        )
        .expect("Invalid regex pattern")
    });

    pub static WORKFLOW: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r#"^(\w+)\s+as\s+"([^"]+)"\s*$"#).expect("Invalid regex pattern")
    });

    pub static EVENT: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^on\s+(.+?)\s*$").expect("Invalid regex pattern")
    });

    /// `<return type> [<namespace>.]<name>(<params>)`; the return type is
    /// checked against the configured list by the caller.
    pub static FUNCTION: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"(?s)^([A-Za-z]+)\s+((?:[A-Za-z_][A-Za-z0-9_]*\.)?[A-Za-z_][A-Za-z0-9_]*)\s*\((.*)\)\s*$",
        )
        .expect("Invalid regex pattern")
    });

    /// Normalize a report type such as `default   list` to `default list`
    pub fn report_type(raw: &str) -> String {
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// `key = value` attribute lines
pub mod attributes {
    use super::*;

    pub static ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^([A-Za-z][A-Za-z0-9_ ]*?)\s*=\s*(.*?)\s*$").expect("Invalid regex pattern")
    });

    /// Parse a single line into a `(key, value)` pair
    pub fn parse_line(line: &str) -> Option<(String, String)> {
        let caps = ASSIGNMENT.captures(line.trim())?;
        let key = caps.get(1)?.as_str().trim().to_string();
        let value = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
        Some((key, value))
    }

    /// Strip one level of surrounding double quotes
    pub fn unquote(value: &str) -> &str {
        let value = value.trim();
        if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
            &value[1..value.len() - 1]
        } else {
            value
        }
    }
}

/// Form field header lines (`Name` or `must have Name` on a line of its own)
pub mod form_fields {
    use super::*;

    pub static FIELD_HEADER: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?m)^[ \t]*(must[ \t]+have[ \t]+)?([A-Za-z_][A-Za-z0-9_]*)[ \t]*\r?$")
            .expect("Invalid regex pattern")
    });
}

/// Report body patterns
pub mod reports {
    use super::*;

    pub static SHOW_ROWS: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"show\s+(?:all\s+)?rows\s+from\s+([A-Za-z0-9_]+)").expect("Invalid regex pattern")
    });

    pub static FIELD_LINE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r#"^([A-Za-z0-9_.]+)(?:\s+as\s+"([^"]*)")?$"#).expect("Invalid regex pattern")
    });

    pub static CUSTOM_ACTIONS: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\bcustom actions\s*\(").expect("Invalid regex pattern")
    });

    pub static ACTION_LABEL: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r#"(?m)^\s*"([^"]+)"\s*\("#).expect("Invalid regex pattern")
    });

    pub static INLINE_ACTION: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r#"\bcustom action\s+"([^"]+)"\s*\("#).expect("Invalid regex pattern")
    });

    pub static WORKFLOW_REF: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\bworkflow\s*=\s*([A-Za-z0-9_]+)").expect("Invalid regex pattern")
    });

    pub static FILTERS: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?m)^\s*filters\s*\(").expect("Invalid regex pattern")
    });

    pub static SORT_BY: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?m)^\s*sort\s+by\s*\(").expect("Invalid regex pattern")
    });

    pub static GROUP_BY: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?m)^\s*group\s+by\s*\(").expect("Invalid regex pattern")
    });
}

/// ZML page markup patterns
pub mod zml {
    use super::*;

    pub static CONTENT: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r#"\bContent\s*=\s*""#).expect("Invalid regex pattern")
    });

    pub static TAG: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"<([A-Za-z]+)\b([^>]*)>").expect("Invalid regex pattern")
    });

    pub static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"([A-Za-z_]+)\s*=\s*'([^']*)'").expect("Invalid regex pattern")
    });

    /// Attributes of a tag in source order
    pub fn attributes(raw: &str) -> Vec<(String, String)> {
        ATTRIBUTE
            .captures_iter(raw)
            .map(|caps| (caps[1].to_string(), caps[2].to_string()))
            .collect()
    }
}

/// Whitespace normalization
pub mod whitespace {
    use super::*;

    pub static RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("Invalid regex pattern"));

    /// Collapse every whitespace run to a single space and trim the ends
    pub fn collapse(text: &str) -> String {
        RUN.replace_all(text.trim(), " ").into_owned()
    }
}
