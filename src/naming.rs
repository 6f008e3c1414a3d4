//! Branch naming and validation - pure functions
//!
//! Nothing here touches the repository. Names are composed from
//! pre-validated components and every check returns a [`ValidationResult`]
//! instead of an error, so interactive prompts can show the reason inline.

use crate::types::{BranchNameComponents, GitBranchRef, ValidationResult};
use chrono::Datelike;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::LazyLock;

/// Maximum description length, in characters
pub const MAX_DESCRIPTION_LEN: usize = 50;

/// Characters git refuses in ref names
const RESERVED_CHARS: &[char] = &['~', '^', ':', '?', '*', '[', ']', '\\'];

/// Unmerged two-letter status codes from `git status --porcelain`
const CONFLICT_CODES: &[&str] = &["UU", "AA", "DD", "AU", "UA", "DU", "UD"];

static DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_\-\p{Han}]+$").expect("description pattern is valid")
});

static PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\-]+$").expect("prefix pattern is valid"));

/// Date segment layout for generated branch names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DateFormat {
    /// `yyyyMMdd`, e.g. `20250101`
    #[default]
    Compact,
    /// `yyyy-MM-dd`, e.g. `2025-01-01`
    Dashed,
    /// `yyMMdd`, e.g. `250101`
    Short,
}

impl DateFormat {
    /// All supported layouts
    pub const ALL: [Self; 3] = [Self::Compact, Self::Dashed, Self::Short];

    /// Pattern string as written in configuration
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "yyyyMMdd",
            Self::Dashed => "yyyy-MM-dd",
            Self::Short => "yyMMdd",
        }
    }

    /// Parse a pattern string; unknown patterns fall back to `yyyyMMdd`
    pub fn parse_lenient(pattern: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == pattern.trim())
            .unwrap_or_default()
    }
}

impl From<String> for DateFormat {
    fn from(pattern: String) -> Self {
        Self::parse_lenient(&pattern)
    }
}

impl From<DateFormat> for String {
    fn from(format: DateFormat) -> Self {
        format.as_str().to_string()
    }
}

impl std::fmt::Display for DateFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render the date segment of a branch name
pub fn format_date<D: Datelike>(now: &D, format: DateFormat) -> String {
    let (year, month, day) = (now.year(), now.month(), now.day());
    match format {
        DateFormat::Compact => format!("{year:04}{month:02}{day:02}"),
        DateFormat::Dashed => format!("{year:04}-{month:02}-{day:02}"),
        DateFormat::Short => format!("{:02}{month:02}{day:02}", year.rem_euclid(100)),
    }
}

/// Check a free-text branch description
pub fn validate_description(description: &str) -> ValidationResult {
    if description.is_empty() {
        return ValidationResult::invalid("description cannot be empty");
    }
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return ValidationResult::invalid(format!(
            "description cannot be longer than {MAX_DESCRIPTION_LEN} characters"
        ));
    }
    if !DESCRIPTION_RE.is_match(description) {
        return ValidationResult::invalid(
            "description may only contain letters, digits, CJK characters, '_' and '-'",
        );
    }
    ValidationResult::valid()
}

/// Check a branch prefix
pub fn validate_prefix(prefix: &str) -> ValidationResult {
    if prefix.is_empty() {
        return ValidationResult::invalid("prefix cannot be empty");
    }
    if !PREFIX_RE.is_match(prefix) {
        return ValidationResult::invalid("prefix may only contain letters, digits, '_' and '-'");
    }
    ValidationResult::valid()
}

/// Check a full branch name against git ref syntax
pub fn validate_branch_name(name: &str) -> ValidationResult {
    if name.is_empty() {
        return ValidationResult::invalid("branch name cannot be empty");
    }
    if name.contains("//") {
        return ValidationResult::invalid("branch name cannot contain '//'");
    }
    if name.starts_with('/') || name.ends_with('/') {
        return ValidationResult::invalid("branch name cannot start or end with '/'");
    }
    if name.chars().any(char::is_whitespace) {
        return ValidationResult::invalid("branch name cannot contain whitespace");
    }
    if let Some(c) = name.chars().find(|c| RESERVED_CHARS.contains(c)) {
        return ValidationResult::invalid(format!("branch name cannot contain '{c}'"));
    }
    ValidationResult::valid()
}

/// Compose `prefix/date/description_author`
///
/// Pure template: components must already be validated. Identical inputs
/// always produce an identical name.
pub fn generate_branch_name(components: &BranchNameComponents) -> String {
    format!(
        "{}/{}/{}_{}",
        components.prefix, components.date, components.description, components.author
    )
}

/// Turn a git identity into a branch-name segment
///
/// Trims and collapses whitespace runs to `-`. Returns `None` if nothing remains.
pub fn normalize_author(raw: &str) -> Option<String> {
    let joined = raw.split_whitespace().collect::<Vec<_>>().join("-");
    (!joined.is_empty()).then_some(joined)
}

/// Whether a porcelain status line reports an unmerged path
pub fn is_conflict_status(line: &str) -> bool {
    line.get(..2).is_some_and(|code| CONFLICT_CODES.contains(&code))
}

const fn selection_rank(branch: &GitBranchRef) -> u8 {
    if branch.is_current {
        0
    } else if !branch.is_remote {
        1
    } else {
        2
    }
}

/// Order branches for the base-branch picker
///
/// Current branch first, then local branches, then remote ones; ties by name.
pub fn sort_branches_for_selection(branches: &mut [GitBranchRef]) {
    branches.sort_by(|a, b| match selection_rank(a).cmp(&selection_rank(b)) {
        Ordering::Equal => a.name.cmp(&b.name),
        other => other,
    });
}
