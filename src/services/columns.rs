use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::AppError;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Which canonicalization a header goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeStyle {
    /// Collapse whitespace, trim, lower-case.
    Basic,
    /// `Basic`, with `-`, `/` and `\` also read as spaces.
    Separators,
}

/// Canonical form of a header. Total and idempotent for every input.
pub fn normalize_column_name(raw: &str, style: NormalizeStyle) -> String {
    let spaced = match style {
        NormalizeStyle::Basic => raw.to_string(),
        NormalizeStyle::Separators => raw.replace(['-', '/', '\\'], " "),
    };
    WHITESPACE
        .replace_all(&spaced, " ")
        .trim()
        .to_lowercase()
}

/// Normalizes a header row and keeps every column addressable: blank headers
/// become `unnamed_<index>` and repeats get a numeric suffix.
pub fn normalize_headers(raw: &[String], style: NormalizeStyle) -> Vec<String> {
    let mut existing_names = HashSet::new();
    raw.iter()
        .enumerate()
        .map(|(idx, name)| {
            let normalized = normalize_column_name(name, style);
            let base = if normalized.is_empty() {
                format!("unnamed_{}", idx)
            } else {
                normalized
            };

            let mut cleaned = base.clone();
            let mut counter = 1;
            while !existing_names.insert(cleaned.clone()) {
                cleaned = format!("{}_{}", base, counter);
                counter += 1;
            }
            if cleaned != base {
                tracing::warn!("Duplicate column '{}' renamed to '{}'", base, cleaned);
            }
            cleaned
        })
        .collect()
}

pub const TEXT_COLUMN_ALIASES: &[&str] = &[
    "commenttextenglish",
    "comment_text_english",
    "commenttext",
    "comment",
    "comments",
    "feedbackdescription",
    "feedback",
    "text",
    "review",
    "comment english",
    "comment_english",
];

pub const TEXT_COLUMN_KEYWORDS: &[&str] = &[
    "commenttextenglish",
    "commenttext",
    "comments",
    "comment",
    "feedback",
    "review",
    "text",
];

pub const GENERIC_TEXT_KEYWORDS: &[&str] = &["comment", "feedback", "text", "review"];

/// One step of text-column detection.
#[derive(Debug, Clone, Copy)]
pub enum MatchRule {
    /// First alias, in list order, that is exactly a column name.
    ExactAlias(&'static [&'static str]),
    /// For each keyword in order, the first column containing it.
    KeywordInOrder(&'static [&'static str]),
    /// First column containing any of the keywords.
    AnyKeyword(&'static [&'static str]),
}

impl MatchRule {
    pub fn find<'a>(&self, columns: &'a [String]) -> Option<&'a String> {
        match self {
            MatchRule::ExactAlias(aliases) => aliases
                .iter()
                .find_map(|alias| columns.iter().find(|col| col.as_str() == *alias)),
            MatchRule::KeywordInOrder(keywords) => keywords
                .iter()
                .find_map(|kw| columns.iter().find(|col| col.contains(kw))),
            MatchRule::AnyKeyword(keywords) => columns
                .iter()
                .find(|col| keywords.iter().any(|kw| col.contains(kw))),
        }
    }
}

/// Ordered rule list; the first rule with a hit decides.
#[derive(Debug, Clone)]
pub struct ColumnSelector {
    rules: Vec<MatchRule>,
}

impl Default for ColumnSelector {
    fn default() -> Self {
        Self {
            rules: vec![
                MatchRule::ExactAlias(TEXT_COLUMN_ALIASES),
                MatchRule::KeywordInOrder(TEXT_COLUMN_KEYWORDS),
                MatchRule::AnyKeyword(GENERIC_TEXT_KEYWORDS),
            ],
        }
    }
}

impl ColumnSelector {
    pub fn with_rules(rules: Vec<MatchRule>) -> Self {
        Self { rules }
    }

    /// Picks the free-text column among already-normalized names.
    pub fn select(&self, columns: &[String]) -> Result<String, AppError> {
        for rule in &self.rules {
            if let Some(col) = rule.find(columns) {
                tracing::debug!("Text column '{}' matched by {:?}", col, rule);
                return Ok(col.clone());
            }
        }
        Err(AppError::ColumnNotFound {
            available: columns.to_vec(),
        })
    }
}

/// Structured lookup: the normalized form of `wanted` must be present.
pub fn require_column(columns: &[String], wanted: &str, style: NormalizeStyle) -> Result<String, AppError> {
    let target = normalize_column_name(wanted, style);
    if columns.iter().any(|col| *col == target) {
        Ok(target)
    } else {
        Err(AppError::MissingColumn {
            column: target,
            available: columns.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn basic_normalization_trims_collapses_and_lowercases() {
        assert_eq!(
            normalize_column_name("  Feedback \t\n Description ", NormalizeStyle::Basic),
            "feedback description"
        );
        assert_eq!(normalize_column_name("Rating-1/5", NormalizeStyle::Basic), "rating-1/5");
    }

    #[test]
    fn separator_normalization_replaces_separators() {
        assert_eq!(
            normalize_column_name("Comment - Text/English\\Raw", NormalizeStyle::Separators),
            "comment text english raw"
        );
        assert_eq!(normalize_column_name("-Leading", NormalizeStyle::Separators), "leading");
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "",
            "   ",
            "Comment Text (English)",
            "a - b",
            "\\/-",
            "MiXeD\tCase\r\nHeader",
            "Ünïcödé  Straße",
            "already normal",
        ];
        for style in [NormalizeStyle::Basic, NormalizeStyle::Separators] {
            for raw in samples {
                let once = normalize_column_name(raw, style);
                assert_eq!(normalize_column_name(&once, style), once, "{:?} / {:?}", raw, style);
            }
        }
    }

    #[test]
    fn headers_are_deduplicated_and_blank_ones_named() {
        let headers = normalize_headers(
            &cols(&["Comment", "comment ", "", "COMMENT"]),
            NormalizeStyle::Basic,
        );
        assert_eq!(headers, cols(&["comment", "comment_1", "unnamed_2", "comment_2"]));
    }

    #[test]
    fn selector_prefers_comment_column_over_id() {
        let columns = normalize_headers(&cols(&["Comment Text (English)", "ID"]), NormalizeStyle::Separators);
        let chosen = ColumnSelector::default().select(&columns).unwrap();
        assert_eq!(chosen, "comment text (english)");
    }

    #[test]
    fn exact_alias_beats_earlier_substring_match() {
        let columns = cols(&["customer comment notes", "review"]);
        assert_eq!(ColumnSelector::default().select(&columns).unwrap(), "review");
    }

    #[test]
    fn alias_order_decides_between_exact_matches() {
        let columns = cols(&["text", "comment"]);
        assert_eq!(ColumnSelector::default().select(&columns).unwrap(), "comment");
    }

    #[test]
    fn keyword_priority_decides_substring_matches() {
        let columns = cols(&["review body", "feedback given"]);
        assert_eq!(ColumnSelector::default().select(&columns).unwrap(), "feedback given");
    }

    #[test]
    fn table_order_breaks_ties_within_a_keyword() {
        let columns = cols(&["first comment", "second comment"]);
        assert_eq!(ColumnSelector::default().select(&columns).unwrap(), "first comment");
    }

    #[test]
    fn generic_fallback_runs_last() {
        let selector = ColumnSelector::with_rules(vec![MatchRule::AnyKeyword(GENERIC_TEXT_KEYWORDS)]);
        let columns = cols(&["id", "texture", "feedbacks"]);
        assert_eq!(selector.select(&columns).unwrap(), "texture");
    }

    #[test]
    fn no_match_lists_exactly_the_given_columns() {
        let columns = cols(&["id", "date", "rating"]);
        match ColumnSelector::default().select(&columns) {
            Err(AppError::ColumnNotFound { available }) => assert_eq!(available, columns),
            other => panic!("expected ColumnNotFound, got {:?}", other),
        }
    }

    #[test]
    fn require_column_matches_after_normalization() {
        let columns = cols(&["id", "feedbackdescription"]);
        assert_eq!(
            require_column(&columns, "FeedbackDescription", NormalizeStyle::Basic).unwrap(),
            "feedbackdescription"
        );

        let err = require_column(&columns, "Notes", NormalizeStyle::Basic).unwrap_err();
        assert_eq!(err.available_columns(), Some(columns.as_slice()));
    }
}
