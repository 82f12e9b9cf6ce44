//! Text search helpers.
//!
//! Terms are normalized from user input, then compiled once into a [`SearchPattern`] that the
//! highlighter runs over every text node. Match ranges are byte ranges into the searched `&str`
//! so text nodes can be split without re-scanning. Two matching modes exist:
//!
//! - literal (the term is escaped before compiling)
//! - pattern (the term is used as a regex as-is)

use regex::{Regex, RegexBuilder};
use std::ops::Range;
use thiserror::Error;

/// A normalized, non-empty search term.
///
/// Terms are built from raw user input by trimming surrounding whitespace and lowercasing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Normalize raw input. Returns `None` if nothing is left after trimming.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    /// The normalized term.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Options that control how a term is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    /// If `true`, performs a case-sensitive search.
    pub case_sensitive: bool,
    /// If `true`, treats the query as a regex pattern.
    pub regex: bool,
}

/// Search errors.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The provided regex pattern failed to compile.
    #[error("Invalid regex: {0}")]
    InvalidRegex(#[from] regex::Error),
}

/// A compiled query, reusable across many texts.
#[derive(Debug, Clone)]
pub struct SearchPattern {
    regex: Regex,
}

impl SearchPattern {
    /// Compile `query` according to `options`.
    ///
    /// With `options.regex == false` the query is escaped first, so characters such as `(` or
    /// `*` match literally.
    pub fn new(query: &str, options: SearchOptions) -> Result<Self, SearchError> {
        let pattern = if options.regex {
            query.to_string()
        } else {
            regex::escape(query)
        };

        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(!options.case_sensitive)
            .multi_line(true)
            .build()?;
        Ok(Self { regex })
    }

    /// All non-empty, non-overlapping matches in `text`, as byte ranges.
    pub fn byte_ranges(&self, text: &str) -> Vec<Range<usize>> {
        self.regex
            .find_iter(text)
            .filter(|m| m.start() != m.end())
            .map(|m| m.range())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(query: &str) -> SearchPattern {
        SearchPattern::new(query, SearchOptions::default()).unwrap()
    }

    fn pattern(query: &str) -> Result<SearchPattern, SearchError> {
        SearchPattern::new(
            query,
            SearchOptions {
                regex: true,
                ..SearchOptions::default()
            },
        )
    }

    #[test]
    fn test_search_term_normalization() {
        assert_eq!(SearchTerm::parse("  World \n").unwrap().as_str(), "world");
        assert!(SearchTerm::parse("   ").is_none());
        assert!(SearchTerm::parse("").is_none());
    }

    #[test]
    fn test_case_insensitive_substring() {
        let starts: Vec<usize> = literal("hello")
            .byte_ranges("Hello hello HELLO shello")
            .into_iter()
            .map(|r| r.start)
            .collect();
        assert_eq!(starts, vec![0, 6, 12, 19]);
    }

    #[test]
    fn test_case_sensitive_option() {
        let exact = SearchPattern::new(
            "Hello",
            SearchOptions {
                case_sensitive: true,
                ..SearchOptions::default()
            },
        )
        .unwrap();
        assert_eq!(exact.byte_ranges("hello Hello"), vec![6..11]);
    }

    #[test]
    fn test_literal_mode_escapes_metacharacters() {
        assert_eq!(literal("f(x)").byte_ranges("call f(x) or f*"), vec![5..9]);
        assert_eq!(literal("f*").byte_ranges("call f(x) or f*"), vec![13..15]);
    }

    #[test]
    fn test_pattern_mode_uses_query_as_regex() {
        assert_eq!(pattern("fx+").unwrap().byte_ranges("fx fxx f").len(), 2);

        let err = pattern("f(x").unwrap_err();
        assert!(matches!(err, SearchError::InvalidRegex(_)));
    }

    #[test]
    fn test_pattern_mode_skips_empty_matches() {
        assert!(pattern("z*").unwrap().byte_ranges("abc").is_empty());
    }

    #[test]
    fn test_byte_ranges_with_multibyte_text() {
        let text = "👋 WÖRLD";
        let ranges = literal("wörld").byte_ranges(text);
        assert_eq!(ranges, vec![5..11]);
        assert_eq!(&text[ranges[0].clone()], "WÖRLD");
    }
}
