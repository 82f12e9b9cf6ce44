//! In-page search highlighting.
//!
//! Highlighting is a clear-then-apply transform over a content root:
//!
//! 1. every existing marker element under the root is unwrapped in place, and the text it split
//!    is merged back together;
//! 2. every text node under the root whose parent is not a skipped container (`script`, `style`)
//!    is matched against the term;
//! 3. each matching text node is replaced by the ordered run of plain text and marker elements.
//!
//! Because step 1 always runs first, highlighting the same term twice produces the same tree.

use crate::dom::{Attribute, Document, DocumentError, NodeId};
use crate::search::{SearchError, SearchOptions, SearchPattern, SearchTerm};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// How the search term is turned into a matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// The term matches literally; regex metacharacters are escaped.
    #[default]
    Literal,
    /// The term is used as a regex pattern as-is. Invalid patterns are reported as errors.
    Pattern,
}

/// Highlighter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Tag of the marker element.
    pub marker_tag: String,
    /// Class identifying marker elements.
    pub marker_class: String,
    /// Text whose immediate parent has one of these tags is never rewritten.
    pub skip_tags: Vec<String>,
    /// How the term is matched.
    pub match_mode: MatchMode,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            marker_tag: "span".to_string(),
            marker_class: "highlight".to_string(),
            skip_tags: vec!["script".to_string(), "style".to_string()],
            match_mode: MatchMode::Literal,
        }
    }
}

/// Summary of one highlight pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightReport {
    /// Markers removed before matching.
    pub cleared: usize,
    /// Markers inserted.
    pub matches: usize,
    /// Text nodes replaced by marked runs.
    pub text_nodes_rewritten: usize,
}

/// Errors produced by a highlight pass.
#[derive(Debug, Error)]
pub enum HighlightError {
    /// The term could not be compiled (pattern mode only).
    #[error(transparent)]
    Search(#[from] SearchError),
    /// The content root is not part of the document, or a structural edit failed.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Applies and clears search highlight markers.
#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    config: HighlightConfig,
}

impl Highlighter {
    /// Create a highlighter with the given settings.
    pub fn new(config: HighlightConfig) -> Self {
        Self { config }
    }

    /// The active settings.
    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    /// Returns `true` if `id` is a marker element produced by this highlighter.
    pub fn is_marker(&self, doc: &Document, id: NodeId) -> bool {
        doc.element(id).is_some_and(|e| {
            e.tag.eq_ignore_ascii_case(&self.config.marker_tag)
                && e.has_class(&self.config.marker_class)
        })
    }

    fn is_skipped_container(&self, doc: &Document, id: NodeId) -> bool {
        doc.tag_name(id).is_some_and(|tag| {
            self.config
                .skip_tags
                .iter()
                .any(|skip| skip.eq_ignore_ascii_case(tag))
        })
    }

    fn markers_under(&self, doc: &Document, root: NodeId) -> Vec<NodeId> {
        doc.descendants(root)
            .filter(|&n| self.is_marker(doc, n))
            .collect()
    }

    fn searchable_text_under(&self, doc: &Document, root: NodeId) -> Vec<NodeId> {
        doc.descendants(root)
            .filter(|&n| doc.is_text(n))
            .filter(|&n| {
                doc.parent(n)
                    .is_none_or(|parent| !self.is_skipped_container(doc, parent))
            })
            .collect()
    }

    /// Unwrap every marker under `root`, restoring its contents as plain text in place.
    ///
    /// Unwrapped markers and the text nodes merged away are freed from the document. Returns the
    /// number of markers removed.
    pub fn clear(&self, doc: &mut Document, root: NodeId) -> Result<usize, DocumentError> {
        if !doc.contains(root) {
            return Err(DocumentError::UnknownNode(root));
        }
        let markers = self.markers_under(doc, root);

        let mut touched: BTreeSet<NodeId> = BTreeSet::new();
        for &marker in markers.iter().rev() {
            let Some(parent) = doc.parent(marker) else {
                continue;
            };
            let contents = doc.children(marker).to_vec();
            doc.replace_with(marker, &contents)?;
            doc.remove(marker)?;
            touched.insert(parent);
        }
        // A nested marker's parent may itself have been unwrapped and freed.
        for parent in touched {
            if doc.contains(parent) {
                doc.merge_adjacent_text(parent)?;
            }
        }

        if !markers.is_empty() {
            tracing::debug!(cleared = markers.len(), "cleared search highlights");
        }
        Ok(markers.len())
    }

    /// Highlight every occurrence of `term` in the text under `root`.
    pub fn highlight(
        &self,
        doc: &mut Document,
        root: NodeId,
        term: &SearchTerm,
    ) -> Result<HighlightReport, HighlightError> {
        let options = SearchOptions {
            case_sensitive: false,
            regex: self.config.match_mode == MatchMode::Pattern,
        };
        // Compile before touching the tree so a bad pattern leaves the page as it was.
        let pattern = SearchPattern::new(term.as_str(), options)?;

        let cleared = self.clear(doc, root)?;
        let mut report = HighlightReport {
            cleared,
            ..HighlightReport::default()
        };

        let candidates = self.searchable_text_under(doc, root);

        for node in candidates {
            let Some(text) = doc.text(node).map(str::to_owned) else {
                continue;
            };
            let ranges = pattern.byte_ranges(&text);
            if ranges.is_empty() {
                continue;
            }

            let mut replacements: Vec<NodeId> = Vec::with_capacity(ranges.len() * 2 + 1);
            let mut last = 0;
            for range in &ranges {
                if range.start > last {
                    replacements.push(doc.create_text(&text[last..range.start]));
                }
                replacements.push(self.create_marker(doc, &text[range.clone()])?);
                last = range.end;
            }
            if last < text.len() {
                replacements.push(doc.create_text(&text[last..]));
            }

            doc.replace_with(node, &replacements)?;
            doc.remove(node)?;
            report.matches += ranges.len();
            report.text_nodes_rewritten += 1;
        }

        tracing::debug!(
            term = %term,
            cleared = report.cleared,
            matches = report.matches,
            nodes = report.text_nodes_rewritten,
            "applied search highlights"
        );
        Ok(report)
    }

    /// Normalize raw input and highlight it.
    ///
    /// Returns `Ok(None)` without touching the document when the input is empty after trimming.
    pub fn highlight_input(
        &self,
        doc: &mut Document,
        root: NodeId,
        raw: &str,
    ) -> Result<Option<HighlightReport>, HighlightError> {
        match SearchTerm::parse(raw) {
            Some(term) => self.highlight(doc, root, &term).map(Some),
            None => Ok(None),
        }
    }

    fn create_marker(&self, doc: &mut Document, text: &str) -> Result<NodeId, DocumentError> {
        let marker = doc.create_element_with_attrs(
            self.config.marker_tag.clone(),
            vec![Attribute::new("class", self.config.marker_class.clone())],
        );
        let inner = doc.create_text(text);
        doc.append_child(marker, inner)?;
        Ok(marker)
    }
}

/// Highlight `search_term` under `root` with the default settings.
pub fn highlight(
    doc: &mut Document,
    root: NodeId,
    search_term: &str,
) -> Result<Option<HighlightReport>, HighlightError> {
    Highlighter::default().highlight_input(doc, root, search_term)
}

/// Remove default-style markers under `root`.
pub fn clear_highlights(doc: &mut Document, root: NodeId) -> Result<usize, DocumentError> {
    Highlighter::default().clear(doc, root)
}
