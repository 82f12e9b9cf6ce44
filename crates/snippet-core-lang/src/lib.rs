#![warn(missing_docs)]
//! `snippet-core-lang` - data-driven language filter configuration for `snippet-core`.
//!
//! This crate intentionally stays lightweight and does **not** depend on URL or DOM types. It
//! provides the fixed table of language filters offered by the site, plus the rules used to
//! interpret an incoming `lang` query parameter.

/// The button id of the "show everything" reset filter.
pub const ALL_BUTTON_ID: &str = "all";

/// A single language filter offered by the site.
///
/// Each filter is bound to one button in the page; clicking it redirects to the current page with
/// `?lang=<query_value>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageFilter {
    /// Element id of the button in the page (e.g. `python`, `c++`).
    pub button_id: String,
    /// Value sent in the `lang` query parameter (e.g. `javascript` for the `js` button).
    pub query_value: String,
    /// Human readable label.
    pub label: String,
    /// Additional button ids that trigger the same filter.
    pub aliases: Vec<String>,
}

impl LanguageFilter {
    /// Create a filter whose button id and query value are the same token.
    pub fn simple(token: impl Into<String>, label: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            button_id: token.clone(),
            query_value: token,
            label: label.into(),
            aliases: Vec::new(),
        }
    }

    /// Create a filter whose query value differs from its button id.
    pub fn mapped(
        button_id: impl Into<String>,
        query_value: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            button_id: button_id.into(),
            query_value: query_value.into(),
            label: label.into(),
            aliases: Vec::new(),
        }
    }

    /// Add an alias button id.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Returns `true` if `id` names this filter's button (or one of its aliases).
    pub fn matches_button(&self, id: &str) -> bool {
        self.button_id == id || self.aliases.iter().any(|a| a == id)
    }
}

/// The language filters shown on the snippet index page, in display order.
pub fn standard_filters() -> Vec<LanguageFilter> {
    vec![
        LanguageFilter::simple("python", "Python"),
        LanguageFilter::simple("c++", "C++").with_alias("cpp"),
        LanguageFilter::simple("bash", "Bash"),
        LanguageFilter::simple("sql", "SQL"),
        LanguageFilter::simple("html", "HTML"),
        LanguageFilter::simple("css", "CSS"),
        LanguageFilter::mapped("js", "javascript", "JavaScript"),
    ]
}

/// Look up a standard filter by button id (aliases included).
pub fn find_filter(button_id: &str) -> Option<LanguageFilter> {
    standard_filters()
        .into_iter()
        .find(|f| f.matches_button(button_id))
}

/// The interpreted value of a `lang` query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LangQuery {
    /// No usable filter; every snippet is listed.
    All,
    /// Filter by the given language, uppercased.
    Language(String),
}

impl LangQuery {
    /// Returns the language if this is a concrete filter.
    pub fn language(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Language(lang) => Some(lang),
        }
    }
}

/// Interpret a raw `lang` query parameter.
///
/// Only non-empty, purely alphabetic values select a language; the value is uppercased. Anything
/// else (missing, empty, `c++`, digits, whitespace) falls back to [`LangQuery::All`].
pub fn normalize_lang_param(raw: Option<&str>) -> LangQuery {
    match raw {
        Some(value) if !value.is_empty() && value.chars().all(char::is_alphabetic) => {
            LangQuery::Language(value.to_uppercase())
        }
        _ => LangQuery::All,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_filters_cover_site_buttons() {
        let ids: Vec<String> = standard_filters()
            .into_iter()
            .map(|f| f.button_id)
            .collect();
        assert_eq!(ids, vec!["python", "c++", "bash", "sql", "html", "css", "js"]);
    }

    #[test]
    fn test_js_button_maps_to_javascript() {
        let filter = find_filter("js").unwrap();
        assert_eq!(filter.query_value, "javascript");
    }

    #[test]
    fn test_cpp_alias() {
        let filter = find_filter("cpp").unwrap();
        assert_eq!(filter.button_id, "c++");
        assert_eq!(filter.query_value, "c++");
        assert!(find_filter("rust").is_none());
        assert!(find_filter(ALL_BUTTON_ID).is_none());
    }

    #[test]
    fn test_normalize_lang_param() {
        assert_eq!(
            normalize_lang_param(Some("python")),
            LangQuery::Language("PYTHON".to_string())
        );
        assert_eq!(normalize_lang_param(Some("c++")), LangQuery::All);
        assert_eq!(normalize_lang_param(Some("")), LangQuery::All);
        assert_eq!(normalize_lang_param(Some("py3")), LangQuery::All);
        assert_eq!(normalize_lang_param(None), LangQuery::All);
        assert_eq!(normalize_lang_param(Some("Sql")).language(), Some("SQL"));
    }
}
