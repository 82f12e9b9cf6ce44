//! Page location and language filter buttons.
//!
//! Filter buttons redirect relative to the current page: a language button resolves
//! `?lang=<value>` (same path, new query) and the reset button resolves `/`.

use snippet_core_lang::{ALL_BUTTON_ID, LangQuery, LanguageFilter, normalize_lang_param};
use thiserror::Error;
use url::Url;

/// Location errors.
#[derive(Debug, Error)]
pub enum LocationError {
    /// The URL (or relative reference) could not be parsed.
    #[error("invalid URL '{input}': {source}")]
    Parse {
        /// The offending input.
        input: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
}

/// The current page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    url: Url,
}

impl Location {
    /// Parse an absolute URL.
    pub fn parse(input: &str) -> Result<Self, LocationError> {
        let url = Url::parse(input).map_err(|source| LocationError::Parse {
            input: input.to_string(),
            source,
        })?;
        Ok(Self { url })
    }

    /// Wrap an existing URL.
    pub fn from_url(url: Url) -> Self {
        Self { url }
    }

    /// The full URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The path component (`window.location.pathname`).
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// First value of query parameter `name`, percent-decoded.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// The interpreted `lang` query parameter.
    pub fn lang_query(&self) -> LangQuery {
        normalize_lang_param(self.query_param("lang").as_deref())
    }

    /// Resolve `href` against this location, as assigning `location.href` would.
    pub fn resolve(&self, href: &str) -> Result<Url, LocationError> {
        self.url.join(href).map_err(|source| LocationError::Parse {
            input: href.to_string(),
            source,
        })
    }
}

/// Where a filter button sends the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterTarget {
    /// Reset to the site root.
    All,
    /// Filter by a language.
    Language(LanguageFilter),
}

impl FilterTarget {
    /// The relative reference assigned to `location.href`.
    pub fn href(&self) -> String {
        match self {
            Self::All => "/".to_string(),
            Self::Language(filter) => format!("?lang={}", filter.query_value),
        }
    }
}

/// The filter button table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterButtons {
    filters: Vec<LanguageFilter>,
}

impl Default for FilterButtons {
    fn default() -> Self {
        Self::standard()
    }
}

impl FilterButtons {
    /// Buttons for an explicit list of filters (plus the reset button).
    pub fn new(filters: Vec<LanguageFilter>) -> Self {
        Self { filters }
    }

    /// The site's standard buttons.
    pub fn standard() -> Self {
        Self::new(snippet_core_lang::standard_filters())
    }

    /// The language filters, in display order.
    pub fn filters(&self) -> &[LanguageFilter] {
        &self.filters
    }

    /// Every button id handled: the reset button, then each filter's id and aliases.
    pub fn button_ids(&self) -> Vec<String> {
        let mut ids = vec![ALL_BUTTON_ID.to_string()];
        for filter in &self.filters {
            ids.push(filter.button_id.clone());
            ids.extend(filter.aliases.iter().cloned());
        }
        ids
    }

    /// Target of the button with element id `button_id`.
    pub fn target(&self, button_id: &str) -> Option<FilterTarget> {
        if button_id == ALL_BUTTON_ID {
            return Some(FilterTarget::All);
        }
        self.filters
            .iter()
            .find(|f| f.matches_button(button_id))
            .cloned()
            .map(FilterTarget::Language)
    }

    /// The URL a click on `button_id` navigates to, or `None` for an unknown button.
    pub fn navigate(
        &self,
        button_id: &str,
        location: &Location,
    ) -> Result<Option<Url>, LocationError> {
        let Some(target) = self.target(button_id) else {
            return Ok(None);
        };
        let url = location.resolve(&target.href())?;
        tracing::debug!(button = button_id, url = %url, "filter button navigation");
        Ok(Some(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(input: &str) -> Location {
        Location::parse(input).unwrap()
    }

    #[test]
    fn test_language_button_keeps_path_and_replaces_query() {
        let buttons = FilterButtons::standard();
        let here = location("http://localhost:5000/index.html?lang=sql");
        let url = buttons.navigate("python", &here).unwrap().unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/index.html?lang=python");
    }

    #[test]
    fn test_all_button_goes_to_root() {
        let buttons = FilterButtons::standard();
        let here = location("http://localhost:5000/index.html?lang=sql");
        let url = buttons.navigate("all", &here).unwrap().unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/");
    }

    #[test]
    fn test_mapped_and_aliased_buttons() {
        let buttons = FilterButtons::standard();
        let here = location("http://localhost/index.html");
        let js = buttons.navigate("js", &here).unwrap().unwrap();
        assert_eq!(js.query(), Some("lang=javascript"));
        let cpp = buttons.navigate("cpp", &here).unwrap().unwrap();
        assert_eq!(cpp.query(), Some("lang=c++"));
        assert!(buttons.navigate("rust", &here).unwrap().is_none());
    }

    #[test]
    fn test_button_ids() {
        let ids = FilterButtons::standard().button_ids();
        assert_eq!(ids[0], "all");
        assert!(ids.contains(&"cpp".to_string()));
        assert_eq!(ids.len(), 9);
    }

    #[test]
    fn test_location_accessors() {
        let here = location("http://localhost/index.html?lang=python&x=1");
        assert_eq!(here.path(), "/index.html");
        assert_eq!(here.query_param("x").as_deref(), Some("1"));
        assert_eq!(here.lang_query(), LangQuery::Language("PYTHON".to_string()));
        assert!(Location::parse("not a url").is_err());
    }
}
