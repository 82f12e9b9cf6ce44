//! Navigation link active state.
//!
//! A nav link is "active" when its `href` attribute equals the current page path exactly. Active
//! links carry the active class and `aria-current="page"`; every other link has both removed.

use crate::dom::{Document, NodeId};
use serde::{Deserialize, Serialize};

/// Class names used by the navigation bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Class identifying navigation links.
    pub link_class: String,
    /// Class added to the link for the current page.
    pub active_class: String,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            link_class: "nav-link".to_string(),
            active_class: "active".to_string(),
        }
    }
}

/// Result of a nav marking pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavReport {
    /// Links marked active.
    pub active: Vec<NodeId>,
    /// Links marked inactive.
    pub inactive: Vec<NodeId>,
}

/// Toggle active state on every nav link for `current_path`.
pub fn mark_active_nav_links(
    doc: &mut Document,
    current_path: &str,
    config: &NavConfig,
) -> NavReport {
    let mut report = NavReport::default();
    for link in doc.elements_by_class(&config.link_class) {
        let Some(element) = doc.element_mut(link) else {
            continue;
        };
        if element.attr("href") == Some(current_path) {
            element.add_class(&config.active_class);
            element.set_attr("aria-current", "page");
            report.active.push(link);
        } else {
            element.remove_class(&config.active_class);
            element.remove_attr("aria-current");
            report.inactive.push(link);
        }
    }
    tracing::debug!(
        path = current_path,
        active = report.active.len(),
        inactive = report.inactive.len(),
        "marked nav links"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAV: &str = "<nav>\
        <a class=\"nav-link active\" aria-current=\"page\" href=\"/index.html\">Home</a>\
        <a class=\"nav-link\" href=\"/add.html\">Add</a>\
        <a class=\"nav-link\" href=\"/privacy.html\">Privacy</a>\
        <a href=\"/add.html\">Footer</a>\
        </nav>";

    #[test]
    fn test_marks_only_matching_link() {
        let mut doc = Document::parse_html(NAV);
        let report = mark_active_nav_links(&mut doc, "/add.html", &NavConfig::default());
        assert_eq!(report.active.len(), 1);
        assert_eq!(report.inactive.len(), 2);

        let add = doc.element(report.active[0]).unwrap();
        assert_eq!(add.attr("class"), Some("nav-link active"));
        assert_eq!(add.attr("aria-current"), Some("page"));

        let links = doc.elements_by_class("nav-link");
        let home = doc.element(links[0]).unwrap();
        assert_eq!(home.attr("class"), Some("nav-link"));
        assert_eq!(home.attr("aria-current"), None);

        let anchors = doc.elements_by_tag("a");
        let footer = doc.element(anchors[3]).unwrap();
        assert_eq!(footer.attr("aria-current"), None);
        assert_eq!(footer.attr("class"), None);
    }

    #[test]
    fn test_no_match_clears_everything() {
        let mut doc = Document::parse_html(NAV);
        let report = mark_active_nav_links(&mut doc, "/", &NavConfig::default());
        assert!(report.active.is_empty());
        assert_eq!(report.inactive.len(), 3);
        assert!(!doc.to_html().contains("aria-current"));
    }
}
