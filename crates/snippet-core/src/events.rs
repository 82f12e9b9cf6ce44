//! Event wiring for a page.
//!
//! Handlers are installed by an explicit registration pass ([`SiteScript::install`]) into a
//! [`HandlerTable`] keyed by event target and event kind. [`Page::dispatch`] then looks up and
//! runs the registered actions against the page's document and location.

use crate::config::SiteConfig;
use crate::dom::{Document, NodeId};
use crate::filters::{FilterButtons, Location};
use crate::highlight::{HighlightReport, Highlighter};
use crate::nav::{NavReport, mark_active_nav_links};
use crate::service_worker::{RegistrationOutcome, ServiceWorkerHost, register_service_worker};
use std::collections::BTreeMap;
use url::Url;

/// Kinds of events a page reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    /// `window` finished loading.
    Load,
    /// The document was parsed.
    DomContentLoaded,
    /// A form was submitted.
    Submit,
    /// An element was clicked.
    Click,
}

/// Where an event is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventTarget {
    /// The window.
    Window,
    /// The document.
    Document,
    /// The element with this id.
    Element(String),
}

impl EventTarget {
    /// Shorthand for [`EventTarget::Element`].
    pub fn element(id: impl Into<String>) -> Self {
        Self::Element(id.into())
    }
}

/// A registered handler body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Register the service worker script.
    RegisterServiceWorker,
    /// Toggle nav link active state for the current path.
    MarkActiveNav,
    /// Read the input with this id and highlight its value in the body.
    HighlightSearch {
        /// Id of the search input element.
        input_id: String,
    },
    /// Navigate according to the filter button with this id.
    Navigate {
        /// Id of the clicked button.
        button_id: String,
    },
}

/// Explicit registry of `(target, event) -> actions`.
#[derive(Debug, Clone, Default)]
pub struct HandlerTable {
    handlers: BTreeMap<(EventTarget, EventKind), Vec<Action>>,
}

impl HandlerTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` for `event` on `target`. Actions run in registration order.
    pub fn register(&mut self, target: EventTarget, event: EventKind, action: Action) {
        self.handlers.entry((target, event)).or_default().push(action);
    }

    /// Actions registered for `event` on `target`.
    pub fn handlers_for(&self, target: &EventTarget, event: EventKind) -> &[Action] {
        self.handlers
            .get(&(target.clone(), event))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Iterate over every registration.
    pub fn iter(&self) -> impl Iterator<Item = (&EventTarget, EventKind, &Action)> {
        self.handlers.iter().flat_map(|((target, event), actions)| {
            actions.iter().map(move |action| (target, *event, action))
        })
    }
}

/// The site's page script: decides which handlers a document gets.
#[derive(Debug, Clone, Default)]
pub struct SiteScript {
    config: SiteConfig,
    buttons: FilterButtons,
}

impl SiteScript {
    /// Create a script with the given config and button table.
    pub fn new(config: SiteConfig, buttons: FilterButtons) -> Self {
        Self { config, buttons }
    }

    /// The active config.
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// The filter button table.
    pub fn buttons(&self) -> &FilterButtons {
        &self.buttons
    }

    /// Register every handler `doc` supports.
    ///
    /// Element handlers are only registered when the element exists in `doc`; a page without a
    /// search form or filter bar simply gets fewer handlers.
    pub fn install(&self, doc: &Document, table: &mut HandlerTable) {
        table.register(
            EventTarget::Window,
            EventKind::Load,
            Action::RegisterServiceWorker,
        );
        table.register(
            EventTarget::Document,
            EventKind::DomContentLoaded,
            Action::MarkActiveNav,
        );

        let search = &self.config.search;
        if doc.get_element_by_id(&search.form_id).is_some() {
            table.register(
                EventTarget::element(&search.form_id),
                EventKind::Submit,
                Action::HighlightSearch {
                    input_id: search.input_id.clone(),
                },
            );
        } else {
            tracing::debug!(form = %search.form_id, "no search form; search disabled");
        }

        for button_id in self.buttons.button_ids() {
            if doc.get_element_by_id(&button_id).is_none() {
                continue;
            }
            table.register(
                EventTarget::element(&button_id),
                EventKind::Click,
                Action::Navigate { button_id },
            );
        }
    }
}

/// The result of running one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Service worker registration ran.
    ServiceWorker(RegistrationOutcome),
    /// Nav links were marked.
    NavMarked(NavReport),
    /// The search term was highlighted.
    Highlighted(HighlightReport),
    /// The submitted search term was empty; nothing changed.
    SearchIgnored,
    /// Highlighting failed (invalid pattern); the error was logged.
    SearchFailed(String),
    /// The page navigated to this URL.
    Navigated(Url),
}

/// A loaded page: document, location and host, plus its installed handlers.
pub struct Page<H: ServiceWorkerHost> {
    document: Document,
    location: Location,
    host: H,
    script: SiteScript,
    highlighter: Highlighter,
    handlers: HandlerTable,
}

impl<H: ServiceWorkerHost> Page<H> {
    /// Create a page and run the registration pass.
    pub fn new(document: Document, location: Location, host: H, script: SiteScript) -> Self {
        let mut handlers = HandlerTable::new();
        script.install(&document, &mut handlers);
        let highlighter = Highlighter::new(script.config().highlight.clone());
        Self {
            document,
            location,
            host,
            script,
            highlighter,
            handlers,
        }
    }

    /// The page's document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access to the document.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// The current location.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// The service worker host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The installed handlers.
    pub fn handlers(&self) -> &HandlerTable {
        &self.handlers
    }

    /// Run the load sequence: `DOMContentLoaded` on the document, then `load` on the window.
    pub fn load(&mut self) -> Vec<DispatchOutcome> {
        let mut outcomes = self.dispatch(&EventTarget::Document, EventKind::DomContentLoaded);
        outcomes.extend(self.dispatch(&EventTarget::Window, EventKind::Load));
        outcomes
    }

    /// Set the `value` of input `input_id`. Returns `false` if no such element exists.
    pub fn set_input_value(&mut self, input_id: &str, value: &str) -> bool {
        let Some(input) = self.document.get_element_by_id(input_id) else {
            return false;
        };
        match self.document.element_mut(input) {
            Some(element) => {
                element.set_attr("value", value);
                true
            }
            None => false,
        }
    }

    /// Type `value` into the search input and submit the search form.
    pub fn submit_search(&mut self, value: &str) -> Vec<DispatchOutcome> {
        let search = self.script.config().search.clone();
        self.set_input_value(&search.input_id, value);
        self.dispatch(&EventTarget::element(search.form_id), EventKind::Submit)
    }

    /// Click the element with id `element_id`.
    pub fn click(&mut self, element_id: &str) -> Vec<DispatchOutcome> {
        self.dispatch(&EventTarget::element(element_id), EventKind::Click)
    }

    /// Dispatch `event` on `target`, running every registered action in order.
    ///
    /// Submit events never trigger the default form navigation.
    pub fn dispatch(&mut self, target: &EventTarget, event: EventKind) -> Vec<DispatchOutcome> {
        let actions = self.handlers.handlers_for(target, event).to_vec();
        if actions.is_empty() {
            tracing::trace!(?target, ?event, "no handlers");
        }
        actions
            .into_iter()
            .filter_map(|action| self.run(&action))
            .collect()
    }

    fn content_root(&self) -> NodeId {
        self.document.body().unwrap_or(self.document.root())
    }

    fn run(&mut self, action: &Action) -> Option<DispatchOutcome> {
        match action {
            Action::RegisterServiceWorker => {
                let script = self.script.config().service_worker_script.clone();
                Some(DispatchOutcome::ServiceWorker(register_service_worker(
                    &mut self.host,
                    &script,
                )))
            }
            Action::MarkActiveNav => {
                let path = self.location.path().to_string();
                let report =
                    mark_active_nav_links(&mut self.document, &path, &self.script.config().nav);
                Some(DispatchOutcome::NavMarked(report))
            }
            Action::HighlightSearch { input_id } => {
                let value = self
                    .document
                    .get_element_by_id(input_id)
                    .and_then(|input| self.document.element(input))
                    .and_then(|element| element.attr("value"))
                    .unwrap_or_default()
                    .to_string();
                let root = self.content_root();
                match self
                    .highlighter
                    .highlight_input(&mut self.document, root, &value)
                {
                    Ok(Some(report)) => Some(DispatchOutcome::Highlighted(report)),
                    Ok(None) => Some(DispatchOutcome::SearchIgnored),
                    Err(err) => {
                        tracing::warn!(error = %err, "search highlight failed");
                        Some(DispatchOutcome::SearchFailed(err.to_string()))
                    }
                }
            }
            Action::Navigate { button_id } => {
                match self.script.buttons().navigate(button_id, &self.location) {
                    Ok(Some(url)) => {
                        self.location = Location::from_url(url.clone());
                        Some(DispatchOutcome::Navigated(url))
                    }
                    Ok(None) => None,
                    Err(err) => {
                        tracing::warn!(button = %button_id, error = %err, "navigation failed");
                        None
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service_worker::NoServiceWorkers;

    const PAGE: &str = "<html><body>\
        <form id=\"search-form\"><input id=\"search-input\" type=\"text\"></form>\
        <button id=\"all\">All</button><button id=\"python\">Python</button>\
        <p>Hello world</p>\
        </body></html>";

    #[test]
    fn test_install_registers_present_elements_only() {
        let doc = Document::parse_html(PAGE);
        let mut table = HandlerTable::new();
        SiteScript::default().install(&doc, &mut table);

        // load + DOMContentLoaded + submit + two buttons
        assert_eq!(table.len(), 5);
        assert_eq!(
            table.handlers_for(&EventTarget::element("python"), EventKind::Click),
            &[Action::Navigate {
                button_id: "python".to_string()
            }]
        );
        assert!(
            table
                .handlers_for(&EventTarget::element("sql"), EventKind::Click)
                .is_empty()
        );
    }

    #[test]
    fn test_unregistered_event_does_nothing() {
        let doc = Document::parse_html(PAGE);
        let location = Location::parse("http://localhost/index.html").unwrap();
        let mut page = Page::new(doc, location, NoServiceWorkers, SiteScript::default());
        assert!(page.click("search-input").is_empty());
        assert!(
            page.dispatch(&EventTarget::Window, EventKind::Click)
                .is_empty()
        );
    }

    #[test]
    fn test_set_input_value_missing_element() {
        let doc = Document::parse_html(PAGE);
        let location = Location::parse("http://localhost/index.html").unwrap();
        let mut page = Page::new(doc, location, NoServiceWorkers, SiteScript::default());
        assert!(!page.set_input_value("nope", "x"));
        assert!(page.set_input_value("search-input", "x"));
    }
}
