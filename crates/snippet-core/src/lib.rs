#![warn(missing_docs)]
//! Snippet Core - headless page behavior for a snippet browsing site
//!
//! # Overview
//!
//! `snippet-core` implements the client-side behavior of the snippet site against an explicit,
//! mutable document tree instead of a browser DOM. The page's content root is always passed in
//! by the caller; nothing is looked up globally.
//!
//! # Core Features
//!
//! - **Search highlighting**: clear-then-apply marker wrapping, case-insensitive, skipping
//!   `script`/`style` text, idempotent
//! - **Navigation state**: `active` class and `aria-current` on the link for the current path
//! - **Filter buttons**: `?lang=<value>` redirects resolved against the current URL
//! - **Service worker registration**: feature-detected, failures logged and swallowed
//! - **Event wiring**: an explicit `(target, event) -> action` registration table
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Page + HandlerTable (events)               │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Highlighter / Nav / Filters / SW register  │  ← Behaviors
//! ├─────────────────────────────────────────────┤
//! │  Search (term normalization, regex ranges)  │  ← Matching
//! ├─────────────────────────────────────────────┤
//! │  HTML reader (html5gum) / writer            │  ← Codec
//! ├─────────────────────────────────────────────┤
//! │  Document arena                             │  ← Tree Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use snippet_core::{Document, highlight};
//!
//! let mut doc = Document::parse_html("<body><p>Hello world</p></body>");
//! let body = doc.body().unwrap();
//!
//! let report = highlight(&mut doc, body, "WORLD").unwrap().unwrap();
//! assert_eq!(report.matches, 1);
//! assert_eq!(
//!     doc.inner_html(body),
//!     "<p>Hello <span class=\"highlight\">world</span></p>"
//! );
//! ```
//!
//! ## Driving a page through events
//!
//! ```rust
//! use snippet_core::{DispatchOutcome, Document, Location, NoServiceWorkers, Page, SiteScript};
//!
//! let doc = Document::parse_html(
//!     "<body><button id=\"python\">Python</button><p>print()</p></body>",
//! );
//! let location = Location::parse("http://localhost/index.html").unwrap();
//! let mut page = Page::new(doc, location, NoServiceWorkers, SiteScript::default());
//!
//! let outcomes = page.click("python");
//! let DispatchOutcome::Navigated(url) = &outcomes[0] else {
//!     panic!("expected navigation");
//! };
//! assert_eq!(url.as_str(), "http://localhost/index.html?lang=python");
//! ```
//!
//! # Module Description
//!
//! - [`dom`] - arena-backed document tree
//! - [`html`] - forgiving HTML parser and serializer
//! - [`search`] - term normalization and regex matching
//! - [`highlight`] - search highlight markers
//! - [`nav`] - navigation link active state
//! - [`filters`] - page location and language filter buttons
//! - [`service_worker`] - service worker registration
//! - [`events`] - handler registration and dispatch
//! - [`config`] - JSON configuration

pub mod config;
pub mod dom;
pub mod events;
pub mod filters;
pub mod highlight;
pub mod html;
pub mod nav;
pub mod search;
pub mod service_worker;

pub use config::{ConfigError, SearchFormConfig, SiteConfig};
pub use dom::{Attribute, Document, DocumentError, ElementData, NodeId, NodeKind};
pub use events::{
    Action, DispatchOutcome, EventKind, EventTarget, HandlerTable, Page, SiteScript,
};
pub use filters::{FilterButtons, FilterTarget, Location, LocationError};
pub use highlight::{
    HighlightConfig, HighlightError, HighlightReport, Highlighter, MatchMode, clear_highlights,
    highlight,
};
pub use nav::{NavConfig, NavReport, mark_active_nav_links};
pub use search::{SearchError, SearchOptions, SearchPattern, SearchTerm};
pub use service_worker::{
    NoServiceWorkers, RegistrationError, RegistrationOutcome, SERVICE_WORKER_SCRIPT,
    ServiceWorkerHost, StaticSiteHost, register_service_worker,
};
