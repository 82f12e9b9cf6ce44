//! Service worker registration.
//!
//! Registration is fire-and-forget: hosts without service worker support are skipped, and a
//! failed registration is logged and reported in the outcome but never returned as an error.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Script registered on page load, relative to the page.
pub const SERVICE_WORKER_SCRIPT: &str = "static/js/serviceWorker.js";

/// Why a registration attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The worker script does not exist.
    #[error("service worker script '{0}' not found")]
    ScriptNotFound(String),
    /// The host refused the registration.
    #[error("registration rejected: {0}")]
    Rejected(String),
}

/// The environment a page registers its worker with.
pub trait ServiceWorkerHost {
    /// Feature detection (`"serviceWorker" in navigator`).
    fn supports_service_workers(&self) -> bool;

    /// Register `script`.
    fn register(&mut self, script: &str) -> Result<(), RegistrationError>;
}

/// What happened when registration ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The host has no service worker support; nothing was attempted.
    Unsupported,
    /// The worker was registered.
    Registered,
    /// Registration failed (already logged).
    Failed(RegistrationError),
}

/// Register `script` with `host` if supported.
pub fn register_service_worker<H>(host: &mut H, script: &str) -> RegistrationOutcome
where
    H: ServiceWorkerHost + ?Sized,
{
    if !host.supports_service_workers() {
        tracing::debug!("service workers unsupported; skipping registration");
        return RegistrationOutcome::Unsupported;
    }
    match host.register(script) {
        Ok(()) => {
            tracing::info!(script, "service worker registered");
            RegistrationOutcome::Registered
        }
        Err(err) => {
            tracing::warn!(script, error = %err, "service worker not registered");
            RegistrationOutcome::Failed(err)
        }
    }
}

/// A host without service worker support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoServiceWorkers;

impl ServiceWorkerHost for NoServiceWorkers {
    fn supports_service_workers(&self) -> bool {
        false
    }

    fn register(&mut self, script: &str) -> Result<(), RegistrationError> {
        Err(RegistrationError::Rejected(format!(
            "cannot register '{script}': service workers unsupported"
        )))
    }
}

/// A host backed by a site directory on disk.
///
/// Registration succeeds when the script exists under the site root; registered scripts are
/// remembered.
#[derive(Debug, Clone)]
pub struct StaticSiteHost {
    root: PathBuf,
    registered: Vec<String>,
}

impl StaticSiteHost {
    /// Create a host serving files from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            registered: Vec::new(),
        }
    }

    /// The site root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scripts registered so far.
    pub fn registered(&self) -> &[String] {
        &self.registered
    }
}

impl ServiceWorkerHost for StaticSiteHost {
    fn supports_service_workers(&self) -> bool {
        true
    }

    fn register(&mut self, script: &str) -> Result<(), RegistrationError> {
        let path = self.root.join(script.trim_start_matches('/'));
        if !path.is_file() {
            return Err(RegistrationError::ScriptNotFound(script.to_string()));
        }
        if !self.registered.iter().any(|s| s == script) {
            self.registered.push(script.to_string());
        }
        Ok(())
    }
}
