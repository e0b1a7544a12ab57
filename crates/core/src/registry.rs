//! Provider registry.
//!
//! Maps a reference URL to the provider responsible for its host, so
//! calling code never branches on provider identity.

use std::sync::Arc;

use tracing::debug;

use crate::provider::{Provider, ProviderFactory};
use crate::reference::{RepoRef, parse_reference};
use crate::{Error, Result};

/// A host pattern: an exact host name or a `*.` wildcard suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPattern(String);

impl HostPattern {
    /// Create a pattern. Matching is case-insensitive.
    #[must_use]
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into().to_lowercase())
    }

    /// Check whether `host` matches.
    #[must_use]
    pub fn matches(&self, host: &str) -> bool {
        let host = host.to_lowercase();
        match self.0.strip_prefix("*.") {
            Some(suffix) => host
                .strip_suffix(suffix)
                .is_some_and(|prefix| prefix.ends_with('.')),
            None => host == self.0,
        }
    }
}

/// Registry of provider factories.
///
/// Factories are consulted in registration order; the first one claiming
/// the URL host wins.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: Vec<Arc<dyn ProviderFactory>>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider factory.
    pub fn register<F: ProviderFactory + 'static>(&mut self, factory: F) {
        self.factories.push(Arc::new(factory));
    }

    /// Register a factory wrapped in Arc.
    pub fn register_arc(&mut self, factory: Arc<dyn ProviderFactory>) {
        self.factories.push(factory);
    }

    /// Find the factory claiming `host`.
    #[must_use]
    pub fn factory_for_host(&self, host: &str) -> Option<&Arc<dyn ProviderFactory>> {
        self.factories.iter().find(|f| f.matches_host(host))
    }

    /// Parse a reference and build the provider for it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedReference`] if the reference cannot be
    /// parsed and [`Error::UnsupportedHost`] if no factory claims its host.
    pub fn provider_for(&self, reference: &str) -> Result<Box<dyn Provider>> {
        let url = parse_reference(reference)?;
        let host = url.host_str().unwrap_or_default();
        let factory = self
            .factory_for_host(host)
            .ok_or_else(|| Error::unsupported_host(host))?;

        let repo_ref = RepoRef::from_url(&url)?;
        debug!(provider = factory.id(), %host, reference = %repo_ref, "Selected provider");
        factory.create(&url, repo_ref)
    }

    /// Get the number of registered factories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Get all provider identifiers, in lookup order.
    #[must_use]
    pub fn ids(&self) -> Vec<&'static str> {
        self.factories.iter().map(|f| f.id()).collect()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.ids())
            .finish()
    }
}
