//! Provider configuration injected at construction time.

use secrecy::{ExposeSecret, SecretString};
use url::Url;

/// Default `User-Agent` sent with API requests and downloads.
pub const DEFAULT_USER_AGENT: &str = concat!("binfetch/", env!("CARGO_PKG_VERSION"));

/// Settings a provider is built with.
///
/// The credential is passed in explicitly; providers never read the process
/// environment themselves.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Bearer token; `None` means unauthenticated, rate-limited access.
    pub token: Option<SecretString>,
    /// API base URL override (e.g. a GitHub Enterprise `/api/v3` endpoint).
    pub api_base_url: Option<Url>,
    /// Additional hosts the provider should claim besides its defaults.
    pub hosts: Vec<String>,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base_url: None,
            hosts: Vec::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ProviderConfig {
    /// Create a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bearer token. Empty tokens are ignored.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.trim().is_empty()).then(|| SecretString::from(token));
        self
    }

    /// Set the API base URL.
    #[must_use]
    pub fn with_api_base_url(mut self, url: Url) -> Self {
        self.api_base_url = Some(url);
        self
    }

    /// Claim an additional host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.hosts.push(host.into());
        self
    }

    /// Set the `User-Agent` header value.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Expose the token for building an `Authorization` header.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.expose_secret())
    }
}
