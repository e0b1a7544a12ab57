//! Gitea release provider for binfetch.
//!
//! Gitea and its Forgejo fork (Codeberg among others) expose a releases API
//! shaped like GitHub's under `/api/v1`. Since instances are self-hosted,
//! the API base is derived from the reference host.

use std::sync::Arc;

use async_trait::async_trait;
use binfetch_core::http::{build_client, get_json};
use binfetch_core::{
    ApiResult, AssetHandler, Error, HostPattern, Provider, ProviderConfig, ProviderFactory,
    Release, ReleaseApi, ReleaseProvider, RepoRef, Result,
};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

/// Provider identifier.
pub const PROVIDER_ID: &str = "gitea";

/// Public instances claimed without configuration.
pub const DEFAULT_HOSTS: &[&str] = &["codeberg.org", "gitea.com"];

const API_PATH: &str = "/api/v1/";

/// Client for the Gitea releases endpoints.
pub struct GiteaApi {
    client: Client,
    base: Url,
    token: Option<SecretString>,
}

impl GiteaApi {
    /// Create a client against `base` (an instance's `/api/v1` URL).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `base` cannot carry a path or the HTTP
    /// client cannot be built.
    pub fn new(base: Url, config: &ProviderConfig) -> Result<Self> {
        if base.cannot_be_a_base() {
            return Err(Error::config(format!("Invalid Gitea API base URL: {base}")));
        }
        Ok(Self {
            client: build_client(&config.user_agent)?,
            base,
            token: config.token.clone(),
        })
    }

    /// The API base URL.
    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, url: Url) -> RequestBuilder {
        let mut request = self.client.get(url).header(ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("token {}", token.expose_secret()));
        }
        request
    }
}

impl std::fmt::Debug for GiteaApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GiteaApi")
            .field("base", &self.base.as_str())
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ReleaseApi for GiteaApi {
    async fn release_by_tag(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
        cancel: &CancellationToken,
    ) -> ApiResult<Release> {
        let url = self.endpoint(&["repos", owner, repo, "releases", "tags", tag]);
        debug!(%url, "Fetching Gitea release by tag");
        let resource = url.to_string();
        get_json(self.request(url), &resource, cancel).await
    }

    async fn latest_release(
        &self,
        owner: &str,
        repo: &str,
        cancel: &CancellationToken,
    ) -> ApiResult<Release> {
        let url = self.endpoint(&["repos", owner, repo, "releases", "latest"]);
        debug!(%url, "Fetching latest Gitea release");
        let resource = url.to_string();
        get_json(self.request(url), &resource, cancel).await
    }

    async fn list_releases(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        per_page: u32,
        cancel: &CancellationToken,
    ) -> ApiResult<Vec<Release>> {
        let mut url = self.endpoint(&["repos", owner, repo, "releases"]);
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &per_page.to_string());
        debug!(%url, "Listing Gitea releases");
        let resource = url.to_string();
        get_json(self.request(url), &resource, cancel).await
    }
}

/// Builds [`ReleaseProvider`]s backed by [`GiteaApi`].
pub struct GiteaProviderFactory {
    config: ProviderConfig,
    hosts: Vec<HostPattern>,
    assets: Arc<dyn AssetHandler>,
}

impl GiteaProviderFactory {
    /// Create a factory claiming the public instances plus any configured hosts.
    #[must_use]
    pub fn new(config: ProviderConfig, assets: Arc<dyn AssetHandler>) -> Self {
        let hosts = DEFAULT_HOSTS
            .iter()
            .copied()
            .map(HostPattern::new)
            .chain(config.hosts.iter().map(HostPattern::new))
            .collect();
        Self {
            config,
            hosts,
            assets,
        }
    }

    /// The API base a reference on `url` is resolved against.
    ///
    /// A configured base wins; otherwise `/api/v1/` on the reference's own
    /// scheme, host and port.
    #[must_use]
    pub fn api_base_for(&self, url: &Url) -> Url {
        if let Some(base) = &self.config.api_base_url {
            return base.clone();
        }
        let mut base = url.clone();
        base.set_query(None);
        base.set_fragment(None);
        base.set_path(API_PATH);
        base
    }
}

impl std::fmt::Debug for GiteaProviderFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GiteaProviderFactory")
            .field("hosts", &self.hosts)
            .finish_non_exhaustive()
    }
}

impl ProviderFactory for GiteaProviderFactory {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn matches_host(&self, host: &str) -> bool {
        self.hosts.iter().any(|p| p.matches(host))
    }

    fn create(&self, url: &Url, reference: RepoRef) -> Result<Box<dyn Provider>> {
        let api = GiteaApi::new(self.api_base_for(url), &self.config)?;
        debug!(base = %api.base(), reference = %reference, "Creating Gitea provider");
        Ok(Box::new(ReleaseProvider::new(
            PROVIDER_ID,
            reference,
            api,
            Arc::clone(&self.assets),
        )))
    }
}
