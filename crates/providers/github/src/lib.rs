//! GitHub release provider for binfetch.
//!
//! Resolves releases through the GitHub REST API. github.com references use
//! `https://api.github.com`; references on any other claimed host are
//! treated as GitHub Enterprise Server and use `https://<host>/api/v3`
//! unless an explicit API base URL is configured.

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
pub const PROVIDER_ID: &str = "github";

/// API endpoint for github.com.
pub const DEFAULT_API_BASE: &str = "https://api.github.com/";

/// Hosts claimed without configuration.
pub const DEFAULT_HOSTS: &[&str] = &["github.com", "www.github.com"];

const API_VERSION: &str = "2022-11-28";
const MEDIA_TYPE: &str = "application/vnd.github+json";

/// Client for the GitHub releases endpoints.
pub struct GitHubApi {
    client: Client,
    base: Url,
    token: Option<SecretString>,
}

impl GitHubApi {
    /// Create a client against `base`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `base` cannot carry a path or the HTTP
    /// client cannot be built.
    pub fn new(base: Url, config: &ProviderConfig) -> Result<Self> {
        if base.cannot_be_a_base() {
            return Err(Error::config(format!("Invalid GitHub API base URL: {base}")));
        }
        Ok(Self {
            client: build_client(&config.user_agent)?,
            base,
            token: config.token.clone(),
        })
    }

    /// Create a client for github.com, honoring a configured base override.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`].
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let base = match &config.api_base_url {
            Some(url) => url.clone(),
            None => Url::parse(DEFAULT_API_BASE)
                .map_err(|e| Error::config(format!("Invalid GitHub API base URL: {e}")))?,
        };
        Self::new(base, config)
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
        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, MEDIA_TYPE)
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));
        }
        request
    }
}

impl std::fmt::Debug for GitHubApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubApi")
            .field("base", &self.base.as_str())
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ReleaseApi for GitHubApi {
    async fn release_by_tag(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
        cancel: &CancellationToken,
    ) -> ApiResult<Release> {
        let url = self.endpoint(&["repos", owner, repo, "releases", "tags", tag]);
        debug!(%url, "Fetching GitHub release by tag");
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
        debug!(%url, "Fetching latest GitHub release");
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
            .append_pair("per_page", &per_page.to_string())
            .append_pair("page", &page.to_string());
        debug!(%url, "Listing GitHub releases");
        let resource = url.to_string();
        get_json(self.request(url), &resource, cancel).await
    }
}

/// Builds [`ReleaseProvider`]s backed by [`GitHubApi`].
pub struct GitHubProviderFactory {
    config: ProviderConfig,
    hosts: Vec<HostPattern>,
    assets: Arc<dyn AssetHandler>,
}

impl GitHubProviderFactory {
    /// Create a factory claiming github.com plus any configured hosts.
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
    /// # Errors
    ///
    /// Returns [`Error::Config`] if an Enterprise base cannot be derived.
    pub fn api_base_for(&self, url: &Url) -> Result<Url> {
        if let Some(base) = &self.config.api_base_url {
            return Ok(base.clone());
        }
        let host = url.host_str().unwrap_or_default().to_lowercase();
        if host.is_empty() || DEFAULT_HOSTS.contains(&host.as_str()) {
            return Url::parse(DEFAULT_API_BASE)
                .map_err(|e| Error::config(format!("Invalid GitHub API base URL: {e}")));
        }

        let mut base = url.clone();
        base.set_query(None);
        base.set_fragment(None);
        base.set_path("/api/v3/");
        Ok(base)
    }
}

impl std::fmt::Debug for GitHubProviderFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubProviderFactory")
            .field("hosts", &self.hosts)
            .finish_non_exhaustive()
    }
}

impl ProviderFactory for GitHubProviderFactory {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn matches_host(&self, host: &str) -> bool {
        self.hosts.iter().any(|p| p.matches(host))
    }

    fn create(&self, url: &Url, reference: RepoRef) -> Result<Box<dyn Provider>> {
        let api = GitHubApi::new(self.api_base_for(url)?, &self.config)?;
        debug!(base = %api.base(), reference = %reference, "Creating GitHub provider");
        Ok(Box::new(ReleaseProvider::new(
            PROVIDER_ID,
            reference,
            api,
            Arc::clone(&self.assets),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binfetch_core::{AssetCandidate, ProcessedAsset};

    struct NoAssets;

    #[async_trait]
    impl AssetHandler for NoAssets {
        fn filter_assets(&self, repo: &str, _: Vec<AssetCandidate>) -> Result<AssetCandidate> {
            Err(Error::asset_selection(repo, "no assets in unit tests"))
        }

        async fn process_url(
            &self,
            _repo: &str,
            candidate: &AssetCandidate,
            _cancel: &CancellationToken,
        ) -> Result<ProcessedAsset> {
            Err(Error::asset_processing(&candidate.name, "no downloads in unit tests"))
        }

        fn sanitize_name(&self, raw_name: &str, _version: &str) -> String {
            raw_name.to_string()
        }
    }

    fn factory(config: ProviderConfig) -> GitHubProviderFactory {
        GitHubProviderFactory::new(config, Arc::new(NoAssets))
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_endpoints() {
        let api = GitHubApi::from_config(&ProviderConfig::new()).unwrap();
        assert_eq!(
            api.endpoint(&["repos", "cli", "cli", "releases", "latest"])
                .as_str(),
            "https://api.github.com/repos/cli/cli/releases/latest"
        );
        assert_eq!(
            api.endpoint(&["repos", "o", "r", "releases", "tags", "cli/v1.0"])
                .as_str(),
            "https://api.github.com/repos/o/r/releases/tags/cli%2Fv1.0"
        );
    }

    #[test]
    fn test_enterprise_base_keeps_prefix() {
        let config = ProviderConfig::new().with_api_base_url(url("https://ghe.corp/api/v3"));
        let api = GitHubApi::from_config(&config).unwrap();
        assert_eq!(
            api.endpoint(&["repos", "o", "r", "releases"]).as_str(),
            "https://ghe.corp/api/v3/repos/o/r/releases"
        );
    }

    #[test]
    fn test_claims_default_and_configured_hosts() {
        let factory = factory(ProviderConfig::new().with_host("*.ghe.corp"));
        assert!(factory.matches_host("github.com"));
        assert!(factory.matches_host("GitHub.com"));
        assert!(factory.matches_host("code.ghe.corp"));
        assert!(!factory.matches_host("gitlab.com"));
        assert!(!factory.matches_host("codeberg.org"));
    }

    #[test]
    fn test_api_base_for_reference_host() {
        let plain = factory(ProviderConfig::new());
        assert_eq!(
            plain
                .api_base_for(&url("https://github.com/o/r"))
                .unwrap()
                .as_str(),
            DEFAULT_API_BASE
        );
        assert_eq!(
            plain
                .api_base_for(&url("https://ghe.corp/o/r/releases/tag/v1?x=1"))
                .unwrap()
                .as_str(),
            "https://ghe.corp/api/v3/"
        );

        let overridden =
            factory(ProviderConfig::new().with_api_base_url(url("http://127.0.0.1:9000/")));
        assert_eq!(
            overridden
                .api_base_for(&url("https://github.com/o/r"))
                .unwrap()
                .as_str(),
            "http://127.0.0.1:9000/"
        );
    }

    #[test]
    fn test_create_binds_reference() {
        let factory = factory(ProviderConfig::new());
        let provider = factory
            .create(
                &url("https://github.com/o/r/releases/tag/v1"),
                RepoRef::new("o", "r").with_tag("v1"),
            )
            .unwrap();
        assert_eq!(provider.id(), PROVIDER_ID);
    }

    #[test]
    fn test_debug_hides_token() {
        let config = ProviderConfig::new().with_token("ghp_hidden");
        let api = GitHubApi::from_config(&config).unwrap();
        let debug = format!("{api:?}");
        assert!(debug.contains("authenticated: true"));
        assert!(!debug.contains("ghp_hidden"));
    }
}
