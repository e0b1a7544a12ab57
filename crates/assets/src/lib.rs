//! Asset selection and processing for binfetch.
//!
//! Provides [`PlatformAssets`], the default [`AssetHandler`]:
//! - Picks the release attachment matching a [`Platform`] (see [`select`])
//! - Downloads it and unpacks zip, tar.gz and gzip archives (see [`extract`])
//! - Derives the local file name (see [`name`])

pub mod extract;
pub mod name;
pub mod select;

use std::io::Cursor;

use async_trait::async_trait;
use binfetch_core::http::{build_client, get_bytes};
use binfetch_core::{
    AssetCandidate, AssetHandler, Error, Platform, ProcessedAsset, Result, config::DEFAULT_USER_AGENT,
};
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub use extract::{ArchiveKind, extract_binary};
pub use name::sanitize_name;
pub use select::AssetSelector;

/// Default [`AssetHandler`] for binaries published as release attachments.
pub struct PlatformAssets {
    selector: AssetSelector,
    client: Client,
    token: Option<SecretString>,
}

impl PlatformAssets {
    /// Create a handler targeting `platform`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(platform: Platform) -> Result<Self> {
        Ok(Self {
            selector: AssetSelector::new(platform),
            client: build_client(DEFAULT_USER_AGENT)?,
            token: None,
        })
    }

    /// Create a handler for the running platform.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn for_current_platform() -> Result<Self> {
        Self::new(Platform::current())
    }

    /// Prefer assets containing `preference` when candidates tie.
    #[must_use]
    pub fn with_preference(mut self, preference: impl Into<String>) -> Self {
        self.selector = self.selector.with_preference(preference);
        self
    }

    /// Send a bearer token with downloads (private repositories).
    #[must_use]
    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    /// Use a preconfigured HTTP client.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// The target platform.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.selector.platform()
    }

    async fn download(&self, candidate: &AssetCandidate, cancel: &CancellationToken) -> Result<Vec<u8>> {
        debug!(url = %candidate.url, "Downloading asset");

        let mut request = self
            .client
            .get(&candidate.url)
            .header(ACCEPT, "application/octet-stream");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));
        }

        get_bytes(request, &candidate.url, cancel)
            .await
            .map(|b| b.to_vec())
            .map_err(|e| match e {
                binfetch_core::ApiError::Cancelled { resource } => Error::cancelled(resource),
                other => Error::asset_processing(&candidate.name, other.to_string()),
            })
    }
}

impl std::fmt::Debug for PlatformAssets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformAssets")
            .field("selector", &self.selector)
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AssetHandler for PlatformAssets {
    fn filter_assets(&self, repo: &str, candidates: Vec<AssetCandidate>) -> Result<AssetCandidate> {
        self.selector.select(repo, candidates)
    }

    async fn process_url(
        &self,
        repo: &str,
        candidate: &AssetCandidate,
        cancel: &CancellationToken,
    ) -> Result<ProcessedAsset> {
        let data = self.download(candidate, cancel).await?;
        let (name, content) = extract_binary(&candidate.name, &data, repo)?;
        info!(
            asset = %candidate.name,
            binary = %name,
            bytes = content.len(),
            "Processed asset"
        );
        Ok(ProcessedAsset {
            name,
            data: Box::new(Cursor::new(content)),
        })
    }

    fn sanitize_name(&self, raw_name: &str, version: &str) -> String {
        sanitize_name(raw_name, version)
    }
}
