//! Release provider trait and the shared fetch pipeline.
//!
//! A [`Provider`] is bound to one repository reference and knows how to
//! turn it into an [`Artifact`]. Every hosting service with a
//! GitHub-shaped releases API is a [`ReleaseProvider`] around its own
//! [`ReleaseApi`]; [`ProviderFactory`] builds them for the registry.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use crate::Result;
use crate::artifact::{Artifact, assemble};
use crate::assets::AssetHandler;
use crate::reference::RepoRef;
use crate::release::LatestVersion;
use crate::resolve::{ReleaseApi, ReleaseResolver};

/// A hosting provider bound to one repository reference.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable short identifier (e.g. "github").
    fn id(&self) -> &'static str;

    /// Resolve the release, select and process its asset.
    ///
    /// # Errors
    ///
    /// Any failure aborts the whole resolution; no partial artifact is
    /// returned.
    async fn fetch(&self, cancel: &CancellationToken) -> Result<Artifact>;

    /// Look up the newest release tag and its page, never pinned.
    ///
    /// # Errors
    ///
    /// Returns an error if no release exists or the API call fails.
    async fn latest_version(&self, cancel: &CancellationToken) -> Result<LatestVersion>;
}

/// Provider for any service exposing the releases shape of [`ReleaseApi`].
pub struct ReleaseProvider<A> {
    id: &'static str,
    reference: RepoRef,
    api: A,
    assets: Arc<dyn AssetHandler>,
}

impl<A: ReleaseApi> ReleaseProvider<A> {
    /// Bind an API client to a reference.
    #[must_use]
    pub fn new(id: &'static str, reference: RepoRef, api: A, assets: Arc<dyn AssetHandler>) -> Self {
        Self {
            id,
            reference,
            api,
            assets,
        }
    }

    /// The reference this provider resolves.
    #[must_use]
    pub const fn reference(&self) -> &RepoRef {
        &self.reference
    }

    /// The underlying API client.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }
}

#[async_trait]
impl<A: ReleaseApi> Provider for ReleaseProvider<A> {
    fn id(&self) -> &'static str {
        self.id
    }

    async fn fetch(&self, cancel: &CancellationToken) -> Result<Artifact> {
        let resolver = ReleaseResolver::new(self.id, &self.api);
        let release = resolver.resolve(&self.reference, cancel).await?;

        let candidates = release.candidates();
        debug!(
            provider = self.id,
            tag = %release.tag_name,
            count = candidates.len(),
            "Built asset candidates"
        );

        let selected = self.assets.filter_assets(&self.reference.repo, candidates)?;
        info!(
            provider = self.id,
            reference = %self.reference,
            asset = %selected.name,
            "Selected release asset"
        );

        let processed = self
            .assets
            .process_url(&self.reference.repo, &selected, cancel)
            .await?;

        Ok(assemble(
            self.assets.as_ref(),
            &processed.name,
            processed.data,
            &release.tag_name,
        ))
    }

    async fn latest_version(&self, cancel: &CancellationToken) -> Result<LatestVersion> {
        debug!(provider = self.id, reference = %self.reference, "Getting latest version");
        let resolver = ReleaseResolver::new(self.id, &self.api);
        let release = resolver.latest(&self.reference, cancel).await?;
        Ok(release.into())
    }
}

/// Builds providers for the hosts it claims.
pub trait ProviderFactory: Send + Sync {
    /// Identifier of the providers this factory builds.
    fn id(&self) -> &'static str;

    /// Whether this factory handles URLs on `host`.
    fn matches_host(&self, host: &str) -> bool;

    /// Build a provider for a parsed reference.
    ///
    /// `url` is the original reference, for providers that derive their API
    /// endpoint from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be constructed.
    fn create(&self, url: &Url, reference: RepoRef) -> Result<Box<dyn Provider>>;
}
