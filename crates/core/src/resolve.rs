//! Release resolution against a provider API.
//!
//! The [`ReleaseApi`] trait is the network boundary: each hosting provider
//! implements the three release lookups and classifies "not found"
//! distinctly from every other failure. [`ReleaseResolver`] turns those
//! lookups into exactly one release for a reference, falling back from the
//! canonical latest release to the newest listed one when a repository only
//! publishes pre-releases.

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::reference::RepoRef;
use crate::release::Release;
use crate::{Error, Result};

/// Failure reported by a provider API call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The requested release (or repository) does not exist.
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that was requested
        resource: String,
    },

    /// The API answered with an unexpected status (auth, rate limit, server error).
    #[error("HTTP {status} from {resource}: {message}")]
    Status {
        /// The resource that was requested
        resource: String,
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// The request never produced a response.
    #[error("request to {resource} failed: {message}")]
    Transport {
        /// The resource that was requested
        resource: String,
        /// The error message
        message: String,
    },

    /// The response body could not be decoded.
    #[error("invalid response from {resource}: {message}")]
    Decode {
        /// The resource that was requested
        resource: String,
        /// The error message
        message: String,
    },

    /// The cancellation token fired before the response arrived.
    #[error("request to {resource} cancelled")]
    Cancelled {
        /// The resource that was requested
        resource: String,
    },
}

impl ApiError {
    /// Convert into a crate error carrying the reference context.
    #[must_use]
    pub fn into_error(self, provider: &str, reference: &RepoRef) -> Error {
        match self {
            Self::NotFound { resource } => Error::ReleaseNotFound {
                owner: reference.owner.clone(),
                repo: reference.repo.clone(),
                tag: reference.tag.clone(),
                resource,
            },
            Self::Cancelled { resource } => Error::cancelled(resource),
            other => Error::ProviderTransport {
                provider: provider.to_string(),
                owner: reference.owner.clone(),
                repo: reference.repo.clone(),
                tag: reference.tag.clone(),
                message: other.to_string(),
            },
        }
    }
}

/// Result type for provider API calls.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Release lookups a hosting provider exposes.
#[async_trait]
pub trait ReleaseApi: Send + Sync {
    /// Fetch the release published under exactly `tag`.
    async fn release_by_tag(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
        cancel: &CancellationToken,
    ) -> ApiResult<Release>;

    /// Fetch the canonical latest (non-prerelease) release.
    async fn latest_release(
        &self,
        owner: &str,
        repo: &str,
        cancel: &CancellationToken,
    ) -> ApiResult<Release>;

    /// List one page of releases, newest first. `page` is 1-based.
    async fn list_releases(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        per_page: u32,
        cancel: &CancellationToken,
    ) -> ApiResult<Vec<Release>>;
}

/// Resolves a reference to a single release.
pub struct ReleaseResolver<'a> {
    provider: &'a str,
    api: &'a dyn ReleaseApi,
}

impl<'a> ReleaseResolver<'a> {
    /// Create a resolver for the given provider API.
    #[must_use]
    pub fn new(provider: &'a str, api: &'a dyn ReleaseApi) -> Self {
        Self { provider, api }
    }

    /// Resolve the release a reference points at.
    ///
    /// A pinned tag is looked up directly and any failure, including a
    /// missing tag, surfaces unchanged. Without a tag the latest release is
    /// used (see [`Self::latest`]).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReleaseNotFound`] when no release matches,
    /// [`Error::ProviderTransport`] for any other API failure and
    /// [`Error::Cancelled`] if the token fires.
    pub async fn resolve(&self, reference: &RepoRef, cancel: &CancellationToken) -> Result<Release> {
        match reference.tag.as_deref() {
            Some(tag) => {
                info!(
                    owner = %reference.owner,
                    repo = %reference.repo,
                    %tag,
                    "Getting release by tag"
                );
                self.api
                    .release_by_tag(&reference.owner, &reference.repo, tag, cancel)
                    .await
                    .map_err(|e| e.into_error(self.provider, reference))
            }
            None => {
                info!(owner = %reference.owner, repo = %reference.repo, "Getting latest release");
                self.latest(reference, cancel).await
            }
        }
    }

    /// Resolve the newest release, ignoring any pinned tag.
    ///
    /// If the provider reports no canonical latest release, the newest
    /// listed release is taken instead, since repositories with only
    /// pre-releases have no latest pointer. An empty listing reports the
    /// original not-found error.
    ///
    /// # Errors
    ///
    /// Same as [`Self::resolve`].
    pub async fn latest(&self, reference: &RepoRef, cancel: &CancellationToken) -> Result<Release> {
        let unpinned = RepoRef {
            tag: None,
            ..reference.clone()
        };
        let owner = unpinned.owner.as_str();
        let repo = unpinned.repo.as_str();

        let not_found = match self.api.latest_release(owner, repo, cancel).await {
            Ok(release) => return Ok(release),
            Err(err @ ApiError::NotFound { .. }) => err,
            Err(err) => return Err(err.into_error(self.provider, &unpinned)),
        };

        debug!(%owner, %repo, "No latest release, falling back to newest listed release");
        let releases = self
            .api
            .list_releases(owner, repo, 1, 1, cancel)
            .await
            .map_err(|e| e.into_error(self.provider, &unpinned))?;

        releases
            .into_iter()
            .next()
            .ok_or_else(|| not_found.into_error(self.provider, &unpinned))
    }
}
