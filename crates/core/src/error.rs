//! Error types for release resolution.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for binfetch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving a reference into an artifact.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The URL cannot be decomposed into owner and repository.
    #[error("Malformed repository reference '{reference}': {reason}")]
    #[diagnostic(
        code(binfetch::reference::malformed),
        help("Use a URL like https://github.com/<owner>/<repo>[/releases/tag/<tag>]")
    )]
    MalformedReference {
        /// The reference as supplied by the user
        reference: String,
        /// Why it could not be parsed
        reason: String,
    },

    /// No registered provider handles the URL host.
    #[error("No release provider registered for host '{host}'")]
    #[diagnostic(
        code(binfetch::provider::unsupported_host),
        help("Supported hosts are configured per provider (github.com, codeberg.org, ...)")
    )]
    UnsupportedHost {
        /// The host that was looked up
        host: String,
    },

    /// No release exists for the requested tag, or the repository has no releases.
    #[error("Release not found for {owner}/{repo} ({})", .tag.as_deref().unwrap_or("latest"))]
    #[diagnostic(
        code(binfetch::release::not_found),
        help("Check the tag name, or that the repository publishes releases")
    )]
    ReleaseNotFound {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
        /// Pinned tag, `None` when the latest release was requested
        tag: Option<String>,
        /// The provider resource that reported the missing release
        resource: String,
    },

    /// Network, authentication or rate-limit failure from the hosting API.
    #[error("{provider} request failed for {owner}/{repo} ({}): {message}", .tag.as_deref().unwrap_or("latest"))]
    #[diagnostic(
        code(binfetch::provider::transport),
        help("Set an API token to raise rate limits or access private repositories")
    )]
    ProviderTransport {
        /// Provider identifier
        provider: String,
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
        /// Pinned tag, `None` when the latest release was requested
        tag: Option<String>,
        /// The error message
        message: String,
    },

    /// No asset matches the current platform, or the match is ambiguous.
    #[error("Asset selection failed for {repo}: {message}")]
    #[diagnostic(code(binfetch::asset::selection))]
    AssetSelectionFailed {
        /// Repository name
        repo: String,
        /// The error message
        message: String,
    },

    /// Downloading or unpacking the selected asset failed.
    #[error("Failed to process asset '{asset}': {message}")]
    #[diagnostic(code(binfetch::asset::processing))]
    AssetProcessingFailed {
        /// The asset name
        asset: String,
        /// The error message
        message: String,
    },

    /// The enclosing cancellation token fired while a request was pending.
    #[error("Operation cancelled: {operation}")]
    #[diagnostic(code(binfetch::cancelled))]
    Cancelled {
        /// What was in flight
        operation: String,
    },

    /// Invalid configuration.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(binfetch::config))]
    Config {
        /// The error message
        message: String,
    },

    /// Wrapped I/O error.
    #[error("I/O error: {0}")]
    #[diagnostic(code(binfetch::io))]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a malformed reference error.
    #[must_use]
    pub fn malformed_reference(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedReference {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported host error.
    #[must_use]
    pub fn unsupported_host(host: impl Into<String>) -> Self {
        Self::UnsupportedHost { host: host.into() }
    }

    /// Create an asset selection error.
    #[must_use]
    pub fn asset_selection(repo: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AssetSelectionFailed {
            repo: repo.into(),
            message: message.into(),
        }
    }

    /// Create an asset processing error.
    #[must_use]
    pub fn asset_processing(asset: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AssetProcessingFailed {
            asset: asset.into(),
            message: message.into(),
        }
    }

    /// Create a cancellation error.
    #[must_use]
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns true if this error reports a missing release.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ReleaseNotFound { .. })
    }
}
