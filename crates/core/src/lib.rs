//! Core types for binfetch.
//!
//! This crate resolves a repository reference into a release artifact:
//!
//! - [`reference`] - Parse URLs into owner, repository and optional tag
//! - [`resolve`] - [`ReleaseApi`] boundary and the latest-release fallback
//! - [`release`] - Release descriptors and asset candidates
//! - [`assets`] - [`AssetHandler`] boundary for selection and download
//! - [`artifact`] - The [`Artifact`] handed to callers
//! - [`provider`] - [`Provider`] trait and the shared fetch pipeline
//! - [`registry`] - Host-keyed [`ProviderRegistry`]
//!
//! # Example
//!
//! ```ignore
//! use binfetch_core::ProviderRegistry;
//! use tokio_util::sync::CancellationToken;
//!
//! let mut registry = ProviderRegistry::new();
//! registry.register(GitHubProviderFactory::new(config, assets));
//!
//! let provider = registry.provider_for("https://github.com/marcosnils/bin")?;
//! let artifact = provider.fetch(&CancellationToken::new()).await?;
//! ```

pub mod artifact;
pub mod assets;
pub mod config;
pub mod error;
pub mod http;
pub mod platform;
pub mod provider;
pub mod reference;
pub mod registry;
pub mod release;
pub mod resolve;

pub use artifact::{Artifact, ArtifactData, assemble};
pub use assets::{AssetHandler, ProcessedAsset};
pub use config::ProviderConfig;
pub use error::{Error, Result};
pub use platform::{Arch, Os, Platform};
pub use provider::{Provider, ProviderFactory, ReleaseProvider};
pub use reference::{RepoRef, parse_reference};
pub use registry::{HostPattern, ProviderRegistry};
pub use release::{AssetCandidate, LatestVersion, Release, ReleaseAsset};
pub use resolve::{ApiError, ApiResult, ReleaseApi, ReleaseResolver};

/// Re-exported so callers can build cancellation tokens without a direct dependency.
pub use tokio_util::sync::CancellationToken;
