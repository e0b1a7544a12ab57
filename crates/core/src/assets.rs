//! Boundary to asset selection and processing.
//!
//! Choosing the right attachment for a platform and unpacking it are
//! heuristic, so providers only see them through [`AssetHandler`]. The
//! default implementation lives in the `binfetch-assets` crate.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::artifact::ArtifactData;
use crate::release::AssetCandidate;

/// A downloaded asset, unpacked down to the binary.
pub struct ProcessedAsset {
    /// Raw file name of the binary (archive entry or asset name).
    pub name: String,
    /// The binary's bytes.
    pub data: ArtifactData,
}

impl std::fmt::Debug for ProcessedAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessedAsset")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Selects, downloads and names release assets.
#[async_trait]
pub trait AssetHandler: Send + Sync {
    /// Choose the single candidate matching the current platform.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::AssetSelectionFailed`] when nothing matches or
    /// the best matches are ambiguous. Never picks one silently.
    fn filter_assets(&self, repo: &str, candidates: Vec<AssetCandidate>)
    -> Result<AssetCandidate>;

    /// Download the candidate and unpack it to the binary it contains.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::AssetProcessingFailed`] if the download or
    /// extraction fails, or [`crate::Error::Cancelled`] if the token fires.
    async fn process_url(
        &self,
        repo: &str,
        candidate: &AssetCandidate,
        cancel: &CancellationToken,
    ) -> Result<ProcessedAsset>;

    /// Turn a raw binary name into the local file name.
    fn sanitize_name(&self, raw_name: &str, version: &str) -> String;
}
