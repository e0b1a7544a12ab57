//! The resolved, locally consumable artifact.

use sha2::{Digest, Sha256};
use tokio::io::AsyncRead;

use crate::assets::AssetHandler;

/// Byte stream of a processed asset.
pub type ArtifactData = Box<dyn AsyncRead + Send + Unpin>;

/// Output of a resolution: a named, versioned byte stream.
///
/// `hash` is handed over empty. The core never reads the asset body, so
/// the caller feeds the bytes through the accumulator while consuming
/// `data` (for example while writing it to disk) and finalizes it
/// afterwards. Hashing eagerly here would cost a second pass over
/// potentially large downloads.
pub struct Artifact {
    /// The binary's bytes.
    pub data: ArtifactData,
    /// Sanitized file name.
    pub name: String,
    /// Empty SHA-256 accumulator for the caller to fill.
    pub hash: Sha256,
    /// Release tag the artifact came from.
    pub version: String,
}

impl std::fmt::Debug for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifact")
            .field("name", &self.name)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// Combine a processed asset with its release tag.
///
/// The name goes through [`AssetHandler::sanitize_name`]; the hash starts
/// empty.
#[must_use]
pub fn assemble(
    handler: &dyn AssetHandler,
    selected_name: &str,
    data: ArtifactData,
    version: &str,
) -> Artifact {
    Artifact {
        data,
        name: handler.sanitize_name(selected_name, version),
        hash: Sha256::new(),
        version: version.to_string(),
    }
}
