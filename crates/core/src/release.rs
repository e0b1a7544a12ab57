//! Release descriptors and asset candidates.

use serde::{Deserialize, Serialize};

/// A tagged release as returned by a hosting provider API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Version tag (e.g. `v1.2.3`).
    pub tag_name: String,
    /// Browsable release page.
    #[serde(default)]
    pub html_url: String,
    /// Attached files, in provider order.
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// One downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    /// File name as published.
    pub name: String,
    /// Direct download URL.
    pub browser_download_url: String,
}

impl Release {
    /// Project the attachments into provider-agnostic candidates.
    ///
    /// Order is preserved; it is the tie-break order available to asset
    /// selection.
    #[must_use]
    pub fn candidates(&self) -> Vec<AssetCandidate> {
        self.assets
            .iter()
            .map(|a| AssetCandidate {
                name: a.name.clone(),
                url: a.browser_download_url.clone(),
            })
            .collect()
    }
}

/// A release attachment flattened to its name and download URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetCandidate {
    /// File name.
    pub name: String,
    /// Direct download URL.
    pub url: String,
}

impl AssetCandidate {
    /// Create a new candidate.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// The newest release tag and where to look at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestVersion {
    /// Version tag.
    pub tag: String,
    /// Browsable release page.
    pub url: String,
}

impl From<Release> for LatestVersion {
    fn from(release: Release) -> Self {
        Self {
            tag: release.tag_name,
            url: release.html_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_preserve_order_and_count() {
        let release = Release {
            tag_name: "v0.9.0".into(),
            html_url: "https://github.com/o/r/releases/tag/v0.9.0".into(),
            assets: ["z-linux.tar.gz", "a-darwin.zip", "m-windows.exe"]
                .iter()
                .map(|n| ReleaseAsset {
                    name: (*n).to_string(),
                    browser_download_url: format!("https://dl.example/{n}"),
                })
                .collect(),
        };

        let candidates = release.candidates();
        assert_eq!(candidates.len(), 3);
        let names: Vec<_> = candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["z-linux.tar.gz", "a-darwin.zip", "m-windows.exe"]);
        assert_eq!(candidates[1].url, "https://dl.example/a-darwin.zip");
    }

    #[test]
    fn test_candidates_empty_release() {
        let release = Release {
            tag_name: "v1".into(),
            html_url: String::new(),
            assets: vec![],
        };
        assert!(release.candidates().is_empty());
    }

    #[test]
    fn test_release_deserializes_api_payload() {
        let json = r#"{
            "id": 1,
            "tag_name": "v2.0.0",
            "html_url": "https://github.com/o/r/releases/tag/v2.0.0",
            "prerelease": false,
            "assets": [
                {"id": 7, "name": "r_linux_amd64.tar.gz", "browser_download_url": "https://x/r.tgz", "size": 10}
            ]
        }"#;
        let release: Release = serde_json::from_str(json).unwrap();
        assert_eq!(release.tag_name, "v2.0.0");
        assert_eq!(release.assets.len(), 1);
        assert_eq!(release.assets[0].name, "r_linux_amd64.tar.gz");

        let latest = LatestVersion::from(release);
        assert_eq!(latest.tag, "v2.0.0");
        assert_eq!(latest.url, "https://github.com/o/r/releases/tag/v2.0.0");
    }
}
