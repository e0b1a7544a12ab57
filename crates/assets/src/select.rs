//! Picking the release asset that matches a platform.
//!
//! Asset names follow no standard, so selection works on tokens: the name is
//! lowercased, `x86_64`/`x86-64` are folded into `amd64`, and the result is
//! split on anything that is not alphanumeric. Tokens are then matched
//! against known OS and architecture aliases.
//!
//! Scoring:
//!
//! | signal                              | score |
//! |-------------------------------------|-------|
//! | target OS mentioned                 | +10   |
//! | target arch mentioned               | +5    |
//! | `universal` build on darwin         | +3    |
//! | repository name in the asset name   | +1    |
//! | `musl` build on linux               | +1    |
//!
//! Assets that only mention foreign OSes or foreign architectures are
//! dropped. The highest score wins. Ties are broken, in order, by archive
//! format when the tied names differ only in their archive suffix, then by
//! the configured preference substring. Anything still tied is an error.

use binfetch_core::{Arch, AssetCandidate, Error, Os, Platform, Result};
use tracing::debug;

use crate::extract::ArchiveKind;

/// Suffixes of attachments that are never the binary itself.
const IGNORED_SUFFIXES: &[&str] = &[
    ".sha256",
    ".sha256sum",
    ".sha512",
    ".sha1",
    ".md5",
    ".sig",
    ".asc",
    ".pem",
    ".crt",
    ".sbom",
    ".spdx",
    ".json",
    ".txt",
    ".intoto.jsonl",
    ".deb",
    ".rpm",
    ".apk",
    ".msi",
    ".dmg",
    ".pkg",
    ".appimage",
];

/// Asset selection settings.
#[derive(Debug, Clone)]
pub struct AssetSelector {
    platform: Platform,
    preference: Option<String>,
}

impl AssetSelector {
    /// Create a selector for a platform.
    #[must_use]
    pub const fn new(platform: Platform) -> Self {
        Self {
            platform,
            preference: None,
        }
    }

    /// Prefer assets containing `preference` when scores tie (e.g. "gnu").
    #[must_use]
    pub fn with_preference(mut self, preference: impl Into<String>) -> Self {
        let preference = preference.into().to_lowercase();
        self.preference = (!preference.is_empty()).then_some(preference);
        self
    }

    /// The target platform.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.platform
    }

    /// Choose the single best candidate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssetSelectionFailed`] if no candidate is compatible
    /// with the platform or the best candidates cannot be told apart.
    pub fn select(&self, repo: &str, candidates: Vec<AssetCandidate>) -> Result<AssetCandidate> {
        if candidates.is_empty() {
            return Err(Error::asset_selection(repo, "release has no assets"));
        }

        let repo_lower = repo.to_lowercase();
        let mut scored: Vec<(u32, AssetCandidate)> = candidates
            .into_iter()
            .filter(|c| !is_ignored(&c.name))
            .filter_map(|c| {
                let score = self.score(&repo_lower, &c.name)?;
                debug!(asset = %c.name, score, "Scored asset");
                Some((score, c))
            })
            .collect();

        let Some(best) = scored.iter().map(|(s, _)| *s).max() else {
            return Err(Error::asset_selection(
                repo,
                format!("no asset matches platform {}", self.platform),
            ));
        };
        scored.retain(|(s, _)| *s == best);
        let mut tied: Vec<AssetCandidate> = scored.into_iter().map(|(_, c)| c).collect();

        if tied.len() > 1 {
            tied = by_archive_format(tied);
        }
        if tied.len() > 1 {
            if let Some(pref) = &self.preference {
                let preferred: Vec<_> = tied
                    .iter()
                    .filter(|c| c.name.to_lowercase().contains(pref.as_str()))
                    .cloned()
                    .collect();
                if preferred.len() == 1 {
                    tied = preferred;
                }
            }
        }

        match tied.len() {
            1 => Ok(tied.remove(0)),
            _ => {
                let names: Vec<_> = tied.iter().map(|c| c.name.as_str()).collect();
                Err(Error::asset_selection(
                    repo,
                    format!(
                        "ambiguous assets for platform {}: {}",
                        self.platform,
                        names.join(", ")
                    ),
                ))
            }
        }
    }

    /// Score one asset name, or `None` if it targets another platform.
    fn score(&self, repo: &str, name: &str) -> Option<u32> {
        let lower = name.to_lowercase();
        let tokens = tokenize(&lower);

        let mut oses: Vec<Os> = tokens.iter().filter_map(|t| os_token(t)).collect();
        if lower.ends_with(".exe") {
            oses.push(Os::Windows);
        }
        let arches: Vec<Arch> = tokens.iter().filter_map(|t| arch_token(t)).collect();
        let universal = tokens.iter().any(|t| t == "universal" || t == "universal2");

        let mut score = 0;

        if !oses.is_empty() {
            if !oses.contains(&self.platform.os) {
                return None;
            }
            score += 10;
        }

        if arches.contains(&self.platform.arch) {
            score += 5;
        } else if universal && self.platform.os == Os::Darwin {
            score += 3;
        } else if !arches.is_empty() {
            return None;
        }

        if !repo.is_empty() && lower.contains(repo) {
            score += 1;
        }
        if self.platform.os == Os::Linux && tokens.iter().any(|t| t.starts_with("musl")) {
            score += 1;
        }

        Some(score)
    }
}

fn is_ignored(name: &str) -> bool {
    let lower = name.to_lowercase();
    IGNORED_SUFFIXES.iter().any(|s| lower.ends_with(s))
        || lower.starts_with("checksums")
        || lower.contains("sha256sums")
}

fn tokenize(lower: &str) -> Vec<String> {
    lower
        .replace("x86_64", "amd64")
        .replace("x86-64", "amd64")
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

fn os_token(token: &str) -> Option<Os> {
    match token {
        "linux" => Some(Os::Linux),
        "darwin" | "macos" | "osx" | "apple" | "mac" => Some(Os::Darwin),
        "windows" | "win" | "win64" | "win32" => Some(Os::Windows),
        _ => None,
    }
}

fn arch_token(token: &str) -> Option<Arch> {
    match token {
        "amd64" | "x64" => Some(Arch::X86_64),
        "aarch64" | "arm64" => Some(Arch::Arm64),
        "i386" | "i686" | "386" | "x86" | "x32" => Some(Arch::X86),
        "arm" | "armv6" | "armv6l" | "armv7" | "armv7l" | "armhf" => Some(Arch::Arm),
        _ => None,
    }
}

/// Keep the best archive format when the tied names share one stem.
fn by_archive_format(tied: Vec<AssetCandidate>) -> Vec<AssetCandidate> {
    let split: Vec<(String, ArchiveKind)> = tied
        .iter()
        .map(|c| {
            let (stem, kind) = ArchiveKind::split(&c.name);
            (stem.to_lowercase(), kind)
        })
        .collect();
    if split.iter().any(|(stem, _)| *stem != split[0].0) {
        return tied;
    }
    let Some(best) = split.iter().map(|(_, kind)| kind.precedence()).min() else {
        return tied;
    };

    tied.into_iter()
        .zip(split)
        .filter(|(_, (_, kind))| kind.precedence() == best)
        .map(|(c, _)| c)
        .collect()
}
