//! Repository reference parsing.
//!
//! A reference is the URL a user points at: a repository page, a release tag
//! page or a direct asset download link. All of them reduce to the same
//! routing triple of owner, repository and optional tag.

use percent_encoding::percent_decode_str;
use url::Url;

use crate::{Error, Result};

/// Host assumed for bare `owner/repo` references.
pub const DEFAULT_HOST: &str = "github.com";

/// Owner, repository and optional tag extracted from a reference URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Pinned release tag; `None` selects the latest release.
    pub tag: Option<String>,
}

impl RepoRef {
    /// Create a reference without a pinned tag.
    #[must_use]
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            tag: None,
        }
    }

    /// Pin the reference to a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Extract the routing triple from a URL path.
    ///
    /// The first two non-empty segments are owner and repository. When a
    /// `releases` segment follows them, the segment after it is a qualifier
    /// (`tag`, `download`, ...) and the tag comes next. For `download` links
    /// only the single segment after the qualifier is the tag, since the rest
    /// is the asset file name. Otherwise the remainder is joined with `/`,
    /// so tags containing slashes survive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedReference`] if fewer than two segments exist
    /// or a segment does not decode to UTF-8.
    pub fn from_url(url: &Url) -> Result<Self> {
        let segments = url
            .path_segments()
            .map(|s| {
                s.filter(|p| !p.is_empty())
                    .map(|p| decode_segment(url, p))
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        let [owner, repo, rest @ ..] = segments.as_slice() else {
            return Err(Error::malformed_reference(
                url.as_str(),
                "can't find owner and repo",
            ));
        };
        let repo = repo.strip_suffix(".git").unwrap_or(repo.as_str());

        let tag = rest
            .iter()
            .position(|p| p == "releases")
            .and_then(|i| {
                let qualifier = rest.get(i + 1)?;
                let tail = rest.get(i + 2..)?;
                if qualifier == "download" {
                    tail.first().cloned()
                } else {
                    Some(tail.join("/"))
                }
            })
            .filter(|t| !t.is_empty());

        Ok(Self {
            owner: owner.clone(),
            repo: repo.to_string(),
            tag,
        })
    }

    /// Human-readable `owner/repo[@tag]` form.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.tag {
            Some(tag) => format!("{}/{}@{}", self.owner, self.repo, tag),
            None => format!("{}/{}", self.owner, self.repo),
        }
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Percent-decode one path segment, so `%2B` in a tag becomes `+`.
fn decode_segment(url: &Url, segment: &str) -> Result<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| Error::malformed_reference(url.as_str(), format!("invalid path segment: {e}")))
}

/// Parse user input into a URL.
///
/// Accepts full URLs as well as scheme-less `host/owner/repo` and bare
/// `owner/repo` shorthands, the latter resolving against [`DEFAULT_HOST`].
///
/// # Errors
///
/// Returns [`Error::MalformedReference`] if the input is not a usable URL.
pub fn parse_reference(input: &str) -> Result<Url> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::malformed_reference(input, "empty reference"));
    }

    let candidate = if input.contains("://") {
        input.to_string()
    } else {
        let first = input.split('/').next().unwrap_or_default();
        if first.contains('.') {
            format!("https://{input}")
        } else {
            format!("https://{DEFAULT_HOST}/{input}")
        }
    };

    let url = Url::parse(&candidate).map_err(|e| Error::malformed_reference(input, e.to_string()))?;
    if url.host_str().is_none() {
        return Err(Error::malformed_reference(input, "missing host"));
    }
    Ok(url)
}
