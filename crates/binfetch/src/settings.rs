//! Provider settings assembled from flags and the environment.

use std::path::PathBuf;

use binfetch_core::ProviderConfig;
use url::Url;

use crate::cli::ProviderArgs;
use crate::errors::CliError;

/// Variables consulted for a GitHub token, in order.
pub const GITHUB_TOKEN_VARS: &[&str] = &["GITHUB_AUTH_TOKEN", "GITHUB_TOKEN", "GH_TOKEN"];

/// Variables consulted for a Gitea token, in order.
pub const GITEA_TOKEN_VARS: &[&str] = &["GITEA_TOKEN"];

/// Configuration for every registered provider.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub github: ProviderConfig,
    pub gitea: ProviderConfig,
}

impl Settings {
    /// Build provider configs from CLI flags plus token variables.
    pub fn from_args(args: &ProviderArgs) -> Result<Self, CliError> {
        let mut github = ProviderConfig::new();
        if let Some(token) = token_from_env(GITHUB_TOKEN_VARS) {
            github = github.with_token(token);
        }
        if let Some(value) = &args.github_api_url {
            let url = Url::parse(value).map_err(|source| CliError::InvalidApiUrl {
                value: value.clone(),
                source,
            })?;
            github = github.with_api_base_url(url);
        }
        for host in &args.github_hosts {
            github = github.with_host(host);
        }

        let mut gitea = ProviderConfig::new();
        if let Some(token) = token_from_env(GITEA_TOKEN_VARS) {
            gitea = gitea.with_token(token);
        }
        for host in &args.gitea_hosts {
            gitea = gitea.with_host(host);
        }

        Ok(Self { github, gitea })
    }
}

/// First non-empty value among `vars`.
fn token_from_env(vars: &[&str]) -> Option<String> {
    vars.iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty())
}

/// Directory binaries are installed into when `--dir` is not given.
pub fn default_install_dir() -> Result<PathBuf, CliError> {
    dirs::executable_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("bin")))
        .ok_or(CliError::NoInstallDir)
}
