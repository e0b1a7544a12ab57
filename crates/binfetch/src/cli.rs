use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::tracing::{LogLevel, TracingFormat};

#[derive(Parser, Debug)]
#[command(name = "binfetch")]
#[command(about = "Install release binaries straight from GitHub and Gitea")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 'l',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    #[arg(
        long,
        global = true,
        help = "Log output format",
        default_value = "compact",
        value_enum
    )]
    pub log_format: TracingFormat,

    #[command(flatten)]
    pub providers: ProviderArgs,
}

/// Provider endpoints and extra hosts.
#[derive(Args, Debug, Default, Clone)]
pub struct ProviderArgs {
    #[arg(
        long,
        global = true,
        env = "BINFETCH_GITHUB_API_URL",
        help = "GitHub API base URL (GitHub Enterprise: https://<host>/api/v3)"
    )]
    pub github_api_url: Option<String>,

    #[arg(
        long = "github-host",
        global = true,
        value_name = "HOST",
        help = "Additional host served by GitHub Enterprise (repeatable, *.domain allowed)"
    )]
    pub github_hosts: Vec<String>,

    #[arg(
        long = "gitea-host",
        global = true,
        value_name = "HOST",
        help = "Additional Gitea or Forgejo host (repeatable, *.domain allowed)"
    )]
    pub gitea_hosts: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Download the release binary for this platform and install it")]
    Fetch(FetchArgs),
    #[command(about = "Show the newest release of a repository")]
    Latest {
        #[arg(help = "Repository URL or owner/repo")]
        url: String,
    },
    #[command(about = "List supported providers")]
    Providers,
}

#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    #[arg(help = "Repository, release or download URL (owner/repo for GitHub)")]
    pub url: String,

    #[arg(
        short,
        long,
        env = "BINFETCH_DIR",
        help = "Install directory (default: ~/.local/bin)"
    )]
    pub dir: Option<PathBuf>,

    #[arg(long, help = "Prefer assets containing this text when several match")]
    pub prefer: Option<String>,

    #[arg(long, help = "Target platform as <os>-<arch> (default: this machine)")]
    pub platform: Option<String>,

    #[arg(short, long, help = "Overwrite an existing file")]
    pub force: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}
