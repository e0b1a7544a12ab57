//! Command implementations.

use std::sync::Arc;

use binfetch_assets::PlatformAssets;
use binfetch_core::{Platform, ProviderConfig, ProviderRegistry};
use binfetch_gitea::GiteaProviderFactory;
use binfetch_github::GitHubProviderFactory;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::cli::{Cli, Commands, FetchArgs};
use crate::errors::CliError;
use crate::install::{Installed, install};
use crate::settings::{Settings, default_install_dir};

/// Dispatch a parsed command line.
pub async fn run(cli: Cli, cancel: &CancellationToken) -> miette::Result<()> {
    let settings = Settings::from_args(&cli.providers)?;
    match cli.command {
        Commands::Fetch(args) => {
            let installed = fetch(&settings, &args, cancel).await?;
            print_installed(&installed);
        }
        Commands::Latest { url } => latest(&settings, &url, cancel).await?,
        Commands::Providers => providers(&settings)?,
    }
    Ok(())
}

/// Register every provider, each with an asset handler carrying its own token.
pub fn build_registry(
    settings: &Settings,
    platform: Platform,
    prefer: Option<&str>,
) -> miette::Result<ProviderRegistry> {
    let assets = |config: &ProviderConfig| -> miette::Result<Arc<PlatformAssets>> {
        let mut handler = PlatformAssets::new(platform)?;
        if let Some(prefer) = prefer {
            handler = handler.with_preference(prefer);
        }
        if let Some(token) = &config.token {
            handler = handler.with_token(token.clone());
        }
        Ok(Arc::new(handler))
    };

    let mut registry = ProviderRegistry::new();
    registry.register(GitHubProviderFactory::new(
        settings.github.clone(),
        assets(&settings.github)?,
    ));
    registry.register(GiteaProviderFactory::new(
        settings.gitea.clone(),
        assets(&settings.gitea)?,
    ));
    Ok(registry)
}

fn target_platform(value: Option<&str>) -> Result<Platform, CliError> {
    match value {
        Some(value) => Platform::parse(value).ok_or_else(|| CliError::InvalidPlatform {
            value: value.to_string(),
        }),
        None => Ok(Platform::current()),
    }
}

#[instrument(skip(settings, cancel), fields(url = %args.url))]
async fn fetch(
    settings: &Settings,
    args: &FetchArgs,
    cancel: &CancellationToken,
) -> miette::Result<Installed> {
    let platform = target_platform(args.platform.as_deref())?;
    let dir = match &args.dir {
        Some(dir) => dir.clone(),
        None => default_install_dir()?,
    };
    info!(%platform, dir = %dir.display(), "Fetching release binary");

    let registry = build_registry(settings, platform, args.prefer.as_deref())?;
    let provider = registry.provider_for(&args.url)?;
    let artifact = provider.fetch(cancel).await?;
    Ok(install(artifact, &dir, args.force).await?)
}

#[allow(clippy::print_stdout)]
fn print_installed(installed: &Installed) {
    println!(
        "Installed {} ({}) sha256:{}",
        installed.path.display(),
        installed.version,
        installed.sha256
    );
}

#[allow(clippy::print_stdout)]
async fn latest(settings: &Settings, url: &str, cancel: &CancellationToken) -> miette::Result<()> {
    let registry = build_registry(settings, Platform::current(), None)?;
    let provider = registry.provider_for(url)?;
    let latest = provider.latest_version(cancel).await?;
    println!("{}\t{}", latest.tag, latest.url);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn providers(settings: &Settings) -> miette::Result<()> {
    let registry = build_registry(settings, Platform::current(), None)?;
    for id in registry.ids() {
        println!("{id}");
    }
    Ok(())
}
