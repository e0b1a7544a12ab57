//! binfetch: install release binaries straight from their hosting provider.

mod cli;
mod commands;
mod errors;
mod install;
mod settings;
mod shutdown;
mod tracing;

use crate::tracing::TracingConfig;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = cli::parse();

    crate::tracing::init_tracing(TracingConfig {
        format: cli.log_format,
        level: cli.level.into(),
        ..TracingConfig::default()
    })?;

    let cancel = shutdown::cancel_on_ctrl_c();
    commands::run(cli, &cancel).await
}
