//! CLI-specific errors with miette diagnostics

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised by the CLI itself rather than the resolution pipeline.
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Unknown platform '{value}'")]
    #[diagnostic(
        code(binfetch::cli::invalid_platform),
        help("Use <os>-<arch>, e.g. linux-amd64, darwin-arm64 or windows-x86_64")
    )]
    InvalidPlatform { value: String },

    #[error("Could not determine an install directory")]
    #[diagnostic(
        code(binfetch::cli::no_install_dir),
        help("Pass --dir or set BINFETCH_DIR")
    )]
    NoInstallDir,

    #[error("{} already exists", path.display())]
    #[diagnostic(
        code(binfetch::cli::already_exists),
        help("Pass --force to overwrite it")
    )]
    AlreadyExists { path: PathBuf },

    #[error("Failed to {operation} {}", path.display())]
    #[diagnostic(
        code(binfetch::cli::file_error),
        help("Check file permissions and ensure the directory exists")
    )]
    FileError {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid API URL '{value}'")]
    #[diagnostic(code(binfetch::cli::invalid_api_url))]
    InvalidApiUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

impl CliError {
    pub fn file(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileError {
            operation,
            path: path.into(),
            source,
        }
    }
}
