//! Writing a resolved artifact to disk.

use std::path::{Path, PathBuf};

use binfetch_core::Artifact;
use sha2::Digest;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::CliError;

const CHUNK_SIZE: usize = 64 * 1024;

/// Where an artifact ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installed {
    pub path: PathBuf,
    pub version: String,
    pub sha256: String,
    pub bytes: u64,
}

/// Stream `artifact` into `dir`, feeding its hash accumulator on the way.
///
/// The file is written under a temporary name and renamed into place, so an
/// interrupted install never leaves a truncated binary behind.
pub async fn install(artifact: Artifact, dir: &Path, force: bool) -> Result<Installed, CliError> {
    let Artifact {
        mut data,
        name,
        mut hash,
        version,
    } = artifact;

    fs::create_dir_all(dir)
        .await
        .map_err(|e| CliError::file("create", dir, e))?;

    let target = dir.join(&name);
    if !force && fs::try_exists(&target).await.unwrap_or(false) {
        return Err(CliError::AlreadyExists { path: target });
    }

    let partial = dir.join(format!(".{name}.{}.partial", Uuid::new_v4()));
    debug!(path = %partial.display(), "Writing artifact");

    let written = async {
        let mut file = fs::File::create(&partial)
            .await
            .map_err(|e| CliError::file("create", &partial, e))?;
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut total = 0u64;
        loop {
            let n = data
                .read(&mut buf)
                .await
                .map_err(|e| CliError::file("read artifact for", &target, e))?;
            if n == 0 {
                break;
            }
            hash.update(&buf[..n]);
            file.write_all(&buf[..n])
                .await
                .map_err(|e| CliError::file("write", &partial, e))?;
            total += n as u64;
        }
        file.sync_all()
            .await
            .map_err(|e| CliError::file("sync", &partial, e))?;
        make_executable(&partial).await?;
        fs::rename(&partial, &target)
            .await
            .map_err(|e| CliError::file("move into place", &target, e))?;
        Ok::<_, CliError>(total)
    }
    .await;

    let bytes = match written {
        Ok(bytes) => bytes,
        Err(err) => {
            let _ = fs::remove_file(&partial).await;
            return Err(err);
        }
    };

    let sha256 = hex::encode(hash.finalize());
    info!(path = %target.display(), %version, %sha256, bytes, "Installed binary");
    Ok(Installed {
        path: target,
        version,
        sha256,
        bytes,
    })
}

#[cfg(unix)]
async fn make_executable(path: &Path) -> Result<(), CliError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .await
        .map_err(|e| CliError::file("set permissions on", path, e))
}

#[cfg(not(unix))]
async fn make_executable(_path: &Path) -> Result<(), CliError> {
    Ok(())
}
