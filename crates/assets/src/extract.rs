//! Archive detection and in-memory binary extraction.

use std::io::{Cursor, Read};
use std::path::Path;

use binfetch_core::{Error, Result};
use flate2::read::GzDecoder;
use tar::Archive;

/// Packaging of a downloaded asset, judged by its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// `.tar.gz`
    TarGz,
    /// `.tgz`
    Tgz,
    /// `.zip`
    Zip,
    /// Single gzip-compressed file.
    Gz,
    /// The binary itself.
    Raw,
}

impl ArchiveKind {
    const SUFFIXES: [(&'static str, Self); 4] = [
        (".tar.gz", Self::TarGz),
        (".tgz", Self::Tgz),
        (".zip", Self::Zip),
        (".gz", Self::Gz),
    ];

    /// Detect the kind of an asset name.
    #[must_use]
    pub fn of(name: &str) -> Self {
        Self::split(name).1
    }

    /// Split a name into its stem and archive kind.
    #[must_use]
    pub fn split(name: &str) -> (&str, Self) {
        for (suffix, kind) in Self::SUFFIXES {
            let Some(at) = name.len().checked_sub(suffix.len()) else {
                continue;
            };
            if name
                .get(at..)
                .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
            {
                return (&name[..at], kind);
            }
        }
        (name, Self::Raw)
    }

    /// Rank used to break ties between otherwise identical assets; lower wins.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::TarGz => 0,
            Self::Tgz => 1,
            Self::Zip => 2,
            Self::Gz => 3,
            Self::Raw => 4,
        }
    }
}

/// A file found inside an archive.
#[derive(Debug, Clone)]
struct Entry {
    path: String,
    executable: bool,
}

impl Entry {
    fn file_name(&self) -> &str {
        Path::new(&self.path)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.path)
    }
}

/// Unpack an asset down to the binary it ships.
///
/// Returns the binary's raw file name and its bytes. Archives are searched
/// for an entry named like the repository (ignoring `.exe`), then for the
/// only executable file, then for the only file.
///
/// # Errors
///
/// Returns [`Error::AssetProcessingFailed`] if the archive is corrupt or no
/// single binary can be identified.
pub fn extract_binary(asset_name: &str, data: &[u8], repo: &str) -> Result<(String, Vec<u8>)> {
    let (stem, kind) = ArchiveKind::split(asset_name);
    match kind {
        ArchiveKind::TarGz | ArchiveKind::Tgz => extract_from_tar_gz(asset_name, data, repo),
        ArchiveKind::Zip => extract_from_zip(asset_name, data, repo),
        ArchiveKind::Gz => {
            let mut content = Vec::new();
            GzDecoder::new(data)
                .read_to_end(&mut content)
                .map_err(|e| Error::asset_processing(asset_name, format!("Failed to gunzip: {e}")))?;
            Ok((stem.to_string(), content))
        }
        ArchiveKind::Raw => Ok((asset_name.to_string(), data.to_vec())),
    }
}

fn extract_from_tar_gz(asset_name: &str, data: &[u8], repo: &str) -> Result<(String, Vec<u8>)> {
    let tar_err = |e: std::io::Error| Error::asset_processing(asset_name, format!("Failed to read tar: {e}"));

    let mut entries = Vec::new();
    let mut archive = Archive::new(GzDecoder::new(data));
    for entry in archive.entries().map_err(tar_err)? {
        let entry = entry.map_err(tar_err)?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let path = entry.path().map_err(tar_err)?.to_string_lossy().into_owned();
        let mode = entry.header().mode().unwrap_or(0);
        entries.push(Entry {
            path,
            executable: mode & 0o111 != 0,
        });
    }

    let chosen = choose_entry(asset_name, &entries, repo)?;

    let mut archive = Archive::new(GzDecoder::new(data));
    for entry in archive.entries().map_err(tar_err)? {
        let mut entry = entry.map_err(tar_err)?;
        let path = entry.path().map_err(tar_err)?.to_string_lossy().into_owned();
        if path == chosen.path {
            let mut content = Vec::new();
            entry.read_to_end(&mut content).map_err(tar_err)?;
            return Ok((chosen.file_name().to_string(), content));
        }
    }

    Err(Error::asset_processing(
        asset_name,
        format!("Entry '{}' disappeared from archive", chosen.path),
    ))
}

fn extract_from_zip(asset_name: &str, data: &[u8], repo: &str) -> Result<(String, Vec<u8>)> {
    let zip_err = |e: zip::result::ZipError| {
        Error::asset_processing(asset_name, format!("Failed to read zip: {e}"))
    };

    let mut archive = zip::ZipArchive::new(Cursor::new(data)).map_err(zip_err)?;

    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let file = archive.by_index(i).map_err(zip_err)?;
        if file.is_dir() {
            continue;
        }
        let path = file.name().to_string();
        let executable = file.unix_mode().is_some_and(|m| m & 0o111 != 0)
            || path.to_lowercase().ends_with(".exe");
        entries.push(Entry { path, executable });
    }

    let chosen = choose_entry(asset_name, &entries, repo)?;
    let mut file = archive.by_name(&chosen.path).map_err(zip_err)?;
    let mut content = Vec::new();
    file.read_to_end(&mut content)
        .map_err(|e| Error::asset_processing(asset_name, format!("Failed to read zip entry: {e}")))?;
    Ok((chosen.file_name().to_string(), content))
}

fn choose_entry<'a>(asset_name: &str, entries: &'a [Entry], repo: &str) -> Result<&'a Entry> {
    let repo = repo.to_lowercase();
    if let Some(entry) = entries.iter().find(|e| {
        let name = e.file_name().to_lowercase();
        name.strip_suffix(".exe").unwrap_or(&name) == repo
    }) {
        return Ok(entry);
    }

    let executables: Vec<&Entry> = entries.iter().filter(|e| e.executable).collect();
    if let [only] = executables.as_slice() {
        return Ok(*only);
    }
    if let [only] = entries {
        return Ok(only);
    }

    if entries.is_empty() {
        return Err(Error::asset_processing(asset_name, "archive contains no files"));
    }
    let pool = if executables.is_empty() {
        entries.iter().collect()
    } else {
        executables
    };
    let names: Vec<&str> = pool.iter().map(|e| e.path.as_str()).collect();
    Err(Error::asset_processing(
        asset_name,
        format!("cannot tell which file is the binary: {}", names.join(", ")),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn tar_gz(files: &[(&str, &str, u32)]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (path, content, mode) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(*mode);
            header.set_cksum();
            builder
                .append_data(&mut header, path, content.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn zip_archive(files: &[(&str, &str, u32)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (path, content, mode) in files {
            let options = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated)
                .unix_permissions(*mode);
            writer.start_file(*path, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_archive_kind_split() {
        assert_eq!(
            ArchiveKind::split("tool_1.0_linux.tar.gz"),
            ("tool_1.0_linux", ArchiveKind::TarGz)
        );
        assert_eq!(ArchiveKind::split("tool.TGZ"), ("tool", ArchiveKind::Tgz));
        assert_eq!(ArchiveKind::split("tool.zip"), ("tool", ArchiveKind::Zip));
        assert_eq!(ArchiveKind::split("tool.gz"), ("tool", ArchiveKind::Gz));
        assert_eq!(ArchiveKind::split("tool.exe"), ("tool.exe", ArchiveKind::Raw));
        assert!(ArchiveKind::TarGz.precedence() < ArchiveKind::Zip.precedence());
        assert!(ArchiveKind::Gz.precedence() < ArchiveKind::Raw.precedence());
    }

    #[test]
    fn test_tar_gz_picks_entry_named_like_repo() {
        let data = tar_gz(&[
            ("gh_2.40.0_linux_amd64/LICENSE", "MIT", 0o644),
            ("gh_2.40.0_linux_amd64/bin/gh", "\x7fELF-gh", 0o755),
            ("gh_2.40.0_linux_amd64/share/man/gh.1", "man", 0o644),
        ]);

        let (name, content) = extract_binary("gh_2.40.0_linux_amd64.tar.gz", &data, "gh").unwrap();
        assert_eq!(name, "gh");
        assert_eq!(content, b"\x7fELF-gh");
    }

    #[test]
    fn test_tar_gz_single_executable() {
        let data = tar_gz(&[
            ("README.md", "readme", 0o644),
            ("rg", "\x7fELF-rg", 0o755),
        ]);

        let (name, content) = extract_binary("ripgrep-14.1.0.tgz", &data, "ripgrep").unwrap();
        assert_eq!(name, "rg");
        assert_eq!(content, b"\x7fELF-rg");
    }

    #[test]
    fn test_tar_gz_ambiguous_executables() {
        let data = tar_gz(&[("one", "1", 0o755), ("two", "2", 0o755)]);

        let err = extract_binary("bundle.tar.gz", &data, "tool").unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, Error::AssetProcessingFailed { .. }));
        assert!(msg.contains("one") && msg.contains("two"), "{msg}");
    }

    #[test]
    fn test_corrupt_tar_gz() {
        let err = extract_binary("tool.tar.gz", b"definitely not gzip", "tool").unwrap_err();
        assert!(matches!(err, Error::AssetProcessingFailed { .. }));
    }

    #[test]
    fn test_zip_windows_exe() {
        let data = zip_archive(&[
            ("tool-win64/README.txt", "readme", 0o644),
            ("tool-win64/Tool.exe", "MZ", 0o644),
        ]);

        let (name, content) = extract_binary("tool-win64.zip", &data, "tool").unwrap();
        assert_eq!(name, "Tool.exe");
        assert_eq!(content, b"MZ");
    }

    #[test]
    fn test_zip_single_file_without_mode() {
        let data = zip_archive(&[("just-a-file", "payload", 0o644)]);

        let (name, content) = extract_binary("thing.zip", &data, "other").unwrap();
        assert_eq!(name, "just-a-file");
        assert_eq!(content, b"payload");
    }

    #[test]
    fn test_gz_single_file() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"\x7fELF-gz").unwrap();
        let data = encoder.finish().unwrap();

        let (name, content) = extract_binary("tool-linux-amd64.gz", &data, "tool").unwrap();
        assert_eq!(name, "tool-linux-amd64");
        assert_eq!(content, b"\x7fELF-gz");
    }

    #[test]
    fn test_raw_binary_passthrough() {
        let (name, content) = extract_binary("tool-linux-amd64", b"\x7fELF", "tool").unwrap();
        assert_eq!(name, "tool-linux-amd64");
        assert_eq!(content, b"\x7fELF");
    }
}
