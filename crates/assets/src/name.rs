//! Local file names for downloaded binaries.

use crate::extract::ArchiveKind;

/// Name segments that describe the build target rather than the tool.
const TARGET_SEGMENTS: &[&str] = &[
    "linux",
    "darwin",
    "macos",
    "osx",
    "apple",
    "mac",
    "windows",
    "win",
    "win64",
    "win32",
    "amd64",
    "x64",
    "aarch64",
    "arm64",
    "i386",
    "i686",
    "386",
    "x86",
    "arm",
    "armv6",
    "armv7",
    "armhf",
    "unknown",
    "pc",
    "gnu",
    "musl",
    "msvc",
    "gnueabihf",
    "musleabihf",
    "static",
    "universal",
    "universal2",
];

/// Turn a raw binary name into the file name it is installed under.
///
/// Lowercases the name, drops archive suffixes, embedded version strings
/// (the release tag with or without its `v`, or any dotted version) and
/// OS/arch/libc segments, and replaces characters that are unsafe in file
/// names. The version is tracked separately, so it is never baked into the
/// name. `.exe` is kept. Falls back to the cleaned raw name if nothing
/// would remain.
#[must_use]
pub fn sanitize_name(raw_name: &str, version: &str) -> String {
    let lower = raw_name.trim().to_lowercase();
    let (base, _) = ArchiveKind::split(&lower);
    let (base, exe) = match base.strip_suffix(".exe") {
        Some(stripped) => (stripped, true),
        None => (base, false),
    };
    let base = base.replace("x86_64", "amd64").replace("x86-64", "amd64");
    let version = version.trim().to_lowercase();

    let mut out = String::new();
    let mut sep = None;
    let mut start = 0;
    for (i, c) in base.char_indices() {
        if c == '-' || c == '_' {
            push_segment(&mut out, sep, &base[start..i], &version);
            sep = Some(c);
            start = i + c.len_utf8();
        }
    }
    push_segment(&mut out, sep, &base[start..], &version);

    let mut name = clean(&out);
    if name.is_empty() {
        name = clean(base.as_str());
    }
    if name.is_empty() {
        name = clean(&lower);
    }
    if exe {
        name.push_str(".exe");
    }
    name
}

fn push_segment(out: &mut String, sep: Option<char>, segment: &str, version: &str) {
    if segment.is_empty() || is_noise(segment, version) {
        return;
    }
    if !out.is_empty() {
        out.push(sep.unwrap_or('-'));
    }
    out.push_str(segment);
}

fn is_noise(segment: &str, version: &str) -> bool {
    let bare = version.strip_prefix('v').unwrap_or(version);
    let seg_bare = segment.strip_prefix('v').unwrap_or(segment);
    (!bare.is_empty() && seg_bare == bare)
        || looks_like_version(segment)
        || TARGET_SEGMENTS.contains(&segment)
}

fn looks_like_version(segment: &str) -> bool {
    let s = segment.strip_prefix('v').unwrap_or(segment);
    s.starts_with(|c: char| c.is_ascii_digit())
        && s.contains('.')
        && s.chars().all(|c| c.is_ascii_digit() || c == '.')
}

fn clean(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect::<String>()
        .trim_matches(|c| matches!(c, '-' | '_' | '.'))
        .to_string()
}
