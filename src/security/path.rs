//! Asset path validation, canonicalization and deny-listing

use std::fmt;
use std::path::Path;

use tracing::debug;
use url::Url;

use super::error::ValidationError;
use super::pattern::matches_asset_path;
use super::sniffer::FileSignature;
use super::text::utf16_len;
use crate::platform;

/// Longest accepted path, raw or canonical (UTF-16 units)
pub const MAX_PATH_LENGTH: usize = 259;

/// Directories that are always restricted, whatever the environment says.
pub const BUILTIN_RESTRICTED_DIRS: &[&str] = &[r"C:\Windows\System32", r"C:\Windows\SysWOW64"];

/// What an asset path is expected to point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Audio,
}

impl AssetKind {
    /// Required file extension, without the dot
    pub fn extension(self) -> &'static str {
        match self {
            AssetKind::Image => "png",
            AssetKind::Audio => "wav",
        }
    }

    /// Binary signature the file content must carry
    pub fn signature(self) -> FileSignature {
        match self {
            AssetKind::Image => FileSignature::Png,
            AssetKind::Audio => FileSignature::Wav,
        }
    }
}

/// A canonical, drive-rooted path that passed every syntactic and
/// deny-list check.
///
/// Nothing is known yet about the file itself; see
/// [`AssetFile`](super::sniffer::AssetFile) for that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPath {
    canonical: String,
    kind: AssetKind,
}

impl VerifiedPath {
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.canonical)
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    /// `file:///` URI for the toast payload.
    pub fn file_uri(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("file:///{}", self.canonical.replace('\\', "/")))
    }

    #[cfg(test)]
    pub(crate) fn for_test(path: impl Into<String>, kind: AssetKind) -> Self {
        Self {
            canonical: path.into(),
            kind,
        }
    }
}

impl fmt::Display for VerifiedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

/// Characters the Windows file APIs refuse in a path.
fn is_reserved_path_char(c: char) -> bool {
    matches!(c, '"' | '<' | '>' | '|' | '\u{1}'..='\u{1F}')
}

fn has_dangerous_sequence(path: &str) -> bool {
    path.contains("..") || path.contains('~')
}

/// Upper-cased, backslash-separated form of a deny-list entry without
/// trailing separators.
fn normalize_dir(dir: &str) -> Option<String> {
    let dir = dir.trim().replace('/', "\\");
    let dir = dir.trim_end_matches('\\');
    if dir.is_empty() {
        None
    } else {
        Some(dir.to_uppercase())
    }
}

/// Deny-list of directories assets may never resolve under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPolicy {
    restricted: Vec<String>,
}

impl Default for PathPolicy {
    fn default() -> Self {
        Self::from_platform()
    }
}

impl PathPolicy {
    /// Only the built-in system directories.
    pub fn builtin() -> Self {
        let mut policy = Self { restricted: Vec::new() };
        for dir in BUILTIN_RESTRICTED_DIRS {
            policy.restrict(dir);
        }
        policy
    }

    /// Built-in directories plus those discovered from the running system.
    pub fn from_platform() -> Self {
        let mut policy = Self::builtin();
        for dir in platform::system_directories() {
            policy.restrict(&dir);
        }
        policy
    }

    /// Add a directory to the deny-list.
    pub fn restrict(&mut self, dir: &str) {
        if let Some(dir) = normalize_dir(dir) {
            if !self.restricted.contains(&dir) {
                self.restricted.push(dir);
            }
        }
    }

    pub fn with_restricted_dir(mut self, dir: &str) -> Self {
        self.restrict(dir);
        self
    }

    pub fn restricted_dirs(&self) -> &[String] {
        &self.restricted
    }

    /// Whether `canonical` falls under a deny-listed directory.
    ///
    /// Plain string prefix, so `C:\Windows\System32` also covers
    /// `C:\Windows\System32.old`.
    pub fn is_restricted(&self, canonical: &str) -> bool {
        let upper = canonical.to_uppercase();
        self.restricted.iter().any(|dir| upper.starts_with(dir.as_str()))
    }

    /// Validate a candidate asset path for `field`.
    ///
    /// Returns `Ok(None)` for an empty input. Every other rejection is an
    /// error, even for optional assets.
    pub fn validate(
        &self,
        input: &str,
        field: &str,
        kind: AssetKind,
    ) -> Result<Option<VerifiedPath>, ValidationError> {
        if input.is_empty() {
            return Ok(None);
        }
        let field = format!("{field} path");

        if input.contains('\0') {
            return Err(ValidationError::IllegalCharacter {
                field,
                what: "invalid null characters",
            });
        }

        if utf16_len(input) > MAX_PATH_LENGTH {
            return Err(ValidationError::TooLong {
                field,
                max: MAX_PATH_LENGTH,
            });
        }

        if input.chars().any(is_reserved_path_char) {
            return Err(ValidationError::IllegalCharacter {
                field,
                what: "invalid characters",
            });
        }

        if !matches_asset_path(input, kind.extension()) {
            return Err(ValidationError::InvalidPattern {
                field,
                extension: kind.extension(),
            });
        }

        if has_dangerous_sequence(input) {
            return Err(ValidationError::DangerousSequence { field });
        }

        let canonical = canonicalize(input).map_err(|reason| ValidationError::InvalidPath {
            field: field.clone(),
            reason,
        })?;

        self.accept_canonical(canonical, field, kind).map(Some)
    }

    /// Checks that must hold for the canonical form, which on Windows may be
    /// a link target the raw input never named.
    fn accept_canonical(
        &self,
        canonical: String,
        field: String,
        kind: AssetKind,
    ) -> Result<VerifiedPath, ValidationError> {
        if utf16_len(&canonical) > MAX_PATH_LENGTH {
            return Err(ValidationError::TooLong {
                field,
                max: MAX_PATH_LENGTH,
            });
        }

        if !has_extension(&canonical, kind.extension()) {
            return Err(ValidationError::InvalidPattern {
                field,
                extension: kind.extension(),
            });
        }

        if has_dangerous_sequence(&canonical) {
            return Err(ValidationError::DangerousSequence { field });
        }

        if self.is_restricted(&canonical) {
            return Err(ValidationError::RestrictedDirectory { field });
        }

        debug!("{} accepted as {:?}", field, canonical);
        Ok(VerifiedPath { canonical, kind })
    }
}

fn has_extension(path: &str, extension: &str) -> bool {
    path.rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(extension))
}

/// Validate `input` against the platform deny-list.
pub fn validate_path(
    input: &str,
    field: &str,
    kind: AssetKind,
) -> Result<Option<VerifiedPath>, ValidationError> {
    PathPolicy::default().validate(input, field, kind)
}

/// Absolute normalized form of a drive-rooted path.
///
/// `.` segments and empty segments vanish, `..` pops (never above the drive
/// root), trailing dots and spaces are dropped from each segment and the
/// drive letter is upper-cased. On Windows an existing target is further
/// resolved through the filesystem.
pub fn canonicalize(path: &str) -> Result<String, String> {
    let (drive, rest) = platform::split_drive(path).ok_or_else(|| "path is not drive-rooted".to_string())?;

    let mut parts: Vec<&str> = Vec::new();
    for segment in rest.split(['\\', '/']) {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            _ => {
                let trimmed = segment.trim_end_matches(['.', ' ']);
                if !trimmed.is_empty() {
                    parts.push(trimmed);
                }
            }
        }
    }

    if parts.is_empty() {
        return Err("path does not name a file".into());
    }

    let canonical = format!("{}:\\{}", drive.to_ascii_uppercase(), parts.join("\\"));
    if utf16_len(&canonical) > MAX_PATH_LENGTH {
        return Err(format!("canonical path exceeds {MAX_PATH_LENGTH} characters"));
    }

    #[cfg(windows)]
    let canonical = resolve_links(canonical)?;

    Ok(canonical)
}

/// Follow symlinks and junctions of an existing target.
#[cfg(windows)]
fn resolve_links(path: String) -> Result<String, String> {
    match std::fs::symlink_metadata(&path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(path),
        Err(e) => Err(e.to_string()),
        Ok(_) => {
            let resolved = std::fs::canonicalize(&path).map_err(|e| e.to_string())?;
            let resolved = resolved
                .to_str()
                .ok_or_else(|| "resolved path is not valid Unicode".to_string())?;
            strip_verbatim_prefix(resolved)
        }
    }
}

/// Turn a `\\?\` path back into its drive-rooted form.
#[cfg_attr(not(windows), allow(dead_code))]
fn strip_verbatim_prefix(path: &str) -> Result<String, String> {
    if path.starts_with(r"\\?\UNC\") || (path.starts_with(r"\\") && !path.starts_with(r"\\?\")) {
        return Err("path resolves to a network location".into());
    }
    let path = path.strip_prefix(r"\\?\").unwrap_or(path);
    match platform::split_drive(path) {
        Some(_) => Ok(path.to_string()),
        None => Err("path resolves outside a drive root".into()),
    }
}
