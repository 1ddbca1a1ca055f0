//! Content sniffing for asset files
//!
//! A file is only trusted as WAV or PNG once its leading bytes say so. Size
//! limits are checked from metadata before anything is read.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use tracing::debug;

use super::path::{AssetKind, VerifiedPath};
use crate::platform;

/// Default ceiling for audio files
pub const MAX_AUDIO_BYTES: u64 = 10 * 1024 * 1024;

/// Default ceiling for image files
pub const MAX_IMAGE_BYTES: u64 = 1024 * 1024;

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Container format confirmed from a file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSignature {
    Wav,
    Png,
}

impl FileSignature {
    /// Bytes needed to recognise the format
    pub fn header_len(self) -> usize {
        match self {
            FileSignature::Wav => 12,
            FileSignature::Png => 8,
        }
    }

    pub fn default_ceiling(self) -> u64 {
        match self {
            FileSignature::Wav => MAX_AUDIO_BYTES,
            FileSignature::Png => MAX_IMAGE_BYTES,
        }
    }

    /// Whether `header` starts the format.
    ///
    /// WAV is recognised by its `RIFF` and `WAVE` markers; the chunk size in
    /// between is not checked.
    pub fn matches(self, header: &[u8]) -> bool {
        match self {
            FileSignature::Wav => {
                header.len() >= 12 && &header[0..4] == b"RIFF" && &header[8..12] == b"WAVE"
            }
            FileSignature::Png => header.starts_with(&PNG_SIGNATURE),
        }
    }
}

/// Read access to asset bytes.
pub trait AssetSource {
    /// Length of the regular file at `path`.
    fn file_len(&self, path: &Path) -> io::Result<u64>;

    /// Fill `buf` from the start of the file at `path`.
    fn read_header(&self, path: &Path, buf: &mut [u8]) -> io::Result<()>;
}

/// The local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFiles;

impl LocalFiles {
    /// Drive-rooted paths only name real files on Windows. Anywhere else the
    /// OS would resolve them against the working directory.
    fn local(path: &Path) -> io::Result<&Path> {
        if cfg!(not(windows)) && path.to_str().is_some_and(platform::is_drive_rooted) {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "drive-rooted paths are only readable on Windows",
            ));
        }
        Ok(path)
    }
}

impl AssetSource for LocalFiles {
    fn file_len(&self, path: &Path) -> io::Result<u64> {
        let meta = fs::metadata(Self::local(path)?)?;
        if !meta.is_file() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"));
        }
        Ok(meta.len())
    }

    fn read_header(&self, path: &Path, buf: &mut [u8]) -> io::Result<()> {
        let mut file = File::open(Self::local(path)?)?;
        file.read_exact(buf)
    }
}

/// Size of the file if it is within bounds and carries `kind`'s signature.
fn inspect<S: AssetSource + ?Sized>(source: &S, path: &Path, kind: FileSignature, ceiling: u64) -> Option<u64> {
    let len = match source.file_len(path) {
        Ok(len) => len,
        Err(e) => {
            debug!("Cannot stat {:?}: {}", path, e);
            return None;
        }
    };

    let header_len = kind.header_len();
    if len < header_len as u64 {
        debug!("{:?} is too short for {:?} ({} bytes)", path, kind, len);
        return None;
    }
    if len > ceiling {
        debug!("{:?} exceeds the {} byte limit ({} bytes)", path, ceiling, len);
        return None;
    }

    let mut buf = [0u8; 12];
    let header = &mut buf[..header_len];
    if let Err(e) = source.read_header(path, header) {
        debug!("Cannot read header of {:?}: {}", path, e);
        return None;
    }

    if kind.matches(header) {
        Some(len)
    } else {
        debug!("{:?} does not carry a {:?} signature", path, kind);
        None
    }
}

/// Whether `path` names a file within `ceiling` bytes whose header matches
/// `kind`. Never fails: any I/O problem reads as `false`.
pub fn sniff<S: AssetSource + ?Sized>(source: &S, path: &Path, kind: FileSignature, ceiling: u64) -> bool {
    inspect(source, path, kind, ceiling).is_some()
}

/// Confirm a verified path's content on the local filesystem with the
/// default ceiling for `kind`.
pub fn confirm_signature(path: &VerifiedPath, kind: FileSignature) -> bool {
    sniff(&LocalFiles, path.as_path(), kind, kind.default_ceiling())
}

/// A verified path whose content has been confirmed.
///
/// This is the only form in which an asset reaches the toast payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFile {
    path: VerifiedPath,
    size: u64,
}

impl AssetFile {
    /// Confirm `path` against its kind's signature.
    ///
    /// `None` means the asset should be treated as absent.
    pub fn probe<S: AssetSource + ?Sized>(path: VerifiedPath, source: &S, ceiling: u64) -> Option<Self> {
        let size = inspect(source, path.as_path(), path.kind().signature(), ceiling)?;
        Some(Self { path, size })
    }

    pub fn path(&self) -> &VerifiedPath {
        &self.path
    }

    pub fn kind(&self) -> AssetKind {
        self.path.kind()
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;

    /// In-memory files keyed by path string.
    #[derive(Default)]
    pub struct MemoryAssets {
        files: HashMap<String, Vec<u8>>,
        pub reads: Cell<usize>,
    }

    impl MemoryAssets {
        pub fn with(mut self, path: &str, bytes: &[u8]) -> Self {
            self.files.insert(path.to_string(), bytes.to_vec());
            self
        }
    }

    impl AssetSource for MemoryAssets {
        fn file_len(&self, path: &Path) -> io::Result<u64> {
            self.files
                .get(path.to_string_lossy().as_ref())
                .map(|bytes| bytes.len() as u64)
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }

        fn read_header(&self, path: &Path, buf: &mut [u8]) -> io::Result<()> {
            self.reads.set(self.reads.get() + 1);
            let bytes = self
                .files
                .get(path.to_string_lossy().as_ref())
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;
            let mut reader = bytes.as_slice();
            reader.read_exact(buf)
        }
    }

    pub const MINIMAL_WAV: [u8; 12] = [0x52, 0x49, 0x46, 0x46, 0, 0, 0, 0, 0x57, 0x41, 0x56, 0x45];
    pub const MINIMAL_PNG: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
}
