//! In-memory archive reader for report packages (C1).
//!
//! A [`PackageReader`] wraps a complete in-memory blob as a random-access
//! ZIP archive (matching the reference `report.zpt` container format) and
//! exposes path-safe named-entry reads. It backs the ephemeral asset server
//! ([`crate::asset_server`]), which has exactly one reader per in-flight job.
//!
//! # Example
//!
//! ```rust,ignore
//! use zpt_render::package::PackageReader;
//!
//! let reader = PackageReader::open(bytes)?;
//! let body = reader.read("/", "report.html")?;
//! ```

use std::collections::HashMap;
use std::io::{Cursor, Read as _};

use zip::ZipArchive;

/// Errors raised while opening or reading a package archive.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PackageError {
    /// The supplied blob does not parse as a ZIP archive at all (empty or
    /// truncated central directory).
    #[error("not an archive: {0}")]
    NotArchive(String),

    /// The blob parses as a ZIP but a requested entry's local header is
    /// inconsistent with the central directory, or decompression failed.
    #[error("corrupt archive entry: {0}")]
    Corrupt(String),

    /// The resolved name escaped the archive root (parent-segment traversal
    /// or an absolute path).
    #[error("forbidden path: {0}")]
    Forbidden(String),

    /// The normalized name has no corresponding entry in the archive.
    #[error("entry not found: {0}")]
    NotFound(String),

    /// Unexpected I/O failure reading the underlying blob.
    #[error("package io error: {0}")]
    Io(String),
}

/// A random-access archive of named byte entries.
///
/// Built once per job from a complete in-memory blob. Not required to be
/// concurrency-safe — each asset server instance is single-owner, per §4.1.
pub struct PackageReader {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    /// Normalized entry name -> index into the archive, built once at open
    /// time so repeated `read` calls don't rescan the central directory.
    index: HashMap<String, usize>,
}

impl PackageReader {
    /// Validates `bytes` as a ZIP archive and indexes its entries.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::NotArchive`] if the blob has no valid central
    /// directory (empty, truncated, or not a ZIP at all).
    pub fn open(bytes: Vec<u8>) -> Result<Self, PackageError> {
        if bytes.is_empty() {
            return Err(PackageError::NotArchive("empty package blob".to_string()));
        }
        let cursor = Cursor::new(bytes);
        let archive = ZipArchive::new(cursor)
            .map_err(|e| PackageError::NotArchive(e.to_string()))?;

        let mut index = HashMap::with_capacity(archive.len());
        for i in 0..archive.len() {
            // name_for_index borrows the archive immutably; cheap, no decompression.
            if let Some(name) = archive.name_for_index(i) {
                index.insert(normalize_entry_name(name), i);
            }
        }

        Ok(Self { archive, index })
    }

    /// Resolves `name` against the archive root and returns the entry's
    /// full decompressed content.
    ///
    /// Resolution rules (§4.1):
    /// 1. `/` maps to `default_index`.
    /// 2. One leading slash is trimmed; a path with a `..` segment (on
    ///    either separator style) is `Forbidden`.
    /// 3. The normalized name is looked up; a miss is `NotFound`.
    pub fn read(&mut self, name: &str, default_index: &str) -> Result<Vec<u8>, PackageError> {
        let resolved = resolve_request_path(name, default_index)?;

        let idx = *self
            .index
            .get(&resolved)
            .ok_or_else(|| PackageError::NotFound(resolved.clone()))?;

        let mut entry = self
            .archive
            .by_index(idx)
            .map_err(|e| PackageError::Corrupt(e.to_string()))?;

        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut buf)
            .map_err(|e| PackageError::Corrupt(e.to_string()))?;
        Ok(buf)
    }

    /// Number of entries in the archive.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Normalizes a ZIP central-directory entry name for lookup: backslashes
/// become forward slashes and a single leading slash is trimmed. This lets
/// nested-directory entries (`subdirectory/nested.html`) resolve the same
/// way whether the archive was produced on Windows or Unix.
fn normalize_entry_name(name: &str) -> String {
    name.replace('\\', "/").trim_start_matches('/').to_string()
}

/// Applies the §4.1 resolution rules to an incoming request path.
fn resolve_request_path(name: &str, default_index: &str) -> Result<String, PackageError> {
    if name == "/" || name.is_empty() {
        return Ok(normalize_entry_name(default_index));
    }

    let unified = name.replace('\\', "/");
    let trimmed = unified.strip_prefix('/').unwrap_or(&unified);

    if trimmed.starts_with("..") || trimmed.split('/').any(|seg| seg == "..") {
        return Err(PackageError::Forbidden(name.to_string()));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use zip::write::{SimpleFileOptions, ZipWriter};

    fn make_fixture() -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let cursor = Cursor::new(&mut buf);
            let mut writer = ZipWriter::new(cursor);
            let opts = SimpleFileOptions::default();
            writer.start_file("report.html", opts).unwrap();
            writer.write_all(b"<html>root</html>").unwrap();
            writer.start_file("subdirectory/nested.html", opts).unwrap();
            writer.write_all(b"<html>nested</html>").unwrap();
            writer.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_open_empty_blob_is_not_archive() {
        let err = PackageReader::open(Vec::new()).unwrap_err();
        assert!(matches!(err, PackageError::NotArchive(_)));
    }

    #[test]
    fn test_open_garbage_blob_is_not_archive() {
        let err = PackageReader::open(vec![1, 2, 3, 4]).unwrap_err();
        assert!(matches!(err, PackageError::NotArchive(_)));
    }

    #[test]
    fn test_root_maps_to_default_index() {
        let mut reader = PackageReader::open(make_fixture()).unwrap();
        let body = reader.read("/", "report.html").unwrap();
        assert_eq!(body, b"<html>root</html>");
    }

    #[test]
    fn test_nested_path_resolves() {
        let mut reader = PackageReader::open(make_fixture()).unwrap();
        let body = reader.read("/subdirectory/nested.html", "report.html").unwrap();
        assert_eq!(body, b"<html>nested</html>");
    }

    #[test]
    fn test_missing_entry_is_not_found() {
        let mut reader = PackageReader::open(make_fixture()).unwrap();
        let err = reader.read("/missing.html", "report.html").unwrap_err();
        assert!(matches!(err, PackageError::NotFound(_)));
    }

    #[test]
    fn test_parent_traversal_is_forbidden() {
        let mut reader = PackageReader::open(make_fixture()).unwrap();
        let err = reader.read("/../etc/passwd", "report.html").unwrap_err();
        assert!(matches!(err, PackageError::Forbidden(_)));

        let err = reader.read("/subdirectory/../../passwd", "report.html").unwrap_err();
        assert!(matches!(err, PackageError::Forbidden(_)));
    }

    #[test]
    fn test_backslash_traversal_is_forbidden() {
        let mut reader = PackageReader::open(make_fixture()).unwrap();
        let err = reader.read("..\\secret.html", "report.html").unwrap_err();
        assert!(matches!(err, PackageError::Forbidden(_)));
    }

    #[test]
    fn test_reader_len() {
        let reader = PackageReader::open(make_fixture()).unwrap();
        assert_eq!(reader.len(), 2);
        assert!(!reader.is_empty());
    }
}
