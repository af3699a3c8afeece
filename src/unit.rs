//! Source units: the `(path, text)` pairs fed into the analyzer.

use std::path::Path;

use crate::error::{Error, Result};

/// A single source file queued for analysis.
///
/// Construction is the only place the crate touches the filesystem; all
/// downstream stages operate on the in-memory text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Path as supplied by the file-discovery collaborator, kept verbatim.
    pub path: String,
    /// Full file contents.
    pub content: String,
}

impl SourceUnit {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Read a unit from disk.
    ///
    /// Bytes are decoded lossily: invalid UTF-8 sequences are replaced
    /// rather than rejected, so a file with a stray encoding can still be
    /// scanned. Only an I/O failure yields an error, and the caller treats
    /// that as a per-unit skip, never a run abort.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| Error::UnreadableFile {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            path: path.display().to_string(),
            content: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_decodes_invalid_utf8_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.cpp");
        let mut f = std::fs::File::create(&path).unwrap();
        // 0xE9 is 'é' in Latin-1, invalid as a standalone UTF-8 byte.
        f.write_all(b"// caf\xE9\nint x;\n").unwrap();

        let unit = SourceUnit::read(&path).unwrap();
        assert!(unit.content.contains("int x;"));
        assert!(unit.content.contains('\u{FFFD}'));
    }

    #[test]
    fn test_read_missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceUnit::read(dir.path().join("absent.cpp")).unwrap_err();
        match err {
            Error::UnreadableFile { path, .. } => assert!(path.contains("absent.cpp")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
