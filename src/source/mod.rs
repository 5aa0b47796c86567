//! Text source implementations
//!
//! `FileSource` loads a file from disk, normalizes it, and stamps a content
//! revision; `InMemorySource` wraps a string for hosts and tests. Both hold
//! the normalized text in memory; layout and page bitmaps stay lazy, the
//! text itself does not.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::SourceError;
use crate::traits::TextSource;
use crate::types::SourceIdentity;

/// A text source loaded from a file path
#[derive(Debug)]
pub struct FileSource {
    identity: SourceIdentity,
    text: String,
}

impl FileSource {
    /// Open and normalize a file
    ///
    /// The raw bytes are lossily decoded as UTF-8 and CRLF line endings are
    /// normalized to LF. The identity's revision is a SHA-256 digest of the
    /// raw bytes, so a changed file never compares equal to a prior load.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SourceError::NotFound(path.display().to_string()),
            _ => SourceError::Io(e),
        })?;

        let revision = hex::encode(Sha256::digest(&bytes));
        let text = normalize(&String::from_utf8_lossy(&bytes));

        Ok(Self {
            identity: SourceIdentity {
                name: path.display().to_string(),
                revision,
            },
            text,
        })
    }
}

impl TextSource for FileSource {
    fn identity(&self) -> &SourceIdentity {
        &self.identity
    }

    fn len(&self) -> usize {
        self.text.len()
    }

    fn read_from(&self, offset: usize) -> Result<&str, SourceError> {
        slice_from(&self.text, offset)
    }
}

/// A text source backed by an in-memory string
pub struct InMemorySource {
    identity: SourceIdentity,
    text: String,
}

impl InMemorySource {
    /// Wrap a string as a source, normalizing line endings
    pub fn new(name: impl Into<String>, text: impl AsRef<str>) -> Self {
        let text = normalize(text.as_ref());
        let revision = hex::encode(Sha256::digest(text.as_bytes()));
        Self {
            identity: SourceIdentity {
                name: name.into(),
                revision,
            },
            text,
        }
    }
}

impl TextSource for InMemorySource {
    fn identity(&self) -> &SourceIdentity {
        &self.identity
    }

    fn len(&self) -> usize {
        self.text.len()
    }

    fn read_from(&self, offset: usize) -> Result<&str, SourceError> {
        slice_from(&self.text, offset)
    }
}

/// Normalize line endings (CRLF and lone CR become LF)
fn normalize(raw: &str) -> String {
    if !raw.contains('\r') {
        return raw.to_string();
    }
    raw.replace("\r\n", "\n").replace('\r', "\n")
}

/// Tail slice starting at a validated byte offset
fn slice_from(text: &str, offset: usize) -> Result<&str, SourceError> {
    if offset > text.len() || !text.is_char_boundary(offset) {
        return Err(SourceError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("offset {} outside source bounds", offset),
        )));
    }
    Ok(&text[offset..])
}
