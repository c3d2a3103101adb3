use crate::document::{DocumentError, TextDocument};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// A whole-file replacement guarded by a check of the current content.
///
/// The reformatted document is computed from what was on disk when the run
/// started; if the file changed since then, writing would silently discard
/// those changes, so [`FileEdit::apply`] refuses.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "FileEdit does nothing until apply() is called"]
pub struct FileEdit {
    /// Path to the file to replace
    pub file: PathBuf,
    /// Content to write
    pub new_content: TextDocument,
    /// What the file must contain before writing
    pub expected_before: EditVerification,
}

/// Verification strategy for the content found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    /// Exact text match required
    ExactMatch(String),
    /// xxh3 hash of expected text (for larger files)
    Hash(u64),
}

impl EditVerification {
    /// Check if the provided text matches the verification criteria.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Create verification from text, using hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("{file} was modified while it was being reformatted")]
    BeforeTextMismatch { file: PathBuf },

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of applying an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "EditResult should be checked for success/already-applied"]
pub enum EditResult {
    /// New content was written
    Applied { file: PathBuf, bytes_written: usize },
    /// The file already held the new content
    AlreadyApplied { file: PathBuf },
}

impl FileEdit {
    /// Replace `file`, which must still contain `before`, with `after`.
    pub fn new(file: impl Into<PathBuf>, before: &TextDocument, after: TextDocument) -> Self {
        Self {
            file: file.into(),
            new_content: after,
            expected_before: EditVerification::from_text(before.string()),
        }
    }

    pub fn apply(&self) -> Result<EditResult, EditError> {
        let current = TextDocument::from_file(&self.file)?;

        if current.string() == self.new_content.string()
            && current.encoding() == self.new_content.encoding()
        {
            return Ok(EditResult::AlreadyApplied {
                file: self.file.clone(),
            });
        }
        if !self.expected_before.matches(current.string()) {
            return Err(EditError::BeforeTextMismatch {
                file: self.file.clone(),
            });
        }

        let bytes = self.new_content.encode();
        atomic_write(&self.file, &bytes)?;
        log::debug!("Wrote {} bytes to {}", bytes.len(), self.file.display());

        Ok(EditResult::Applied {
            file: self.file.clone(),
            bytes_written: bytes.len(),
        })
    }
}

/// Write via a sibling tempfile, fsync and rename.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), EditError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;

    // Keep the permissions of the file being replaced
    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file().set_permissions(metadata.permissions())?;
    }

    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
