//! Immutable text snapshots with line, encoding and newline views.
//!
//! A [`TextDocument`] is what every query in this crate produces and
//! consumes: file content at a revision, in-memory formatter output, the
//! chosen mix of both. An empty document stands for "file absent", so a file
//! created or deleted between two revisions diffs like any other change.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("content is not valid UTF-8{}", path_suffix(path))]
    InvalidUtf8 {
        path: Option<PathBuf>,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" ({})", p.display()))
        .unwrap_or_default()
}

/// Byte encoding of a document on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    /// UTF-8 with a leading byte order mark
    Utf8Sig,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Utf8 => write!(f, "utf-8"),
            Encoding::Utf8Sig => write!(f, "utf-8-sig"),
        }
    }
}

/// Line terminator style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Newline {
    #[default]
    Lf,
    CrLf,
}

impl Newline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Newline::Lf => "\n",
            Newline::CrLf => "\r\n",
        }
    }

    /// Detect the style from the first line terminator in `text`.
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(idx) if idx > 0 && text.as_bytes()[idx - 1] == b'\r' => Newline::CrLf,
            _ => Newline::Lf,
        }
    }
}

/// A snapshot of file content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextDocument {
    string: String,
    encoding: Encoding,
    newline: Newline,
    lines: Vec<String>,
}

impl TextDocument {
    /// The empty document, also used for content that does not exist.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a document from decoded text, keeping it verbatim.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_encoding(text, Encoding::Utf8)
    }

    fn with_encoding(text: impl Into<String>, encoding: Encoding) -> Self {
        let string = text.into();
        let newline = Newline::detect(&string);
        let lines = string.lines().map(str::to_owned).collect();
        Self {
            string,
            encoding,
            newline,
            lines,
        }
    }

    /// Build a document from canonical lines, terminating each with `newline`.
    pub fn from_lines<I, S>(lines: I, encoding: Encoding, newline: Newline) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        let mut string = String::new();
        for line in &lines {
            string.push_str(line);
            string.push_str(newline.as_str());
        }
        Self {
            string,
            encoding,
            newline,
            lines,
        }
    }

    /// Decode raw bytes, recognizing a UTF-8 byte order mark.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, DocumentError> {
        let (bytes, encoding) = match bytes.strip_prefix(UTF8_BOM) {
            Some(rest) => (rest.to_vec(), Encoding::Utf8Sig),
            None => (bytes, Encoding::Utf8),
        };
        let text = String::from_utf8(bytes)
            .map_err(|source| DocumentError::InvalidUtf8 { path: None, source })?;
        Ok(Self::with_encoding(text, encoding))
    }

    /// Read a file from disk.
    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        let bytes = fs::read(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(bytes).map_err(|e| match e {
            DocumentError::InvalidUtf8 { source, .. } => DocumentError::InvalidUtf8 {
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        })
    }

    /// Same encoding and newline style, new lines.
    pub fn with_lines<I, S>(&self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_lines(lines, self.encoding, self.newline)
    }

    pub fn string(&self) -> &str {
        &self.string
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn newline(&self) -> Newline {
        self.newline
    }

    pub fn is_empty(&self) -> bool {
        self.string.is_empty()
    }

    /// Encode back to bytes, restoring a byte order mark if one was read.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.string.len() + UTF8_BOM.len());
        if self.encoding == Encoding::Utf8Sig {
            out.extend_from_slice(UTF8_BOM);
        }
        out.extend_from_slice(self.string.as_bytes());
        out
    }
}
