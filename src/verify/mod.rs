//! Syntax-tree equivalence checks for reformatted documents.
//!
//! A reformatted document is accepted only when its normalized Python syntax
//! tree equals that of the document it was produced from. Combined with
//! [`BinarySearch`] this finds the smallest amount of context for which a
//! partial application of the formatter's output is still equivalent.

pub mod bisect;

pub use bisect::{BinarySearch, SearchError};

use crate::diff::DiffChunk;
use crate::document::TextDocument;
use crate::pool;
use crate::ts::{normalize, TreeSitterError};
use std::collections::HashMap;
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

#[derive(Error, Debug)]
pub enum VerificationError {
    #[error(
        "syntax tree changed when applying {} reformatted chunk(s) to edited lines {:?}",
        chunks.iter().filter(|c| !c.is_unchanged()).count(),
        edited_linenums
    )]
    NotEquivalent {
        chunks: Vec<DiffChunk>,
        edited_linenums: Vec<usize>,
    },

    #[error("source does not parse: {0}")]
    SourceSyntax(#[source] TreeSitterError),

    #[error("Tree-sitter error: {0}")]
    TreeSitter(#[from] TreeSitterError),
}

/// Parse `source` and render its normalized tree.
///
/// Returns the rendering and whether the tree has syntax errors.
fn render(source: &str) -> Result<(Vec<String>, Option<TreeSitterError>), TreeSitterError> {
    pool::with_parser(|parser| -> Result<_, TreeSitterError> {
        let parsed = parser.parse_with_source(source)?;
        let error = parsed.first_error().map(|e| TreeSitterError::SyntaxError {
            line: e.line,
            byte_start: e.byte_start,
            byte_end: e.byte_end,
        });
        Ok((normalize(&parsed), error))
    })?
}

/// Compares candidate documents against a fixed baseline.
///
/// Results are cached by content hash, since bisection often produces the
/// same candidate for neighbouring context sizes.
pub struct AstVerifier {
    baseline: Vec<String>,
    cache: HashMap<u64, bool>,
}

impl AstVerifier {
    /// Parse the baseline. A baseline with syntax errors cannot be verified against.
    pub fn new(baseline: &TextDocument) -> Result<Self, VerificationError> {
        let (rendered, error) = render(baseline.string())?;
        if let Some(error) = error {
            return Err(VerificationError::SourceSyntax(error));
        }
        Ok(Self {
            baseline: rendered,
            cache: HashMap::new(),
        })
    }

    /// Whether `document` has the same syntax tree as the baseline.
    pub fn is_equivalent_to_baseline(
        &mut self,
        document: &TextDocument,
    ) -> Result<bool, VerificationError> {
        let key = xxh3_64(document.string().as_bytes());
        if let Some(&cached) = self.cache.get(&key) {
            return Ok(cached);
        }
        let (rendered, error) = render(document.string())?;
        let equivalent = error.is_none() && rendered == self.baseline;
        self.cache.insert(key, equivalent);
        Ok(equivalent)
    }

    /// Like [`is_equivalent_to_baseline`](Self::is_equivalent_to_baseline),
    /// failing with [`VerificationError::NotEquivalent`] on a mismatch.
    pub fn verify(
        &mut self,
        document: &TextDocument,
        chunks: &[DiffChunk],
        edited_linenums: &[usize],
    ) -> Result<(), VerificationError> {
        if self.is_equivalent_to_baseline(document)? {
            return Ok(());
        }
        log::debug!(
            "syntax tree verification failed, edited lines {:?}, {} chunk(s)",
            edited_linenums,
            chunks.len()
        );
        Err(VerificationError::NotEquivalent {
            chunks: chunks.to_vec(),
            edited_linenums: edited_linenums.to_vec(),
        })
    }
}

/// Verify that `dst` has the same syntax tree as `src`.
///
/// `chunks` and `edited_linenums` describe how `dst` was produced and are
/// carried in the error for reporting.
pub fn verify_ast_unchanged(
    src: &TextDocument,
    dst: &TextDocument,
    chunks: &[DiffChunk],
    edited_linenums: &[usize],
) -> Result<(), VerificationError> {
    AstVerifier::new(src)?.verify(dst, chunks, edited_linenums)
}
