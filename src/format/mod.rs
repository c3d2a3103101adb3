//! Reformatting restricted to edited regions.
//!
//! The formatter runs on the whole file, then its output is applied only to
//! chunks that touch lines edited in the revision range. Keeping only some
//! chunks can break the program (an indented block half re-indented, say),
//! so each candidate is checked for syntax-tree equivalence. When the
//! edited-lines-only candidate fails, the edited spans are widened by context
//! lines; [`BinarySearch`] finds the smallest context that yields an
//! equivalent document.

pub mod chooser;
pub mod formatter;

pub use chooser::choose_lines;
pub use formatter::{CommandFormatter, FormatError, Formatter, DEFAULT_FORMATTER};

use crate::diff::diff_chunks;
use crate::document::TextDocument;
use crate::git::{git_get_content_at_revision, EditedLinenumsDiffer, GitError, RevisionRange};
use crate::verify::{AstVerifier, BinarySearch, VerificationError};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReformatError {
    #[error("failed to reformat {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    #[error("{path}: {source}")]
    Verification {
        path: PathBuf,
        #[source]
        source: VerificationError,
    },

    #[error(transparent)]
    Git(#[from] GitError),
}

/// A file whose edited regions were reformatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReformatOutcome {
    /// Path relative to the repository root
    pub path: PathBuf,
    /// Content at the target revision before reformatting
    pub original: TextDocument,
    /// Content with the accepted chunks applied
    pub reformatted: TextDocument,
    /// Context lines that had to be added around edits to stay equivalent
    pub context_lines: usize,
}

/// Reformat the regions of `path` edited since the base of `revrange`.
///
/// The content reformatted is that of `revrange.rev2`, normally the working
/// tree. Returns `None` when the formatter changes nothing in the edited
/// regions. The file on disk is not modified.
pub fn reformat_edited_parts<F: Formatter + ?Sized>(
    root: &Path,
    path: &Path,
    revrange: &RevisionRange,
    formatter: &F,
) -> Result<Option<ReformatOutcome>, ReformatError> {
    let original = git_get_content_at_revision(path, &revrange.rev2, root)?;
    let formatted = formatter
        .format(&original)
        .map_err(|source| ReformatError::Format {
            path: path.to_path_buf(),
            source,
        })?;
    if formatted.lines() == original.lines() {
        return Ok(None);
    }

    let verification_error = |source| ReformatError::Verification {
        path: path.to_path_buf(),
        source,
    };
    let mut verifier = AstVerifier::new(&original).map_err(verification_error)?;
    let differ = EditedLinenumsDiffer::new(root, revrange.clone());
    let chunks = diff_chunks(&original, &formatted);

    let max_context_lines = original.lines().len();
    let mut search = BinarySearch::new(0, max_context_lines + 1);
    let mut accepted: Option<(usize, TextDocument)> = None;
    let mut last_failure = None;

    while !search.found() {
        let context_lines = search.get_next();
        if context_lines > 0 {
            log::debug!(
                "Trying with {context_lines} lines of context for {}",
                path.display()
            );
        }
        let edited_linenums = differ.revision_vs_lines(path, &original, context_lines)?;
        let chosen = original.with_lines(choose_lines(&chunks, &edited_linenums));

        match verifier.verify(&chosen, &chunks, &edited_linenums) {
            Ok(()) => {
                search.respond(true);
                accepted = Some((context_lines, chosen));
            }
            Err(error @ VerificationError::NotEquivalent { .. }) => {
                search.respond(false);
                last_failure = Some(error);
            }
            Err(other) => return Err(verification_error(other)),
        }
    }

    let Some((context_lines, reformatted)) = accepted else {
        // Even the fully reformatted file differs: the formatter is unsafe here.
        return Err(verification_error(last_failure.unwrap_or(
            VerificationError::NotEquivalent {
                chunks,
                edited_linenums: Vec::new(),
            },
        )));
    };

    if reformatted.lines() == original.lines() {
        return Ok(None);
    }
    Ok(Some(ReformatOutcome {
        path: path.to_path_buf(),
        original,
        reformatted,
        context_lines,
    }))
}
