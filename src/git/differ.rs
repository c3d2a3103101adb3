use crate::diff::{diff_opcodes, opcodes_to_edit_linenums};
use crate::document::TextDocument;
use crate::git::content::git_get_content_at_revision;
use crate::git::errors::GitError;
use crate::git::revision::{Revision, RevisionRange};
use std::path::{Path, PathBuf};

/// Finds the line numbers edited between the ends of a revision range.
#[derive(Debug, Clone)]
pub struct EditedLinenumsDiffer {
    root: PathBuf,
    revrange: RevisionRange,
}

impl EditedLinenumsDiffer {
    pub fn new(root: impl Into<PathBuf>, revrange: RevisionRange) -> Self {
        Self {
            root: root.into(),
            revrange,
        }
    }

    /// Lines of `path` at the target revision that differ from the base.
    pub fn compare_revisions(
        &self,
        path: &Path,
        context_lines: usize,
    ) -> Result<Vec<usize>, GitError> {
        let new = git_get_content_at_revision(path, &self.revrange.rev2, &self.root)?;
        self.revision_vs_lines(path, &new, context_lines)
    }

    /// Lines of `content` that differ from `path` at the base revision.
    pub fn revision_vs_lines(
        &self,
        path: &Path,
        content: &TextDocument,
        context_lines: usize,
    ) -> Result<Vec<usize>, GitError> {
        let base = Revision::Named(self.revrange.base_revision(&self.root)?);
        let old = git_get_content_at_revision(path, &base, &self.root)?;
        let opcodes = diff_opcodes(&old, content);
        Ok(opcodes_to_edit_linenums(&opcodes, context_lines))
    }
}
