//! Git queries: revision ranges, content at a revision, edited lines.
//!
//! All queries shell out to `git` in a given working directory and fully
//! consume its output before returning.

pub mod content;
pub mod differ;
pub mod errors;
pub mod revision;
pub mod runner;

pub use content::{
    git_get_content_at_revision, git_get_modified_files, should_reformat_file, show_args,
};
pub use differ::EditedLinenumsDiffer;
pub use errors::{GitError, RevisionError};
pub use revision::{Revision, RevisionRange, PRE_COMMIT, WORKTREE};
pub use runner::{git_find_root, git_merge_base};
