//! Retouch: reformat and lint only what changed
//!
//! Applies a code formatter and linters to a Python project, restricted to
//! the lines edited between two git revisions. Everything else in a file, and
//! every unmodified file, is left alone.
//!
//! # Architecture
//!
//! Edited lines come from a line diff of a file's content at the base
//! revision against its target content ([`EditedLinenumsDiffer`]). The
//! formatter output is split into [`DiffChunk`]s, and only the chunks that
//! touch edited lines are kept. Because a partial application can change the
//! program, each candidate is checked for syntax-tree equivalence with
//! tree-sitter; a [`BinarySearch`] over context lines finds the narrowest
//! candidate that passes.
//!
//! # Safety
//!
//! - The syntax tree of every written file equals that of its input
//! - Files are written only if unchanged since they were read
//! - Atomic file writes (tempfile + fsync + rename)
//! - Encoding and newline style are preserved
//!
//! # Example
//!
//! ```no_run
//! use retouch::{reformat_edited_parts, CommandFormatter, RevisionRange};
//! use std::path::Path;
//!
//! let formatter = CommandFormatter::default();
//! let revrange = RevisionRange::parse("HEAD")?;
//! let root = Path::new("/repo");
//!
//! let outcome = reformat_edited_parts(root, Path::new("app.py"), &revrange, &formatter)?;
//! if let Some(outcome) = outcome {
//!     print!("{}", outcome.reformatted.string());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod command;
pub mod config;
pub mod diff;
pub mod document;
pub mod edit;
pub mod format;
pub mod git;
pub mod lint;
pub mod pool;
pub mod ts;
pub mod verify;

// Re-exports
pub use config::{find_config, load_from_path, load_from_str, ConfigError, RetouchConfig};
pub use diff::{diff_chunks, diff_opcodes, opcodes_to_chunks, opcodes_to_edit_linenums, DiffChunk};
pub use document::{DocumentError, Encoding, Newline, TextDocument};
pub use edit::{EditError, EditResult, EditVerification, FileEdit};
pub use format::{
    reformat_edited_parts, CommandFormatter, FormatError, Formatter, ReformatError,
    ReformatOutcome,
};
pub use git::{
    git_get_content_at_revision, git_get_modified_files, EditedLinenumsDiffer, GitError, Revision,
    RevisionError, RevisionRange,
};
pub use lint::{parse_linter_line, run_linter, run_linters, LintError};
pub use ts::{PythonParser, TreeSitterError};
pub use verify::{verify_ast_unchanged, AstVerifier, BinarySearch, SearchError, VerificationError};
