//! Revision range parsing.
//!
//! Accepted specifiers:
//!
//! - `REV` compares `REV` against the working tree
//! - `REV1..REV2` compares two revisions directly
//! - `REV1...REV2` compares `REV2` against the merge base of both
//! - `REV..` / `REV...` default the target to the working tree
//! - `:PRE-COMMIT:` reads both ends from the pre-commit environment

use crate::git::errors::{GitError, RevisionError};
use crate::git::runner::git_merge_base;
use std::fmt;
use std::path::Path;

/// Sentinel for the live working tree.
pub const WORKTREE: &str = ":WORKTREE:";
/// Sentinel for the range handed over by the pre-commit framework.
pub const PRE_COMMIT: &str = ":PRE-COMMIT:";

pub const PRE_COMMIT_FROM_REF: &str = "PRE_COMMIT_FROM_REF";
pub const PRE_COMMIT_TO_REF: &str = "PRE_COMMIT_TO_REF";

/// A point in history, or the files currently on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Revision {
    Named(String),
    WorkingTree,
}

impl Revision {
    /// Interpret a revision string, recognizing the [`WORKTREE`] sentinel.
    pub fn parse(s: &str) -> Self {
        if s == WORKTREE {
            Revision::WorkingTree
        } else {
            Revision::Named(s.to_string())
        }
    }

    pub fn is_working_tree(&self) -> bool {
        matches!(self, Revision::WorkingTree)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Revision::Named(name) => write!(f, "{name}"),
            Revision::WorkingTree => write!(f, "{WORKTREE}"),
        }
    }
}

/// The two states being compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionRange {
    /// Base revision
    pub rev1: String,
    /// Target revision
    pub rev2: Revision,
    /// Compare against the merge base of `rev1` and `rev2` instead of `rev1`
    pub use_common_ancestor: bool,
}

impl RevisionRange {
    /// Compare `rev1` directly against the working tree.
    pub fn new(rev1: impl Into<String>) -> Self {
        Self {
            rev1: rev1.into(),
            rev2: Revision::WorkingTree,
            use_common_ancestor: false,
        }
    }

    /// Parse a specifier, reading the pre-commit refs from the process environment.
    pub fn parse(specifier: &str) -> Result<Self, RevisionError> {
        Self::parse_with_env(specifier, |name| std::env::var(name).ok())
    }

    /// Parse a specifier with an explicit environment lookup.
    pub fn parse_with_env<F>(specifier: &str, env: F) -> Result<Self, RevisionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if specifier == PRE_COMMIT {
            let rev1 = env(PRE_COMMIT_FROM_REF).ok_or(RevisionError::MissingPreCommitRef {
                variable: PRE_COMMIT_FROM_REF,
            })?;
            let rev2 = env(PRE_COMMIT_TO_REF).ok_or(RevisionError::MissingPreCommitRef {
                variable: PRE_COMMIT_TO_REF,
            })?;
            return Ok(Self {
                rev1,
                rev2: Revision::parse(&rev2),
                use_common_ancestor: true,
            });
        }

        // Triple dots first: "a...b" also contains "..".
        let (rev1, rev2, use_common_ancestor) = if let Some((a, b)) = specifier.split_once("...") {
            (a, b, true)
        } else if let Some((a, b)) = specifier.split_once("..") {
            (a, b, false)
        } else {
            (specifier, "", false)
        };

        let rev1 = if rev1.is_empty() { "HEAD" } else { rev1 };
        let rev2 = if rev2.is_empty() {
            Revision::WorkingTree
        } else {
            Revision::parse(rev2)
        };

        Ok(Self {
            rev1: rev1.to_string(),
            rev2,
            use_common_ancestor,
        })
    }

    /// The revision the target is compared against.
    ///
    /// With `use_common_ancestor` this is the merge base of `rev1` and
    /// `rev2` (or `HEAD` when the target is the working tree).
    pub fn base_revision(&self, cwd: &Path) -> Result<String, GitError> {
        if !self.use_common_ancestor {
            return Ok(self.rev1.clone());
        }
        let target = match &self.rev2 {
            Revision::Named(name) => name.as_str(),
            Revision::WorkingTree => "HEAD",
        };
        git_merge_base(&self.rev1, target, cwd)
    }
}

impl fmt::Display for RevisionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dots = if self.use_common_ancestor { "..." } else { ".." };
        match &self.rev2 {
            Revision::WorkingTree => write!(f, "{}{}", self.rev1, dots),
            Revision::Named(rev2) => write!(f, "{}{}{}", self.rev1, dots, rev2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(specifier: &str) -> RevisionRange {
        RevisionRange::parse_with_env(specifier, |_| None).unwrap()
    }

    #[test]
    fn bare_revision_targets_worktree() {
        let range = parse("HEAD");
        assert_eq!(range.rev1, "HEAD");
        assert_eq!(range.rev2, Revision::WorkingTree);
        assert!(!range.use_common_ancestor);
    }

    #[test]
    fn double_dot_range() {
        let range = parse("master..branch");
        assert_eq!(range.rev1, "master");
        assert_eq!(range.rev2, Revision::Named("branch".to_string()));
        assert!(!range.use_common_ancestor);
    }

    #[test]
    fn triple_dot_range() {
        let range = parse("master...branch");
        assert_eq!(range.rev1, "master");
        assert_eq!(range.rev2, Revision::Named("branch".to_string()));
        assert!(range.use_common_ancestor);
    }

    #[test]
    fn trailing_dots_default_to_worktree() {
        let range = parse("master..");
        assert_eq!(range.rev2, Revision::WorkingTree);
        assert!(!range.use_common_ancestor);

        let range = parse("master...");
        assert_eq!(range.rev2, Revision::WorkingTree);
        assert!(range.use_common_ancestor);
    }

    #[test]
    fn empty_sides_default_to_head() {
        assert_eq!(parse(""), RevisionRange::new("HEAD"));
        let range = parse("..feature");
        assert_eq!(range.rev1, "HEAD");
        assert_eq!(range.rev2, Revision::Named("feature".to_string()));
    }

    #[test]
    fn worktree_sentinel_as_target() {
        let range = parse("HEAD..:WORKTREE:");
        assert_eq!(range.rev2, Revision::WorkingTree);
    }

    #[test]
    fn pre_commit_reads_environment() {
        let env: HashMap<&str, &str> = [(PRE_COMMIT_FROM_REF, "old"), (PRE_COMMIT_TO_REF, "new")]
            .into_iter()
            .collect();
        let range =
            RevisionRange::parse_with_env(PRE_COMMIT, |k| env.get(k).map(|v| v.to_string()))
                .unwrap();
        assert_eq!(range.rev1, "old");
        assert_eq!(range.rev2, Revision::Named("new".to_string()));
        assert!(range.use_common_ancestor);
    }

    #[test]
    fn pre_commit_requires_both_refs() {
        for present in [None, Some(PRE_COMMIT_FROM_REF), Some(PRE_COMMIT_TO_REF)] {
            let result = RevisionRange::parse_with_env(PRE_COMMIT, |k| {
                (Some(k) == present).then(|| "ref".to_string())
            });
            assert!(
                matches!(result, Err(RevisionError::MissingPreCommitRef { .. })),
                "present: {present:?}"
            );
        }
    }

    #[test]
    fn display_round_trips() {
        for spec in ["HEAD..", "master...", "a..b", "a...b"] {
            assert_eq!(parse(spec).to_string(), spec);
        }
    }
}
