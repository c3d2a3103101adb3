use crate::document::DocumentError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("failed to spawn git: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("`git {command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("git output is not valid UTF-8 for `git {command}`")]
    InvalidOutput { command: String },

    #[error("expected a repository-relative path, got {0}")]
    AbsolutePath(PathBuf),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RevisionError {
    #[error("{variable} must be set when using the :PRE-COMMIT: revision")]
    MissingPreCommitRef { variable: &'static str },
}
