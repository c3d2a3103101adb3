//! Blocking git subprocess invocation.

use crate::git::errors::GitError;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Run git in `cwd` and return the raw process output, successful or not.
pub(crate) fn git_output<S: AsRef<str>>(args: &[S], cwd: &Path) -> Result<Output, GitError> {
    let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
    log::debug!("[{}]$ git {}", cwd.display(), args.join(" "));

    Command::new("git")
        .args(&args)
        .current_dir(cwd)
        // Stable, untranslated error messages
        .env("LC_ALL", "C")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(GitError::Spawn)
}

/// Run git and return its standard output, failing on a non-zero exit.
pub(crate) fn git_check_output<S: AsRef<str>>(args: &[S], cwd: &Path) -> Result<String, GitError> {
    let output = git_output(args, cwd)?;
    let command = join_args(args);
    if !output.status.success() {
        return Err(failure(command, &output));
    }
    String::from_utf8(output.stdout).map_err(|_| GitError::InvalidOutput { command })
}

/// Run git with `-z` style output and split it into its NUL-terminated entries.
pub(crate) fn git_check_output_paths<S: AsRef<str>>(
    args: &[S],
    cwd: &Path,
) -> Result<Vec<String>, GitError> {
    Ok(git_check_output(args, cwd)?
        .split('\0')
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect())
}

pub(crate) fn failure(command: String, output: &Output) -> GitError {
    GitError::CommandFailed {
        command,
        status: output
            .status
            .code()
            .map_or_else(|| "signal".to_string(), |c| c.to_string()),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

pub(crate) fn join_args<S: AsRef<str>>(args: &[S]) -> String {
    args.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ")
}

/// Find the most recent common ancestor of two revisions.
pub fn git_merge_base(rev1: &str, rev2: &str, cwd: &Path) -> Result<String, GitError> {
    Ok(git_check_output(&["merge-base", rev1, rev2], cwd)?
        .trim()
        .to_string())
}

/// Find the top-level directory of the repository containing `cwd`.
pub fn git_find_root(cwd: &Path) -> Result<PathBuf, GitError> {
    let root = git_check_output(&["rev-parse", "--show-toplevel"], cwd)?;
    Ok(PathBuf::from(root.trim()))
}
