//! File content at a revision, and detection of modified files.

use crate::document::{DocumentError, TextDocument};
use crate::git::errors::GitError;
use crate::git::revision::{Revision, RevisionRange};
use crate::git::runner::{failure, git_check_output_paths, git_output, join_args};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Extension of files the formatter is run on.
pub const SOURCE_EXTENSION: &str = "py";

/// git exits with 128 when the path or the revision does not exist.
const GIT_FATAL: i32 = 128;

/// Arguments for `git show` of `path` at `revision`.
pub fn show_args(path: &Path, revision: &str) -> Vec<String> {
    vec![
        "show".to_string(),
        format!("{revision}:./{}", to_posix(path)),
    ]
}

/// Get the content of `path` at `revision`.
///
/// A file that does not exist at that revision, or is missing from the
/// working tree, is returned as an empty document so that additions and
/// deletions diff like any other change.
pub fn git_get_content_at_revision(
    path: &Path,
    revision: &Revision,
    cwd: &Path,
) -> Result<TextDocument, GitError> {
    if path.is_absolute() {
        return Err(GitError::AbsolutePath(path.to_path_buf()));
    }

    let name = match revision {
        Revision::WorkingTree => {
            return match TextDocument::from_file(&cwd.join(path)) {
                Ok(doc) => Ok(doc),
                Err(DocumentError::Io { source, .. })
                    if source.kind() == std::io::ErrorKind::NotFound =>
                {
                    Ok(TextDocument::empty())
                }
                Err(e) => Err(e.into()),
            };
        }
        Revision::Named(name) => name,
    };

    let args = show_args(path, name);
    let output = git_output(&args, cwd)?;
    if output.status.success() {
        return Ok(TextDocument::from_bytes(output.stdout)?);
    }
    if output.status.code() == Some(GIT_FATAL) {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_missing_path(&stderr) || precedes_history(name, cwd)? {
            log::debug!(
                "{} not found at {name}, treating as empty",
                path.display()
            );
            return Ok(TextDocument::empty());
        }
    }
    Err(failure(join_args(&args), &output))
}

/// `git show` stderr for a path that is not in an existing revision.
fn is_missing_path(stderr: &str) -> bool {
    stderr.contains("does not exist in") || stderr.contains("exists on disk, but not in")
}

/// Whether `revision` walks back past the root commit of a known revision,
/// like `HEAD~2` in a repository with two commits.
fn precedes_history(revision: &str, cwd: &Path) -> Result<bool, GitError> {
    let Some(split) = revision.find(['~', '^']) else {
        return Ok(false);
    };
    let base = &revision[..split];
    if base.is_empty() {
        return Ok(false);
    }
    let commit = format!("{base}^{{commit}}");
    let output = git_output(&["rev-parse", "--verify", "--quiet", commit.as_str()], cwd)?;
    Ok(output.status.success())
}

/// Whether the formatter should be run on `path`.
pub fn should_reformat_file(path: &Path) -> bool {
    path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION)
}

/// Get the paths under `paths` that differ between the two ends of `revrange`.
///
/// Untracked files count as modified when the target is the working tree.
/// Only existing source files are returned, relative to `cwd`.
pub fn git_get_modified_files<P: AsRef<Path>>(
    paths: &[P],
    revrange: &RevisionRange,
    cwd: &Path,
) -> Result<BTreeSet<PathBuf>, GitError> {
    if paths.is_empty() {
        return Ok(BTreeSet::new());
    }
    let relative: Vec<String> = paths
        .iter()
        .map(|p| relative_arg(p.as_ref(), cwd))
        .collect();

    let base = revrange.base_revision(cwd)?;
    let mut diff_args = vec![
        "diff".to_string(),
        "--name-only".to_string(),
        "--relative".to_string(),
        "-z".to_string(),
        base,
    ];
    if let Revision::Named(rev2) = &revrange.rev2 {
        diff_args.push(rev2.clone());
    }
    diff_args.push("--".to_string());
    diff_args.extend(relative.iter().cloned());

    // NUL-separated output is never quoted, even for non-ASCII names
    let mut changed = git_check_output_paths(&diff_args, cwd)?;

    if revrange.rev2.is_working_tree() {
        let mut untracked_args = vec![
            "ls-files".to_string(),
            "--others".to_string(),
            "--exclude-standard".to_string(),
            "-z".to_string(),
            "--".to_string(),
        ];
        untracked_args.extend(relative);
        changed.extend(git_check_output_paths(&untracked_args, cwd)?);
    }

    Ok(changed
        .into_iter()
        .map(PathBuf::from)
        .filter(|path| should_reformat_file(&cwd.join(path)))
        .collect())
}

fn relative_arg(path: &Path, cwd: &Path) -> String {
    let relative = path.strip_prefix(cwd).unwrap_or(path);
    if relative.as_os_str().is_empty() {
        ".".to_string()
    } else {
        to_posix(relative)
    }
}

fn to_posix(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn show_args_are_cwd_relative() {
        assert_eq!(
            show_args(Path::new("my.txt"), "HEAD^"),
            ["show", "HEAD^:./my.txt"]
        );
        assert_eq!(
            show_args(Path::new("sub/my.txt"), "master"),
            ["show", "master:./sub/my.txt"]
        );
    }

    #[test]
    fn absolute_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = git_get_content_at_revision(dir.path(), &Revision::WorkingTree, dir.path());
        assert!(matches!(result, Err(GitError::AbsolutePath(_))));
    }

    #[test]
    fn missing_worktree_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let doc =
            git_get_content_at_revision(Path::new("gone.py"), &Revision::WorkingTree, dir.path())
                .unwrap();
        assert!(doc.lines().is_empty());
    }

    #[test]
    fn should_reformat_only_existing_source_files() {
        let dir = tempfile::tempdir().unwrap();
        let cases = [
            (".", false, false),
            ("main", true, false),
            ("main.c", true, false),
            ("main.py", true, true),
            ("missing.py", false, false),
            ("main.pyx", true, false),
            ("main.pyi", true, false),
            ("main.pyc", true, false),
            ("main.pyo", true, false),
            ("main.js", true, false),
        ];
        for (name, create, expect) in cases {
            let path = dir.path().join(name);
            if create {
                fs::write(&path, "").unwrap();
            }
            assert_eq!(should_reformat_file(&path), expect, "{name}");
        }
    }

    #[test]
    fn relative_arg_for_root_is_dot() {
        let cwd = Path::new("/repo");
        assert_eq!(relative_arg(Path::new("/repo"), cwd), ".");
        assert_eq!(relative_arg(Path::new("/repo/c/d.py"), cwd), "c/d.py");
        assert_eq!(relative_arg(Path::new("a.py"), cwd), "a.py");
    }
}
