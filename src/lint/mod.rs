//! Linter integration limited to edited lines.
//!
//! Runs an external linter on a set of files and keeps only the diagnostics
//! that point at lines changed in the revision range. Lines of linter output
//! that are not `path:line[:column]: message` diagnostics are passed through.
//!
//! # Example
//!
//! ```no_run
//! use retouch::git::RevisionRange;
//! use retouch::lint::run_linter;
//! use std::path::{Path, PathBuf};
//!
//! let paths = vec![PathBuf::from("src/app.py")];
//! let mut out = std::io::stdout();
//! let revrange = RevisionRange::new("HEAD");
//! let count = run_linter("flake8", Path::new("/repo"), &paths, &revrange, &mut out)?;
//! println!("{count} diagnostics on edited lines");
//! # Ok::<(), retouch::lint::LintError>(())
//! ```

use crate::command::{split_command, CommandLineError};
use crate::git::{EditedLinenumsDiffer, GitError, RevisionRange};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LintError {
    #[error("invalid linter command: {0}")]
    CommandLine(#[from] CommandLineError),

    #[error("failed to run linter `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to compute edited lines: {0}")]
    Git(#[from] GitError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extract the path and line number of a `path:line[:column]: message` line.
///
/// Absolute paths are made relative to `root`; paths outside it, a missing
/// or non-numeric line or column, and extra colon-separated fields all make
/// the line unparsable.
pub fn parse_linter_line(line: &str, root: &Path) -> Option<(PathBuf, usize)> {
    let (location, _description) = line.trim_end().split_once(": ")?;
    let mut fields = location.split(':');
    let path = fields.next()?;
    let linenum: usize = fields.next()?.parse().ok()?;
    if let Some(column) = fields.next() {
        column.parse::<usize>().ok()?;
    }
    if fields.next().is_some() || path.is_empty() {
        return None;
    }

    let path = Path::new(path);
    let path = if path.is_absolute() {
        path.strip_prefix(root).ok()?.to_path_buf()
    } else {
        path.to_path_buf()
    };
    Some((path, linenum))
}

/// Run one linter and write its diagnostics on edited lines to `out`.
///
/// The absolute paths of the existing files in `paths` are appended to the
/// command, which runs in `root`. Returns the number of diagnostic lines
/// written; passed-through lines are not counted.
pub fn run_linter<P: AsRef<Path>, W: Write>(
    cmdline: &str,
    root: &Path,
    paths: &[P],
    revrange: &RevisionRange,
    out: &mut W,
) -> Result<usize, LintError> {
    let (existing, missing): (Vec<&Path>, Vec<&Path>) = paths
        .iter()
        .map(|p| p.as_ref())
        .partition(|p| root.join(p).exists());

    if !missing.is_empty() {
        let names: Vec<String> = missing.iter().map(|p| p.display().to_string()).collect();
        log::warn!("Missing file {} from {}", names.join(", "), cmdline);
    }
    if existing.is_empty() {
        return Ok(0);
    }

    let mut args = split_command(cmdline)?;
    args.extend(
        existing
            .iter()
            .map(|p| root.join(p).to_string_lossy().into_owned()),
    );
    log::debug!("[{}]$ {}", root.display(), args.join(" "));

    let output = Command::new(&args[0])
        .args(&args[1..])
        .current_dir(root)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .output()
        .map_err(|source| LintError::Spawn {
            command: cmdline.to_string(),
            source,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let differ = EditedLinenumsDiffer::new(root, revrange.clone());
    let mut edited: HashMap<PathBuf, Vec<usize>> = HashMap::new();
    let mut count = 0;

    for line in stdout.lines() {
        let Some((path, linenum)) = parse_linter_line(line, root) else {
            writeln!(out, "{line}")?;
            continue;
        };
        if !edited.contains_key(&path) {
            let linenums = differ.compare_revisions(&path, 0)?;
            edited.insert(path.clone(), linenums);
        }
        if edited[&path].binary_search(&linenum).is_ok() {
            writeln!(out, "{line}")?;
            count += 1;
        }
    }

    Ok(count)
}

/// Run several linters in turn, returning the total diagnostic count.
pub fn run_linters<P: AsRef<Path>, W: Write>(
    cmdlines: &[String],
    root: &Path,
    paths: &[P],
    revrange: &RevisionRange,
    out: &mut W,
) -> Result<usize, LintError> {
    let mut total = 0;
    for cmdline in cmdlines {
        total += run_linter(cmdline, root, paths, revrange, out)?;
    }
    Ok(total)
}
