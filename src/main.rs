use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use colored::Colorize;
use retouch::config::{find_config, load_from_path, RetouchConfig};
use retouch::edit::{EditResult, FileEdit};
use retouch::format::{reformat_edited_parts, CommandFormatter, ReformatError, ReformatOutcome};
use retouch::git::{git_find_root, git_get_modified_files, RevisionError, RevisionRange};
use retouch::lint::run_linters;
use similar::{ChangeTag, TextDiff};
use std::env;
use std::path::{Component, Path, PathBuf};
use std::process::ExitCode;

/// Exit status for a misconfigured pre-commit hook invocation.
const EXIT_PRE_COMMIT: u8 = 123;

#[derive(Parser)]
#[command(name = "retouch")]
#[command(
    about = "Reformat and lint only the Python code changed since a git revision",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Files and directories to process (default: `src` from config, else `.`)
    paths: Vec<PathBuf>,

    /// Revision range to compare against, e.g. `HEAD`, `main...`, `v1..v2`
    #[arg(short, long)]
    revision: Option<String>,

    /// Linter to run on the files; only reports on edited lines are kept
    #[arg(short = 'L', long = "lint", value_name = "CMD")]
    lint: Vec<String>,

    /// Formatter command reading source on stdin and writing it to stdout
    #[arg(long, value_name = "CMD")]
    formatter: Option<String>,

    /// Show a diff of the reformatting instead of writing files
    #[arg(short, long)]
    diff: bool,

    /// Exit with status 1 if any file would be reformatted; write nothing
    #[arg(long)]
    check: bool,

    /// Read `[tool.retouch]` from this file instead of pyproject.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More logging (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

/// Command line options merged over the config file.
struct Settings {
    paths: Vec<PathBuf>,
    revision: String,
    lint: Vec<String>,
    formatter: Option<String>,
    diff: bool,
    check: bool,
}

impl Settings {
    fn merge(cli: Cli, config: RetouchConfig) -> Self {
        let paths = if !cli.paths.is_empty() {
            cli.paths
        } else {
            config.src.iter().map(PathBuf::from).collect()
        };
        Self {
            paths,
            revision: cli
                .revision
                .or(config.revision)
                .unwrap_or_else(|| "HEAD".to_string()),
            lint: if cli.lint.is_empty() { config.lint } else { cli.lint },
            formatter: cli.formatter.or(config.formatter),
            diff: cli.diff || config.diff,
            check: cli.check || config.check,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{} {:#}", "✗".red(), error);
            if error.downcast_ref::<RevisionError>().is_some() {
                ExitCode::from(EXIT_PRE_COMMIT)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => log::LevelFilter::Error,
        (false, 0) => log::LevelFilter::Warn,
        (false, 1) => log::LevelFilter::Info,
        (false, _) => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let cwd = env::current_dir().context("failed to read current directory")?;
    let root = git_find_root(&cwd)?;
    log::debug!("Repository root: {}", root.display());

    let config = match cli.config.as_deref() {
        Some(path) => load_from_path(path)?,
        None => match find_config(&root) {
            Some(path) => load_from_path(path)?,
            None => RetouchConfig::default(),
        },
    };
    // Paths from the command line are relative to the current directory,
    // those from the config file to the repository root.
    let base = if cli.paths.is_empty() { root.clone() } else { cwd };
    let settings = Settings::merge(cli, config);

    let revrange = RevisionRange::parse(&settings.revision)?;
    if !revrange.rev2.is_working_tree() && !(settings.diff || settings.check) {
        anyhow::bail!(
            "cannot reformat the committed revision {}; use --diff or --check",
            revrange.rev2
        );
    }

    let paths = if settings.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        settings
            .paths
            .iter()
            .map(|path| relative_to_root(&root, &base, path))
            .collect::<Result<Vec<_>>>()?
    };

    let formatter = match settings.formatter.as_deref() {
        Some(cmdline) => CommandFormatter::new(cmdline)?,
        None => CommandFormatter::default(),
    };

    let modified = git_get_modified_files(&paths, &revrange, &root)?;
    log::info!("{} modified file(s) against {}", modified.len(), revrange);

    let mut would_reformat = 0;
    let mut failed = 0;
    for path in &modified {
        match reformat_edited_parts(&root, path, &revrange, &formatter) {
            Ok(Some(outcome)) => {
                would_reformat += 1;
                report_outcome(&root, &outcome, &settings)?;
            }
            Ok(None) => log::debug!("Nothing to reformat in {}", path.display()),
            Err(error @ (ReformatError::Verification { .. } | ReformatError::Format { .. })) => {
                eprintln!("{} {}", "✗".red(), error);
                failed += 1;
            }
            Err(error) => return Err(error.into()),
        }
    }

    let mut stdout = std::io::stdout().lock();
    let diagnostics = run_linters(&settings.lint, &root, &paths, &revrange, &mut stdout)?;

    if failed > 0 {
        anyhow::bail!("{failed} file(s) could not be reformatted safely");
    }
    if (settings.check && would_reformat > 0) || diagnostics > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn report_outcome(root: &Path, outcome: &ReformatOutcome, settings: &Settings) -> Result<()> {
    if settings.diff {
        display_diff(
            &outcome.path,
            outcome.original.string(),
            outcome.reformatted.string(),
        );
        return Ok(());
    }
    if settings.check {
        println!("{} Would reformat {}", "✗".yellow(), outcome.path.display());
        return Ok(());
    }

    let edit = FileEdit::new(
        root.join(&outcome.path),
        &outcome.original,
        outcome.reformatted.clone(),
    );
    match edit.apply()? {
        EditResult::Applied { .. } => {
            println!("{} Reformatted {}", "✓".green(), outcome.path.display());
        }
        EditResult::AlreadyApplied { .. } => {
            println!("{} Already formatted {}", "⊙".yellow(), outcome.path.display());
        }
    }
    if outcome.context_lines > 0 {
        log::info!(
            "{}: needed {} line(s) of context around edits",
            outcome.path.display(),
            outcome.context_lines
        );
    }
    Ok(())
}

/// Express `path`, given relative to `base`, relative to the repository root.
fn relative_to_root(root: &Path, base: &Path, path: &Path) -> Result<PathBuf> {
    let absolute = normalize(&base.join(path));
    let absolute = absolute.canonicalize().unwrap_or(absolute);
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

    let relative = absolute.strip_prefix(&root).with_context(|| {
        format!(
            "{} is outside the repository {}",
            path.display(),
            root.display()
        )
    })?;
    Ok(if relative.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        relative.to_path_buf()
    })
}

/// Resolve `.` and `..` components lexically.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

fn display_diff(file: &Path, original: &str, modified: &str) {
    println!("{}", format!("--- {} (original)", file.display()).dimmed());
    println!("{}", format!("+++ {} (reformatted)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);
    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        println!("{}", hunk.header().to_string().cyan());
        for change in hunk.iter_changes() {
            let line = match change.tag() {
                ChangeTag::Delete => format!("-{}", change).red(),
                ChangeTag::Insert => format!("+{}", change).green(),
                ChangeTag::Equal => format!(" {}", change).normal(),
            };
            print!("{}", line);
            if change.missing_newline() {
                println!();
            }
        }
    }
}
