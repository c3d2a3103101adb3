use crate::command::{split_command, CommandLineError};
use crate::document::{DocumentError, TextDocument};
use std::io::Write;
use std::process::{Command, Stdio};
use thiserror::Error;

/// Command used when none is configured.
pub const DEFAULT_FORMATTER: &str = "black -q -";

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("invalid formatter command: {0}")]
    CommandLine(#[from] CommandLineError),

    #[error("failed to run formatter `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("formatter `{command}` failed ({status}): {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("formatter output: {0}")]
    Output(#[from] DocumentError),
}

/// A source-to-source reformatter.
///
/// Implementations must keep the program's meaning; the output is still
/// verified before any of it is kept.
pub trait Formatter {
    fn format(&self, document: &TextDocument) -> Result<TextDocument, FormatError>;
}

/// Pipes documents through an external command's stdin and stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFormatter {
    cmdline: String,
    args: Vec<String>,
}

impl CommandFormatter {
    pub fn new(cmdline: &str) -> Result<Self, FormatError> {
        Ok(Self {
            cmdline: cmdline.to_string(),
            args: split_command(cmdline)?,
        })
    }

    pub fn cmdline(&self) -> &str {
        &self.cmdline
    }
}

impl Default for CommandFormatter {
    fn default() -> Self {
        Self {
            cmdline: DEFAULT_FORMATTER.to_string(),
            args: DEFAULT_FORMATTER.split_whitespace().map(str::to_owned).collect(),
        }
    }
}

impl Formatter for CommandFormatter {
    fn format(&self, document: &TextDocument) -> Result<TextDocument, FormatError> {
        log::debug!("$ {}", self.cmdline);
        let spawn_error = |source| FormatError::Spawn {
            command: self.cmdline.clone(),
            source,
        };

        let mut child = Command::new(&self.args[0])
            .args(&self.args[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        // Feed stdin from another thread so a formatter that streams its
        // output cannot deadlock against a full pipe.
        let input = document.string().as_bytes().to_vec();
        let writer = child.stdin.take().map(|mut stdin| {
            std::thread::spawn(move || -> std::io::Result<()> {
                stdin.write_all(&input)
            })
        });

        let output = child.wait_with_output().map_err(spawn_error)?;
        let written = match writer.map(|w| w.join()) {
            Some(Ok(result)) => result,
            Some(Err(_)) => Err(std::io::Error::other("stdin writer thread panicked")),
            None => Ok(()),
        };

        if !output.status.success() {
            return Err(FormatError::Failed {
                command: self.cmdline.clone(),
                status: output
                    .status
                    .code()
                    .map_or_else(|| "signal".to_string(), |c| c.to_string()),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written.map_err(spawn_error)?;

        let formatted = TextDocument::from_bytes(output.stdout)?;
        Ok(document.with_lines(formatted.lines().iter().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_runs_black_on_stdin() {
        let formatter = CommandFormatter::default();
        assert_eq!(formatter.cmdline(), DEFAULT_FORMATTER);
        assert_eq!(formatter.args, ["black", "-q", "-"]);
    }

    #[test]
    #[cfg(unix)]
    fn pipes_through_command() {
        let formatter = CommandFormatter::new("tr a-z A-Z").unwrap();
        let doc = TextDocument::new("x = 1\r\ny = 2\r\n");
        let formatted = formatter.format(&doc).unwrap();
        assert_eq!(formatted.string(), "X = 1\r\nY = 2\r\n");
    }

    #[test]
    #[cfg(unix)]
    fn failing_command_is_reported() {
        let formatter = CommandFormatter::new("false").unwrap();
        let result = formatter.format(&TextDocument::new("x\n"));
        assert!(matches!(result, Err(FormatError::Failed { .. })));
    }

    #[test]
    fn missing_command_is_reported() {
        let formatter = CommandFormatter::new("this-formatter-does-not-exist").unwrap();
        let result = formatter.format(&TextDocument::new("x\n"));
        assert!(matches!(result, Err(FormatError::Spawn { .. })));
    }
}
