use serde::Deserialize;
use std::fmt;

/// Settings from the `[tool.retouch]` table.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RetouchConfig {
    /// Paths to process when none are given on the command line
    pub src: Vec<String>,
    /// Revision range to compare against, `HEAD` when unset
    pub revision: Option<String>,
    /// Linter command lines
    pub lint: Vec<String>,
    /// Formatter command line reading stdin and writing stdout
    pub formatter: Option<String>,
    pub diff: bool,
    pub check: bool,
}

/// The parts of `pyproject.toml` we read; everything else is ignored.
#[derive(Debug, Deserialize, Default)]
pub(crate) struct PyProject {
    #[serde(default)]
    pub tool: Option<Tool>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct Tool {
    #[serde(default)]
    pub retouch: Option<RetouchConfig>,
}

impl RetouchConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        for (index, cmdline) in self.lint.iter().enumerate() {
            if cmdline.trim().is_empty() {
                issues.push(ValidationIssue::BlankCommand {
                    field: "lint",
                    index: Some(index),
                });
            }
        }
        if let Some(formatter) = &self.formatter {
            if formatter.trim().is_empty() {
                issues.push(ValidationIssue::BlankCommand {
                    field: "formatter",
                    index: None,
                });
            }
        }
        if let Some(revision) = &self.revision {
            if revision.trim().is_empty() {
                issues.push(ValidationIssue::InvalidRevision {
                    revision: revision.clone(),
                    message: "revision is blank".to_string(),
                });
            } else if revision.chars().any(char::is_whitespace) {
                issues.push(ValidationIssue::InvalidRevision {
                    revision: revision.clone(),
                    message: "revision contains whitespace".to_string(),
                });
            }
        }
        for path in &self.src {
            if path.trim().is_empty() {
                issues.push(ValidationIssue::BlankPath);
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    BlankCommand {
        field: &'static str,
        index: Option<usize>,
    },
    InvalidRevision {
        revision: String,
        message: String,
    },
    BlankPath,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::BlankCommand { field, index } => match index {
                Some(index) => write!(f, "'{field}' entry {index} is a blank command"),
                None => write!(f, "'{field}' is a blank command"),
            },
            ValidationIssue::InvalidRevision { revision, message } => {
                write!(f, "invalid revision '{revision}': {message}")
            }
            ValidationIssue::BlankPath => write!(f, "'src' contains a blank path"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(RetouchConfig::default().validate().is_ok());
    }

    #[test]
    fn collects_every_issue() {
        let config = RetouchConfig {
            src: vec![" ".to_string()],
            revision: Some("main ..".to_string()),
            lint: vec!["flake8".to_string(), "".to_string()],
            formatter: Some("  ".to_string()),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.issues,
            [
                ValidationIssue::BlankCommand {
                    field: "lint",
                    index: Some(1)
                },
                ValidationIssue::BlankCommand {
                    field: "formatter",
                    index: None
                },
                ValidationIssue::InvalidRevision {
                    revision: "main ..".to_string(),
                    message: "revision contains whitespace".to_string(),
                },
                ValidationIssue::BlankPath,
            ]
        );
        assert_eq!(err.to_string().lines().count(), 4);
    }
}
