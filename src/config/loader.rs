use crate::config::schema::{PyProject, RetouchConfig, ValidationError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Project file searched for in the repository root.
pub const PYPROJECT: &str = "pyproject.toml";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

impl ConfigError {
    fn with_path(self, path: &Path) -> Self {
        let path = path.to_path_buf();
        match self {
            ConfigError::Toml { path: None, source } => ConfigError::Toml {
                path: Some(path),
                source,
            },
            ConfigError::Validation { path: None, source } => ConfigError::Validation {
                path: Some(path),
                source,
            },
            other => other,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config from {}: {}", path.display(), source)
            }
            ConfigError::Toml { path, source } => match path {
                Some(path) => write!(
                    f,
                    "failed to parse config TOML ({}): {}",
                    path.display(),
                    source
                ),
                None => write!(f, "failed to parse config TOML: {}", source),
            },
            ConfigError::Validation { path, source } => match path {
                Some(path) => write!(
                    f,
                    "invalid [tool.retouch] config ({}): {}",
                    path.display(),
                    source
                ),
                None => write!(f, "invalid [tool.retouch] config: {}", source),
            },
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Toml { source, .. } => Some(source),
            ConfigError::Validation { source, .. } => Some(source),
        }
    }
}

/// Read `[tool.retouch]` from TOML text; a missing table yields the defaults.
pub fn load_from_str(input: &str) -> Result<RetouchConfig, ConfigError> {
    let project: PyProject = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Toml { path: None, source })?;
    let config = project
        .tool
        .and_then(|tool| tool.retouch)
        .unwrap_or_default();
    config
        .validate()
        .map_err(|source| ConfigError::Validation { path: None, source })?;
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<RetouchConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.with_path(path))
}

/// The `pyproject.toml` in `root`, if there is one.
pub fn find_config(root: &Path) -> Option<PathBuf> {
    let path = root.join(PYPROJECT);
    path.is_file().then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_tool_table() {
        let config = load_from_str(
            r#"
[project]
name = "demo"

[tool.black]
line-length = 88

[tool.retouch]
src = ["src", "tests"]
revision = "main..."
lint = ["flake8", "mypy --strict"]
diff = true
"#,
        )
        .unwrap();
        assert_eq!(config.src, ["src", "tests"]);
        assert_eq!(config.revision.as_deref(), Some("main..."));
        assert_eq!(config.lint, ["flake8", "mypy --strict"]);
        assert_eq!(config.formatter, None);
        assert!(config.diff);
        assert!(!config.check);
    }

    #[test]
    fn missing_table_gives_defaults() {
        let config = load_from_str("[project]\nname = \"demo\"\n").unwrap();
        assert_eq!(config, RetouchConfig::default());
        assert_eq!(load_from_str("").unwrap(), RetouchConfig::default());
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = load_from_str("[tool.retouch]\nisort = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml { path: None, .. }));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = load_from_str("[tool.retouch]\nformatter = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
        assert!(err.to_string().contains("'formatter' is a blank command"));
    }

    #[test]
    fn errors_name_the_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(PYPROJECT);
        fs::write(&path, "[tool.retouch]\nlint = 1\n").unwrap();

        let err = load_from_path(&path).unwrap_err();
        assert!(matches!(&err, ConfigError::Toml { path: Some(p), .. } if p == &path));
        assert_eq!(find_config(temp_dir.path()), Some(path));
    }

    #[test]
    fn missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert_eq!(find_config(temp_dir.path()), None);
        let err = load_from_path(temp_dir.path().join(PYPROJECT)).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
