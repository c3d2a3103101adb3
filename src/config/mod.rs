pub mod loader;
pub mod schema;

pub use loader::{find_config, load_from_path, load_from_str, ConfigError, PYPROJECT};
pub use schema::{RetouchConfig, ValidationError, ValidationIssue};
