//! Tree-sitter integration for Python syntax trees.
//!
//! Parses with the Python grammar bundled in ast-grep-language and renders
//! trees in a layout-insensitive form for equivalence checks.

pub mod errors;
pub mod normalize;
pub mod parser;

pub use errors::TreeSitterError;
pub use normalize::normalize;
pub use parser::{ErrorNode, ParsedSource, PythonParser};
