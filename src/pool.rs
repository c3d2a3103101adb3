//! Thread-local parser pooling.
//!
//! Bisection re-parses candidate documents many times per file. Creates a
//! parser on first use per thread and reuses it afterwards.

use crate::ts::{PythonParser, TreeSitterError};
use std::cell::RefCell;

thread_local! {
    static PYTHON_PARSER: RefCell<Option<PythonParser>> = const { RefCell::new(None) };
}

/// Execute function with pooled parser instance.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use retouch::pool::with_parser;
///
/// let has_errors = with_parser(|parser| {
///     parser.parse_with_source("if True: pass").map(|p| p.has_errors())
/// })??;
/// # Ok(())
/// # }
/// ```
pub fn with_parser<F, R>(f: F) -> Result<R, TreeSitterError>
where
    F: FnOnce(&mut PythonParser) -> R,
{
    PYTHON_PARSER.with(|cell| {
        let mut opt = cell.borrow_mut();
        if opt.is_none() {
            *opt = Some(PythonParser::new()?);
        }
        match opt.as_mut() {
            Some(parser) => Ok(f(parser)),
            None => Err(TreeSitterError::LanguageSet),
        }
    })
}
