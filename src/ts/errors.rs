use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeSitterError {
    #[error("failed to set language for parser")]
    LanguageSet,

    #[error("failed to parse source code")]
    ParseFailed,

    #[error("syntax error at line {line} (byte {byte_start}..{byte_end})")]
    SyntaxError {
        line: usize,
        byte_start: usize,
        byte_end: usize,
    },
}
