use thiserror::Error;

use crate::body::BodyError;

pub type LoadResult<T> = Result<T, LoadError>;

/// Errors raised while reading save files and star catalogs.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },

    #[error("invalid body: {0}")]
    Body(#[from] BodyError),

    #[error("bad starfield header (expected 'STAR')")]
    BadMagic,

    #[error("unsupported starfield version: {0}")]
    UnsupportedVersion(i32),

    #[error("unreasonable star count: {0}")]
    BadStarCount(i32),
}

impl LoadError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        LoadError::Parse { line, message: message.into() }
    }
}
