use std::{io, path::PathBuf};

use thiserror::Error;

use crate::ast::CommandKind;

/// Errors raised while classifying source lines.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: unrecognized command `{token}`")]
    UnknownCommand { line: usize, token: String },
    #[error("line {line}: unknown segment `{segment}`")]
    UnknownSegment { line: usize, segment: String },
    #[error("line {line}: `{command}` is missing its {what}")]
    MissingArgument {
        line: usize,
        command: String,
        what: &'static str,
    },
    /// Index token is not an integer in 0..=32767.
    #[error("line {line}: invalid index `{index}` for segment {segment}")]
    BadIndex {
        line: usize,
        segment: String,
        index: String,
    },
    #[error("line {line}: unexpected trailing input `{rest}`")]
    TrailingInput { line: usize, rest: String },
    #[error("advance called with no lines left (after line {line})")]
    Exhausted { line: usize },
    #[error("failed to read line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: io::Error,
    },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::UnknownCommand { line, .. }
            | ParseError::UnknownSegment { line, .. }
            | ParseError::MissingArgument { line, .. }
            | ParseError::BadIndex { line, .. }
            | ParseError::TrailingInput { line, .. }
            | ParseError::Exhausted { line }
            | ParseError::Io { line, .. } => *line,
        }
    }
}

/// Errors raised by the code generator for commands that parse but cannot be
/// translated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranslateError {
    #[error("invalid index {0} for segment pointer (expected 0 or 1)")]
    PointerIndex(u16),
    #[error("invalid index {0} for segment temp (expected 0 through 7)")]
    TempIndex(u16),
    #[error("index {0} does not fit in an A-instruction (max 32767)")]
    IndexRange(u16),
    #[error("cannot pop into segment constant")]
    PopConstant,
    #[error("push/pop dispatch called with {0:?} command")]
    InvalidDispatch(CommandKind),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not open input file {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("input file {} has no usable name for static symbols", .0.display())]
    NoQualifier(PathBuf),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("line {line}: {source}")]
    Translate {
        line: usize,
        #[source]
        source: TranslateError,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::InputNotFound(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
