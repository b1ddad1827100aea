//! Translates stack VM commands into Hack assembly.

pub mod log;

pub mod ast;
pub mod driver;
pub mod error;
pub mod parser;
pub mod translator;

pub use ast::{ArithOp, Command, CommandKind, Segment};
pub use error::{Error, ParseError, TranslateError};
pub use parser::{parse, Parser};
pub use translator::{FnSink, Options, Sink, Translator};
