use std::fmt;

use crate::diagnostic::Diagnostic;
use crate::interpreter::{InterpreterError, ParseError};

/// Any failure of a run: the program did not parse, or it stopped with a
/// runtime error.
#[derive(Debug)]
pub enum Error {
    Parse(ParseError),
    Runtime(InterpreterError),
}

impl Error {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Error::Parse(err) => err.to_diagnostic(),
            Error::Runtime(err) => err.to_diagnostic(),
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl From<InterpreterError> for Error {
    fn from(err: InterpreterError) -> Self {
        Error::Runtime(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(err) => write!(f, "{}", err),
            Error::Runtime(err) => write!(f, "Runtime error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Runtime(err) => Some(err),
        }
    }
}
