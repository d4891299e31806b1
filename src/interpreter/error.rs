use std::io;

use crate::diagnostic::{Diagnostic, Label, Span};

#[derive(Debug)]
pub enum InterpreterError {
    UndefinedVariable { name: String, span: Span },
    UndefinedFunction { name: String, span: Span },
    ArityMismatch { name: String, expected: usize, found: usize, span: Span },
    CallDepthExceeded { name: String, limit: usize, span: Span },
    Io(io::Error),
}

impl InterpreterError {
    pub fn undefined_variable_at(name: impl Into<String>, span: Span) -> Self {
        Self::UndefinedVariable { name: name.into(), span }
    }

    pub fn undefined_function_at(name: impl Into<String>, span: Span) -> Self {
        Self::UndefinedFunction { name: name.into(), span }
    }

    pub fn arity_mismatch_at(name: impl Into<String>, expected: usize, found: usize, span: Span) -> Self {
        Self::ArityMismatch { name: name.into(), expected, found, span }
    }

    pub fn call_depth_exceeded_at(name: impl Into<String>, limit: usize, span: Span) -> Self {
        Self::CallDepthExceeded { name: name.into(), limit, span }
    }

    /// Get the span associated with this error
    pub fn span(&self) -> Span {
        match self {
            Self::UndefinedVariable { span, .. } => *span,
            Self::UndefinedFunction { span, .. } => *span,
            Self::ArityMismatch { span, .. } => *span,
            Self::CallDepthExceeded { span, .. } => *span,
            Self::Io(_) => Span::dummy(),
        }
    }

    /// Convert to a diagnostic for pretty printing
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::UndefinedVariable { name, span } => {
                Diagnostic::error(format!("undefined variable `{}`", name))
                    .with_code("E0201")
                    .with_label(Label::primary(*span, "not found in any enclosing scope"))
            }
            Self::UndefinedFunction { name, span } => {
                Diagnostic::error(format!("undefined function `{}`", name))
                    .with_code("E0202")
                    .with_label(Label::primary(*span, "no function with this name"))
            }
            Self::ArityMismatch { name, expected, found, span } => Diagnostic::error(format!(
                "function `{}` takes {} argument{} but {} {} supplied",
                name,
                expected,
                if *expected == 1 { "" } else { "s" },
                found,
                if *found == 1 { "was" } else { "were" }
            ))
            .with_code("E0203")
            .with_label(Label::primary(*span, format!("expected {}", expected))),
            Self::CallDepthExceeded { name, limit, span } => {
                Diagnostic::error(format!("call depth limit of {} exceeded", limit))
                    .with_code("E0204")
                    .with_label(Label::primary(*span, format!("while calling `{}`", name)))
                    .with_note("the limit can be raised with `--max-depth`")
            }
            Self::Io(err) => Diagnostic::error(format!("I/O error: {}", err)).with_code("E0205"),
        }
    }
}

impl From<io::Error> for InterpreterError {
    fn from(err: io::Error) -> Self {
        InterpreterError::Io(err)
    }
}

impl std::fmt::Display for InterpreterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterpreterError::UndefinedVariable { name, .. } => {
                write!(f, "Undefined variable: {}", name)
            }
            InterpreterError::UndefinedFunction { name, .. } => {
                write!(f, "Undefined function: {}", name)
            }
            InterpreterError::ArityMismatch { name, expected, found, .. } => {
                write!(f, "Function {} expects {} arguments, got {}", name, expected, found)
            }
            InterpreterError::CallDepthExceeded { limit, .. } => {
                write!(f, "Call depth limit exceeded ({})", limit)
            }
            InterpreterError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for InterpreterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InterpreterError::Io(err) => Some(err),
            _ => None,
        }
    }
}
