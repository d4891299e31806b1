use crate::value::Value;

/// Outcome of executing a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlFlow {
    Next,
    Return(Value),
}
