pub mod parser;
pub mod environment;
pub mod functions;
pub mod error;
pub mod control_flow;
pub mod console;
pub mod evaluator;

pub use error::InterpreterError;
pub use control_flow::ControlFlow;
pub use environment::{Environment, Variable};
pub use functions::FunctionTable;
pub use parser::{parse_program, ParseError, Parser};
pub use evaluator::{Interpreter, parse_and_run, parse_and_run_with_diagnostics, run_with_io};
