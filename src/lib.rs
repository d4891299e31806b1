pub mod ast;
pub mod cli;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod token;
pub mod value;

pub use ast::{Expr, ExprKind, Program, Stmt};
pub use config::Limits;
pub use error::Error;
pub use token::Token;
pub use value::{Value, ValueType};
