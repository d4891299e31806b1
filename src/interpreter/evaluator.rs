use crate::ast::{BinaryOp, Expr, ExprKind, Program, Stmt};
use crate::config::Limits;
use crate::diagnostic::{Diagnostic, Span};
use crate::error::Error;
use crate::value::{Value, ValueType};
use super::console;
use super::control_flow::ControlFlow;
use super::environment::Environment;
use super::error::InterpreterError;
use super::functions::FunctionTable;
use super::parser::{parse_program, Parser};
use log::{debug, trace};
use std::io::{self, BufRead, StdinLock, StdoutLock, Write};
use std::rc::Rc;

/// Tree-walking evaluator. Holds everything one run needs: the scope stack,
/// the function table, the console streams and the call depth.
pub struct Interpreter<'p, R, W> {
    env: Environment,
    functions: FunctionTable<'p>,
    input: R,
    output: W,
    limits: Limits,
    depth: usize,
}

impl<'p> Interpreter<'p, StdinLock<'static>, StdoutLock<'static>> {
    pub fn new() -> Self {
        Self::with_io(io::stdin().lock(), io::stdout().lock())
    }
}

impl<'p> Default for Interpreter<'p, StdinLock<'static>, StdoutLock<'static>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'p, R: BufRead, W: Write> Interpreter<'p, R, W> {
    pub fn with_io(input: R, output: W) -> Self {
        Self {
            env: Environment::new(),
            functions: FunctionTable::new(),
            input,
            output,
            limits: Limits::default(),
            depth: 0,
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Registers every top-level function, then executes the remaining
    /// top-level statements in order. A top-level `return` ends the program
    /// and its value is returned.
    pub fn run(&mut self, program: &'p Program) -> Result<Option<Value>, InterpreterError> {
        for decl in program.functions() {
            if self.functions.register(decl) {
                debug!("function `{}` redeclared, latest declaration wins", decl.name);
            } else {
                debug!("registered function `{}` ({} params)", decl.name, decl.params.len());
            }
        }

        debug!("executing program with {} functions", self.functions.len());
        let mut result = None;
        for stmt in &program.statements {
            if matches!(stmt, Stmt::Function(_)) {
                continue;
            }
            if let ControlFlow::Return(value) = self.execute_statement(stmt)? {
                debug!("top-level return, stopping");
                result = Some(value);
                break;
            }
        }

        self.output.flush()?;
        debug!("program finished");
        Ok(result)
    }

    fn execute_block(&mut self, statements: &[Stmt]) -> Result<ControlFlow, InterpreterError> {
        for stmt in statements {
            match self.execute_statement(stmt)? {
                ControlFlow::Next => {}
                flow => return Ok(flow),
            }
        }
        Ok(ControlFlow::Next)
    }

    fn execute_statement(&mut self, statement: &Stmt) -> Result<ControlFlow, InterpreterError> {
        match statement {
            Stmt::VarDecl { name, ty, init, .. } => {
                let value = match init {
                    Some(expr) => self.evaluate(expr)?,
                    None => ty.default_value(),
                };
                self.env.declare(name.clone(), *ty, value);
                Ok(ControlFlow::Next)
            }
            Stmt::Assign { name, value, span } => {
                let value = self.evaluate(value)?;
                if !self.env.assign(name, value) {
                    return Err(InterpreterError::undefined_variable_at(&**name, *span));
                }
                Ok(ControlFlow::Next)
            }
            // Registered before execution starts.
            Stmt::Function(_) => Ok(ControlFlow::Next),
            Stmt::Call(expr) => {
                self.evaluate(expr)?;
                Ok(ControlFlow::Next)
            }
            Stmt::If { condition, then_branch, else_branch } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute_block(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute_block(else_branch)
                } else {
                    Ok(ControlFlow::Next)
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let ControlFlow::Return(value) = self.execute_block(body)? {
                        return Ok(ControlFlow::Return(value));
                    }
                }
                Ok(ControlFlow::Next)
            }
            Stmt::For { init, condition, increment, body } => {
                self.env.push_scope();
                trace!("push for-loop scope (depth {})", self.env.depth());
                let result = self.execute_for(init, condition, increment, body);
                self.env.pop_scope();
                trace!("pop for-loop scope");
                result
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.output, "{}", value)?;
                self.output.flush()?;
                Ok(ControlFlow::Next)
            }
            Stmt::Input { name, span } => {
                self.execute_input(name, *span)?;
                Ok(ControlFlow::Next)
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::None,
                };
                Ok(ControlFlow::Return(value))
            }
        }
    }

    fn execute_for(
        &mut self,
        init: &Stmt,
        condition: &Expr,
        increment: &Stmt,
        body: &[Stmt],
    ) -> Result<ControlFlow, InterpreterError> {
        self.execute_statement(init)?;
        while self.evaluate(condition)?.is_truthy() {
            if let ControlFlow::Return(value) = self.execute_block(body)? {
                return Ok(ControlFlow::Return(value));
            }
            self.execute_statement(increment)?;
        }
        Ok(ControlFlow::Next)
    }

    /// Reads into `name` according to the type of its current value.
    fn execute_input(&mut self, name: &str, span: Span) -> Result<(), InterpreterError> {
        let current = match self.env.get(name) {
            Some(variable) => variable.value.value_type(),
            None => return Err(InterpreterError::undefined_variable_at(name, span)),
        };

        self.output.flush()?;
        let value = match current {
            ValueType::Int => Value::Int(console::read_int(&mut self.input)?),
            ValueType::Bool => Value::Bool(console::read_int(&mut self.input)? != 0),
            ValueType::String => Value::String(console::read_line(&mut self.input)),
            ValueType::None => return Ok(()),
        };
        self.env.assign(name, value);
        Ok(())
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, InterpreterError> {
        match &expr.kind {
            ExprKind::Literal(value) => Ok(value.clone()),
            ExprKind::Identifier(name) => self
                .env
                .get(name)
                .map(|variable| variable.value.clone())
                .ok_or_else(|| InterpreterError::undefined_variable_at(&**name, expr.span)),
            ExprKind::Binary { left, op, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                Ok(binary_operation(*op, &left, &right))
            }
            ExprKind::Call { name, args } => self.call_function(name, args, expr.span),
        }
    }

    fn call_function(&mut self, name: &Rc<str>, args: &[Expr], span: Span) -> Result<Value, InterpreterError> {
        let decl = self
            .functions
            .get(name)
            .ok_or_else(|| InterpreterError::undefined_function_at(&**name, span))?;

        if decl.params.len() != args.len() {
            return Err(InterpreterError::arity_mismatch_at(
                &**name,
                decl.params.len(),
                args.len(),
                span,
            ));
        }

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.evaluate(arg)?);
        }

        if self.depth >= self.limits.max_call_depth {
            return Err(InterpreterError::call_depth_exceeded_at(
                &**name,
                self.limits.max_call_depth,
                span,
            ));
        }

        self.depth += 1;
        self.env.push_scope();
        trace!("enter `{}` (call depth {})", name, self.depth);

        for (param, value) in decl.params.iter().zip(values) {
            self.env.bind(param.name.clone(), value);
        }
        let result = self.execute_block(&decl.body);

        self.env.pop_scope();
        self.depth -= 1;
        trace!("exit `{}`", name);

        match result? {
            ControlFlow::Return(value) => Ok(value),
            ControlFlow::Next => Ok(Value::None),
        }
    }
}

/// Applies `op`. A string on either side switches to string semantics,
/// whatever the operator: comparisons compare the rendered forms and every
/// other operator concatenates them. Otherwise both sides are read as
/// integers.
pub fn binary_operation(op: BinaryOp, left: &Value, right: &Value) -> Value {
    if left.is_string() || right.is_string() {
        let (l, r) = (left.to_string(), right.to_string());
        return match op {
            BinaryOp::Eq => Value::Bool(l == r),
            BinaryOp::NotEq => Value::Bool(l != r),
            BinaryOp::Less => Value::Bool(l < r),
            BinaryOp::LessEq => Value::Bool(l <= r),
            BinaryOp::Greater => Value::Bool(l > r),
            BinaryOp::GreaterEq => Value::Bool(l >= r),
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => Value::String(l + &r),
        };
    }

    let (l, r) = (left.to_int(), right.to_int());
    match op {
        BinaryOp::Add => Value::Int(l.wrapping_add(r)),
        BinaryOp::Sub => Value::Int(l.wrapping_sub(r)),
        BinaryOp::Mul => Value::Int(l.wrapping_mul(r)),
        BinaryOp::Div => Value::Int(if r == 0 { 0 } else { l.wrapping_div(r) }),
        BinaryOp::Mod => Value::Int(if r == 0 { 0 } else { l.wrapping_rem(r) }),
        BinaryOp::Eq => Value::Bool(l == r),
        BinaryOp::NotEq => Value::Bool(l != r),
        BinaryOp::Less => Value::Bool(l < r),
        BinaryOp::LessEq => Value::Bool(l <= r),
        BinaryOp::Greater => Value::Bool(l > r),
        BinaryOp::GreaterEq => Value::Bool(l >= r),
    }
}

/// Parses and runs `source` on the process's stdin and stdout.
pub fn parse_and_run(source: &str) -> Result<Option<Value>, String> {
    let program = parse_program(source).map_err(|e| e.to_string())?;

    let mut interpreter = Interpreter::new();
    interpreter
        .run(&program)
        .map_err(|e| format!("Runtime error: {}", e))
}

/// Parses and runs `source` against the given streams.
pub fn run_with_io<R: BufRead, W: Write>(
    source: &str,
    input: R,
    output: W,
    limits: Limits,
) -> Result<Option<Value>, Error> {
    let program = Parser::with_limits(source, limits).parse_program()?;

    let mut interpreter = Interpreter::with_io(input, output).with_limits(limits);
    Ok(interpreter.run(&program)?)
}

pub fn parse_and_run_with_diagnostics(source: &str, limits: Limits) -> Result<Option<Value>, Vec<Diagnostic>> {
    let program = Parser::with_limits(source, limits)
        .parse_program()
        .map_err(|e| vec![e.to_diagnostic()])?;
    debug!("parsed {} top-level statements", program.statements.len());

    let mut interpreter = Interpreter::new().with_limits(limits);
    interpreter.run(&program).map_err(|e| vec![e.to_diagnostic()])
}
