use crate::ast::{BinaryOp, Expr, ExprKind, FunctionDecl, Param, Program, Stmt};
use crate::config::Limits;
use crate::diagnostic::{Diagnostic, Label, Span};
use crate::lexer::{LexError, Lexer};
use crate::token::{SpannedToken, Token};
use crate::value::{Value, ValueType};
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    Lex(LexError),
    Syntax {
        message: String,
        span: Span,
        expected: Vec<String>,
        found: Option<String>,
    },
    UnknownType { name: String, span: Span },
    TooManyParameters { function: String, limit: usize, span: Span },
    TooManyArguments { function: String, limit: usize, span: Span },
    NestedFunction { name: String, span: Span },
    ExpressionTooDeep { limit: usize, span: Span },
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self::Syntax {
            message: message.into(),
            span,
            expected: Vec::new(),
            found: None,
        }
    }

    pub fn with_expected(mut self, items: Vec<String>) -> Self {
        if let Self::Syntax { expected, .. } = &mut self {
            *expected = items;
        }
        self
    }

    pub fn with_found(mut self, token: impl Into<String>) -> Self {
        if let Self::Syntax { found, .. } = &mut self {
            *found = Some(token.into());
        }
        self
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Lex(err) => err.span(),
            Self::Syntax { span, .. } => *span,
            Self::UnknownType { span, .. } => *span,
            Self::TooManyParameters { span, .. } => *span,
            Self::TooManyArguments { span, .. } => *span,
            Self::NestedFunction { span, .. } => *span,
            Self::ExpressionTooDeep { span, .. } => *span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::Lex(err) => err.to_diagnostic(),
            Self::Syntax { message, span, expected, found } => {
                let mut msg = message.clone();
                if !expected.is_empty() {
                    msg = format!("expected {}", expected.join(" or "));
                    if let Some(found) = found {
                        msg.push_str(&format!(", found {}", found));
                    }
                }

                let mut diag = Diagnostic::error(msg)
                    .with_code("E0101")
                    .with_label(Label::primary(*span, ""));

                if expected.len() == 1 {
                    diag = diag.with_help(format!("expected {} here", expected[0]));
                }

                diag
            }
            Self::UnknownType { name, span } => Diagnostic::error(format!("unknown type `{}`", name))
                .with_code("E0102")
                .with_label(Label::primary(*span, "not a variable type"))
                .with_help("variables are declared as `int`, `string` or `bool`"),
            Self::TooManyParameters { function, limit, span } => {
                Diagnostic::error(format!("function `{}` declares more than {} parameters", function, limit))
                    .with_code("E0103")
                    .with_label(Label::primary(*span, "parameter over the limit"))
                    .with_note("the limit can be raised with `--max-params`")
            }
            Self::TooManyArguments { function, limit, span } => {
                Diagnostic::error(format!("call to `{}` passes more than {} arguments", function, limit))
                    .with_code("E0104")
                    .with_label(Label::primary(*span, "argument over the limit"))
                    .with_note("the limit can be raised with `--max-params`")
            }
            Self::NestedFunction { name, span } => {
                Diagnostic::error(format!("function `{}` is declared inside a block", name))
                    .with_code("E0105")
                    .with_label(Label::primary(*span, "nested declaration"))
                    .with_help("move the declaration to the top level of the program")
            }
            Self::ExpressionTooDeep { limit, span } => {
                Diagnostic::error(format!("expression is nested more than {} levels deep", limit))
                    .with_code("E0106")
                    .with_label(Label::primary(*span, "nesting limit reached here"))
                    .with_help("split the expression using intermediate variables")
                    .with_note("the limit can be raised with `--max-expr-depth`")
            }
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::Lex(err)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lex(err) => write!(f, "{}", err),
            ParseError::Syntax { message, expected, found, .. } => {
                if expected.is_empty() {
                    return write!(f, "Syntax error: {}", message);
                }
                write!(f, "Syntax error: expected {}", expected.join(" or "))?;
                if let Some(found) = found {
                    write!(f, ", found {}", found)?;
                }
                Ok(())
            }
            ParseError::UnknownType { name, .. } => write!(f, "Unknown type: {}", name),
            ParseError::TooManyParameters { function, limit, .. } => {
                write!(f, "Too many parameters in function {} (limit: {})", function, limit)
            }
            ParseError::TooManyArguments { function, limit, .. } => {
                write!(f, "Too many arguments in call to {} (limit: {})", function, limit)
            }
            ParseError::NestedFunction { name, .. } => {
                write!(f, "Function {} must be declared at the top level", name)
            }
            ParseError::ExpressionTooDeep { limit, .. } => {
                write!(f, "Expression nested too deeply (limit: {})", limit)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Recursive-descent parser over a pull-based [`Lexer`] with one token of
/// lookahead. Stops at the first error.
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: SpannedToken,
    previous_span: Span,
    limits: Limits,
    block_depth: usize,
    /// Open parentheses and argument lists around the current expression.
    nesting: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self::with_limits(source, Limits::default())
    }

    pub fn with_limits(source: &'src str, limits: Limits) -> Self {
        Self {
            lexer: Lexer::new(source),
            current: SpannedToken {
                token: Token::Eof,
                span: Span::dummy(),
            },
            previous_span: Span::dummy(),
            limits,
            block_depth: 0,
            nesting: 0,
        }
    }

    pub fn parse_program(mut self) -> Result<Program, ParseError> {
        self.current = self.lexer.next_token()?;

        let mut statements = Vec::new();
        while !self.at(&Token::Eof) {
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    fn at(&self, kind: &Token) -> bool {
        self.current.token.same_kind(kind)
    }

    fn current_span(&self) -> Span {
        self.current.span
    }

    fn advance(&mut self) -> Result<SpannedToken, ParseError> {
        let next = self.lexer.next_token()?;
        let consumed = std::mem::replace(&mut self.current, next);
        self.previous_span = consumed.span;
        Ok(consumed)
    }

    fn expect(&mut self, expected: Token) -> Result<Span, ParseError> {
        if self.at(&expected) {
            return Ok(self.advance()?.span);
        }
        Err(self.unexpected(expected.to_string()))
    }

    fn expect_ident(&mut self, what: &str) -> Result<(Rc<str>, Span), ParseError> {
        if let Token::Ident(name) = &self.current.token {
            let name = Rc::from(name.as_str());
            let span = self.advance()?.span;
            return Ok((name, span));
        }
        Err(self.unexpected(what.to_string()))
    }

    fn unexpected(&self, expected: String) -> ParseError {
        let message = if self.at(&Token::Eof) {
            "unexpected end of input"
        } else {
            "unexpected token"
        };
        ParseError::new(message, self.current_span())
            .with_expected(vec![expected])
            .with_found(self.current.token.to_string())
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(Token::LBrace)?;
        self.block_depth += 1;
        let mut statements = Vec::new();
        while !self.at(&Token::RBrace) && !self.at(&Token::Eof) {
            statements.push(self.parse_statement()?);
        }
        self.block_depth -= 1;
        self.expect(Token::RBrace)?;
        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match &self.current.token {
            Token::Var => self.parse_var_declaration(),
            Token::Func => self.parse_function_declaration(),
            Token::If => self.parse_if_statement(),
            Token::While => self.parse_while_statement(),
            Token::For => self.parse_for_statement(),
            Token::Print => self.parse_print_statement(),
            Token::Input => self.parse_input_statement(),
            Token::Return => self.parse_return_statement(),
            Token::Ident(_) => {
                let (name, span) = self.expect_ident("identifier")?;
                let stmt = match &self.current.token {
                    Token::Assign => self.parse_assignment_tail(name, span)?,
                    Token::LParen => {
                        let (call, _) = self.parse_call(name, span)?;
                        Stmt::Call(call)
                    }
                    _ => return Err(self.unexpected("`=` or `(`".to_string())),
                };
                self.expect(Token::Semicolon)?;
                Ok(stmt)
            }
            _ => Err(self.unexpected("statement".to_string())),
        }
    }

    /// `var NAME : TYPE ( = expr )? ;`
    fn parse_var_declaration(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect(Token::Var)?;
        let (name, _) = self.expect_ident("variable name")?;
        self.expect(Token::Colon)?;
        let ty = self.parse_variable_type()?;

        let init = if self.at(&Token::Assign) {
            self.advance()?;
            Some(self.parse_expression()?)
        } else {
            None
        };
        let end = self.expect(Token::Semicolon)?;

        Ok(Stmt::VarDecl {
            name,
            ty,
            init,
            span: start.merge(end),
        })
    }

    fn parse_variable_type(&mut self) -> Result<ValueType, ParseError> {
        let (type_name, span) = self.expect_ident("type name")?;
        type_name.parse::<ValueType>().map_err(|_| ParseError::UnknownType {
            name: type_name.to_string(),
            span,
        })
    }

    /// `NAME = expr`, with NAME already consumed. The caller owns the terminator.
    fn parse_assignment_tail(&mut self, name: Rc<str>, start: Span) -> Result<Stmt, ParseError> {
        self.expect(Token::Assign)?;
        let value = self.parse_expression()?;
        let span = start.merge(value.span);
        Ok(Stmt::Assign { name, value, span })
    }

    fn parse_function_declaration(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect(Token::Func)?;
        let (name, name_span) = self.expect_ident("function name")?;

        if self.block_depth > 0 {
            return Err(ParseError::NestedFunction {
                name: name.to_string(),
                span: start.merge(name_span),
            });
        }

        self.expect(Token::LParen)?;
        let mut params = Vec::new();
        if !self.at(&Token::RParen) {
            loop {
                let (param_name, param_span) = self.expect_ident("parameter name")?;
                if params.len() == self.limits.max_params {
                    return Err(ParseError::TooManyParameters {
                        function: name.to_string(),
                        limit: self.limits.max_params,
                        span: param_span,
                    });
                }
                self.expect(Token::Colon)?;
                let (ty, _) = self.expect_ident("parameter type")?;
                params.push(Param { name: param_name, ty });

                if self.at(&Token::Comma) {
                    self.advance()?;
                } else {
                    break;
                }
            }
        }
        self.expect(Token::RParen)?;
        self.expect(Token::Colon)?;
        let (return_type, _) = self.expect_ident("return type")?;
        let body = self.parse_block()?;

        Ok(Stmt::Function(FunctionDecl {
            name,
            params,
            return_type,
            body,
            span: start.merge(self.previous_span),
        }))
    }

    fn parse_if_statement(&mut self) -> Result<Stmt, ParseError> {
        self.expect(Token::If)?;
        self.expect(Token::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(Token::RParen)?;
        let then_branch = self.parse_block()?;

        let else_branch = if self.at(&Token::Else) {
            self.advance()?;
            if self.at(&Token::If) {
                Some(vec![self.parse_if_statement()?])
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_while_statement(&mut self) -> Result<Stmt, ParseError> {
        self.expect(Token::While)?;
        self.expect(Token::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(Token::RParen)?;
        let body = self.parse_block()?;
        Ok(Stmt::While { condition, body })
    }

    /// `for ( INIT ; cond ; NAME = expr ) { ... }` where INIT is a `var`
    /// declaration (which brings its own `;`) or a bare assignment.
    fn parse_for_statement(&mut self) -> Result<Stmt, ParseError> {
        self.expect(Token::For)?;
        self.expect(Token::LParen)?;

        let init = match &self.current.token {
            Token::Var => self.parse_var_declaration()?,
            Token::Ident(_) => {
                let (name, span) = self.expect_ident("identifier")?;
                let init = self.parse_assignment_tail(name, span)?;
                self.expect(Token::Semicolon)?;
                init
            }
            _ => return Err(self.unexpected("`var` or assignment".to_string())),
        };

        let condition = self.parse_expression()?;
        self.expect(Token::Semicolon)?;

        let (name, span) = self.expect_ident("identifier")?;
        let increment = self.parse_assignment_tail(name, span)?;
        self.expect(Token::RParen)?;

        let body = self.parse_block()?;

        Ok(Stmt::For {
            init: Box::new(init),
            condition,
            increment: Box::new(increment),
            body,
        })
    }

    fn parse_print_statement(&mut self) -> Result<Stmt, ParseError> {
        self.expect(Token::Print)?;
        self.expect(Token::LParen)?;
        let value = self.parse_expression()?;
        self.expect(Token::RParen)?;
        self.expect(Token::Semicolon)?;
        Ok(Stmt::Print(value))
    }

    fn parse_input_statement(&mut self) -> Result<Stmt, ParseError> {
        self.expect(Token::Input)?;
        self.expect(Token::LParen)?;
        let (name, span) = self.expect_ident("variable name")?;
        self.expect(Token::RParen)?;
        self.expect(Token::Semicolon)?;
        Ok(Stmt::Input { name, span })
    }

    fn parse_return_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect(Token::Return)?;
        let value = if self.at(&Token::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        let end = self.expect(Token::Semicolon)?;
        Ok(Stmt::Return {
            value,
            span: start.merge(end),
        })
    }

    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        Ok(self.parse_binary_expr(1)?.0)
    }

    fn token_to_binary_operator(token: &Token) -> Option<BinaryOp> {
        match token {
            Token::Eq => Some(BinaryOp::Eq),
            Token::NotEq => Some(BinaryOp::NotEq),
            Token::Less => Some(BinaryOp::Less),
            Token::LessEq => Some(BinaryOp::LessEq),
            Token::Greater => Some(BinaryOp::Greater),
            Token::GreaterEq => Some(BinaryOp::GreaterEq),
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Sub),
            Token::Star => Some(BinaryOp::Mul),
            Token::Slash => Some(BinaryOp::Div),
            Token::Percent => Some(BinaryOp::Mod),
            _ => None,
        }
    }

    /// Rejects trees taller than `max_expr_depth`; evaluating and dropping
    /// an expression both recurse once per level.
    fn check_height(&self, height: usize, span: Span) -> Result<(), ParseError> {
        if height > self.limits.max_expr_depth {
            return Err(ParseError::ExpressionTooDeep {
                limit: self.limits.max_expr_depth,
                span,
            });
        }
        Ok(())
    }

    /// Enters a parenthesised expression or an argument list.
    fn enter_nested(&mut self) -> Result<(), ParseError> {
        self.nesting += 1;
        if self.nesting > self.limits.max_expr_depth {
            return Err(ParseError::ExpressionTooDeep {
                limit: self.limits.max_expr_depth,
                span: self.current_span(),
            });
        }
        Ok(())
    }

    /// Returns the expression with its height.
    fn parse_binary_expr(&mut self, min_precedence: u8) -> Result<(Expr, usize), ParseError> {
        let (mut left, mut height) = self.parse_primary()?;

        while let Some(op) = Self::token_to_binary_operator(&self.current.token) {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance()?;
            let (right, right_height) = self.parse_binary_expr(precedence + 1)?;
            let span = left.span.merge(right.span);
            height = height.max(right_height) + 1;
            self.check_height(height, span)?;
            left = Expr {
                kind: ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            };
        }

        Ok((left, height))
    }

    fn parse_primary(&mut self) -> Result<(Expr, usize), ParseError> {
        let literal = match &self.current.token {
            Token::Int(n) => Some(Value::Int(*n)),
            Token::String(s) => Some(Value::String(s.clone())),
            Token::True => Some(Value::Bool(true)),
            Token::False => Some(Value::Bool(false)),
            _ => None,
        };
        if let Some(value) = literal {
            let span = self.advance()?.span;
            let expr = Expr {
                kind: ExprKind::Literal(value),
                span,
            };
            return Ok((expr, 1));
        }

        match &self.current.token {
            Token::Ident(_) => {
                let (name, span) = self.expect_ident("identifier")?;
                if self.at(&Token::LParen) {
                    self.parse_call(name, span)
                } else {
                    let expr = Expr {
                        kind: ExprKind::Identifier(name),
                        span,
                    };
                    Ok((expr, 1))
                }
            }
            Token::LParen => {
                let start = self.expect(Token::LParen)?;
                self.enter_nested()?;
                let (mut inner, height) = self.parse_binary_expr(1)?;
                self.nesting -= 1;
                let end = self.expect(Token::RParen)?;
                inner.span = start.merge(end);
                Ok((inner, height))
            }
            _ => Err(self.unexpected("expression".to_string())),
        }
    }

    /// `( args )` after a function name that has already been consumed.
    fn parse_call(&mut self, name: Rc<str>, start: Span) -> Result<(Expr, usize), ParseError> {
        self.expect(Token::LParen)?;
        self.enter_nested()?;
        let mut args = Vec::new();
        let mut height = 1;
        if !self.at(&Token::RParen) {
            loop {
                let (arg, arg_height) = self.parse_binary_expr(1)?;
                if args.len() == self.limits.max_params {
                    return Err(ParseError::TooManyArguments {
                        function: name.to_string(),
                        limit: self.limits.max_params,
                        span: arg.span,
                    });
                }
                height = height.max(arg_height + 1);
                args.push(arg);

                if self.at(&Token::Comma) {
                    self.advance()?;
                } else {
                    break;
                }
            }
        }
        self.nesting -= 1;
        let end = self.expect(Token::RParen)?;

        let span = start.merge(end);
        self.check_height(height, span)?;
        let expr = Expr {
            kind: ExprKind::Call { name, args },
            span,
        };
        Ok((expr, height))
    }
}

pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    Parser::new(source).parse_program()
}
