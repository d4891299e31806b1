use std::fmt;

use crate::diagnostic::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Eof,

    // Literals and Identifiers
    Ident(String),
    Int(i32),
    String(String),
    True,
    False,

    // Keywords
    Var,
    Func,
    If,
    Else,
    While,
    For,
    Print,
    Input,
    Return,

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    Colon,
    Comma,
    Semicolon,

    // Operators
    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
}

impl Token {
    /// Maps a word to its keyword token, if it is one.
    pub fn keyword(word: &str) -> Option<Token> {
        let token = match word {
            "var" => Token::Var,
            "func" => Token::Func,
            "if" => Token::If,
            "else" => Token::Else,
            "while" => Token::While,
            "for" => Token::For,
            "print" => Token::Print,
            "input" => Token::Input,
            "return" => Token::Return,
            "true" => Token::True,
            "false" => Token::False,
            _ => return None,
        };
        Some(token)
    }

    /// True when both tokens carry the same tag, ignoring payloads.
    pub fn same_kind(&self, other: &Token) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Eof => write!(f, "end of input"),
            Token::Ident(name) => write!(f, "identifier `{}`", name),
            Token::Int(value) => write!(f, "integer `{}`", value),
            Token::String(text) => write!(f, "string {:?}", text),
            Token::True => write!(f, "`true`"),
            Token::False => write!(f, "`false`"),
            Token::Var => write!(f, "`var`"),
            Token::Func => write!(f, "`func`"),
            Token::If => write!(f, "`if`"),
            Token::Else => write!(f, "`else`"),
            Token::While => write!(f, "`while`"),
            Token::For => write!(f, "`for`"),
            Token::Print => write!(f, "`print`"),
            Token::Input => write!(f, "`input`"),
            Token::Return => write!(f, "`return`"),
            Token::LParen => write!(f, "`(`"),
            Token::RParen => write!(f, "`)`"),
            Token::LBrace => write!(f, "`{{`"),
            Token::RBrace => write!(f, "`}}`"),
            Token::Colon => write!(f, "`:`"),
            Token::Comma => write!(f, "`,`"),
            Token::Semicolon => write!(f, "`;`"),
            Token::Assign => write!(f, "`=`"),
            Token::Plus => write!(f, "`+`"),
            Token::Minus => write!(f, "`-`"),
            Token::Star => write!(f, "`*`"),
            Token::Slash => write!(f, "`/`"),
            Token::Percent => write!(f, "`%`"),
            Token::Eq => write!(f, "`==`"),
            Token::NotEq => write!(f, "`!=`"),
            Token::Less => write!(f, "`<`"),
            Token::LessEq => write!(f, "`<=`"),
            Token::Greater => write!(f, "`>`"),
            Token::GreaterEq => write!(f, "`>=`"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}
