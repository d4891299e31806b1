use chumsky::prelude::*;
use std::fmt;

use crate::diagnostic::{Diagnostic, Label, Span};
use crate::token::{SpannedToken, Token};

type LexExtra<'src> = extra::Err<Simple<'src, char>>;

/// Raw token text as recognised by the grammar, before keyword lookup and
/// integer conversion. `Unterminated` and `Unknown` are kept as lexemes so
/// the failure surfaces only when the lexer reaches them.
#[derive(Debug, Clone)]
enum Lexeme<'src> {
    Int(&'src str),
    Word(&'src str),
    Str(String),
    Symbol(Token),
    Unterminated,
    Unknown(char),
}

/// ASCII whitespace and `//` line comments.
fn trivia<'src>() -> impl Parser<'src, &'src str, (), LexExtra<'src>> {
    let space = one_of(" \t\n\r\x0B\x0C").ignored();
    let comment = just("//").then(none_of("\n").repeated()).ignored();
    space.or(comment).repeated()
}

fn lexeme<'src>() -> impl Parser<'src, &'src str, Lexeme<'src>, LexExtra<'src>> {
    let int = text::digits(10).to_slice().map(Lexeme::Int);

    let word = text::ascii::ident().map(Lexeme::Word);

    // `\n` is the only escape; any other backslash is kept as written.
    let string = just('"')
        .ignore_then(
            just("\\n")
                .to('\n')
                .or(none_of("\""))
                .repeated()
                .collect::<String>(),
        )
        .then_ignore(just('"'))
        .map(Lexeme::Str);

    // An opening quote with no partner swallows the rest of the input.
    let unterminated = just('"').then(any().repeated()).to(Lexeme::Unterminated);

    let double = choice((
        just("==").to(Token::Eq),
        just("!=").to(Token::NotEq),
        just("<=").to(Token::LessEq),
        just(">=").to(Token::GreaterEq),
    ));

    let single = choice((
        just('(').to(Token::LParen),
        just(')').to(Token::RParen),
        just('{').to(Token::LBrace),
        just('}').to(Token::RBrace),
        just(':').to(Token::Colon),
        just(',').to(Token::Comma),
        just(';').to(Token::Semicolon),
        just('=').to(Token::Assign),
        just('+').to(Token::Plus),
        just('-').to(Token::Minus),
        just('*').to(Token::Star),
        just('/').to(Token::Slash),
        just('%').to(Token::Percent),
        just('<').to(Token::Less),
        just('>').to(Token::Greater),
    ));

    choice((
        int,
        word,
        string,
        unterminated,
        double.or(single).map(Lexeme::Symbol),
        any().map(Lexeme::Unknown),
    ))
}

/// The whole source as spanned lexemes. Every character starts some lexeme,
/// so this never fails.
fn lexemes<'src>() -> impl Parser<'src, &'src str, Vec<(Lexeme<'src>, Span)>, LexExtra<'src>> {
    let spanned = lexeme()
        .map_with(|lexeme, e| {
            let span: SimpleSpan = e.span();
            (lexeme, Span::new(span.start, span.end))
        })
        .then_ignore(trivia());

    trivia().ignore_then(spanned.repeated().collect::<Vec<_>>())
}

#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    UnexpectedChar { ch: char, span: Span },
    UnterminatedString { span: Span },
    IntegerOverflow { literal: String, span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedChar { span, .. } => *span,
            Self::UnterminatedString { span } => *span,
            Self::IntegerOverflow { span, .. } => *span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::UnexpectedChar { ch, span } => Diagnostic::error(format!("unknown character `{}`", ch.escape_default()))
                .with_code("E0001")
                .with_label(Label::primary(*span, "not a valid token")),
            Self::UnterminatedString { span } => Diagnostic::error("unterminated string literal")
                .with_code("E0002")
                .with_label(Label::primary(*span, "missing closing `\"`")),
            Self::IntegerOverflow { literal, span } => {
                Diagnostic::error(format!("integer literal `{}` is out of range", literal))
                    .with_code("E0003")
                    .with_label(Label::primary(*span, "does not fit in a 32-bit signed integer"))
                    .with_note(format!("the largest integer literal is {}", i32::MAX))
            }
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnexpectedChar { ch, .. } => write!(f, "Unknown character: {}", ch.escape_default()),
            LexError::UnterminatedString { .. } => write!(f, "Unterminated string literal"),
            LexError::IntegerOverflow { literal, .. } => write!(f, "Integer literal out of range: {}", literal),
        }
    }
}

impl std::error::Error for LexError {}

/// Pull-based lexer. The grammar runs over the source once, when the lexer
/// is created; each call to [`Lexer::next_token`] then turns the next lexeme
/// into a token, so keyword lookup and lexical errors happen in stream order.
/// Once the end of the input has been reached every further call yields
/// [`Token::Eof`].
#[derive(Debug, Clone)]
pub struct Lexer<'src> {
    end: usize,
    lexemes: Vec<(Lexeme<'src>, Span)>,
    cursor: usize,
    exhausted: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            end: source.len(),
            lexemes: lexemes().parse(source).into_output().unwrap_or_default(),
            cursor: 0,
            exhausted: false,
        }
    }

    /// Restarts lexing from the beginning of `source`.
    pub fn reset(&mut self, source: &'src str) {
        *self = Self::new(source);
    }

    pub fn next_token(&mut self) -> Result<SpannedToken, LexError> {
        let Some((lexeme, span)) = self.lexemes.get(self.cursor) else {
            return Ok(SpannedToken {
                token: Token::Eof,
                span: Span::new(self.end, self.end),
            });
        };

        let token = Self::classify(lexeme, *span)?;
        self.cursor += 1;
        Ok(SpannedToken { token, span: *span })
    }

    fn classify(lexeme: &Lexeme<'_>, span: Span) -> Result<Token, LexError> {
        match lexeme {
            Lexeme::Int(digits) => digits.parse::<i32>().map(Token::Int).map_err(|_| LexError::IntegerOverflow {
                literal: digits.to_string(),
                span,
            }),
            Lexeme::Word(word) => Ok(Token::keyword(word).unwrap_or_else(|| Token::Ident(word.to_string()))),
            Lexeme::Str(text) => Ok(Token::String(text.clone())),
            Lexeme::Symbol(token) => Ok(token.clone()),
            Lexeme::Unterminated => Err(LexError::UnterminatedString { span }),
            Lexeme::Unknown(ch) => Err(LexError::UnexpectedChar { ch: *ch, span }),
        }
    }
}

/// Yields every token before end of input, then stops. A lexical error is
/// yielded once and ends the stream.
impl Iterator for Lexer<'_> {
    type Item = Result<SpannedToken, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        match self.next_token() {
            Ok(SpannedToken { token: Token::Eof, .. }) => {
                self.exhausted = true;
                None
            }
            Ok(token) => Some(Ok(token)),
            Err(err) => {
                self.exhausted = true;
                Some(Err(err))
            }
        }
    }
}

/// Lexes the whole source, including the trailing `Eof` token.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let at_end = token.token == Token::Eof;
        tokens.push(token);
        if at_end {
            return Ok(tokens);
        }
    }
}
