//! Logos-based tokenizer for normalized dice expressions.

use logos::Logos;
use std::fmt;

use crate::error::{ExprError, ExprResult};

/// A binary operator of the dice grammar, plus the end-of-input sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Addition `+`.
    Add,
    /// Subtraction `-`.
    Sub,
    /// Multiplication `*`.
    Mul,
    /// Division `/`, rounded half up.
    Div,
    /// Dice roll `AdB`.
    Dice,
    /// End-of-stream sentinel; flushes the operator stack.
    End,
}

impl Operator {
    /// Binding strength: `End` < `+ -` < `* /` < `d`.
    pub fn precedence(self) -> u8 {
        match self {
            Self::End => 0,
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
            Self::Dice => 3,
        }
    }

    /// The source symbol for this operator.
    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
            Self::Dice => 'd',
            Self::End => '$',
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// What a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Non-negative integer literal.
    Number(i64),
    /// Binary operator or the end sentinel.
    Operator(Operator),
    /// Opening parenthesis.
    LParen,
    /// Closing parenthesis.
    RParen,
}

/// A token with its character offset in the normalized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// The token payload.
    pub kind: TokenKind,
    /// Character offset (not byte offset) where the token starts.
    pub position: usize,
}

impl Token {
    /// Shorthand for an operator token.
    pub fn operator(op: Operator, position: usize) -> Self {
        Self {
            kind: TokenKind::Operator(op),
            position,
        }
    }
}

/// Internal logos token, converted to [`Token`] after lexing.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
    #[regex("[0-9]+")]
    Number,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("d")]
    Dice,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,
}

/// Tokenize a normalized expression.
///
/// The returned stream always ends with an [`Operator::End`] sentinel. The
/// first character the lexer cannot match aborts with
/// [`ExprError::UnrecognizedCharacter`].
pub fn tokenize(text: &str) -> ExprResult<Vec<Token>> {
    let mut lexer = RawToken::lexer(text);
    let mut tokens = Vec::new();

    while let Some(raw) = lexer.next() {
        let span = lexer.span();
        let position = text[..span.start].chars().count();
        let kind = match raw {
            Ok(RawToken::Number) => {
                let value = lexer.slice().parse().map_err(|_| ExprError::Overflow)?;
                TokenKind::Number(value)
            }
            Ok(RawToken::Plus) => TokenKind::Operator(Operator::Add),
            Ok(RawToken::Minus) => TokenKind::Operator(Operator::Sub),
            Ok(RawToken::Star) => TokenKind::Operator(Operator::Mul),
            Ok(RawToken::Slash) => TokenKind::Operator(Operator::Div),
            Ok(RawToken::Dice) => TokenKind::Operator(Operator::Dice),
            Ok(RawToken::LParen) => TokenKind::LParen,
            Ok(RawToken::RParen) => TokenKind::RParen,
            Err(()) => {
                let ch = text[span.start..].chars().next().unwrap_or('?');
                return Err(ExprError::UnrecognizedCharacter { ch, position });
            }
        };
        tokens.push(Token { kind, position });
    }

    tokens.push(Token::operator(Operator::End, text.chars().count()));
    Ok(tokens)
}
