//! Dice expression engine for Dicer.
//!
//! Turns free-form roll text such as `3d6+2`, `d%` or `（1d4+1）*2` into a
//! rolled total plus a human-readable trace of the faces that were rolled,
//! and estimates the closed-form `[min, max]` range of an expression without
//! touching the RNG.
//!
//! The pipeline is: [`normalize::preprocess`] (full-width folding and dice
//! shorthand) → [`lexer::tokenize`] → a two-stack operator-precedence
//! reduction shared by [`DiceEvaluator::parse`] and [`DiceEvaluator::range`].

pub mod error;
pub mod eval;
pub mod lexer;
pub mod normalize;
pub mod range;
pub mod roller;

mod reduce;

pub use error::{ExprError, ExprResult};
pub use eval::{DiceEvaluator, ELIDED_TRACE, Evaluation, ExprValue};
pub use lexer::{Operator, Token, TokenKind, tokenize};
pub use normalize::preprocess;
pub use range::Range;
pub use roller::{RandRoller, Roller, SequenceRoller};
