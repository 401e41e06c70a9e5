//! Closed-form range estimation.
//!
//! Mirrors the rolling evaluator's precedence rules but never touches the
//! RNG: every die is assumed to show 1 at minimum and its largest face at
//! maximum, and operands are treated as independent.

use std::fmt;

use crate::error::{ExprError, ExprResult};
use crate::eval::div_round_half_up;
use crate::lexer::Operator;
use crate::reduce::Reducer;

/// Inclusive bounds of an expression's possible values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    /// Smallest reachable value.
    pub min: i64,
    /// Largest reachable value.
    pub max: i64,
}

impl Range {
    /// A degenerate range holding one value.
    pub fn exact(n: i64) -> Self {
        Self { min: n, max: n }
    }

    /// Returns true if `value` lies within the bounds.
    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Returns true if zero lies within the bounds.
    pub fn straddles_zero(&self) -> bool {
        self.contains(0)
    }

    fn from_corners(corners: [i64; 4]) -> Self {
        let min = corners.iter().copied().min().unwrap_or(0);
        let max = corners.iter().copied().max().unwrap_or(0);
        Self { min, max }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

pub(crate) struct RangeReducer {
    pub(crate) max_dice: u32,
}

impl Reducer for RangeReducer {
    type Value = Range;

    fn number(&mut self, n: i64) -> Range {
        Range::exact(n)
    }

    fn apply(&mut self, op: Operator, a: Range, b: Range) -> ExprResult<Range> {
        match op {
            Operator::Add => Ok(Range {
                min: checked(a.min.checked_add(b.min))?,
                max: checked(a.max.checked_add(b.max))?,
            }),
            Operator::Sub => Ok(Range {
                min: checked(a.min.checked_sub(b.max))?,
                max: checked(a.max.checked_sub(b.min))?,
            }),
            Operator::Mul => Ok(Range::from_corners([
                checked(a.min.checked_mul(b.min))?,
                checked(a.min.checked_mul(b.max))?,
                checked(a.max.checked_mul(b.min))?,
                checked(a.max.checked_mul(b.max))?,
            ])),
            Operator::Div => {
                if b.straddles_zero() {
                    return Err(ExprError::DivideByZero);
                }
                Ok(Range::from_corners([
                    div_round_half_up(a.min, b.min)?,
                    div_round_half_up(a.min, b.max)?,
                    div_round_half_up(a.max, b.min)?,
                    div_round_half_up(a.max, b.max)?,
                ]))
            }
            Operator::Dice => {
                if a.min <= 0 || b.min <= 0 || a.max > i64::from(self.max_dice) {
                    return Err(ExprError::InvalidDiceParameter {
                        count: a.min,
                        faces: b.min,
                    });
                }
                Ok(Range {
                    min: a.min,
                    max: checked(a.max.checked_mul(b.max))?,
                })
            }
            Operator::End => Err(ExprError::IncompleteExpression),
        }
    }

    fn group(&mut self, inner: Range) -> Range {
        inner
    }
}

fn checked(value: Option<i64>) -> ExprResult<i64> {
    value.ok_or(ExprError::Overflow)
}
