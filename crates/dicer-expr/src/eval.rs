//! Rolling evaluation of dice expressions.

use std::fmt;

use crate::error::{ExprError, ExprResult};
use crate::lexer::{Operator, Token, tokenize};
use crate::normalize::preprocess;
use crate::range::{Range, RangeReducer};
use crate::reduce::{Reducer, reduce};
use crate::roller::Roller;

/// Trace shown in place of roll details when dice feed into other dice.
pub const ELIDED_TRACE: &str = "[略]";

/// Default face count for a `d` without a right operand.
pub const DEFAULT_FACES: u32 = 100;

/// Upper bound on the number of dice a single `AdB` may roll.
pub const DEFAULT_MAX_DICE: u32 = 10_000;

/// The result of evaluating a subexpression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprValue {
    /// Numeric value.
    pub value: i64,
    /// Canonical source text of the subexpression.
    pub expr: String,
    /// True iff the subtree contains at least one dice operator.
    pub is_dice: bool,
    /// Bracketed roll list (`[3+5+1]`), only for a dice leaf whose count and
    /// faces are both plain numbers.
    pub dice_details: Option<String>,
    /// True when a dice operator took another dice result as an operand.
    pub has_nested_dice: bool,
    /// Expanded trace: roll details for dice leaves, literals otherwise.
    pub expanded: String,
}

impl ExprValue {
    fn literal(n: i64) -> Self {
        Self {
            value: n,
            expr: n.to_string(),
            is_dice: false,
            dice_details: None,
            has_nested_dice: false,
            expanded: n.to_string(),
        }
    }
}

/// The outcome of [`DiceEvaluator::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// The rolled total.
    pub result: i64,
    /// Human-readable trace; [`ELIDED_TRACE`] for nested dice.
    pub expanded: String,
    /// Canonical normalized expression.
    pub expr: String,
    /// Whether any dice were rolled.
    pub is_dice: bool,
}

impl From<ExprValue> for Evaluation {
    fn from(value: ExprValue) -> Self {
        let expanded = if value.has_nested_dice {
            ELIDED_TRACE.to_string()
        } else if value.is_dice {
            value.expanded
        } else {
            value.expr.clone()
        };
        Self {
            result: value.value,
            expanded,
            expr: value.expr,
            is_dice: value.is_dice,
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.expanded == self.expr {
            write!(f, "{}={}", self.expr, self.result)
        } else {
            write!(f, "{}={}={}", self.expr, self.expanded, self.result)
        }
    }
}

/// Parses and evaluates dice expressions.
///
/// Holds no per-call state; one evaluator can be shared by every command.
#[derive(Debug, Clone)]
pub struct DiceEvaluator {
    default_faces: u32,
    max_dice: u32,
}

impl Default for DiceEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_FACES)
    }
}

impl DiceEvaluator {
    /// Create an evaluator whose bare `d` rolls `default_faces`-sided dice.
    pub fn new(default_faces: u32) -> Self {
        Self {
            default_faces: default_faces.max(1),
            max_dice: DEFAULT_MAX_DICE,
        }
    }

    /// Cap the number of dice a single `AdB` may roll.
    pub fn with_max_dice(mut self, max_dice: u32) -> Self {
        self.max_dice = max_dice.max(1);
        self
    }

    /// Face count inserted for a `d` without a right operand.
    pub fn default_faces(&self) -> u32 {
        self.default_faces
    }

    /// Normalize raw input (see [`preprocess`]).
    pub fn preprocess(&self, raw: &str) -> String {
        preprocess(raw, self.default_faces)
    }

    /// Normalize and tokenize raw input.
    pub fn tokenize(&self, raw: &str) -> ExprResult<Vec<Token>> {
        tokenize(&self.preprocess(raw))
    }

    /// Evaluate raw input, returning the full value tree summary.
    pub fn evaluate(&self, raw: &str, roller: &mut dyn Roller) -> ExprResult<ExprValue> {
        let tokens = self.tokenize(raw)?;
        let mut reducer = RollReducer {
            roller,
            max_dice: self.max_dice,
        };
        reduce(&tokens, &mut reducer)
    }

    /// Roll an expression, returning its total and expanded trace.
    pub fn parse(&self, raw: &str, roller: &mut dyn Roller) -> ExprResult<Evaluation> {
        let evaluation = Evaluation::from(self.evaluate(raw, roller)?);
        tracing::debug!(
            expr = %evaluation.expr,
            result = evaluation.result,
            "rolled expression"
        );
        Ok(evaluation)
    }

    /// Compute the closed-form `[min, max]` of an expression without rolling.
    pub fn range(&self, raw: &str) -> ExprResult<Range> {
        let tokens = self.tokenize(raw)?;
        reduce(
            &tokens,
            &mut RangeReducer {
                max_dice: self.max_dice,
            },
        )
    }
}

struct RollReducer<'a> {
    roller: &'a mut dyn Roller,
    max_dice: u32,
}

impl Reducer for RollReducer<'_> {
    type Value = ExprValue;

    fn number(&mut self, n: i64) -> ExprValue {
        ExprValue::literal(n)
    }

    fn apply(&mut self, op: Operator, lhs: ExprValue, rhs: ExprValue) -> ExprResult<ExprValue> {
        if op == Operator::Dice {
            return self.roll(lhs, rhs);
        }

        let value = match op {
            Operator::Add => lhs.value.checked_add(rhs.value),
            Operator::Sub => lhs.value.checked_sub(rhs.value),
            Operator::Mul => lhs.value.checked_mul(rhs.value),
            _ => Some(div_round_half_up(lhs.value, rhs.value)?),
        }
        .ok_or(ExprError::Overflow)?;

        Ok(ExprValue {
            value,
            expr: format!("{}{op}{}", lhs.expr, rhs.expr),
            is_dice: lhs.is_dice || rhs.is_dice,
            dice_details: None,
            has_nested_dice: lhs.has_nested_dice || rhs.has_nested_dice,
            expanded: format!("{}{op}{}", lhs.expanded, rhs.expanded),
        })
    }

    fn group(&mut self, inner: ExprValue) -> ExprValue {
        ExprValue {
            expr: format!("({})", inner.expr),
            expanded: format!("({})", inner.expanded),
            ..inner
        }
    }
}

impl RollReducer<'_> {
    fn roll(&mut self, count: ExprValue, faces: ExprValue) -> ExprResult<ExprValue> {
        let invalid = ExprError::InvalidDiceParameter {
            count: count.value,
            faces: faces.value,
        };
        if count.value <= 0 || faces.value <= 0 || count.value > i64::from(self.max_dice) {
            return Err(invalid);
        }
        let n = u32::try_from(count.value).map_err(|_| invalid.clone())?;
        let sides = u32::try_from(faces.value).map_err(|_| invalid)?;

        let rolls = self.roller.roll_many(n, sides);
        let value = rolls.iter().map(|&r| i64::from(r)).sum();

        let nested = count.is_dice || faces.is_dice || count.has_nested_dice || faces.has_nested_dice;
        let dice_details = (!nested).then(|| {
            let faces: Vec<String> = rolls.iter().map(u32::to_string).collect();
            format!("[{}]", faces.join("+"))
        });
        let expanded = dice_details
            .clone()
            .unwrap_or_else(|| ELIDED_TRACE.to_string());

        Ok(ExprValue {
            value,
            expr: format!("{}d{}", count.expr, faces.expr),
            is_dice: true,
            dice_details,
            has_nested_dice: nested,
            expanded,
        })
    }
}

/// Integer division rounded to nearest, halves rounded toward +∞.
///
/// `7/2 = 4`, `-7/2 = -3`, `5/3 = 2`.
pub fn div_round_half_up(lhs: i64, rhs: i64) -> ExprResult<i64> {
    if rhs == 0 {
        return Err(ExprError::DivideByZero);
    }
    let (a, b) = if rhs < 0 {
        (-i128::from(lhs), -i128::from(rhs))
    } else {
        (i128::from(lhs), i128::from(rhs))
    };
    let quotient = (2 * a + b).div_euclid(2 * b);
    i64::try_from(quotient).map_err(|_| ExprError::Overflow)
}
