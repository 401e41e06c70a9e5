//! Two-stack operator-precedence reduction shared by rolling and range
//! estimation.

use crate::error::{ExprError, ExprResult};
use crate::lexer::{Operator, Token, TokenKind};

/// How values are built while reducing a token stream.
pub(crate) trait Reducer {
    /// The value kept on the value stack.
    type Value;

    /// Lift an integer literal.
    fn number(&mut self, n: i64) -> Self::Value;

    /// Combine two operands with a binary operator.
    fn apply(
        &mut self,
        op: Operator,
        lhs: Self::Value,
        rhs: Self::Value,
    ) -> ExprResult<Self::Value>;

    /// Mark a value as having been written inside parentheses.
    fn group(&mut self, inner: Self::Value) -> Self::Value;
}

#[derive(Debug, Clone, Copy)]
enum Stacked {
    Op(Operator, usize),
    /// Position of the `(` and the value-stack depth when it was opened.
    Paren(usize, usize),
}

/// Reduce a sentinel-terminated token stream to a single value.
///
/// Operators of equal or higher precedence are applied before a new one is
/// pushed, so every operator (including `d`) is left-associative.
pub(crate) fn reduce<R: Reducer>(tokens: &[Token], reducer: &mut R) -> ExprResult<R::Value> {
    let mut values: Vec<R::Value> = Vec::new();
    let mut ops: Vec<Stacked> = Vec::new();

    for token in tokens {
        match token.kind {
            TokenKind::Number(n) => values.push(reducer.number(n)),
            TokenKind::LParen => ops.push(Stacked::Paren(token.position, values.len())),
            TokenKind::RParen => {
                let depth = loop {
                    match ops.pop() {
                        Some(Stacked::Op(op, position)) => {
                            apply_top(reducer, &mut values, op, position)?;
                        }
                        Some(Stacked::Paren(_, depth)) => break depth,
                        None => {
                            return Err(ExprError::MismatchedParen {
                                position: token.position,
                            });
                        }
                    }
                };
                if values.len() <= depth {
                    return Err(ExprError::IncompleteExpression);
                }
                let inner = values.pop().ok_or(ExprError::IncompleteExpression)?;
                values.push(reducer.group(inner));
            }
            TokenKind::Operator(op) => {
                while let Some(&Stacked::Op(top, position)) = ops.last() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    ops.pop();
                    apply_top(reducer, &mut values, top, position)?;
                }
                if op == Operator::End {
                    if let Some(&Stacked::Paren(position, _)) = ops.last() {
                        return Err(ExprError::MismatchedParen { position });
                    }
                } else {
                    ops.push(Stacked::Op(op, token.position));
                }
            }
        }
    }

    if !ops.is_empty() || values.len() != 1 {
        return Err(ExprError::IncompleteExpression);
    }
    values.pop().ok_or(ExprError::IncompleteExpression)
}

fn apply_top<R: Reducer>(
    reducer: &mut R,
    values: &mut Vec<R::Value>,
    op: Operator,
    position: usize,
) -> ExprResult<()> {
    let missing = ExprError::MissingOperand {
        operator: op.symbol(),
        position,
    };
    let rhs = values.pop().ok_or_else(|| missing.clone())?;
    let lhs = values.pop().ok_or(missing)?;
    let value = reducer.apply(op, lhs, rhs)?;
    values.push(value);
    Ok(())
}
