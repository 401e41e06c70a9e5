//! Error types for the expression engine.

/// Errors raised while tokenizing or evaluating a dice expression.
///
/// Messages are user-facing: handlers forward them verbatim into chat.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    /// A character that is neither a digit, an operator, nor a parenthesis.
    #[error("无法识别的字符 '{ch}'（位置 {position}）")]
    UnrecognizedCharacter {
        /// The offending character.
        ch: char,
        /// Character offset in the normalized expression.
        position: usize,
    },

    /// A closing parenthesis without an opener, or an opener never closed.
    #[error("括号不匹配（位置 {position}）")]
    MismatchedParen {
        /// Character offset of the unmatched parenthesis.
        position: usize,
    },

    /// An operator was applied without enough operands.
    #[error("运算符 '{operator}' 缺少操作数（位置 {position}）")]
    MissingOperand {
        /// The operator symbol.
        operator: char,
        /// Character offset of the operator.
        position: usize,
    },

    /// A dice operator with a non-positive count or face value, or too many dice.
    #[error("无效的骰子参数：{count}d{faces}")]
    InvalidDiceParameter {
        /// Number of dice requested.
        count: i64,
        /// Number of faces requested.
        faces: i64,
    },

    /// Division whose divisor is (or may be) zero.
    #[error("除数不能为零")]
    DivideByZero,

    /// The expression did not reduce to exactly one value.
    #[error("表达式不完整")]
    IncompleteExpression,

    /// A literal or intermediate result does not fit in 64 bits.
    #[error("数值溢出")]
    Overflow,
}

/// Convenience result type for expression operations.
pub type ExprResult<T> = Result<T, ExprError>;
