use std::fmt;

use super::expr::BinaryOp;

/// Intermediate value produced while evaluating a formula.
///
/// Comparisons and `!` produce booleans; everything else produces numbers.
/// Booleans coerce to `1`/`0` wherever a number is expected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
}

impl Value {
    /// Numeric view of this value.
    #[must_use]
    pub fn to_number(self) -> f64 {
        match self {
            Value::Number(n) => n,
            Value::Bool(true) => 1.0,
            Value::Bool(false) => 0.0,
        }
    }

    /// Zero and NaN are falsy; every other number is truthy.
    #[must_use]
    pub fn is_truthy(self) -> bool {
        match self {
            Value::Number(n) => n != 0.0 && !n.is_nan(),
            Value::Bool(b) => b,
        }
    }

    /// Compare two values numerically. Any comparison involving NaN is false,
    /// except `!=` which is true. Arithmetic operators yield `false`.
    #[must_use]
    pub fn compare(self, op: BinaryOp, other: Value) -> bool {
        let (a, b) = (self.to_number(), other.to_number());
        match op {
            BinaryOp::Eq => a == b,
            BinaryOp::Neq => a != b,
            BinaryOp::Gt => a > b,
            BinaryOp::Gte => a >= b,
            BinaryOp::Lt => a < b,
            BinaryOp::Lte => a <= b,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => false,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
        }
    }
}
