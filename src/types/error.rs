use thiserror::Error;

use crate::parse::ParseError;

/// Why a single formula could not produce a number.
///
/// These never abort an evaluation pass: the rule's value becomes `0` and the
/// error is kept as a diagnostic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("reference error: '{name}' is not defined")]
    Reference { name: String },

    #[error(transparent)]
    Syntax(#[from] ParseError),

    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not finite ({value})")]
    NonFinite { value: f64 },

    #[error("result is a boolean, not a number")]
    NonNumeric,

    #[error("helper '{name}' cannot be used as a value")]
    HelperAsValue { name: String },

    #[error("'{name}' is not a function")]
    NotAFunction { name: String },

    #[error("{helper} expects {expected} argument(s), got {found}")]
    Arity {
        helper: &'static str,
        expected: &'static str,
        found: usize,
    },
}
