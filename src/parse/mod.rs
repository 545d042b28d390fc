mod error;
mod grammar;

pub use error::ParseError;

use crate::Expr;

/// Longest formula [`parse`] accepts, in bytes.
pub const MAX_FORMULA_LEN: usize = 4096;

/// How many parentheses, call argument lists, prefix operators and ternary
/// branches may nest inside one another.
pub const MAX_NESTING: usize = 64;

/// Deepest expression tree [`parse`] returns. Long operator chains count
/// one level per operator.
pub const MAX_DEPTH: usize = 256;

/// Parse one formula into an [`Expr`].
///
/// # Errors
///
/// Returns [`ParseError`] if the text is not a well-formed formula, or if it
/// exceeds [`MAX_FORMULA_LEN`], [`MAX_NESTING`] or [`MAX_DEPTH`].
pub fn parse(formula: &str) -> Result<Expr, ParseError> {
    use winnow::Parser;
    if formula.len() > MAX_FORMULA_LEN {
        return Err(ParseError::new(
            format!("formula longer than {MAX_FORMULA_LEN} bytes"),
            MAX_FORMULA_LEN,
        ));
    }
    let expr = grammar::formula
        .parse(formula)
        .map_err(|e| ParseError::from_winnow(&e))?;
    if expr.depth() > MAX_DEPTH {
        return Err(ParseError::new(
            format!("formula nested too deeply (expression depth over {MAX_DEPTH})"),
            0,
        ));
    }
    Ok(expr)
}
