use std::fmt;

use super::error::RuntimeError;

/// The fixed helper functions every formula can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Helper {
    Max,
    Min,
    /// Floor.
    Int,
    Ceil,
    Abs,
    /// Halves round toward positive infinity.
    Round,
}

impl Helper {
    pub const ALL: [Helper; 6] = [
        Helper::Max,
        Helper::Min,
        Helper::Int,
        Helper::Ceil,
        Helper::Abs,
        Helper::Round,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Helper::Max => "MAX",
            Helper::Min => "MIN",
            Helper::Int => "INT",
            Helper::Ceil => "CEIL",
            Helper::Abs => "ABS",
            Helper::Round => "ROUND",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.name() == name)
    }

    /// Apply the helper to already-evaluated arguments.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Arity`] when the argument count is wrong:
    /// `MAX`/`MIN` need at least one, the rest exactly one.
    pub fn apply(self, args: &[f64]) -> Result<f64, RuntimeError> {
        match self {
            Helper::Max => self.fold(args, f64::max),
            Helper::Min => self.fold(args, f64::min),
            Helper::Int => self.unary(args).map(f64::floor),
            Helper::Ceil => self.unary(args).map(f64::ceil),
            Helper::Abs => self.unary(args).map(f64::abs),
            Helper::Round => self.unary(args).map(round_half_up),
        }
    }

    fn unary(self, args: &[f64]) -> Result<f64, RuntimeError> {
        match args {
            [x] => Ok(*x),
            _ => Err(self.arity_error("1", args.len())),
        }
    }

    fn fold(self, args: &[f64], pick: fn(f64, f64) -> f64) -> Result<f64, RuntimeError> {
        let (first, rest) = args
            .split_first()
            .ok_or_else(|| self.arity_error("at least 1", 0))?;
        if args.iter().any(|x| x.is_nan()) {
            return Ok(f64::NAN);
        }
        Ok(rest.iter().copied().fold(*first, pick))
    }

    fn arity_error(self, expected: &'static str, found: usize) -> RuntimeError {
        RuntimeError::Arity {
            helper: self.name(),
            expected,
            found,
        }
    }
}

fn round_half_up(x: f64) -> f64 {
    let floor = x.floor();
    if x - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

impl fmt::Display for Helper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
