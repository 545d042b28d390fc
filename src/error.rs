use thiserror::Error;

/// Errors surfaced to callers of rule-list and export operations.
///
/// Formula-level failures never appear here; they are recorded as
/// [`RuleWarning`](crate::RuleWarning)s and the rule's value becomes `0`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid rule set: {reason}")]
    InvalidRuleSet { reason: String },

    #[error("duplicate rule id '{id}'")]
    DuplicateRuleId { id: String },

    #[error("no rule with id '{id}'")]
    RuleNotFound { id: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Error::InvalidRuleSet {
            reason: reason.into(),
        }
    }
}
