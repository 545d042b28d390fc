use std::fmt;

use winnow::error::ContextError;

/// A formula that is not well-formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    message: String,
    offset: usize,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }

    pub(crate) fn from_winnow(err: &winnow::error::ParseError<&str, ContextError>) -> Self {
        let inner = err.inner();
        let detail = match inner.cause() {
            Some(cause) => cause.to_string(),
            None => inner.to_string().replace('\n', "; "),
        };
        let message = if detail.is_empty() {
            "unexpected input".to_owned()
        } else {
            detail
        };
        Self::new(message, err.offset())
    }

    /// Byte offset into the formula where parsing stopped.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "syntax error at offset {}: {}", self.offset, self.message)
    }
}

impl std::error::Error for ParseError {}
