use serde::{Deserialize, Serialize};

use super::expr::Expr;
use crate::parse::ParseError;

/// A named formula contributing one column to the output table.
///
/// `id` names the rule's value for later formulas, `label` is the column
/// header, and `formula` is the expression text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub formula: String,
}

impl Rule {
    pub fn new(id: impl Into<String>, label: impl Into<String>, formula: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            formula: formula.into(),
        }
    }
}

/// A rule whose formula text has been parsed.
///
/// A formula that fails to parse keeps its [`ParseError`]; evaluating the rule
/// then reports that error and yields `0`.
#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    pub(crate) id: String,
    pub(crate) label: String,
    pub(crate) expr: Result<Expr, ParseError>,
}
