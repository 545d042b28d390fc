use std::fmt;

use super::evaluation_report::EvaluationReport;
use super::input::InputTuple;
use super::lint::LintFinding;
use super::record::ResultRecord;
use super::rule::CompiledRule;
use crate::parse::ParseError;

/// A compiled, immutable rule set. Thread-safe and designed to live behind `Arc`.
///
/// Produced by [`RuleList::compile()`](super::RuleList::compile). Each formula
/// is parsed once here, so evaluating many items costs no further parsing.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub(crate) rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// Run one evaluation pass for `input`.
    ///
    /// Rules are evaluated strictly in order. A failing formula is logged,
    /// recorded as a warning and stored as `0`; the pass always completes.
    pub fn evaluate(&self, input: &InputTuple) -> EvaluationReport {
        crate::evaluate::evaluate(&self.rules, input)
    }

    /// Like [`evaluate()`](Self::evaluate), keeping only the result record.
    #[must_use]
    pub fn evaluate_record(&self, input: &InputTuple) -> ResultRecord {
        self.evaluate(input).into_parts().0
    }

    /// Rule ids in evaluation order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules whose formula failed to parse, in rule order.
    #[must_use]
    pub fn syntax_errors(&self) -> Vec<(&str, &ParseError)> {
        self.rules
            .iter()
            .filter_map(|r| r.expr.as_ref().err().map(|e| (r.id.as_str(), e)))
            .collect()
    }

    /// Names a rule's formula refers to, in first-seen order.
    ///
    /// Returns `None` if the rule does not exist, and an empty list if its
    /// formula does not parse.
    #[must_use]
    pub fn dependencies_of(&self, rule_id: &str) -> Option<Vec<&str>> {
        self.rules
            .iter()
            .find(|r| r.id == rule_id)
            .map(|r| match &r.expr {
                Ok(expr) => expr.identifiers(),
                Err(_) => Vec::new(),
            })
    }

    /// References that cannot resolve when the rules run in order.
    #[must_use]
    pub fn lint(&self) -> Vec<LintFinding> {
        crate::compile::lint(&self.rules)
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RuleSet({} rules, {} with syntax errors)",
            self.rules.len(),
            self.syntax_errors().len(),
        )
    }
}
