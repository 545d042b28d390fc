use std::fmt;

use serde::Serialize;

use super::evaluation_report::{EvaluationReport, RuleWarning};
use super::input::InputTuple;
use super::record::ResultRecord;

/// Identifier assigned to an item when it joins a worksheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(pub(crate) u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One enclosure entry: its label, normalized inputs and latest results.
#[derive(Debug, Clone, Serialize)]
pub struct Item {
    id: ItemId,
    label: String,
    input: InputTuple,
    results: ResultRecord,
    #[serde(skip)]
    warnings: Vec<RuleWarning>,
}

impl Item {
    pub(crate) fn new(
        id: ItemId,
        label: impl Into<String>,
        input: InputTuple,
        report: EvaluationReport,
    ) -> Self {
        let (results, warnings) = report.into_parts();
        Self {
            id,
            label: label.into(),
            input,
            results,
            warnings,
        }
    }

    /// Swap in a fresh evaluation, keeping identity and inputs.
    pub(crate) fn apply(&mut self, report: EvaluationReport) {
        let (results, warnings) = report.into_parts();
        self.results = results;
        self.warnings = warnings;
    }

    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn input(&self) -> &InputTuple {
        &self.input
    }

    #[must_use]
    pub fn results(&self) -> &ResultRecord {
        &self.results
    }

    /// Formula failures from the latest evaluation of this item.
    #[must_use]
    pub fn warnings(&self) -> &[RuleWarning] {
        &self.warnings
    }
}
