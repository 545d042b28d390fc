use std::fmt;

use super::error::FormulaError;
use super::record::ResultRecord;

/// A rule whose formula failed during a pass and was recorded as `0`.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleWarning {
    pub rule_id: String,
    pub label: String,
    pub error: FormulaError,
}

impl fmt::Display for RuleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.rule_id, self.label, self.error)
    }
}

/// Outcome of one evaluation pass: the full result record plus a warning for
/// every rule that fell back to `0`.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct EvaluationReport {
    record: ResultRecord,
    warnings: Vec<RuleWarning>,
}

impl EvaluationReport {
    pub(crate) fn new(record: ResultRecord, warnings: Vec<RuleWarning>) -> Self {
        Self { record, warnings }
    }

    #[must_use]
    pub fn record(&self) -> &ResultRecord {
        &self.record
    }

    /// Failed rules, in rule order.
    #[must_use]
    pub fn warnings(&self) -> &[RuleWarning] {
        &self.warnings
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    #[must_use]
    pub fn into_parts(self) -> (ResultRecord, Vec<RuleWarning>) {
        (self.record, self.warnings)
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rules evaluated", self.record.len())?;
        if !self.warnings.is_empty() {
            let failed: Vec<&str> = self.warnings.iter().map(|w| w.rule_id.as_str()).collect();
            write!(f, ", failed: [{}]", failed.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuntimeError;

    fn report() -> EvaluationReport {
        let mut record = ResultRecord::with_capacity(2);
        record.push("pole1", 4.0);
        record.push("bad", 0.0);
        EvaluationReport::new(
            record,
            vec![RuleWarning {
                rule_id: "bad".into(),
                label: "Broken".into(),
                error: RuntimeError::DivisionByZero.into(),
            }],
        )
    }

    #[test]
    fn report_accessors() {
        let report = report();
        assert_eq!(report.record().get("pole1"), Some(4.0));
        assert_eq!(report.warnings().len(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn report_display() {
        assert_eq!(report().to_string(), "2 rules evaluated, failed: [bad]");
    }

    #[test]
    fn warning_display() {
        let report = report();
        assert_eq!(
            report.warnings()[0].to_string(),
            "bad (Broken): runtime error: division by zero"
        );
    }
}
