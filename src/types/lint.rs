use std::fmt;

/// Why a reference in a formula will not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintKind {
    /// Not a base variable, helper, or rule id.
    Unknown,
    /// The id of a later rule; its value is not yet computed.
    Forward,
    /// The rule's own id.
    SelfReference,
}

/// One unresolvable reference found by [`RuleSet::lint()`](super::RuleSet::lint).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintFinding {
    pub rule_id: String,
    pub reference: String,
    pub kind: LintKind,
}

impl fmt::Display for LintFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let why = match self.kind {
            LintKind::Unknown => "is not defined",
            LintKind::Forward => "is defined by a later rule",
            LintKind::SelfReference => "refers to the rule itself",
        };
        write!(f, "{}: '{}' {why}", self.rule_id, self.reference)
    }
}
