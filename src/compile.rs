use std::collections::HashSet;

use crate::types::is_valid_identifier;
use crate::{CompiledRule, Helper, LintFinding, LintKind, Rule, RuleSet};

const BASE_VARIABLES: [&str; 3] = ["L", "W", "D"];

pub(crate) fn compile(rules: &[Rule]) -> RuleSet {
    let compiled = rules
        .iter()
        .map(|rule| CompiledRule {
            id: rule.id.clone(),
            label: rule.label.clone(),
            expr: crate::parse::parse(&rule.formula),
        })
        .collect();
    RuleSet { rules: compiled }
}

/// Walk the rules in order, tracking which names are bound at each step.
pub(crate) fn lint(rules: &[CompiledRule]) -> Vec<LintFinding> {
    let mut visible: HashSet<&str> = BASE_VARIABLES.into_iter().collect();

    let mut findings = Vec::new();
    for (idx, rule) in rules.iter().enumerate() {
        if let Ok(expr) = &rule.expr {
            for name in expr.identifiers() {
                if visible.contains(name) || Helper::from_name(name).is_some() {
                    continue;
                }
                let kind = if name == rule.id {
                    LintKind::SelfReference
                } else if rules[idx + 1..].iter().any(|later| later.id == name) {
                    LintKind::Forward
                } else {
                    LintKind::Unknown
                };
                findings.push(LintFinding {
                    rule_id: rule.id.clone(),
                    reference: name.to_owned(),
                    kind,
                });
            }
        }
        if is_valid_identifier(&rule.id) {
            visible.insert(rule.id.as_str());
        }
    }
    findings
}
