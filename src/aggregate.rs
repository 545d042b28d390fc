use crate::{Item, ResultRecord, Rule, Totals};

/// Sum each rule's value across `items`, in rule order.
///
/// A missing entry counts as `0`. The result is always re-derived from the
/// items passed in.
#[must_use]
pub fn aggregate<'a>(items: impl IntoIterator<Item = &'a Item>, rules: &[Rule]) -> Totals {
    let mut sums = vec![0.0; rules.len()];
    for item in items {
        for (sum, rule) in sums.iter_mut().zip(rules) {
            *sum += item.results().value_or_zero(&rule.id);
        }
    }

    let mut totals = ResultRecord::with_capacity(rules.len());
    for (rule, sum) in rules.iter().zip(sums) {
        totals.push(&rule.id, sum);
    }
    totals
}
