use enclosure_calc::{call, ident, num, Expr, InputTuple, Rule, RuleList};
use proptest::prelude::*;

const HELPERS_1: &[&str] = &["INT", "CEIL", "ABS", "ROUND"];
const HELPERS_N: &[&str] = &["MAX", "MIN"];

/// Raw dimensions as a user might type them, including zero, negatives and
/// fractions.
pub fn arb_input() -> impl Strategy<Value = InputTuple> {
    (-3.0_f64..40.0, -3.0_f64..40.0, any::<bool>())
        .prop_map(|(l, w, enclosed)| InputTuple::new(l, w, enclosed))
}

/// A leaf: a small literal or one of `names`.
fn arb_leaf(names: Vec<String>) -> BoxedStrategy<Expr> {
    let literal = (0_u32..50).prop_map(|n| num(f64::from(n)));
    if names.is_empty() {
        literal.boxed()
    } else {
        prop_oneof![
            literal,
            prop::sample::select(names).prop_map(|n| ident(&n)),
        ]
        .boxed()
    }
}

/// A bounded formula tree over `names`, using every operator family.
pub fn arb_expr(names: Vec<String>, depth: u32) -> BoxedStrategy<Expr> {
    arb_leaf(names)
        .prop_recursive(depth, 24, 3, |inner| {
            prop_oneof![
                (inner.clone(), inner.clone()).prop_map(|(a, b)| a + b),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| a - b),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| a * b),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| a / b),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| a.gt(b)),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| a.and(b)),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| a.or(b)),
                (inner.clone(), inner.clone(), inner.clone())
                    .prop_map(|(c, a, b)| c.select(a, b)),
                (prop::sample::select(HELPERS_1), inner.clone())
                    .prop_map(|(h, a)| call(h, vec![a])),
                (prop::sample::select(HELPERS_N), inner.clone(), inner.clone())
                    .prop_map(|(h, a, b)| call(h, vec![a, b])),
            ]
        })
        .boxed()
}

fn base_names() -> Vec<String> {
    ["L", "W", "D"].iter().map(|s| (*s).to_owned()).collect()
}

/// Ids `r0..rN` where each formula refers only to base variables and earlier
/// ids. Labels are arbitrary text.
pub fn arb_rule_list() -> impl Strategy<Value = RuleList> {
    (1_usize..=8).prop_flat_map(|n| {
        let formulas: Vec<BoxedStrategy<String>> = (0..n)
            .map(|i| {
                let mut names = base_names();
                names.extend((0..i).map(|j| format!("r{j}")));
                arb_expr(names, 3).prop_map(|e| e.to_string()).boxed()
            })
            .collect();
        (formulas, prop::collection::vec("\\PC{0,8}", n)).prop_map(|(formulas, labels)| {
            let rules = formulas
                .into_iter()
                .zip(labels)
                .enumerate()
                .map(|(i, (formula, label))| Rule::new(format!("r{i}"), label, formula))
                .collect();
            RuleList::new(rules).expect("generated ids are unique and non-empty")
        })
    })
}
