mod aggregate;
mod compile;
pub mod defaults;
mod error;
mod evaluate;
mod export;
pub mod parse;
mod types;
mod worksheet;

pub use aggregate::aggregate;
pub use defaults::DEFAULT_RULES;
pub use error::Error;
pub use evaluate::{eval_formula, evaluate_formula};
pub use export::{ColumnLabels, Table, format_number};
pub(crate) use types::CompiledRule;
pub use types::{
    BinaryOp, Binding, Context, EvaluationReport, Expr, FormulaError, Helper, InputTuple, Item,
    ItemId, LintFinding, LintKind, ResultRecord, Rule, RuleList, RuleSet, RuleWarning,
    RuntimeError, Totals, UnaryOp, Value, call, ident, is_valid_identifier, num,
};
pub use worksheet::Worksheet;
