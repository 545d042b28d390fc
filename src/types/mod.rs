mod context;
mod error;
mod evaluation_report;
mod expr;
mod helper;
mod input;
mod item;
mod lint;
mod record;
mod rule;
mod rule_list;
mod ruleset;
mod value;

pub use context::{Binding, Context, is_valid_identifier};
pub use error::{FormulaError, RuntimeError};
pub use evaluation_report::{EvaluationReport, RuleWarning};
pub use expr::{BinaryOp, Expr, UnaryOp, call, ident, num};
pub use helper::Helper;
pub use input::InputTuple;
pub use item::{Item, ItemId};
pub use lint::{LintFinding, LintKind};
pub use record::{ResultRecord, Totals};
pub(crate) use rule::CompiledRule;
pub use rule::Rule;
pub use rule_list::RuleList;
pub use ruleset::RuleSet;
pub use value::Value;
