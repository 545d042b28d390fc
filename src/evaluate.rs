use tracing::warn;

use crate::types::Binding;
use crate::{
    BinaryOp, CompiledRule, Context, EvaluationReport, Expr, FormulaError, InputTuple,
    ResultRecord, RuleWarning, RuntimeError, UnaryOp, Value,
};

pub(crate) fn evaluate(rules: &[CompiledRule], input: &InputTuple) -> EvaluationReport {
    let mut ctx = Context::for_input(input);
    let mut record = ResultRecord::with_capacity(rules.len());
    let mut warnings = Vec::new();

    for rule in rules {
        let outcome = match &rule.expr {
            Ok(expr) => eval_formula(expr, &ctx),
            Err(e) => Err(FormulaError::Syntax(e.clone())),
        };
        let value = match outcome {
            Ok(v) => clamp_negative(v),
            Err(error) => {
                warn!(rule = %rule.id, label = %rule.label, %error, "formula failed; using 0");
                warnings.push(RuleWarning {
                    rule_id: rule.id.clone(),
                    label: rule.label.clone(),
                    error,
                });
                0.0
            }
        };
        record.push(&rule.id, value);
        ctx = ctx.with_result(&rule.id, value);
    }

    EvaluationReport::new(record, warnings)
}

/// Negative results (and `-0`) are stored as `0`.
fn clamp_negative(value: f64) -> f64 {
    if value <= 0.0 {
        0.0
    } else {
        value
    }
}

/// Parse and evaluate one formula against `ctx`.
///
/// # Errors
///
/// [`FormulaError::Syntax`] if the text does not parse, otherwise as
/// [`eval_formula()`].
pub fn evaluate_formula(formula: &str, ctx: &Context) -> Result<f64, FormulaError> {
    let expr = crate::parse::parse(formula)?;
    eval_formula(&expr, ctx)
}

/// Evaluate a parsed formula to its final number.
///
/// Evaluation recurses once per tree level. Trees from [`parse`](crate::parse::parse)
/// are at most [`MAX_DEPTH`](crate::parse::MAX_DEPTH) deep; hand-built trees
/// should stay within the same bound.
///
/// # Errors
///
/// Any [`FormulaError`] raised during evaluation, plus
/// [`RuntimeError::NonNumeric`] for a boolean result and
/// [`RuntimeError::NonFinite`] for NaN or infinity.
pub fn eval_formula(expr: &Expr, ctx: &Context) -> Result<f64, FormulaError> {
    match eval_expr(expr, ctx)? {
        Value::Number(n) if n.is_finite() => Ok(n),
        Value::Number(n) => Err(RuntimeError::NonFinite { value: n }.into()),
        Value::Bool(_) => Err(RuntimeError::NonNumeric.into()),
    }
}

fn eval_expr(expr: &Expr, ctx: &Context) -> Result<Value, FormulaError> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Ident(name) => match ctx.get(name) {
            Some(Binding::Number(n)) => Ok(Value::Number(n)),
            Some(Binding::Helper(_)) => {
                Err(RuntimeError::HelperAsValue { name: name.clone() }.into())
            }
            None => Err(FormulaError::Reference { name: name.clone() }),
        },
        Expr::Unary(op, inner) => {
            let v = eval_expr(inner, ctx)?;
            Ok(match op {
                UnaryOp::Neg => Value::Number(-v.to_number()),
                UnaryOp::Plus => Value::Number(v.to_number()),
                UnaryOp::Not => Value::Bool(!v.is_truthy()),
            })
        }
        Expr::Binary { op, lhs, rhs } => {
            let a = eval_expr(lhs, ctx)?;
            let b = eval_expr(rhs, ctx)?;
            eval_binary(*op, a, b)
        }
        Expr::And(a, b) => {
            let left = eval_expr(a, ctx)?;
            if left.is_truthy() {
                eval_expr(b, ctx)
            } else {
                Ok(left)
            }
        }
        Expr::Or(a, b) => {
            let left = eval_expr(a, ctx)?;
            if left.is_truthy() {
                Ok(left)
            } else {
                eval_expr(b, ctx)
            }
        }
        Expr::Conditional {
            cond,
            then,
            otherwise,
        } => {
            if eval_expr(cond, ctx)?.is_truthy() {
                eval_expr(then, ctx)
            } else {
                eval_expr(otherwise, ctx)
            }
        }
        Expr::Call { name, args } => match ctx.get(name) {
            Some(Binding::Helper(helper)) => {
                let values = args
                    .iter()
                    .map(|arg| eval_expr(arg, ctx).map(Value::to_number))
                    .collect::<Result<Vec<f64>, _>>()?;
                Ok(Value::Number(helper.apply(&values)?))
            }
            Some(Binding::Number(_)) => {
                Err(RuntimeError::NotAFunction { name: name.clone() }.into())
            }
            None => Err(FormulaError::Reference { name: name.clone() }),
        },
    }
}

fn eval_binary(op: BinaryOp, a: Value, b: Value) -> Result<Value, FormulaError> {
    let (x, y) = (a.to_number(), b.to_number());
    let n = match op {
        BinaryOp::Add => x + y,
        BinaryOp::Sub => x - y,
        BinaryOp::Mul => x * y,
        BinaryOp::Div if y == 0.0 => return Err(RuntimeError::DivisionByZero.into()),
        BinaryOp::Div => x / y,
        BinaryOp::Eq
        | BinaryOp::Neq
        | BinaryOp::Gt
        | BinaryOp::Gte
        | BinaryOp::Lt
        | BinaryOp::Lte => return Ok(Value::Bool(a.compare(op, b))),
    };
    Ok(Value::Number(n))
}
