use winnow::ascii::{digit0, digit1};
use winnow::combinator::{
    alt, cut_err, empty, not, opt, preceded, repeat, separated, terminated,
};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

use super::MAX_NESTING;
use crate::{BinaryOp, Expr, UnaryOp};

#[derive(Debug, thiserror::Error)]
#[error("formula nested too deeply (more than {} levels)", MAX_NESTING)]
struct TooDeep;

// -- Whitespace -------------------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., char::is_whitespace)
        .void()
        .parse_next(input)
}

/// One level deeper: parentheses, call arguments, prefix operators and
/// ternary branches all recurse through here.
fn descend(input: &mut &str, depth: usize) -> ModalResult<usize> {
    if depth < MAX_NESTING {
        return Ok(depth + 1);
    }
    cut_err(empty.try_map(|()| Err::<usize, _>(TooDeep))).parse_next(input)
}

// -- Atoms ------------------------------------------------------------------

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1, |c: char| c.is_ascii_alphabetic() || c == '_' || c == '$'),
        take_while(0.., |c: char| {
            c.is_ascii_alphanumeric() || c == '_' || c == '$'
        }),
    )
        .take()
        .parse_next(input)
}

fn number(input: &mut &str) -> ModalResult<f64> {
    (
        alt((
            (digit1, opt(('.', digit0))).void(),
            ('.', digit1).void(),
        )),
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
    )
        .take()
        .try_map(|s: &str| s.parse::<f64>())
        .parse_next(input)
}

fn ident_or_call(input: &mut &str, depth: usize) -> ModalResult<Expr> {
    let name = ident.parse_next(input)?;
    let checkpoint = input.checkpoint();
    ws.parse_next(input)?;
    if opt('(').parse_next(input)?.is_some() {
        let depth = descend(input, depth)?;
        let args: Vec<Expr> =
            separated(0.., |i: &mut &str| ternary(i, depth), (ws, ',')).parse_next(input)?;
        ws.parse_next(input)?;
        cut_err(')')
            .context(StrContext::Expected(StrContextValue::CharLiteral(')')))
            .parse_next(input)?;
        Ok(Expr::Call {
            name: name.to_owned(),
            args,
        })
    } else {
        input.reset(&checkpoint);
        Ok(Expr::Ident(name.to_owned()))
    }
}

fn group(input: &mut &str, depth: usize) -> ModalResult<Expr> {
    let depth = descend(input, depth)?;
    let expr = ternary(input, depth)?;
    ws.parse_next(input)?;
    ')'.parse_next(input)?;
    Ok(expr)
}

fn primary(input: &mut &str, depth: usize) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    alt((
        number.map(Expr::Number),
        preceded('(', cut_err(|i: &mut &str| group(i, depth))),
        |i: &mut &str| ident_or_call(i, depth),
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "expression",
    )))
    .parse_next(input)
}

// -- Operators --------------------------------------------------------------

// `--` and `++` are increment/decrement tokens, never two prefix operators.
fn minus(input: &mut &str) -> ModalResult<char> {
    terminated('-', not('-')).parse_next(input)
}

fn plus(input: &mut &str) -> ModalResult<char> {
    terminated('+', not('+')).parse_next(input)
}

fn unary_op(input: &mut &str) -> ModalResult<UnaryOp> {
    alt((
        minus.value(UnaryOp::Neg),
        plus.value(UnaryOp::Plus),
        '!'.value(UnaryOp::Not),
    ))
    .parse_next(input)
}

fn mul_op(input: &mut &str) -> ModalResult<BinaryOp> {
    alt(('*'.value(BinaryOp::Mul), '/'.value(BinaryOp::Div))).parse_next(input)
}

fn add_op(input: &mut &str) -> ModalResult<BinaryOp> {
    alt((plus.value(BinaryOp::Add), minus.value(BinaryOp::Sub))).parse_next(input)
}

fn relational_op(input: &mut &str) -> ModalResult<BinaryOp> {
    alt((
        "<=".value(BinaryOp::Lte),
        ">=".value(BinaryOp::Gte),
        "<".value(BinaryOp::Lt),
        ">".value(BinaryOp::Gt),
    ))
    .parse_next(input)
}

fn equality_op(input: &mut &str) -> ModalResult<BinaryOp> {
    alt((
        "===".value(BinaryOp::Eq),
        "!==".value(BinaryOp::Neq),
        "==".value(BinaryOp::Eq),
        "!=".value(BinaryOp::Neq),
    ))
    .parse_next(input)
}

// -- Expressions (precedence: ?: < || < && < equality < relational < + < * < unary)

fn unary(input: &mut &str, depth: usize) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    match opt(unary_op).parse_next(input)? {
        Some(op) => {
            let depth = descend(input, depth)?;
            let inner = cut_err(|i: &mut &str| unary(i, depth)).parse_next(input)?;
            Ok(Expr::Unary(op, Box::new(inner)))
        }
        None => primary(input, depth),
    }
}

fn fold_binary(first: Expr, rest: Vec<(BinaryOp, Expr)>) -> Expr {
    rest.into_iter().fold(first, |lhs, (op, rhs)| Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

fn term(input: &mut &str, depth: usize) -> ModalResult<Expr> {
    let first = unary(input, depth)?;
    let rest: Vec<(BinaryOp, Expr)> = repeat(
        0..,
        (
            preceded(ws, mul_op),
            cut_err(|i: &mut &str| unary(i, depth)),
        ),
    )
    .parse_next(input)?;
    Ok(fold_binary(first, rest))
}

fn additive(input: &mut &str, depth: usize) -> ModalResult<Expr> {
    let first = term(input, depth)?;
    let rest: Vec<(BinaryOp, Expr)> = repeat(
        0..,
        (
            preceded(ws, add_op),
            cut_err(|i: &mut &str| term(i, depth)),
        ),
    )
    .parse_next(input)?;
    Ok(fold_binary(first, rest))
}

fn relational(input: &mut &str, depth: usize) -> ModalResult<Expr> {
    let first = additive(input, depth)?;
    let rest: Vec<(BinaryOp, Expr)> = repeat(
        0..,
        (
            preceded(ws, relational_op),
            cut_err(|i: &mut &str| additive(i, depth)),
        ),
    )
    .parse_next(input)?;
    Ok(fold_binary(first, rest))
}

fn equality(input: &mut &str, depth: usize) -> ModalResult<Expr> {
    let first = relational(input, depth)?;
    let rest: Vec<(BinaryOp, Expr)> = repeat(
        0..,
        (
            preceded(ws, equality_op),
            cut_err(|i: &mut &str| relational(i, depth)),
        ),
    )
    .parse_next(input)?;
    Ok(fold_binary(first, rest))
}

fn and_expr(input: &mut &str, depth: usize) -> ModalResult<Expr> {
    let first = equality(input, depth)?;
    let rest: Vec<Expr> = repeat(
        0..,
        preceded((ws, "&&"), cut_err(|i: &mut &str| equality(i, depth))),
    )
    .parse_next(input)?;
    Ok(rest
        .into_iter()
        .fold(first, |acc, r| Expr::And(Box::new(acc), Box::new(r))))
}

fn or_expr(input: &mut &str, depth: usize) -> ModalResult<Expr> {
    let first = and_expr(input, depth)?;
    let rest: Vec<Expr> = repeat(
        0..,
        preceded((ws, "||"), cut_err(|i: &mut &str| and_expr(i, depth))),
    )
    .parse_next(input)?;
    Ok(rest
        .into_iter()
        .fold(first, |acc, r| Expr::Or(Box::new(acc), Box::new(r))))
}

fn ternary(input: &mut &str, depth: usize) -> ModalResult<Expr> {
    let cond = or_expr(input, depth)?;
    let checkpoint = input.checkpoint();
    ws.parse_next(input)?;
    if opt('?').parse_next(input)?.is_none() {
        input.reset(&checkpoint);
        return Ok(cond);
    }
    let depth = descend(input, depth)?;
    let then = cut_err(|i: &mut &str| ternary(i, depth)).parse_next(input)?;
    ws.parse_next(input)?;
    cut_err(':')
        .context(StrContext::Expected(StrContextValue::CharLiteral(':')))
        .parse_next(input)?;
    let otherwise = cut_err(|i: &mut &str| ternary(i, depth)).parse_next(input)?;
    Ok(cond.select(then, otherwise))
}

// -- Top-level parser -------------------------------------------------------

pub fn formula(input: &mut &str) -> ModalResult<Expr> {
    let expr = ternary(input, 0)?;
    ws.parse_next(input)?;
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use crate::parse::{parse, MAX_DEPTH, MAX_FORMULA_LEN};
    use crate::{call, ident, num};

    use super::*;

    #[test]
    fn parse_number_literals() {
        let cases = [
            ("42", 42.0),
            ("3.5", 3.5),
            ("2.", 2.0),
            (".25", 0.25),
            ("1e3", 1000.0),
            ("1.5E-1", 0.15),
        ];
        for (text, expected) in cases {
            assert_eq!(parse(text).unwrap(), Expr::Number(expected), "failed for {text}");
        }
    }

    #[test]
    fn parse_identifier() {
        assert_eq!(parse("midPole").unwrap(), ident("midPole"));
        assert_eq!(parse("$total_2").unwrap(), ident("$total_2"));
    }

    #[test]
    fn parse_multiplication_binds_tighter() {
        let expr = parse("L + W * 2").unwrap();
        assert_eq!(expr, ident("L") + ident("W") * num(2.0));
    }

    #[test]
    fn parse_left_associative_subtraction() {
        let expr = parse("10 - 4 - 3").unwrap();
        assert_eq!(expr, (num(10.0) - num(4.0)) - num(3.0));
    }

    #[test]
    fn parse_parenthesized_grouping() {
        let expr = parse("(L+W)*2-2").unwrap();
        assert_eq!(expr, (ident("L") + ident("W")) * num(2.0) - num(2.0));
    }

    #[test]
    fn parse_ternary() {
        let expr = parse("D ? 4 : 2").unwrap();
        assert_eq!(expr, ident("D").select(num(4.0), num(2.0)));
    }

    #[test]
    fn parse_ternary_is_right_associative() {
        let expr = parse("a ? 1 : b ? 2 : 3").unwrap();
        assert_eq!(
            expr,
            ident("a").select(num(1.0), ident("b").select(num(2.0), num(3.0)))
        );
    }

    #[test]
    fn parse_comparison_inside_ternary() {
        let expr = parse("L>3 ? INT((L-1)/2)*2 : 0").unwrap();
        let expected = ident("L").gt(num(3.0)).select(
            call("INT", vec![(ident("L") - num(1.0)) / num(2.0)]) * num(2.0),
            num(0.0),
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn parse_call_arguments() {
        assert_eq!(
            parse("MAX(L, W)").unwrap(),
            call("MAX", vec![ident("L"), ident("W")])
        );
        assert_eq!(parse("MIN()").unwrap(), call("MIN", vec![]));
        assert_eq!(
            parse("ROUND ( 2.5 )").unwrap(),
            call("ROUND", vec![num(2.5)])
        );
    }

    #[test]
    fn parse_all_comparison_ops() {
        let ops = [
            ("==", BinaryOp::Eq),
            ("===", BinaryOp::Eq),
            ("!=", BinaryOp::Neq),
            ("!==", BinaryOp::Neq),
            (">", BinaryOp::Gt),
            (">=", BinaryOp::Gte),
            ("<", BinaryOp::Lt),
            ("<=", BinaryOp::Lte),
        ];
        for (sym, expected_op) in ops {
            match parse(&format!("L {sym} 1")).unwrap() {
                Expr::Binary { op, .. } => assert_eq!(op, expected_op, "failed for {sym}"),
                other => panic!("expected Binary for {sym}, got {other:?}"),
            }
        }
    }

    #[test]
    fn parse_logical_precedence() {
        let expr = parse("a || b && c").unwrap();
        assert_eq!(expr, ident("a").or(ident("b").and(ident("c"))));
    }

    #[test]
    fn parse_unary_operators() {
        assert_eq!(parse("-L").unwrap(), -ident("L"));
        assert_eq!(parse("!D").unwrap(), !ident("D"));
        assert_eq!(parse("- -1").unwrap(), -(-num(1.0)));
        assert_eq!(
            parse("+W").unwrap(),
            Expr::Unary(UnaryOp::Plus, Box::new(ident("W")))
        );
    }

    #[test]
    fn parse_rejects_increment_tokens() {
        for bad in ["--1", "++1", "1--1", "L++W", "- --1"] {
            assert!(parse(bad).is_err(), "expected error for {bad:?}");
        }
        assert_eq!(parse("1 - -1").unwrap(), num(1.0) - (-num(1.0)));
        assert_eq!(
            parse("+-1").unwrap(),
            Expr::Unary(UnaryOp::Plus, Box::new(-num(1.0)))
        );
    }

    #[test]
    fn parse_accepts_nesting_up_to_the_limit() {
        let text = format!("{}1{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert_eq!(parse(&text).unwrap(), num(1.0));
    }

    #[test]
    fn nesting_limit_covers_every_recursive_form() {
        let over = MAX_NESTING + 1;
        let cases = [
            format!("{}1{}", "(".repeat(over), ")".repeat(over)),
            format!("{}1", "- ".repeat(over)),
            format!("{}1", "!".repeat(over)),
            format!("{}1{}", "INT(".repeat(over), ")".repeat(over)),
            format!("{}1{}", "D ? ".repeat(over), " : 0".repeat(over)),
        ];
        for text in &cases {
            let err = parse(text).unwrap_err();
            assert!(err.message().contains("nested too deeply"), "{err} for {text}");
        }
    }

    #[test]
    fn long_operator_chain_is_bounded() {
        let ok = format!("{}1", "L*".repeat(MAX_DEPTH - 1));
        assert_eq!(parse(&ok).unwrap().depth(), MAX_DEPTH);

        let err = parse(&format!("{}1", "1+".repeat(MAX_DEPTH))).unwrap_err();
        assert!(err.message().contains("nested too deeply"), "{err}");
    }

    #[test]
    fn overlong_formula_is_rejected() {
        let err = parse(&"1".repeat(MAX_FORMULA_LEN + 1)).unwrap_err();
        assert_eq!(err.offset(), MAX_FORMULA_LEN);
        assert!(parse(&"1".repeat(MAX_FORMULA_LEN)).is_ok());
    }

    #[test]
    fn parse_surrounding_whitespace() {
        assert_eq!(parse("  \t1 \n").unwrap(), num(1.0));
    }

    #[test]
    fn parse_rejects_malformed_input() {
        for bad in [
            "", "   ", "1 +", "(1", "1)", "D ? 4", "D ? 4 2", "MAX(1,", "MAX(1,)", "1 = 2",
            "L W", "2e", "a & b", "长*2", "1..2",
        ] {
            assert!(parse(bad).is_err(), "expected error for {bad:?}");
        }
    }

    #[test]
    fn parse_default_template_formula() {
        let text = "(L>3 ? INT((L-1)/2)*2 : 0) + (W>3 ? INT((W-1)/2)*2 : 0) - (D ? 0 : INT((MAX(L,W)-1)/2))";
        let expr = parse(text).unwrap();
        assert_eq!(expr.identifiers(), vec!["L", "INT", "W", "D", "MAX"]);
    }
}
