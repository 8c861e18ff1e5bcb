use anyhow::Result;
use biparse::error::ShowError;
use biparse::fold::as_int;
use biparse::infix::{infixl, infixr, InfixOp, InfixPattern};
use biparse::lexical::digit;
use biparse::pattern::{Pattern, PatternExt};
use biparse::surd::Repeat;
use biparse::trie::TriePattern;
use rstest::rstest;

fn arith_ops() -> TriePattern<char, InfixOp<i64>> {
    let ops: TriePattern<char, InfixOp<i64>> = TriePattern::new();
    ops.register_op(InfixOp::new("+", infixl(1), |a, b| a + b));
    ops.register_op(InfixOp::new("-", infixl(1), |a, b| a - b));
    ops.register_op(InfixOp::new("*", infixl(2), |a, b| a * b));
    ops.register_op(InfixOp::new("/", infixl(2), |a, b| a / b));
    ops.register_op(InfixOp::new("^", infixr(3), |a: i64, b: i64| a.pow(b as u32)));
    ops
}

fn arith() -> impl Pattern<In = char, Out = i64> {
    InfixPattern::new(Repeat::new(as_int(10), digit()), arith_ops())
}

/// Builds the bracketed form, to see the association.
fn tree() -> impl Pattern<In = char, Out = String> {
    let ops: TriePattern<char, InfixOp<String>> = TriePattern::new();
    for (name, prec) in [("+", infixl(1)), ("*", infixl(2)), ("^", infixr(3))] {
        ops.register_op(InfixOp::new(name, prec, move |a: String, b: String| {
            format!("({}{}{})", a, name, b)
        }));
    }
    InfixPattern::new(digit().convert_forward(|d| d.to_string()), ops)
}

#[rstest]
#[case("1+2*3", 7)]
#[case("2*3+1", 7)]
#[case("1-2*3+4", -1)]
#[case("8-3-2", 3)]
#[case("2^3^2", 512)]
#[case("2*3^2+1", 19)]
#[case("100/10/5", 2)]
#[case("42", 42)]
fn evaluates(#[case] text: &str, #[case] value: i64) -> Result<()> {
    assert_eq!(arith().read_str(text)?, Some(value));
    Ok(())
}

#[rstest]
#[case("1+2*3", "(1+(2*3))")]
#[case("1*2+3", "((1*2)+3)")]
#[case("1+2+3", "((1+2)+3)")]
#[case("2^3^2", "(2^(3^2))")]
#[case("1+2*3^4*5+6", "((1+((2*(3^4))*5))+6)")]
fn associates(#[case] text: &str, #[case] shape: &str) -> Result<()> {
    assert_eq!(tree().read_str(text)?, Some(shape.to_string()));
    Ok(())
}

#[test]
fn missing_operand() -> Result<()> {
    let e = arith().read_str("1+").unwrap_err();
    assert!(e.to_string().ends_with("infix 1 parse failed at +"), "{}", e);

    let (errors, value) = arith().read_partial_str("1+*")?;
    assert_eq!(value, None);
    assert_eq!(errors.len(), 1);

    let rescued = InfixPattern::new(Repeat::new(as_int(10), digit()), arith_ops())
        .rescue(|_, lhs, _| Ok(Some(*lhs)));
    assert_eq!(rescued.read_str("3*")?, Some(9));
    Ok(())
}

#[test]
fn show_unsupported() {
    assert_eq!(arith().show_string(&7), Err(ShowError::Unsupported("infix show")));
}

#[test]
fn operators() {
    let plus = InfixOp::new("+", infixl(1), |a: i64, b| a + b);
    assert_eq!(plus.apply(2, 3), 5);
    assert_eq!(plus.to_string(), "+");
    assert_eq!(plus.clone(), plus);
    assert_ne!(plus, InfixOp::new("+", infixl(2), |a: i64, b| a + b));
    let ops = arith_ops();
    assert_eq!(ops.get_str("^").map(|op| op.precedence), Some(infixr(3)));
}
