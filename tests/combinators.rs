use anyhow::Result;
use biparse::atom::{always, any_item, element_in, element_in_range, item, never, peek,
                    satisfy, MapPattern, StickyEnd};
use biparse::ccdp::{Contextual, Deferred};
use biparse::error::{ParseError, Redefined, RoundTripError, ShowError};
use biparse::fold::{as_big_int, as_count, as_double, as_int, as_list, as_string, fold_all,
                    join_fold};
use biparse::input::input_of_str;
use biparse::lexical::{digit, string_for, until};
use biparse::pattern::{test_peek, DynPattern, Pattern, PatternExt};
use biparse::recover::unexpected;
use biparse::sjit::JoinBy;
use biparse::surd::{Decide, Repeat, Seq, Until};
use num::BigInt;
use rstest::rstest;
use std::cell::Cell;
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::rc::Rc;

#[test]
fn atoms() -> Result<()> {
    let ident = element_in_range('a'..='z') | item('_');
    assert!(ident.test_item('_')?);
    assert!(!ident.test_item('-')?);
    assert!(!(!item(' ')).test_item(' ')?);
    let consonant = element_in_range('a'..='z') & !element_in(['a', 'e', 'i', 'o', 'u']);
    assert!(consonant.test_item('k')?);
    assert!(!consonant.test_item('e')?);
    let even = satisfy("even", |n: &i32| n % 2 == 0);
    assert_eq!(even.read_items(vec![4, 1])?, Some(4));
    assert_eq!(even.description(), "(even)");
    assert_eq!(always::<char, _>(7).read_str("x")?, Some(7));
    assert_eq!(never::<char, u8>().read_str("x")?, None);
    Ok(())
}

#[test]
fn lookahead_and_end() -> Result<()> {
    assert_eq!((peek(item('a')), any_item()).read_str("a")?, Some(('a', 'a')));
    let last = (any_item(), StickyEnd::new(any_item(), true));
    assert_eq!(last.read_str("x")?, Some(('x', true)));
    assert_eq!(last.read_str("xy")?, None);
    let or_false = (any_item(), StickyEnd::new(any_item(), true).on_fail(|_| Ok(Some(false))));
    assert_eq!(or_false.read_str("xy")?, Some(('x', false)));
    Ok(())
}

#[test]
fn map_pattern() -> Result<()> {
    let bools = Repeat::new(as_list(), MapPattern::new(HashMap::from([('t', true), ('f', false)])));
    assert_eq!(bools.read_str("tft")?, Some(vec![true, false, true]));
    assert_eq!(bools.rebuild_str("ff")?, Some("ff".into()));

    let yes = MapPattern::new([('y', true), ('Y', true), ('j', true), ('n', false)]);
    assert_eq!(yes.read_str("j")?, Some(true));
    assert_eq!(yes.show_string(&true)?, "y");
    assert_eq!(yes.rebuild_str("Y")?, Some("y".into()));
    Ok(())
}

#[test]
fn sequences() -> Result<()> {
    let pair = (item('a'), any_item());
    assert_eq!(pair.read_str("ax")?, Some(('a', 'x')));
    assert_eq!(pair.read_str("bx")?, None);
    assert_eq!(pair.show_string(&('a', 'y'))?, "ay");

    let ab = Seq(vec![item('a'), item('b')]);
    assert_eq!(ab.read_str("ab")?, Some(vec!['a', 'b']));
    assert_eq!(ab.show_string(&vec!['a']),
               Err(ShowError::TupleSize { expected: 2, got: 1 }));
    Ok(())
}

fn count_a(text: &str, range: RangeInclusive<usize>, greedy: bool)
           -> Result<(Option<usize>, String)> {
    let p = Repeat::new(as_count(), item('a')).in_bounds(range, greedy);
    let mut input = input_of_str(text, "t")?;
    let n = p.read(&mut input)?;
    let rest = Repeat::new(as_string(), any_item()).many().read(&mut input)?;
    Ok((n, rest.unwrap_or_default()))
}

#[rstest]
#[case("aaaa", 2..=3, true, Some(3), "a")]
#[case("aaaa", 2..=3, false, Some(2), "aa")]
#[case("a", 2..=3, true, None, "")]
#[case("aab", 0..=5, true, Some(2), "b")]
#[case("b", 0..=5, false, Some(0), "b")]
fn repeat_bounds(#[case] text: &str,
                 #[case] range: RangeInclusive<usize>,
                 #[case] greedy: bool,
                 #[case] count: Option<usize>,
                 #[case] rest: &str) -> Result<()> {
    assert_eq!(count_a(text, range, greedy)?, (count, rest.to_string()));
    Ok(())
}

#[test]
fn repeat_show() -> Result<()> {
    let aa = Repeat::new(as_list(), item('a')).in_bounds(2..=3, true);
    assert_eq!(aa.show_string(&vec!['a']),
               Err(ShowError::RepeatCount { count: 1, min: 2, max: 3 }));
    assert_eq!(aa.show_string(&vec!['a', 'a'])?, "aa");

    let many = Repeat::new(as_string(), item('a')).many();
    assert_eq!(many.default_value(), Some(&String::new()));
    assert_eq!(many.read_str("b")?, Some("".into()));
    assert!(matches!(Repeat::new(as_count(), item('a')).show_string(&2),
                     Err(ShowError::Unsupported(_))));
    Ok(())
}

#[test]
fn decide_first_case_wins() -> Result<()> {
    let letter = Decide::new()
        .case(element_in_range('a'..='z'))
        .case(item('a'));
    assert_eq!(letter.read_str("a")?, Some((0, 'a')));
    assert_eq!(letter.read_str("?")?, None);
    assert_eq!(letter.show_string(&(1, 'a'))?, "a");
    assert_eq!(letter.show_string(&(5, 'a')),
               Err(ShowError::BadCase { index: 5, cases: 2 }));
    Ok(())
}

#[test]
fn until_terminator() -> Result<()> {
    let field = Until::new(item(';'), as_string(), any_item());
    let mut input = input_of_str("abc;d", "t")?;
    assert_eq!(field.read(&mut input)?, Some("abc".into()));
    assert_eq!(item(';').read(&mut input)?, Some(';'));
    // No terminator: runs into the end.
    assert_eq!(field.read_str("abc")?, None);
    Ok(())
}

#[test]
fn folds() -> Result<()> {
    let big = "99999999999999999999";
    let (errors, value) = Repeat::new(as_int(10), digit()).read_partial_str(big)?;
    assert_eq!(value, None);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.starts_with("integer overflow"));

    let bigint = Repeat::new(as_big_int(10), digit());
    assert_eq!(bigint.read_str(big)?, Some(big.parse::<BigInt>()?));
    assert_eq!(bigint.rebuild_str(big)?, Some(big.into()));

    assert_eq!(fold_all(vec![1, 2, 3], &join_fold(10, |a: i32, b: i32| a + b))?, 16);
    let hex = Repeat::new(as_int(16), digit());
    assert_eq!(hex.read_str("10")?, Some(16));
    Ok(())
}

#[test]
fn convert_and_context() -> Result<()> {
    let two = (digit(), item('-'), digit())
        .convert(|(a, _, b)| a * 10 + b, |n: &u32| Some((n / 10, '-', n % 10)));
    assert_eq!(two.read_str("4-2")?, Some(42));
    assert_eq!(two.show_string(&42)?, "4-2");

    let counted = Contextual::new(digit(), |n: &u32| {
        let n = *n as usize;
        Repeat::new(as_string(), any_item()).in_bounds(n..=n, true)
    });
    assert_eq!(counted.read_str("3abcd")?, Some((3, "abc".into())));
    assert_eq!(counted.show_string(&(2, "xy".into()))?, "2xy");

    let hash = (item('#'), digit()).discard_first();
    assert_eq!(hash.read_str("#5")?, Some(5));
    assert!(matches!(hash.show_string(&5), Err(ShowError::Unsupported(_))));

    let sign = item('+').to_default('+');
    assert_eq!(sign.read_str("x")?, Some('+'));
    assert_eq!(item('a').named("letter a").description(), "letter a");
    Ok(())
}

#[test]
fn deferred_recursion() -> Result<()> {
    let nested: Deferred<char, u32> = Deferred::declare();
    assert!(matches!(nested.read_str("."), Err(ParseError::Undefined)));
    let inner = nested.clone();
    nested.define(Decide::new()
        .case((item('('), inner, item(')')).convert(|(_, n, _)| n + 1,
                                                   |n: &u32| Some(('(', n - 1, ')'))))
        .case(item('.').convert(|_| 0, |_: &u32| Some('.')))
        .merge_first(|n: &u32| if *n == 0 { 1 } else { 0 }))?;
    assert_eq!(nested.read_str("(((.)))")?, Some(3));
    assert_eq!(nested.show_string(&2)?, "((.))");
    assert_eq!(nested.define(item('x').convert(|_| 0, |_: &u32| None)), Err(Redefined));
    assert!(nested.description().contains("recurse"));

    let lazy = Deferred::from_fn(|| Box::new(item('z')) as DynPattern<char, char>);
    assert_eq!(lazy.read_str("z")?, Some('z'));
    Ok(())
}

#[test]
fn piped_and_also_do() -> Result<()> {
    let word = Repeat::new(as_string(), element_in_range('a'..='z'));
    let checked = word.piped(|s, v| {
        if v.as_deref() == Some("bad") {
            s.error("reserved word".into())?;
        }
        Ok(v)
    });
    assert_eq!(checked.read_str("good")?, Some("good".into()));
    assert_eq!(checked.read_str("bad").unwrap_err().to_string(),
               "<string>:1:3: reserved word");

    let seen = Rc::new(Cell::new(0));
    let seen2 = seen.clone();
    let counted = Repeat::new(as_count(), item('x').also_do(move |_, _| seen2.set(seen2.get() + 1)));
    assert_eq!(counted.read_str("xxx")?, Some(3));
    assert_eq!(seen.get(), 3);
    Ok(())
}

#[test]
fn surround() -> Result<()> {
    let paren = digit().surround(item('('), item(')'));
    assert_eq!(paren.read_str("(5)")?, Some(5));
    assert_eq!(paren.read_str("(5]")?, None);
    assert_eq!(paren.show_string(&7)?, "(7)");
    assert_eq!(digit().prefix(item('$')).rebuild_str("$3")?, Some("$3".into()));
    assert_eq!(digit().surround(any_item(), item(')')).show_string(&5),
               Err(ShowError::NoConstant));
    Ok(())
}

#[test]
fn join_by() -> Result<()> {
    let list = JoinBy::new(item(','), digit());
    assert_eq!(list.read_str("1,2,3")?, Some((vec![1, 2, 3], vec![',', ','])));
    assert_eq!(list.rebuild_str("1,2,3")?, Some("1,2,3".into()));
    assert_eq!(list.show_string(&(vec![1, 2], vec![])),
               Err(ShowError::SeparatorCount { items: 2, separators: 0 }));
    let e = list.read_str("1,2,").unwrap_err();
    assert!(e.to_string().ends_with("expecting item for last separator ','"));

    let trailing = JoinBy::new(item(',').to_default(','), digit());
    assert_eq!(trailing.read_str("1,2,")?, Some((vec![1, 2], vec![','])));
    assert_eq!(trailing.read_str("1")?, Some((vec![1], vec![])));

    let rescued = JoinBy::new(item(','), digit()).rescue(|_, _| Ok(Some(0)));
    assert_eq!(rescued.read_str("1,,2")?, Some((vec![1, 0, 2], vec![',', ','])));

    let merged = JoinBy::new(item(','), digit()).merge_constant_join(',');
    assert_eq!(merged.read_str("4,5")?, Some(vec![4, 5]));
    assert_eq!(merged.show_string(&vec![4, 5, 6])?, "4,5,6");
    Ok(())
}

#[test]
fn char_joins_and_fractions() -> Result<()> {
    let joined = JoinBy::new(element_in([',', ';']), digit()).concat_char_join();
    assert_eq!(joined.read_str("1,2;3")?, Some((vec![1, 2, 3], ",;".to_string())));
    assert_eq!(joined.show_string(&(vec![4, 5], ";".into()))?, "4;5");

    assert_eq!(Repeat::new(as_double(3), digit()).read_str("25")?, Some(3.25));
    assert_eq!(Repeat::new(as_double(-1), digit()).read_str("5")?, Some(-1.5));
    Ok(())
}

fn numbers() -> impl Pattern<In = char, Out = (Vec<i64>, Vec<char>)> {
    let number = Repeat::new(as_int(10), digit())
        .clam_while(element_in_range('a'..='z'), -1, unexpected("number"));
    JoinBy::new(item(' '), number)
}

#[test]
fn clam_while_reports_once() -> Result<()> {
    let (errors, value) = numbers().read_partial_str("1 ab 3")?;
    assert_eq!(value, Some((vec![1, -1, 3], vec![' ', ' '])));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "unexpected 'a', expecting number");
    assert_eq!(errors[0].location.as_ref().map(|l| l.column), Some(2));

    let e = numbers().read_str("1 ab 3").unwrap_err();
    assert_eq!(e.to_string(), "<string>:1:2: unexpected 'a', expecting number");
    Ok(())
}

#[test]
fn clam_skips_to_match() -> Result<()> {
    let semi = item(';').clam_unexpected();
    let (errors, value) = semi.read_partial_str("xy;")?;
    assert_eq!(value, Some(';'));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "unexpected 'x', expecting ';'");
    Ok(())
}

#[test]
fn clam_while_stops_on_empty_skip() -> Result<()> {
    let number = Repeat::new(as_int(10), digit())
        .clam_while(string_for(item('x')), -1, unexpected("number"));
    let (errors, value) = number.read_partial_str("y")?;
    assert_eq!(value, Some(-1));
    assert_eq!(errors.len(), 1);

    let (errors, value) = number.read_partial_str("xxy")?;
    assert_eq!(value, Some(-1));
    assert_eq!(errors[0].message, "unexpected 'x', expecting number");
    Ok(())
}

#[test]
fn lookahead_reports_through_parent() -> Result<()> {
    let semi = || item(';').clam_unexpected();

    let (errors, value) = peek(semi()).read_partial_str("ab")?;
    assert_eq!(value, None);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].token, 'a');
    assert_eq!(errors[0].message, "unexpected 'a', expecting ';'");
    let loc = errors[0].location.as_ref().expect("location");
    assert_eq!((loc.line, loc.column), (1, 0));

    let e = peek(semi()).read_str("ab").unwrap_err();
    assert_eq!(e.to_string(), "<string>:1:0: unexpected 'a', expecting ';'");

    let mut input = input_of_str("ab", "<string>")?.collect_errors();
    assert!(!test_peek(&semi(), &mut input)?);
    assert_eq!(item('a').read(&mut input)?, Some('a'));
    assert_eq!(input.take_errors().len(), 1);

    let (errors, value) = until(any_item(), semi()).read_partial_str("a;")?;
    assert_eq!(value.as_deref(), Some("a"));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].location.as_ref().map(|l| (l.line, l.column)), Some((1, 0)));
    Ok(())
}

#[test]
fn rebuild() -> Result<()> {
    assert_eq!(Repeat::new(as_list(), digit()).rebuild_str("123")?, Some("123".into()));
    assert_eq!(Repeat::new(as_list(), any_item::<i32>()).rebuild_items(vec![4, 5])?,
               Some(vec![4, 5]));
    assert!(matches!(Repeat::new(as_count(), item(1)).rebuild_items(vec![1, 1]),
                     Err(RoundTripError::Show(ShowError::Unsupported(_)))));
    assert!(element_in_range('0'..='9').test_item('5')?);
    Ok(())
}
