use anyhow::Result;
use biparse::atom::{any_item, element_in_range, item};
use biparse::error::{ParseError, ShowError};
use biparse::feed::Feed;
use biparse::fold::{as_int, as_list, as_string};
use biparse::input::input_of_str;
use biparse::lexer::LexerFeed;
use biparse::lexical::{clamly, digit, digit_for, hex_digit, item_nocase, prefix1, quoted,
                       separated, sign, single_line, split, string_for, suffix1, text_line,
                       to_string_pat, tokenize, until, ws1, ExpectClose, TextPattern};
use biparse::location::SourceLocation;
use biparse::pattern::{Pattern, PatternExt};
use biparse::surd::Repeat;
use regex::Regex;

fn word() -> impl Pattern<In = char, Out = String> {
    Repeat::new(as_string(), element_in_range('a'..='z'))
}

#[test]
fn digits() -> Result<()> {
    assert_eq!(digit().read_str("7")?, Some(7));
    let letters = digit_for('a'..='f', 'a', 10);
    assert_eq!(letters.read_str("c")?, Some(12));
    assert_eq!(letters.show_string(&12)?, "c");
    assert_eq!(letters.show_string(&3), Err(ShowError::Unsupported("convert back")));

    assert_eq!(hex_digit().read_str("f")?, Some(15));
    assert_eq!(hex_digit().read_str("F")?, Some(15));
    assert_eq!(hex_digit().read_str("g")?, None);
    let hex = Repeat::new(as_int(16), hex_digit());
    assert_eq!(hex.read_str("fF")?, Some(255));
    assert_eq!(hex.rebuild_str("1a")?.as_deref(), Some("1A"));
    Ok(())
}

#[test]
fn strings() -> Result<()> {
    let lit = quoted('"', '"', any_item());
    assert_eq!(lit.read_str("\"a b\" c")?.as_deref(), Some("a b"));
    assert_eq!(lit.read_str("\"ab")?, None);
    assert_eq!(lit.show_string(&"x".into())?, "\"x\"");

    assert_eq!(until(any_item(), item(';')).read_str("ab;c")?.as_deref(), Some("ab"));
    assert_eq!(string_for(element_in_range('0'..='9')).read_str("x")?.as_deref(), Some(""));

    let single = to_string_pat(any_item());
    assert_eq!(single.read_str("q")?.as_deref(), Some("q"));
    assert_eq!(single.show_string(&"qq".into()), Err(ShowError::Unsupported("convert back")));
    Ok(())
}

#[test]
fn case_and_space() -> Result<()> {
    let k = item_nocase('k');
    assert_eq!(k.read_str("K")?, Some('K'));
    assert_eq!(k.read_str("k")?, Some('k'));
    assert_eq!(k.read_str("x")?, None);
    assert_eq!(k.constant(), Some(&'k'));

    assert_eq!(ws1().read_str("x")?, None);
    assert_eq!(ws1().read_str(" \tx")?.as_deref(), Some(" \t"));

    let tokens = Repeat::new(as_list(), tokenize(word()));
    assert_eq!(tokens.read_str("  ab cd\n")?, Some(vec!["ab".into(), "cd".into()]));
    assert_eq!(tokens.show_string(&vec!["ab".into(), "cd".into()])?, "abcd");

    let words = Repeat::new(as_list(), split(word()));
    assert_eq!(words.rebuild_str("ab \n cd\t")?.as_deref(), Some("ab cd "));
    Ok(())
}

#[test]
fn expect_close() {
    let mut expect = ExpectClose::new();
    expect.add(('(', ')'), SourceLocation { column: 1, ..SourceLocation::new("f") });
    expect.add(('(', ')'), SourceLocation { column: 3, ..SourceLocation::new("f") });
    assert_eq!(expect.remove(('(', ')')).map(|l| l.column), Some(3));
    assert!(expect.remove(('[', ']')).is_none());
}

#[test]
fn clamly_brackets() -> Result<()> {
    let (open, close) = clamly('(', ')');
    let inner = word().surround(open, close);
    let (open, close) = clamly('(', ')');
    let outer = inner.surround(open, close);

    let mut input = input_of_str("((a))", "x")?.with_state(ExpectClose::new());
    assert_eq!(outer.read(&mut input)?.as_deref(), Some("a"));

    let mut input = input_of_str("((a)", "x")?.with_state(ExpectClose::new()).collect_errors();
    assert_eq!(outer.read(&mut input)?, None);
    let errors = input.take_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "expecting ')' (from x:1:1)");

    let (open, close) = clamly('(', ')');
    let skipping = word().surround(open, close);
    let (errors, value) = skipping.read_partial_str("(ab x)")?;
    assert_eq!(value.as_deref(), Some("ab"));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "expecting ')'");
    Ok(())
}

#[test]
fn lexer_tokens() -> Result<()> {
    let input = input_of_str(" let x in", "t")?;
    let mut lexer = LexerFeed::new(input, tokenize(word()), String::new())?;
    assert_eq!(lexer.peek(), "let");
    let binding = (item("let".to_string()), any_item());
    assert_eq!(binding.read(&mut lexer)?, Some(("let".into(), "x".into())));
    assert_eq!(lexer.consume(), Ok("in".into()));
    assert_eq!(lexer.peek(), "");
    assert!(lexer.consume().is_err());
    assert!(lexer.take_error().is_none());
    Ok(())
}

#[test]
fn lexer_failure() -> Result<()> {
    let input = input_of_str("ab 1 cd", "t")?.collect_errors();
    let mut lexer = LexerFeed::new(input, tokenize(word()), String::new())?;
    let all = Repeat::new(as_list(), any_item()).read(&mut lexer)?;
    assert_eq!(all, Some(vec!["ab".to_string()]));
    let errors = lexer.chars_mut().take_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "lexer failed at '1'");

    let input = input_of_str("ab 1", "t")?;
    let mut lexer = LexerFeed::new(input, tokenize(word()), String::new())?;
    assert_eq!(lexer.consume(), Ok("ab".into()));
    let e = lexer.take_error().expect("tokenizing fails");
    assert!(e.to_string().ends_with("lexer failed at '1'"), "{}", e);

    let input = input_of_str("1", "t")?;
    assert!(matches!(LexerFeed::new(input, tokenize(word()), String::new()),
                     Err(ParseError::Located(..))));
    Ok(())
}

#[test]
fn signs_and_lists() -> Result<()> {
    let signed = (sign(), Repeat::new(as_int(10), digit()));
    assert_eq!(signed.read_str("-12")?, Some((true, 12)));
    assert_eq!(signed.read_str("+3")?, Some((false, 3)));
    assert_eq!(signed.read_str("4")?, Some((false, 4)));
    assert_eq!(signed.show_string(&(true, 5))?, "-5");
    assert_eq!(signed.show_string(&(false, 5))?, "5");

    let list = separated(',', digit());
    assert_eq!(list.read_str(" 1, 2 ,3 ")?, Some(vec![1, 2, 3]));
    assert_eq!(list.read_str("x")?, Some(vec![]));
    assert_eq!(list.show_string(&vec![1, 2])?, "1,2");
    Ok(())
}

#[test]
fn affixes_and_lines() -> Result<()> {
    let ident = prefix1(element_in_range('a'..='z'), string_for(element_in_range('0'..='9')));
    assert_eq!(ident.read_str("x12")?.as_deref(), Some("x12"));
    assert_eq!(ident.read_str("1")?, None);
    assert_eq!(ident.show_string(&"y3".into())?, "y3");

    let stmt = suffix1(item(';'), any_item());
    assert_eq!(stmt.read_str("a b;c")?.as_deref(), Some("a b;"));
    assert_eq!(stmt.rebuild_str("x;")?.as_deref(), Some("x;"));

    let lines = Repeat::new(as_list(), single_line());
    assert_eq!(lines.read_str("one\ntwo\n")?,
               Some(vec!["one\n".to_string(), "two\n".to_string()]));
    assert_eq!(single_line().read_str("last")?, None);
    Ok(())
}

#[test]
fn text_patterns() -> Result<()> {
    let assign = text_line(Regex::new(r"^(\w+)\s*=\s*(-?\d+)\s*$")?,
                           |caps| Some((caps[1].to_string(), caps[2].parse::<i64>().ok()?)))
        .unparse(|(name, value)| Some(format!("{} = {}\n", name, value)));
    let program = Repeat::new(as_list(), assign);
    let read = program.read_str("x = 1\ny=-2\n")?.expect("read");
    assert_eq!(read, vec![("x".to_string(), 1), ("y".to_string(), -2)]);
    assert_eq!(program.show_string(&read)?, "x = 1\ny = -2\n");

    let comment = text_line(Regex::new(r"^#(.*)")?, |caps| Some(caps[1].trim().to_string()));
    assert_eq!(comment.read_str("# note\n")?.as_deref(), Some("note"));
    assert_eq!(comment.read_str("note\n")?, None);
    assert_eq!(comment.show_string(&"note".into()),
               Err(ShowError::Unsupported("text pattern without unparse")));

    let vowels = TextPattern::new(word(), Regex::new("[aeiou]+")?,
                                  |caps| Some(caps[0].len()));
    assert_eq!(vowels.read_str("bead")?, Some(2));
    assert_eq!(vowels.read_str("xyz")?, None);
    assert!(vowels.description().ends_with("/[aeiou]+/"), "{}", vowels.description());
    Ok(())
}

