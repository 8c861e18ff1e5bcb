use anyhow::Result;
use biparse::atom::{element_in_range, item};
use biparse::fold::as_string;
use biparse::input::input_of_str;
use biparse::layout::{line_indent, Deep, ItemPattern, LayoutPattern};
use biparse::pattern::{Pattern, PatternExt};
use biparse::surd::Repeat;
use std::rc::Rc;

const INPUT: &str = include_str!("t-layout.txt");

fn outline() -> impl Pattern<In = char, Out = Deep<String, char>> {
    let word = Repeat::new(as_string(), element_in_range('a'..='z') | item('-'));
    LayoutPattern::new(word, item(':'), line_indent())
}

fn term(s: &str) -> Deep<String, char> {
    Deep::Term(s.into())
}

fn nest(s: &str, children: Vec<Deep<String, char>>) -> Deep<String, char> {
    Deep::Nest { item: s.into(), tail: ':', children }
}

#[test]
fn t_layout() -> Result<()> {
    let tree = outline().read_str(INPUT)?.expect("parsed");
    assert_eq!(tree.to_string(),
               "Root [fruit: { apple, citrus: { lemon, lime }, pear }, \
                vegetables: { root: { carrot, beet } }, grain]");
    let word = Repeat::new(as_string(), element_in_range('a'..='z') | item('-'));
    let stepped = LayoutPattern::new(word, item(':'), line_indent()).indent_step(2);
    assert_eq!(stepped.show_string(&tree)?, INPUT);
    Ok(())
}

#[test]
fn nesting() -> Result<()> {
    let tree = outline().read_str("a:\n b\n c\n d\n")?;
    assert_eq!(tree, Some(Deep::Root(vec![nest("a", vec![term("b"), term("c"), term("d")])])));

    let tree = outline().read_str("a:\n b:\n  c\nd\n")?.expect("parsed");
    assert_eq!(tree, Deep::Root(vec![nest("a", vec![nest("b", vec![term("c")])]),
                                     term("d")]));
    assert_eq!(outline().show_string(&tree)?, "a:\n b:\n  c\nd\n");
    Ok(())
}

#[test]
fn end_of_input_closes_blocks() -> Result<()> {
    let tree = outline().read_str("a:\n b:\n  c")?.expect("parsed");
    assert_eq!(tree, Deep::Root(vec![nest("a", vec![nest("b", vec![term("c")])])]));
    assert_eq!(outline().read_str("x")?, Some(Deep::Root(vec![term("x")])));
    Ok(())
}

#[test]
fn accessors() -> Result<()> {
    let tree = outline().read_str("a:\n b\nc\n")?.expect("parsed");
    assert_eq!(tree.item(), None);
    assert_eq!(tree.children().len(), 2);
    assert_eq!(tree.children()[0].item().map(String::as_str), Some("a"));
    assert_eq!(tree.children()[0].children(), &[term("b")]);
    assert!(tree.children()[1].children().is_empty());
    Ok(())
}

#[test]
fn bad_indentation() -> Result<()> {
    let e = outline().read_str("a\n  b\n").unwrap_err();
    assert!(e.to_string().ends_with("illegal layout increment (0 => 2) near \"a\""), "{}", e);

    let (errors, tree) = outline().read_partial_str("a\n  b\n")?;
    assert_eq!(errors.len(), 1);
    assert_eq!(tree, Some(Deep::Root(vec![term("a"), term("b")])));

    let e = outline().read_str("a:\nb\n").unwrap_err();
    assert!(e.to_string().ends_with("bad layout-open decrement (0 => 0)"), "{}", e);

    let e = outline().read_str("a:\n  b\n c\n").unwrap_err();
    assert!(e.to_string().ends_with("unaligned layout close (0 => 1)"), "{}", e);

    let e = outline().read_str("a b").unwrap_err();
    assert!(e.to_string().ends_with("expecting layout after item"), "{}", e);
    Ok(())
}

#[test]
fn missing_layout_keeps_token() -> Result<()> {
    let mut input = input_of_str("a b", "t")?.collect_errors();
    assert_eq!(outline().read(&mut input)?, None);
    let errors = input.take_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].token, ' ');
    assert_eq!(errors[0].location.as_ref().map(|l| l.column), Some(1));
    assert_eq!(item(' ').read(&mut input)?, Some(' '));
    assert_eq!(item('b').read(&mut input)?, Some('b'));
    Ok(())
}

#[test]
fn decided_block_items() -> Result<()> {
    let digits: ItemPattern<char, String> =
        Rc::new(Repeat::new(as_string(), element_in_range('0'..='9')));
    let word = Repeat::new(as_string(), element_in_range('a'..='z'));
    let typed = LayoutPattern::new(word, item(':'), line_indent())
        .decide_item(move |head: &String, _: &char| {
            if head == "nums" { Some(digits.clone()) } else { None }
        });
    let text = "nums:\n 12\n 7\nab:\n c\n";
    let tree = typed.read_str(text)?.expect("parsed");
    assert_eq!(tree, Deep::Root(vec![nest("nums", vec![term("12"), term("7")]),
                                     nest("ab", vec![term("c")])]));
    assert_eq!(typed.show_string(&tree)?, text);

    assert!(outline().read_str("nums:\n 12\n").is_err());
    assert!(typed.read_str("ab:\n 12\n").is_err());
    Ok(())
}

#[test]
fn rescue_layout() -> Result<()> {
    let word = Repeat::new(as_string(), element_in_range('a'..='z'));
    let spaced = LayoutPattern::new(word, item(':'), line_indent())
        .rescue_layout(|s| Ok(item(';').read(s)?.map(|_| 0)));
    assert_eq!(spaced.read_str("a;b;")?, Some(Deep::Root(vec![term("a"), term("b")])));
    Ok(())
}

#[test]
fn show_nested_root() {
    let bad = Deep::Root(vec![nest("a", vec![Deep::Root(vec![])])]);
    assert!(outline().show_string(&bad).is_err());
}
