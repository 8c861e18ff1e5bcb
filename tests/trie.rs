use anyhow::Result;
use biparse::atom::item;
use biparse::error::ShowError;
use biparse::pattern::{Pattern, PatternExt};
use biparse::sjit::JoinBy;
use biparse::trie::{DictTrie, Trie, TriePattern};
use kstring::KString;

#[test]
fn storage() {
    let mut t: Trie<char, u32> = Trie::new();
    assert_eq!(t.insert_str("ab", 1), None);
    assert_eq!(t.insert_str("ab", 2), Some(1));
    t.insert_str("a", 3);
    assert_eq!(t.get(&['a', 'b']), Some(&2));
    assert_eq!(t.get(&['a']), Some(&3));
    assert!(!t.contains(&['b']));
    assert!(t.get_path(&['a']).is_some());

    t.merge([("cd".chars(), 4), ("ce".chars(), 5)]);
    assert_eq!(t.route(&'c').map(|n| n.routes().len()), Some(2));
    assert_eq!(t.get_path(&['c']).and_then(|n| n.value()), None);

    let mut keys: Vec<String> = t.collect_keys().into_iter()
        .map(|k| k.into_iter().collect())
        .collect();
    keys.sort();
    assert_eq!(keys, vec!["a", "ab", "cd", "ce"]);
}

#[test]
fn nocase_storage() {
    let mut t: Trie<char, u32> = Trie::new();
    t.insert_nocase("Ok", 1);
    for spelling in ["ok", "OK", "Ok", "oK"] {
        let path: Vec<char> = spelling.chars().collect();
        assert_eq!(t.get(&path), Some(&1), "{}", spelling);
    }
    assert_eq!(t.collect_keys().len(), 4);
}

#[test]
fn nocase_storage_replaces() {
    let mut t: Trie<char, u32> = Trie::new();
    t.insert_str("OK", 7);
    let replaced = t.insert_nocase("ok", 1);
    assert_eq!(replaced, vec![(vec!['O', 'K'], 7)]);
}

fn comparisons() -> TriePattern<char, u32> {
    let ops: TriePattern<char, u32> = TriePattern::new();
    ops.insert_str("<", 1);
    ops.insert_str("<=", 2);
    ops.insert_str("<<", 3);
    ops.insert_str("=", 4);
    ops
}

#[test]
fn exact() -> Result<()> {
    let ops = comparisons();
    assert_eq!(ops.read_str("<=")?, Some(2));
    assert_eq!(ops.read_str("<")?, Some(1));
    assert_eq!(ops.read_str("<x")?, Some(1));
    assert_eq!(ops.read_str("x")?, None);
    assert_eq!(ops.show_string(&3)?, "<<");
    assert_eq!(ops.show_string(&9), Err(ShowError::NotRegistered));
    assert_eq!(ops.description(), "(trie: 4 exact values)");

    let both = (comparisons(), comparisons());
    assert_eq!(both.read_str("<<=")?, Some((3, 4)));
    Ok(())
}

#[test]
fn exact_path_without_value() -> Result<()> {
    let arrows: TriePattern<char, &str> = TriePattern::new();
    arrows.insert_str("->>", "tail");
    assert_eq!(arrows.read_str("->>")?, Some("tail"));
    assert_eq!(arrows.read_str("->")?, None);
    assert_eq!(arrows.path_of(&"tail"), Some(vec!['-', '>', '>']));
    Ok(())
}

#[test]
fn reassigned_paths() -> Result<()> {
    let t: TriePattern<char, u32> = TriePattern::new();
    t.insert_str("ab", 1);
    t.insert_str("ab", 2);
    t.insert_str("cd", 1);
    assert_eq!(t.read_str("cd")?, Some(1));
    assert_eq!(t.show_string(&1)?, "cd");
    assert_eq!(t.rebuild_str("cd")?.as_deref(), Some("cd"));
    assert_eq!(t.show_string(&2)?, "ab");

    // the latest path of a value wins, while it still holds the value
    t.insert_str("ef", 1);
    assert_eq!(t.show_string(&1)?, "ef");
    t.insert_str("ef", 3);
    assert_eq!(t.show_string(&1)?, "cd");
    t.insert_str("cd", 3);
    assert_eq!(t.show_string(&1), Err(ShowError::NotRegistered));
    assert_eq!(t.description(), "(trie: 2 exact values)");
    Ok(())
}

#[test]
fn nocase_keywords() -> Result<()> {
    let kw: TriePattern<char, u8> = TriePattern::new();
    kw.insert_nocase("select", 1);
    kw.insert_nocase("from", 2);
    assert_eq!(kw.read_str("SeLeCt")?, Some(1));
    assert_eq!(kw.read_str("FROM")?, Some(2));
    assert_eq!(kw.show_string(&1)?, "select");

    kw.insert_nocase("FROM", 3);
    assert_eq!(kw.read_str("from")?, Some(3));
    assert_eq!(kw.show_string(&3)?, "FROM");
    assert_eq!(kw.show_string(&2), Err(ShowError::NotRegistered));
    Ok(())
}

fn keywords() -> impl Pattern<In = char, Out = KString> {
    let kw = TriePattern::greedy(|c: &char| c.is_alphanumeric());
    kw.insert_str("if", KString::from_static("if"));
    kw.insert_str("in", KString::from_static("in"));
    kw
}

#[test]
fn greedy() -> Result<()> {
    let kw = keywords();
    assert_eq!(kw.read_str("in")?.as_deref(), Some("in"));
    assert_eq!(kw.read_str("inside")?.as_deref(), Some("inside"));
    assert_eq!(kw.read_str("i")?.as_deref(), Some("i"));
    assert_eq!(kw.read_str("x1")?.as_deref(), Some("x1"));
    assert_eq!(kw.read_str(" ")?, None);
    assert_eq!((keywords(), keywords()).read_str("xif")?,
               Some((KString::from_static("x"), KString::from_static("if"))));
    assert_eq!(kw.show_string(&KString::from_static("other"))?, "other");

    let words = JoinBy::new(item(' '), keywords());
    let (items, seps) = words.read_str("in if inside")?.expect("read");
    assert_eq!(items.iter().map(|k| k.as_str()).collect::<Vec<_>>(),
               vec!["in", "if", "inside"]);
    assert_eq!(seps, vec![' ', ' ']);
    assert_eq!(words.rebuild_str("in if inside")?.as_deref(), Some("in if inside"));
    Ok(())
}

#[test]
fn lazy() -> Result<()> {
    let names = TriePattern::lazy(|text: &str| Some(text.to_uppercase()));
    names.insert_str("for", "FOR".to_string());
    assert_eq!(names.read_str("for")?.as_deref(), Some("FOR"));
    assert_eq!(names.get_str("fo"), None);
    assert_eq!(names.read_str("fo")?.as_deref(), Some("FO"));
    assert_eq!(names.get_str("fo").as_deref(), Some("FO"));
    assert_eq!(names.show_string(&"FO".into())?, "fo");
    assert_eq!(names.read_str("x")?, None);
    assert_eq!(names.description(), "(trie: 2 lazy values)");
    Ok(())
}

#[test]
fn dictionary() -> Result<()> {
    let d = DictTrie::new();
    d.insert("hund", "dog");
    d.insert("katze", "cat");
    assert_eq!(d.read_str("hund")?.as_deref(), Some("dog"));
    assert_eq!(d.back().read_str("cat")?.as_deref(), Some("katze"));
    assert_eq!(d.show_string(&KString::from_static("dog"))?, "hund");
    assert_eq!(d.read_str("maus")?, None);
    Ok(())
}
