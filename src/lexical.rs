// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Frequently used character patterns.

use crate::atom::{any_item, element_in, element_in_range, item, EqualTo, Labeled, OneOf,
                  SatisfyPattern};
use crate::ccdp::{no_inverse, Convert};
use crate::error::{ReadResult, ShowError, ShowResult};
use crate::feed::Feed;
use crate::fold::{as_string, AsString};
use crate::location::SourceLocation;
use crate::pattern::{Output, Pattern, PatternExt};
use crate::recover::SatisfyClam;
use crate::sjit::{JoinBy, SurroundBy};
use crate::state::state_as;
use crate::surd::{Decide, Repeat, Until};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::fmt::Formatter;
use std::ops::RangeInclusive;
use std::rc::Rc;

/// A digit in `range` as number, counting from `zero`, plus `pad`:
/// `digit_for('a'..='f', 'a', 10)` reads `c` as 12.
pub fn digit_for(range: RangeInclusive<char>, zero: char, pad: u32)
                 -> impl Pattern<In = char, Out = u32> {
    Convert::new(element_in_range(range),
                 move |c: char| c as u32 - zero as u32 + pad,
                 move |d: &u32| d.checked_sub(pad)
                 .and_then(|d| char::from_u32(zero as u32 + d)))
}

pub fn digit() -> impl Pattern<In = char, Out = u32> {
    digit_for('0'..='9', '0', 0)
}

/// Hex digit of either case; shows upper case.
pub fn hex_digit() -> impl Pattern<In = char, Out = u32> {
    Decide::new()
        .case(digit())
        .case(digit_for('A'..='F', 'A', 10))
        .case(digit_for('a'..='f', 'a', 10))
        .merge_first(|d: &u32| if *d < 10 { 0 } else { 1 })
}

/// Zero or more `c`s as string.
pub fn string_for<C>(c: C) -> Repeat<AsString, C>
    where C: Pattern<In = char, Out = char>
{
    Repeat::new(as_string(), c).many()
}

/// Characters read by `c` between `open` and `close`, e.g. a string
/// literal without escapes.
pub fn quoted<C>(open: char, close: char, c: C)
                 -> SurroundBy<char, Until<SatisfyPattern<char, EqualTo<char>>,
                                           AsString, C>>
    where C: Pattern<In = char, Out = char>
{
    until(c, item(close)).surround(item(open), item(close))
}

/// `c`s up to (not including) the first token read by `terminate`.
pub fn until<C, Tm>(c: C, terminate: Tm) -> Until<Tm, AsString, C>
    where C: Pattern<In = char, Out = char>,
          Tm: Pattern<In = char>
{
    Until::new(terminate, as_string(), c)
}

/// A character pattern reading one-character strings.
pub fn to_string_pat<C>(c: C) -> impl Pattern<In = char, Out = String>
    where C: Pattern<In = char, Out = char>
{
    Convert::new(c,
                 |c: char| c.to_string(),
                 |s: &String| {
                     let mut chars = s.chars();
                     match (chars.next(), chars.next()) {
                         (Some(c), None) => Some(c),
                         _ => None
                     }
                 })
}

/// `c` in either case; as a bracket it shows `c`.
pub fn item_nocase(c: char) -> impl Pattern<In = char, Out = char> {
    let mut cases = vec![c];
    cases.extend(c.to_uppercase().chain(c.to_lowercase()).filter(|v| *v != c));
    element_in(cases).to_constant(c)
}

pub fn white() -> impl Pattern<In = char, Out = char> {
    element_in([' ', '\t', '\n', '\r']).named("white")
}

/// Optional whitespace; as a bracket, shown as nothing.
pub fn ws() -> impl Pattern<In = char, Out = String> {
    string_for(white()).to_constant(String::new())
}

/// Required whitespace; as a bracket, shown as one space.
pub fn ws1() -> impl Pattern<In = char, Out = String> {
    Repeat::new(as_string(), white()).to_constant(" ".into())
}

/// An optional `+` or `-`: whether it was a minus. Shows `-` for
/// true, nothing for false.
pub fn sign() -> impl Pattern<In = char, Out = bool> {
    Convert::new(element_in(['+', '-']).to_default('+'),
                 |c: char| c == '-',
                 no_inverse::<bool, char>)
        .show_by(|s: &mut dyn Output<char>, minus: &bool| {
            if *minus {
                s.put('-');
            }
            Ok(())
        })
}

/// `p` with optional whitespace around.
pub fn tokenize<P: Pattern<In = char>>(p: P) -> SurroundBy<char, P> {
    p.surround(ws(), ws())
}

/// `p` followed by required whitespace.
pub fn split<P: Pattern<In = char>>(p: P) -> SurroundBy<char, P> {
    p.surround(ws(), ws1())
}


/// Zero or more `p`s separated by `sep`, whitespace allowed around
/// each; shown without whitespace.
pub fn separated<P>(sep: char, p: P) -> impl Pattern<In = char, Out = Vec<P::Out>>
    where P: Pattern<In = char>,
          P::Out: Clone
{
    tokenize(JoinBy::new(tokenize(item(sep)), p)
             .merge_constant_join(sep)
             .to_default(Vec::new()))
}

/// `head` and then the text read by `rest`, as one string.
pub fn prefix1<H, R>(head: H, rest: R) -> impl Pattern<In = char, Out = String>
    where H: Pattern<In = char, Out = char>,
          R: Pattern<In = char, Out = String>
{
    Convert::new((head, rest),
                 |(c, rest): (char, String)| {
                     let mut text = String::with_capacity(rest.len() + 1);
                     text.push(c);
                     text.push_str(&rest);
                     text
                 },
                 |text: &String| {
                     let mut chars = text.chars();
                     let c = chars.next()?;
                     Some((c, chars.as_str().to_string()))
                 })
}

/// `c`s up to and including the first `tail`, as one string.
pub fn suffix1<Tl, C>(tail: Tl, c: C) -> impl Pattern<In = char, Out = String>
    where Tl: Pattern<In = char, Out = char>,
          C: Pattern<In = char, Out = char>
{
    let tail = Rc::new(tail);
    Convert::new((until(c, tail.clone()), tail),
                 |(mut body, t): (String, char)| {
                     body.push(t);
                     body
                 },
                 |text: &String| {
                     let mut body = text.clone();
                     let t = body.pop()?;
                     Some((body, t))
                 })
}

pub fn newline_char() -> SatisfyPattern<char, Labeled<OneOf<char>>> {
    element_in(['\r', '\n']).labeled("newline")
}

/// The rest of the current line, with its line break. A last line
/// without line break is not read.
pub fn single_line() -> impl Pattern<In = char, Out = String> {
    suffix1(newline_char(), any_item::<char>())
}


type Transform<T> = Box<dyn Fn(&Captures<'_>) -> Option<T>>;
type Unparse<T> = Box<dyn Fn(&T) -> Option<String>>;

/// Matches `regex` on the text read by `item`, and makes the value
/// from the captures; no match, or `None` from the transform, is not
/// parsed. The text read is consumed either way.
///
/// `show` writes what [unparse](TextPattern::unparse) makes of the
/// value, through `item`.
///
/// ```
/// use biparse::lexical::text_line;
/// use biparse::pattern::PatternExt;
/// use regex::Regex;
///
/// let assign = text_line(Regex::new(r"^(\w+) *= *(\d+)\s*$").unwrap(),
///                        |caps| Some((caps[1].to_string(), caps[2].parse::<u32>().ok()?)))
///     .unparse(|(k, v)| Some(format!("{} = {}\n", k, v)));
/// assert_eq!(assign.read_str("x=5\n").unwrap(), Some(("x".to_string(), 5)));
/// assert_eq!(assign.show_string(&("x".into(), 5)).unwrap(), "x = 5\n");
/// ```
pub struct TextPattern<P, T> {
    item: P,
    regex: Regex,
    transform: Transform<T>,
    unparse: Option<Unparse<T>>,
}

impl<P: Pattern<In = char, Out = String>, T> TextPattern<P, T> {
    pub fn new(item: P, regex: Regex,
               transform: impl Fn(&Captures<'_>) -> Option<T> + 'static)
               -> TextPattern<P, T> {
        TextPattern { item, regex, transform: Box::new(transform), unparse: None }
    }

    pub fn unparse(mut self, unparse: impl Fn(&T) -> Option<String> + 'static)
                   -> TextPattern<P, T> {
        self.unparse = Some(Box::new(unparse));
        self
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// A [TextPattern](TextPattern) over [single_line](single_line). The
/// line break is part of the text matched: use a multi-line `$` or
/// `\s*$` to anchor at the end.
pub fn text_line<T>(regex: Regex, transform: impl Fn(&Captures<'_>) -> Option<T> + 'static)
                    -> TextPattern<impl Pattern<In = char, Out = String>, T> {
    TextPattern::new(single_line(), regex, transform)
}

impl<P, T> Pattern for TextPattern<P, T>
    where P: Pattern<In = char, Out = String>
{
    type In = char;
    type Out = T;

    fn read(&self, s: &mut dyn Feed<char>) -> ReadResult<T> {
        let text = match self.item.read(s)? {
            Some(text) => text,
            None => return Ok(None)
        };
        Ok(self.regex.captures(&text).and_then(|caps| (self.transform)(&caps)))
    }
    fn show(&self, s: &mut dyn Output<char>, value: &T) -> ShowResult {
        let unparse = self.unparse.as_ref()
            .ok_or(ShowError::Unsupported("text pattern without unparse"))?;
        let text = unparse(value).ok_or(ShowError::Unsupported("unparse"))?;
        self.item.show(s, &text)
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        self.item.describe(f)?;
        f.write_fmt(format_args!("/{}/", self.regex.as_str()))
    }
}


/// The locations of open brackets still waiting for their close
/// bracket. Attach to an input with
/// [with_state](crate::input::Input::with_state) for
/// [clamly](clamly) to tell where a missing close bracket was opened.
#[derive(Debug, Default)]
pub struct ExpectClose {
    open: HashMap<(char, char), Vec<SourceLocation>>,
}

impl ExpectClose {
    pub fn new() -> ExpectClose {
        ExpectClose::default()
    }

    pub fn add(&mut self, pair: (char, char), loc: SourceLocation) {
        self.open.entry(pair).or_default().push(loc);
    }

    pub fn remove(&mut self, pair: (char, char)) -> Option<SourceLocation> {
        self.open.get_mut(&pair)?.pop()
    }
}

/// The open bracket of [clamly](clamly): records its location.
pub struct ClamlyOpen {
    pair: (char, char),
    item: SatisfyPattern<char, EqualTo<char>>,
}

impl Pattern for ClamlyOpen {
    type In = char;
    type Out = char;

    fn read(&self, s: &mut dyn Feed<char>) -> ReadResult<char> {
        let parsed = self.item.read(s)?;
        if parsed.is_some() {
            if let Some(loc) = s.source_loc().cloned() {
                if let Some(expect) = state_as::<char, ExpectClose>(s) {
                    expect.add(self.pair, loc);
                }
            }
        }
        Ok(parsed)
    }
    fn show(&self, s: &mut dyn Output<char>, value: &char) -> ShowResult {
        self.item.show(s, value)
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        self.item.describe(f)
    }
    fn constant(&self) -> Option<&char> {
        self.item.constant()
    }
}

/// The close bracket of [clamly](clamly): when missing, reports
/// "expecting <close>", with the location of the open bracket if
/// known, and skips ahead to the next close bracket.
pub struct ClamlyClose {
    pair: (char, char),
    item: SatisfyPattern<char, EqualTo<char>>,
    clam: SatisfyClam<char, EqualTo<char>>,
}

impl Pattern for ClamlyClose {
    type In = char;
    type Out = char;

    fn read(&self, s: &mut dyn Feed<char>) -> ReadResult<char> {
        if let Some(c) = self.item.read(s)? {
            if let Some(expect) = state_as::<char, ExpectClose>(s) {
                expect.remove(self.pair);
            }
            return Ok(Some(c))
        }
        self.clam.read(s)
    }
    fn show(&self, s: &mut dyn Output<char>, value: &char) -> ShowResult {
        self.item.show(s, value)
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        self.item.describe(f)
    }
    fn constant(&self) -> Option<&char> {
        self.item.constant()
    }
}

/// Bracket pair with error recovery for the close bracket, for use
/// with [SurroundBy](SurroundBy):
///
/// ```
/// use biparse::lexical::{clamly, ExpectClose};
/// use biparse::atom::element_in_range;
/// use biparse::fold::as_string;
/// use biparse::input::input_of_str;
/// use biparse::pattern::{Pattern, PatternExt};
/// use biparse::surd::Repeat;
///
/// let (open, close) = clamly('(', ')');
/// let word = Repeat::new(as_string(), element_in_range('a'..='z')).surround(open, close);
/// let mut input = input_of_str("(abc", "x").unwrap()
///     .with_state(ExpectClose::new()).collect_errors();
/// word.read(&mut input).unwrap();
/// assert_eq!(input.take_errors()[0].message, "expecting ')' (from x:1:1)");
/// ```
pub fn clamly(open: char, close: char) -> (ClamlyOpen, ClamlyClose) {
    let pair = (open, close);
    let messager = move |s: &mut dyn Feed<char>| {
        let from = state_as::<char, ExpectClose>(s)
            .and_then(|expect| expect.remove(pair))
            .map(|loc| format!(" (from {})", loc))
            .unwrap_or_default();
        format!("expecting {:?}{}", close, from)
    };
    (ClamlyOpen { pair, item: item(open) },
     ClamlyClose { pair, item: item(close), clam: item(close).clam(messager) })
}
