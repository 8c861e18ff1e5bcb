// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Single token patterns, and the patterns that read nothing.
//!
//! A [SatisfyPattern](SatisfyPattern) reads one token if it satisfies
//! its [Condition](Condition). Conditions combine with `&`, `|` and
//! `!`:
//!
//! ```
//! use biparse::atom::{element_in_range, item};
//! let ident = element_in_range('a'..='z') | item('_');
//! let not_space = !item(' ');
//! ```

use crate::error::{ReadResult, ShowError, ShowResult};
use crate::feed::{Feed, FeedExt, Filter};
use crate::pattern::{Output, Pattern};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::{BitAnd, BitOr, Not, RangeInclusive};

pub trait Condition<T> {
    fn test(&self, value: &T) -> bool;
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error>;
    /// The one value satisfying this condition, if known.
    fn constant(&self) -> Option<&T> {
        None
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AnyItem;

impl<T> Condition<T> for AnyItem {
    fn test(&self, _value: &T) -> bool {
        true
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_str("anyItem")
    }
}

#[derive(Debug, Clone)]
pub struct EqualTo<T>(pub T);

impl<T: PartialEq + Debug> Condition<T> for EqualTo<T> {
    fn test(&self, value: &T) -> bool {
        *value == self.0
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_fmt(format_args!("{:?}", self.0))
    }
    fn constant(&self) -> Option<&T> {
        Some(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct OneOf<T>(pub Vec<T>);

impl<T: PartialEq + Debug> Condition<T> for OneOf<T> {
    fn test(&self, value: &T) -> bool {
        self.0.contains(value)
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_str("(")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_fmt(format_args!("{:?}", v))?;
        }
        f.write_str(")")
    }
}

#[derive(Debug, Clone)]
pub struct InRange<T>(pub RangeInclusive<T>);

impl<T: PartialOrd + Debug> Condition<T> for InRange<T> {
    fn test(&self, value: &T) -> bool {
        self.0.contains(value)
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_fmt(format_args!("({:?})", self.0))
    }
}

#[derive(Debug, Clone)]
pub struct InRanges<T>(pub Vec<RangeInclusive<T>>);

impl<T: PartialOrd + Debug> Condition<T> for InRanges<T> {
    fn test(&self, value: &T) -> bool {
        self.0.iter().any(|r| r.contains(value))
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_str("[")?;
        for r in &self.0 {
            f.write_fmt(format_args!("{:?}-{:?}", r.start(), r.end()))?;
        }
        f.write_str("]")
    }
}

pub struct FnCondition<F> {
    name: String,
    predicate: F,
}

impl<T, F: Fn(&T) -> bool> Condition<T> for FnCondition<F> {
    fn test(&self, value: &T) -> bool {
        (self.predicate)(value)
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_fmt(format_args!("({})", self.name))
    }
}

pub struct And<A, B>(A, B);
pub struct Or<A, B>(A, B);
pub struct Negate<A>(A);

impl<T, A: Condition<T>, B: Condition<T>> Condition<T> for And<A, B> {
    fn test(&self, value: &T) -> bool {
        self.0.test(value) && self.1.test(value)
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_str("(")?;
        self.0.describe(f)?;
        f.write_str("&")?;
        self.1.describe(f)?;
        f.write_str(")")
    }
}

impl<T, A: Condition<T>, B: Condition<T>> Condition<T> for Or<A, B> {
    fn test(&self, value: &T) -> bool {
        self.0.test(value) || self.1.test(value)
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_str("(")?;
        self.0.describe(f)?;
        f.write_str("|")?;
        self.1.describe(f)?;
        f.write_str(")")
    }
}

impl<T, A: Condition<T>> Condition<T> for Negate<A> {
    fn test(&self, value: &T) -> bool {
        !self.0.test(value)
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_str("!")?;
        self.0.describe(f)
    }
}

/// Replaces the description of a condition.
pub struct Labeled<C> {
    label: String,
    cond: C,
}

impl<T, C: Condition<T>> Condition<T> for Labeled<C> {
    fn test(&self, value: &T) -> bool {
        self.cond.test(value)
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_str(&self.label)
    }
    fn constant(&self) -> Option<&T> {
        self.cond.constant()
    }
}


/// Reads one token satisfying `C`, shows the value as the token.
pub struct SatisfyPattern<T, C> {
    cond: C,
    _token: PhantomData<fn(&T)>,
}

impl<T, C: Condition<T>> SatisfyPattern<T, C> {
    pub fn new(cond: C) -> SatisfyPattern<T, C> {
        SatisfyPattern { cond, _token: PhantomData }
    }

    pub fn test(&self, value: &T) -> bool {
        self.cond.test(value)
    }

    pub fn labeled(self, label: &str) -> SatisfyPattern<T, Labeled<C>> {
        SatisfyPattern::new(Labeled { label: label.into(), cond: self.cond })
    }
}

impl<T: Clone, C: Condition<T>> Pattern for SatisfyPattern<T, C> {
    type In = T;
    type Out = T;

    fn read(&self, s: &mut dyn Feed<T>) -> ReadResult<T> {
        Ok(s.consume_if(|t| self.cond.test(t)))
    }
    fn show(&self, s: &mut dyn Output<T>, value: &T) -> ShowResult {
        s.put(value.clone());
        Ok(())
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        self.cond.describe(f)
    }
    fn constant(&self) -> Option<&T> {
        self.cond.constant()
    }
}

impl<T, A: Condition<T>, B: Condition<T>> BitAnd<SatisfyPattern<T, B>> for SatisfyPattern<T, A> {
    type Output = SatisfyPattern<T, And<A, B>>;
    fn bitand(self, other: SatisfyPattern<T, B>) -> Self::Output {
        SatisfyPattern::new(And(self.cond, other.cond))
    }
}

impl<T, A: Condition<T>, B: Condition<T>> BitOr<SatisfyPattern<T, B>> for SatisfyPattern<T, A> {
    type Output = SatisfyPattern<T, Or<A, B>>;
    fn bitor(self, other: SatisfyPattern<T, B>) -> Self::Output {
        SatisfyPattern::new(Or(self.cond, other.cond))
    }
}

impl<T, A: Condition<T>> Not for SatisfyPattern<T, A> {
    type Output = SatisfyPattern<T, Negate<A>>;
    fn not(self) -> Self::Output {
        SatisfyPattern::new(Negate(self.cond))
    }
}

pub fn any_item<T>() -> SatisfyPattern<T, AnyItem> {
    SatisfyPattern::new(AnyItem)
}

/// The token `value`; a constant pattern.
pub fn item<T: PartialEq + Debug>(value: T) -> SatisfyPattern<T, EqualTo<T>> {
    SatisfyPattern::new(EqualTo(value))
}

pub fn element_in<T: PartialEq + Debug>(values: impl IntoIterator<Item = T>)
                                        -> SatisfyPattern<T, OneOf<T>> {
    SatisfyPattern::new(OneOf(values.into_iter().collect()))
}

pub fn element_in_range<T: PartialOrd + Debug>(range: RangeInclusive<T>)
                                               -> SatisfyPattern<T, InRange<T>> {
    SatisfyPattern::new(InRange(range))
}

pub fn element_in_ranges<T: PartialOrd + Debug>(ranges: Vec<RangeInclusive<T>>)
                                                -> SatisfyPattern<T, InRanges<T>> {
    SatisfyPattern::new(InRanges(ranges))
}

/// `satisfy("even", |n: &i32| n % 2 == 0)`
pub fn satisfy<T, F: Fn(&T) -> bool>(name: &str, predicate: F)
                                     -> SatisfyPattern<T, FnCondition<F>> {
    SatisfyPattern::new(FnCondition { name: name.into(), predicate })
}


/// Reads `value` without consuming anything.
pub struct Always<T, O> {
    value: O,
    _token: PhantomData<fn(&T)>,
}

pub fn always<T, O: Clone>(value: O) -> Always<T, O> {
    Always { value, _token: PhantomData }
}

impl<T, O: Clone + Debug> Pattern for Always<T, O> {
    type In = T;
    type Out = O;

    fn read(&self, _s: &mut dyn Feed<T>) -> ReadResult<O> {
        Ok(Some(self.value.clone()))
    }
    fn show(&self, _s: &mut dyn Output<T>, _value: &O) -> ShowResult {
        Ok(())
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_fmt(format_args!("(always: {:?})", self.value))
    }
    fn constant(&self) -> Option<&O> {
        Some(&self.value)
    }
}

pub struct Never<T, O>(PhantomData<fn(&T) -> O>);

pub fn never<T, O>() -> Never<T, O> {
    Never(PhantomData)
}

impl<T, O> Pattern for Never<T, O> {
    type In = T;
    type Out = O;

    fn read(&self, _s: &mut dyn Feed<T>) -> ReadResult<O> {
        Ok(None)
    }
    fn show(&self, _s: &mut dyn Output<T>, _value: &O) -> ShowResult {
        Ok(())
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_str("(never)")
    }
}


type OnFail<T, O> = Box<dyn Fn(&mut dyn Feed<T>) -> ReadResult<O>>;

/// Reads `value` if `item` matches the current token and the feed is
/// at its end (the last token was consumed already). Shows nothing.
pub struct StickyEnd<P: Pattern, O> {
    item: P,
    value: O,
    on_fail: Option<OnFail<P::In, O>>,
}

impl<P: Pattern, O> StickyEnd<P, O> {
    pub fn new(item: P, value: O) -> StickyEnd<P, O> {
        StickyEnd { item, value, on_fail: None }
    }

    /// What to read instead when not at the end.
    pub fn on_fail(mut self, on_fail: impl Fn(&mut dyn Feed<P::In>) -> ReadResult<O> + 'static)
                   -> StickyEnd<P, O> {
        self.on_fail = Some(Box::new(on_fail));
        self
    }
}

impl<P, O> Pattern for StickyEnd<P, O>
    where P: Pattern,
          P::In: Clone,
          O: Clone + Debug
{
    type In = P::In;
    type Out = O;

    fn read(&self, s: &mut dyn Feed<P::In>) -> ReadResult<O> {
        if crate::pattern::test_peek(&self.item, s)? && s.is_sticky_end() {
            return Ok(Some(self.value.clone()))
        }
        match &self.on_fail {
            Some(on_fail) => on_fail(s),
            None => Ok(None)
        }
    }
    fn show(&self, _s: &mut dyn Output<P::In>, _value: &O) -> ShowResult {
        Ok(())
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_str("(stickyEnd: ")?;
        self.item.describe(f)?;
        f.write_fmt(format_args!(", {:?})", self.value))
    }
}


/// Lookahead: reads what `item` would read at the current token,
/// consuming nothing. Shows nothing.
pub struct Peek<P>(P);

pub fn peek<P: Pattern>(item: P) -> Peek<P> {
    Peek(item)
}

impl<P> Pattern for Peek<P>
    where P: Pattern,
          P::In: Clone
{
    type In = P::In;
    type Out = P::Out;

    fn read(&self, s: &mut dyn Feed<P::In>) -> ReadResult<P::Out> {
        self.0.read(&mut Filter::peeking(s))
    }
    fn show(&self, _s: &mut dyn Output<P::In>, _value: &P::Out) -> ShowResult {
        Ok(())
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_str("&")?;
        self.0.describe(f)
    }
}


type NoKey<K, V> = Box<dyn Fn(&mut dyn Feed<K>, &K) -> ReadResult<V>>;

/// One token looked up in a map. A value mapped from several keys
/// shows as the first of them in the order given to
/// [new](MapPattern::new).
pub struct MapPattern<K, V> {
    map: HashMap<K, V>,
    reverse: Vec<(V, K)>,
    no_key: Option<NoKey<K, V>>,
}

impl<K: Hash + Eq + Clone, V: Clone + PartialEq> MapPattern<K, V> {
    pub fn new(entries: impl IntoIterator<Item = (K, V)>) -> MapPattern<K, V> {
        let mut map = HashMap::new();
        let mut reverse: Vec<(V, K)> = Vec::new();
        for (k, v) in entries {
            if !reverse.iter().any(|(rv, _)| *rv == v) {
                reverse.push((v.clone(), k.clone()));
            }
            map.insert(k, v);
        }
        MapPattern { map, reverse, no_key: None }
    }

    pub fn no_key(mut self, no_key: impl Fn(&mut dyn Feed<K>, &K) -> ReadResult<V> + 'static)
                  -> MapPattern<K, V> {
        self.no_key = Some(Box::new(no_key));
        self
    }
}

impl<K, V> Pattern for MapPattern<K, V>
    where K: Hash + Eq + Clone + Debug,
          V: Clone + PartialEq + Debug
{
    type In = K;
    type Out = V;

    fn read(&self, s: &mut dyn Feed<K>) -> ReadResult<V> {
        let key = s.peek().clone();
        match self.map.get(&key) {
            None => match &self.no_key {
                Some(no_key) => no_key(s, &key),
                None => Ok(None)
            },
            Some(value) =>
                if s.is_sticky_end() {
                    Ok(None)
                } else {
                    Ok(Some(value.clone()))
                }
        }
    }
    fn show(&self, s: &mut dyn Output<K>, value: &V) -> ShowResult {
        let key = self.reverse.iter()
            .find(|(v, _)| v == value)
            .map(|(_, k)| k.clone())
            .ok_or(ShowError::NotRegistered)?;
        s.put(key);
        Ok(())
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_fmt(format_args!("(map: {} keys)", self.map.len()))
    }
}
