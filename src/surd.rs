// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Sequence, Until, Repeat, Decide.
//!
//! Tuples of patterns are sequences: `(item('a'), any_item())` reads
//! two tokens into a pair. [Seq](Seq) is the variant for any number
//! of patterns of the same type.
//!
//! None of these rewind the input: a sequence failing in its second
//! slot has consumed what the first slot read, and so has a failing
//! case of [Decide](Decide) for the next case.

use crate::error::{ParseError, ReadResult, ShowError, ShowResult};
use crate::feed::Feed;
use crate::fold::{Fold, Reducer};
use crate::pattern::{DynPattern, Output, Pattern, test_peek};
use std::fmt::Formatter;
use std::ops::RangeInclusive;

macro_rules! tuple_pattern {
    ($first:ident $($name:ident)+; $($idx:tt)+) => {
        impl<$first: Pattern, $($name: Pattern<In = $first::In>),+> Pattern
            for ($first, $($name),+)
        {
            type In = $first::In;
            type Out = ($first::Out, $($name::Out),+);

            fn read(&self, s: &mut dyn Feed<Self::In>) -> ReadResult<Self::Out> {
                Ok(Some(($(
                    match self.$idx.read(s)? {
                        Some(v) => v,
                        None => return Ok(None)
                    }
                ),+)))
            }
            fn show(&self, s: &mut dyn Output<Self::In>, value: &Self::Out) -> ShowResult {
                $( self.$idx.show(s, &value.$idx)?; )+
                Ok(())
            }
            fn describe(&self, f: &mut Formatter<'_>)
                        -> Result<(), std::fmt::Error> {
                f.write_str("(")?;
                $(
                    if $idx > 0 {
                        f.write_str(" ")?;
                    }
                    self.$idx.describe(f)?;
                )+
                f.write_str(")")
            }
        }
    }
}

tuple_pattern!(A B; 0 1);
tuple_pattern!(A B C; 0 1 2);
tuple_pattern!(A B C D; 0 1 2 3);
tuple_pattern!(A B C D E; 0 1 2 3 4);
tuple_pattern!(A B C D E G; 0 1 2 3 4 5);


/// Patterns of the same type in sequence, read into a `Vec` of
/// their values.
pub struct Seq<P>(pub Vec<P>);

impl<P: Pattern> Pattern for Seq<P> {
    type In = P::In;
    type Out = Vec<P::Out>;

    fn read(&self, s: &mut dyn Feed<P::In>) -> ReadResult<Vec<P::Out>> {
        let mut values = Vec::with_capacity(self.0.len());
        for p in &self.0 {
            match p.read(s)? {
                Some(v) => values.push(v),
                None => return Ok(None)
            }
        }
        Ok(Some(values))
    }
    fn show(&self, s: &mut dyn Output<P::In>, value: &Vec<P::Out>) -> ShowResult {
        if value.len() != self.0.len() {
            return Err(ShowError::TupleSize { expected: self.0.len(), got: value.len() })
        }
        for (p, v) in self.0.iter().zip(value) {
            p.show(s, v)?;
        }
        Ok(())
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_str("(")?;
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            p.describe(f)?;
        }
        f.write_str(")")
    }
}


// A reducer refusing an item is reported as error; the repetition is
// then not parsed.
fn accept_or_report<T, I, R: Reducer<T>>(reducer: &mut R, value: T,
                                         s: &mut dyn Feed<I>)
                                         -> Result<bool, ParseError> {
    match reducer.accept(value) {
        Ok(()) => Ok(true),
        Err(e) => {
            s.error(e.0)?;
            Ok(false)
        }
    }
}

fn show_unfolded<F, P>(fold: &F, item: &P, s: &mut dyn Output<P::In>, value: &F::Output)
                       -> ShowResult
    where P: Pattern,
          F: Fold<P::Out>
{
    for v in fold.unfold(value)? {
        item.show(s, &v)?;
    }
    Ok(())
}

/// Reads `item`s until `terminate` matches the current token. The
/// terminating token is not consumed.
pub struct Until<Tm, F, P> {
    terminate: Tm,
    fold: F,
    item: P,
}

impl<Tm, F, P> Until<Tm, F, P> {
    pub fn new(terminate: Tm, fold: F, item: P) -> Until<Tm, F, P> {
        Until { terminate, fold, item }
    }
}

impl<Tm, F, P> Pattern for Until<Tm, F, P>
    where P: Pattern,
          P::In: Clone,
          Tm: Pattern<In = P::In>,
          F: Fold<P::Out>
{
    type In = P::In;
    type Out = F::Output;

    fn read(&self, s: &mut dyn Feed<P::In>) -> ReadResult<F::Output> {
        let mut reducer = self.fold.reducer();
        while !test_peek(&self.terminate, s)? {
            let parsed = match self.item.read(s)? {
                Some(v) => v,
                None => return Ok(None)
            };
            if !accept_or_report(&mut reducer, parsed, s)? {
                return Ok(None)
            }
        }
        Ok(Some(reducer.finish()))
    }
    fn show(&self, s: &mut dyn Output<P::In>, value: &F::Output) -> ShowResult {
        show_unfolded(&self.fold, &self.item, s, value)
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        self.item.describe(f)?;
        f.write_str("~")?;
        self.terminate.describe(f)
    }
}


/// Repetition count limits of [Repeat](Repeat).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: usize,
    pub max: usize,
    /// Greedy repetition reads up to `max` items, non-greedy stops
    /// as soon as `min` items were read.
    pub greedy: bool,
}

impl Bounds {
    pub fn new(range: RangeInclusive<usize>, greedy: bool) -> Bounds {
        Bounds { min: *range.start(), max: *range.end(), greedy }
    }

    pub fn contains(&self, count: usize) -> bool {
        self.min <= count && count <= self.max
    }

    fn limit(&self) -> usize {
        if self.greedy { self.max } else { self.min }
    }
}

impl Default for Bounds {
    fn default() -> Bounds {
        Bounds::new(1..=usize::MAX, true)
    }
}

/// Reads `item` repeatedly, one or more times by default.
pub struct Repeat<F, P>
    where P: Pattern,
          F: Fold<P::Out>
{
    fold: F,
    item: P,
    bounds: Bounds,
    default: Option<F::Output>,
}

impl<F, P> Repeat<F, P>
    where P: Pattern,
          F: Fold<P::Out>
{
    pub fn new(fold: F, item: P) -> Repeat<F, P> {
        Repeat { fold, item, bounds: Bounds::default(), default: None }
    }

    pub fn in_bounds(mut self, range: RangeInclusive<usize>, greedy: bool) -> Repeat<F, P> {
        self.bounds = Bounds::new(range, greedy);
        self
    }

    /// Zero or more times; also an optional pattern, with the fold of
    /// nothing as default value.
    pub fn many(mut self) -> Repeat<F, P> {
        self.bounds = Bounds::new(0..=usize::MAX, true);
        self.default = Some(self.fold.reducer().finish());
        self
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

impl<F, P> Pattern for Repeat<F, P>
    where P: Pattern,
          F: Fold<P::Out>
{
    type In = P::In;
    type Out = F::Output;

    fn read(&self, s: &mut dyn Feed<P::In>) -> ReadResult<F::Output> {
        let mut reducer = self.fold.reducer();
        let mut count = 0;
        while count < self.bounds.limit() {
            let parsed = match self.item.read(s)? {
                Some(v) => v,
                None => break
            };
            if !accept_or_report(&mut reducer, parsed, s)? {
                return Ok(None)
            }
            count += 1;
        }
        if self.bounds.contains(count) {
            Ok(Some(reducer.finish()))
        } else {
            Ok(None)
        }
    }
    fn show(&self, s: &mut dyn Output<P::In>, value: &F::Output) -> ShowResult {
        let items = self.fold.unfold(value)?;
        if !self.bounds.contains(items.len()) {
            return Err(ShowError::RepeatCount {
                count: items.len(),
                min: self.bounds.min,
                max: self.bounds.max,
            })
        }
        for v in &items {
            self.item.show(s, v)?;
        }
        Ok(())
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_str("{")?;
        self.item.describe(f)?;
        f.write_str("}")?;
        if self.default.is_some() {
            f.write_str("?")
        } else if self.bounds != Bounds::default() {
            f.write_fmt(format_args!("({}..={}){}",
                                     self.bounds.min,
                                     self.bounds.max,
                                     if self.bounds.greedy { "g" } else { "" }))
        } else {
            Ok(())
        }
    }
    fn default_value(&self) -> Option<&F::Output> {
        self.default.as_ref()
    }
}


/// Ordered choice: the first case reading successfully wins, its
/// index is kept in the value so that `show` can use the same case.
pub struct Decide<T, O> {
    cases: Vec<DynPattern<T, O>>,
}

impl<T: 'static, O: 'static> Decide<T, O> {
    pub fn new() -> Decide<T, O> {
        Decide { cases: Vec::new() }
    }

    pub fn case(mut self, case: impl Pattern<In = T, Out = O> + 'static) -> Decide<T, O> {
        self.cases.push(Box::new(case));
        self
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

impl<T: 'static, O: 'static> Default for Decide<T, O> {
    fn default() -> Self {
        Decide::new()
    }
}

impl<T, O> Pattern for Decide<T, O> {
    type In = T;
    type Out = (usize, O);

    fn read(&self, s: &mut dyn Feed<T>) -> ReadResult<(usize, O)> {
        for (i, case) in self.cases.iter().enumerate() {
            if let Some(v) = case.read(s)? {
                return Ok(Some((i, v)))
            }
        }
        Ok(None)
    }
    fn show(&self, s: &mut dyn Output<T>, value: &(usize, O)) -> ShowResult {
        let (i, v) = value;
        let case = self.cases.get(*i).ok_or(ShowError::BadCase {
            index: *i,
            cases: self.cases.len(),
        })?;
        case.show(s, v)
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_str("(")?;
        for (i, case) in self.cases.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            case.describe(f)?;
        }
        f.write_str(")")
    }
}
