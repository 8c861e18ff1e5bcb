// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The pattern contract: every pattern can `read` a value from a
//! [Feed](Feed) of tokens and `show` a value back as tokens into an
//! [Output](Output).
//!
//! Reading has two ways of failing: `Ok(None)` ("not parsed") is the
//! soft failure that combinators act upon, `Err` is fatal. Not
//! parsed does *not* mean that no tokens were consumed: there is no
//! backtracking. Alternatives have to be prefix-disjoint or guarded
//! by [peek](crate::atom::peek).
//!
//! Round trip: for a value `v` read by pattern `p`, reading the
//! output of `p.show(v)` with `p` gives `v` again.

use crate::ccdp::{AlsoDo, Convert, Named, Optional, Piped, ShowBy, ToConstant,
                  no_inverse};
use crate::error::{ErrorRecord, ParseError, ReadResult, RoundTripError,
                   ShowError, ShowResult};
use crate::feed::{Feed, Filter, SingleFeed};
use crate::input::{input_of_items, input_of_reader, input_of_str};
use crate::recover::ClamWhile;
use crate::sjit::SurroundBy;
use std::fmt::{Debug, Display, Formatter};
use std::io::Read;
use std::rc::Rc;

/// File tag of inputs read from strings.
pub const STRING_FILE: &str = "<string>";

/// Sink for the tokens written by [Pattern::show](Pattern::show).
pub trait Output<T> {
    fn put(&mut self, item: T);
}

impl<T> Output<T> for Vec<T> {
    fn put(&mut self, item: T) {
        self.push(item)
    }
}

impl Output<char> for String {
    fn put(&mut self, item: char) {
        self.push(item)
    }
}

pub trait Pattern {
    /// The token type.
    type In;
    /// The value type.
    type Out;

    fn read(&self, s: &mut dyn Feed<Self::In>) -> ReadResult<Self::Out>;
    fn show(&self, s: &mut dyn Output<Self::In>, value: &Self::Out) -> ShowResult;

    /// Human readable description of the grammar, for diagnostics.
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error>;

    /// The value of an optional pattern, used when nothing is
    /// parsed.
    fn default_value(&self) -> Option<&Self::Out> {
        None
    }

    /// The single value a constant pattern shows, e.g. a bracket.
    fn constant(&self) -> Option<&Self::Out> {
        None
    }
}

/// Boxed patterns, used where cases of different types are held
/// together.
pub type DynPattern<T, O> = Box<dyn Pattern<In = T, Out = O>>;

macro_rules! forward_pattern {
    () => {
        fn read(&self, s: &mut dyn Feed<Self::In>) -> ReadResult<Self::Out> {
            (**self).read(s)
        }
        fn show(&self, s: &mut dyn Output<Self::In>, value: &Self::Out) -> ShowResult {
            (**self).show(s, value)
        }
        fn describe(&self, f: &mut Formatter<'_>)
                    -> Result<(), std::fmt::Error> {
            (**self).describe(f)
        }
        fn default_value(&self) -> Option<&Self::Out> {
            (**self).default_value()
        }
        fn constant(&self) -> Option<&Self::Out> {
            (**self).constant()
        }
    }
}

impl<P: Pattern + ?Sized> Pattern for Box<P> {
    type In = P::In;
    type Out = P::Out;
    forward_pattern!();
}

impl<P: Pattern + ?Sized> Pattern for Rc<P> {
    type In = P::In;
    type Out = P::Out;
    forward_pattern!();
}

impl<'p, P: Pattern + ?Sized> Pattern for &'p P {
    type In = P::In;
    type Out = P::Out;
    forward_pattern!();
}

// Hack to get access to a Formatter, since Formatter::new is
// inaccessible:
pub struct Describe<'p, P: ?Sized>(pub &'p P);

impl<'p, P: Pattern + ?Sized> Display for Describe<'p, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        self.0.describe(f)
    }
}

/// Whether `pattern` would read at the current token of `s`, without
/// advancing `s`. Errors raised by `pattern` still go to `s`.
pub fn test_peek<P>(pattern: &P, s: &mut dyn Feed<P::In>) -> Result<bool, ParseError>
    where P: Pattern + ?Sized,
          P::In: Clone
{
    let mut lookahead = Filter::peeking(s);
    Ok(pattern.read(&mut lookahead)?.is_some())
}


/// Building and running patterns. Implemented for every pattern.
pub trait PatternExt: Pattern + Sized {
    fn description(&self) -> String {
        format!("{}", Describe(self))
    }

    // ---- entry points ---------------------------------------------

    fn read_str(&self, text: &str) -> ReadResult<Self::Out>
        where Self: Pattern<In = char>
    {
        let mut input = input_of_str(text, STRING_FILE)?;
        self.read(&mut input)
    }

    fn read_items(&self, items: Vec<Self::In>) -> ReadResult<Self::Out>
        where Self::In: Clone + Debug
    {
        let mut input = input_of_items(items)?;
        self.read(&mut input)
    }

    /// Read with errors collected instead of raised.
    fn read_partial_str(&self, text: &str)
                        -> Result<(Vec<ErrorRecord<char>>, Option<Self::Out>),
                                  ParseError>
        where Self: Pattern<In = char>
    {
        let mut input = input_of_str(text, STRING_FILE)?.collect_errors();
        let value = self.read(&mut input)?;
        Ok((input.take_errors(), value))
    }

    fn read_partial_items(&self, items: Vec<Self::In>)
                          -> Result<(Vec<ErrorRecord<Self::In>>, Option<Self::Out>),
                                    ParseError>
        where Self::In: Clone + Debug
    {
        let mut input = input_of_items(items)?.collect_errors();
        let value = self.read(&mut input)?;
        Ok((input.take_errors(), value))
    }

    /// Read characters decoded from `fh`; a decoding failure is
    /// reported as [ParseError::Io](ParseError::Io).
    fn read_from(&self, fh: impl Read, file: &str) -> ReadResult<Self::Out>
        where Self: Pattern<In = char>
    {
        let mut input = input_of_reader(fh, file)?;
        let value = self.read(&mut input)?;
        if let Some(e) = input.feed_mut().take_io_error() {
            return Err(ParseError::Io(e))
        }
        Ok(value)
    }

    fn show_string(&self, value: &Self::Out) -> Result<String, ShowError>
        where Self: Pattern<In = char>
    {
        let mut out = String::new();
        self.show(&mut out, value)?;
        Ok(out)
    }

    fn show_items(&self, value: &Self::Out) -> Result<Vec<Self::In>, ShowError> {
        let mut out = Vec::new();
        self.show(&mut out, value)?;
        Ok(out)
    }

    /// `show(read(text))`, for checking round trips.
    fn rebuild_str(&self, text: &str) -> Result<Option<String>, RoundTripError>
        where Self: Pattern<In = char>
    {
        match self.read_str(text)? {
            Some(v) => Ok(Some(self.show_string(&v)?)),
            None => Ok(None)
        }
    }

    fn rebuild_items(&self, items: Vec<Self::In>)
                     -> Result<Option<Vec<Self::In>>, RoundTripError>
        where Self::In: Clone + Debug
    {
        match self.read_items(items)? {
            Some(v) => Ok(Some(self.show_items(&v)?)),
            None => Ok(None)
        }
    }

    /// Whether the pattern reads the single token `value`.
    fn test_item(&self, value: Self::In) -> Result<bool, ParseError>
        where Self::In: Clone
    {
        Ok(self.read(&mut SingleFeed::new(value))?.is_some())
    }

    // ---- adapters -------------------------------------------------

    fn named(self, name: &str) -> Named<Self> {
        Named::new(self, name)
    }

    /// Make the pattern optional: `default` is read when it fails.
    fn to_default(self, default: Self::Out) -> Optional<Self> {
        Optional::new(self, default)
    }

    fn to_constant(self, constant: Self::Out) -> ToConstant<Self> {
        ToConstant::new(self, constant)
    }

    fn show_by<F>(self, show: F) -> ShowBy<Self, F>
        where F: Fn(&mut dyn Output<Self::In>, &Self::Out) -> ShowResult
    {
        ShowBy::new(self, show)
    }

    /// Run `op` on every successfully read value.
    fn also_do<F>(self, op: F) -> AlsoDo<Self, F>
        where F: Fn(&mut dyn Feed<Self::In>, &Self::Out)
    {
        AlsoDo::new(self, op)
    }

    fn piped<F>(self, op: F) -> Piped<Self, F>
        where F: Fn(&mut dyn Feed<Self::In>, Option<Self::Out>) -> ReadResult<Self::Out>
    {
        Piped::new(self, op)
    }

    fn convert<O, F, G>(self, from: F, to: G) -> Convert<Self, F, G, O>
        where F: Fn(Self::Out) -> O,
              G: Fn(&O) -> Option<Self::Out>
    {
        Convert::new(self, from, to)
    }

    /// A conversion without inverse; `show` on it fails.
    fn convert_forward<O, F>(self, from: F)
                             -> Convert<Self, F, fn(&O) -> Option<Self::Out>, O>
        where F: Fn(Self::Out) -> O
    {
        Convert::new(self, from, no_inverse::<O, Self::Out>)
    }

    /// On failure, report the message made by `messager`, skip
    /// whatever `skip` reads, and yield `default`.
    fn clam_while<S, M>(self, skip: S, default: Self::Out, messager: M)
                        -> ClamWhile<Self, S>
        where S: Pattern<In = Self::In>,
              M: Fn(&mut dyn Feed<Self::In>) -> String + 'static
    {
        ClamWhile::new(self, skip, default, messager)
    }

    fn prefix<L>(self, left: L) -> SurroundBy<Self::In, Self>
        where L: Pattern<In = Self::In> + 'static
    {
        SurroundBy::prefix(left, self)
    }

    fn suffix<R>(self, right: R) -> SurroundBy<Self::In, Self>
        where R: Pattern<In = Self::In> + 'static
    {
        SurroundBy::suffix(right, self)
    }

    fn surround<L, R>(self, left: L, right: R) -> SurroundBy<Self::In, Self>
        where L: Pattern<In = Self::In> + 'static,
              R: Pattern<In = Self::In> + 'static
    {
        SurroundBy::new(left, right, self)
    }

    // ---- pairs ----------------------------------------------------

    fn discard_first<A, B>(self) -> Convert<Self, fn((A, B)) -> B, fn(&B) -> Option<(A, B)>, B>
        where Self: Pattern<Out = (A, B)>
    {
        Convert::new(self, |(_, b)| b, no_inverse::<B, (A, B)>)
    }

    fn discard_second<A, B>(self) -> Convert<Self, fn((A, B)) -> A, fn(&A) -> Option<(A, B)>, A>
        where Self: Pattern<Out = (A, B)>
    {
        Convert::new(self, |(a, _)| a, no_inverse::<A, (A, B)>)
    }

    /// Keep the second part; `show` recomputes the first from it.
    fn merge_first<A, B, F>(self, first: F) -> impl Pattern<In = Self::In, Out = B>
        where Self: Pattern<Out = (A, B)>,
              B: Clone,
              F: Fn(&B) -> A
    {
        Convert::new(self, |(_, b): (A, B)| b, move |b: &B| Some((first(b), b.clone())))
    }

    /// Keep the first part; `show` recomputes the second from it.
    fn merge_second<A, B, F>(self, second: F) -> impl Pattern<In = Self::In, Out = A>
        where Self: Pattern<Out = (A, B)>,
              A: Clone,
              F: Fn(&A) -> B
    {
        Convert::new(self, |(a, _): (A, B)| a, move |a: &A| Some((a.clone(), second(a))))
    }
}

impl<P: Pattern> PatternExt for P {}
