// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Token streams with one token of lookahead.
//!
//! Notes about feeds:
//!
//! * A feed cannot be constructed from empty input.
//!
//! * Once all tokens are consumed, `peek` yields the last token
//!   *again* ("sticky end"), and `consume` returns [End](End).
//!   Patterns detect termination by peeking; `consume` failing is the
//!   exceptional case.
//!
//! * Patterns like `Until(item(' '), as_string(), any_item())` fail
//!   at the end of input; easiest workaround is to append a
//!   terminating token to the actual input.

use crate::error::{End, ParseError};
use crate::location::SourceLocation;
use crate::state::StateMap;

pub trait Feed<T> {
    fn peek(&self) -> &T;
    fn consume(&mut self) -> Result<T, End>;

    /// All tokens were consumed: `peek` keeps returning the last one,
    /// `consume` fails.
    fn at_end(&self) -> bool;

    /// Report a hard error. Raising inputs return `Err`, collecting
    /// inputs record the message and return `Ok(())`, in which case
    /// the caller continues with some recovery value.
    fn error(&mut self, message: String) -> Result<(), ParseError> {
        Err(ParseError::Failed(message))
    }

    fn source_loc(&self) -> Option<&SourceLocation> {
        None
    }

    fn state(&mut self) -> Option<&mut StateMap> {
        None
    }
}

impl<'f, T, F: Feed<T> + ?Sized> Feed<T> for &'f mut F {
    fn peek(&self) -> &T {
        (**self).peek()
    }
    fn consume(&mut self) -> Result<T, End> {
        (**self).consume()
    }
    fn at_end(&self) -> bool {
        (**self).at_end()
    }
    fn error(&mut self, message: String) -> Result<(), ParseError> {
        (**self).error(message)
    }
    fn source_loc(&self) -> Option<&SourceLocation> {
        (**self).source_loc()
    }
    fn state(&mut self) -> Option<&mut StateMap> {
        (**self).state()
    }
}

pub trait FeedExt<T>: Feed<T> {
    fn consume_or_none(&mut self) -> Option<T> {
        self.consume().ok()
    }

    fn consume_if(&mut self, pred: impl Fn(&T) -> bool) -> Option<T> {
        if pred(self.peek()) {
            self.consume_or_none()
        } else {
            None
        }
    }

    /// Consume tokens as long as they satisfy `pred`, never past the
    /// end.
    fn take_while(&mut self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        let mut v = Vec::new();
        while let Some(t) = self.consume_if(&pred) {
            v.push(t);
        }
        v
    }

    /// Consumes a token unless at the end already.
    fn is_sticky_end(&mut self) -> bool {
        self.consume_or_none().is_none()
    }

    fn collect_all(&mut self) -> Vec<T> {
        let mut v = Vec::new();
        while let Some(t) = self.consume_or_none() {
            v.push(t);
        }
        v
    }
}

impl<T, F: Feed<T> + ?Sized> FeedExt<T> for F {}


/// Feed over tokens held in memory.
#[derive(Debug, Clone)]
pub struct SliceFeed<T> {
    items: Vec<T>,
    position: usize,
}

impl<T: Clone> SliceFeed<T> {
    pub fn new(items: Vec<T>) -> Result<SliceFeed<T>, ParseError> {
        if items.is_empty() {
            return Err(ParseError::EmptyInput)
        }
        Ok(SliceFeed { items, position: 0 })
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

impl<T: Clone> Feed<T> for SliceFeed<T> {
    fn peek(&self) -> &T {
        &self.items[self.position.min(self.items.len() - 1)]
    }
    fn consume(&mut self) -> Result<T, End> {
        if let Some(t) = self.items.get(self.position) {
            self.position += 1;
            Ok(t.clone())
        } else {
            Err(End)
        }
    }
    fn at_end(&self) -> bool {
        self.position >= self.items.len()
    }
}


/// Feed pulling from an iterator, buffering one token. The last
/// token stays buffered after it was consumed, for `peek`.
pub struct IteratorFeed<I: Iterator> {
    iter: I,
    next_one: I::Item,
    tail_consumed: bool,
}

impl<I> IteratorFeed<I>
    where I: Iterator,
          I::Item: Clone
{
    pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Result<IteratorFeed<I>, ParseError> {
        let mut iter = iter.into_iter();
        if let Some(next_one) = iter.next() {
            Ok(IteratorFeed { iter, next_one, tail_consumed: false })
        } else {
            Err(ParseError::EmptyInput)
        }
    }
}

impl<I> Feed<I::Item> for IteratorFeed<I>
    where I: Iterator,
          I::Item: Clone
{
    fn peek(&self) -> &I::Item {
        &self.next_one
    }
    fn consume(&mut self) -> Result<I::Item, End> {
        if self.tail_consumed {
            return Err(End)
        }
        if let Some(t) = self.iter.next() {
            Ok(std::mem::replace(&mut self.next_one, t))
        } else {
            self.tail_consumed = true;
            Ok(self.next_one.clone())
        }
    }
    fn at_end(&self) -> bool {
        self.tail_consumed
    }
}


/// A feed of exactly one token, for trying patterns without
/// advancing the real stream.
#[derive(Debug, Clone)]
pub struct SingleFeed<T> {
    value: T,
    consumed: bool,
}

impl<T> SingleFeed<T> {
    pub fn new(value: T) -> SingleFeed<T> {
        SingleFeed { value, consumed: false }
    }
}

impl<T: Clone> Feed<T> for SingleFeed<T> {
    fn peek(&self) -> &T {
        &self.value
    }
    fn consume(&mut self) -> Result<T, End> {
        if self.consumed {
            Err(End)
        } else {
            self.consumed = true;
            Ok(self.value.clone())
        }
    }
    fn at_end(&self) -> bool {
        self.consumed
    }
}


/// A child feed reading from `feed` while reporting errors, source
/// locations and state through `parent`.
pub struct Filter<'p, T, F> {
    parent: &'p mut dyn Feed<T>,
    feed: F,
}

impl<'p, T, F: Feed<T>> Filter<'p, T, F> {
    pub fn new(parent: &'p mut dyn Feed<T>, feed: F) -> Filter<'p, T, F> {
        Filter { parent, feed }
    }
}

impl<'p, T: Clone> Filter<'p, T, SingleFeed<T>> {
    /// Lookahead of the current token of `parent`.
    pub fn peeking(parent: &'p mut dyn Feed<T>) -> Filter<'p, T, SingleFeed<T>> {
        let feed = SingleFeed::new(parent.peek().clone());
        Filter { parent, feed }
    }
}

impl<'p, T, F: Feed<T>> Feed<T> for Filter<'p, T, F> {
    fn peek(&self) -> &T {
        self.feed.peek()
    }
    fn consume(&mut self) -> Result<T, End> {
        self.feed.consume()
    }
    fn at_end(&self) -> bool {
        self.feed.at_end()
    }
    fn error(&mut self, message: String) -> Result<(), ParseError> {
        self.parent.error(message)
    }
    fn source_loc(&self) -> Option<&SourceLocation> {
        self.parent.source_loc()
    }
    fn state(&mut self) -> Option<&mut StateMap> {
        self.parent.state()
    }
}


/// Reads through `parent`, counting the tokens consumed.
pub struct Counted<'p, T> {
    parent: &'p mut dyn Feed<T>,
    consumed: usize,
}

impl<'p, T> Counted<'p, T> {
    pub fn new(parent: &'p mut dyn Feed<T>) -> Counted<'p, T> {
        Counted { parent, consumed: 0 }
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl<'p, T> Feed<T> for Counted<'p, T> {
    fn peek(&self) -> &T {
        self.parent.peek()
    }
    fn consume(&mut self) -> Result<T, End> {
        let t = self.parent.consume()?;
        self.consumed += 1;
        Ok(t)
    }
    fn at_end(&self) -> bool {
        self.parent.at_end()
    }
    fn error(&mut self, message: String) -> Result<(), ParseError> {
        self.parent.error(message)
    }
    fn source_loc(&self) -> Option<&SourceLocation> {
        self.parent.source_loc()
    }
    fn state(&mut self) -> Option<&mut StateMap> {
        self.parent.state()
    }
}
