// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error recovery. Both strategies report through
//! [Feed::error](Feed::error), hence they only continue on inputs
//! collecting errors; a raising input stops at the report.

use crate::atom::{Condition, SatisfyPattern};
use crate::error::{ReadResult, ShowResult};
use crate::feed::{Counted, Feed};
use crate::pattern::{Describe, Output, Pattern};
use std::fmt::{Debug, Display, Formatter};

/// Makes the message of a recovery report, from the input at the
/// point of failure.
pub type Messager<T> = Box<dyn Fn(&mut dyn Feed<T>) -> String>;

/// "unexpected <token>, expecting <expecting>"
pub fn unexpected<T: Debug>(expecting: impl Display) -> impl Fn(&mut dyn Feed<T>) -> String {
    let expecting = expecting.to_string();
    move |s| format!("unexpected {:?}, expecting {}", s.peek(), expecting)
}

/// A satisfy pattern that, failing, reports and then skips tokens
/// until it matches again (or the input ends).
pub struct SatisfyClam<T, C> {
    item: SatisfyPattern<T, C>,
    messager: Messager<T>,
}

impl<T: Clone + Debug + 'static, C: Condition<T>> SatisfyPattern<T, C> {
    pub fn clam(self, messager: impl Fn(&mut dyn Feed<T>) -> String + 'static)
                -> SatisfyClam<T, C> {
        SatisfyClam { item: self, messager: Box::new(messager) }
    }

    /// [clam](SatisfyPattern::clam) with the [unexpected](unexpected)
    /// message.
    pub fn clam_unexpected(self) -> SatisfyClam<T, C> {
        let expecting = Describe(&self).to_string();
        self.clam(unexpected(expecting))
    }
}

impl<T: Clone, C: Condition<T>> Pattern for SatisfyClam<T, C> {
    type In = T;
    type Out = T;

    fn read(&self, s: &mut dyn Feed<T>) -> ReadResult<T> {
        if let Some(v) = self.item.read(s)? {
            return Ok(Some(v))
        }
        let message = (self.messager)(s);
        s.error(message)?;
        loop {
            if s.consume().is_err() {
                return Ok(None)
            }
            if let Some(v) = self.item.read(s)? {
                return Ok(Some(v))
            }
        }
    }
    fn show(&self, s: &mut dyn Output<T>, value: &T) -> ShowResult {
        self.item.show(s, value)
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        self.item.describe(f)
    }
    fn constant(&self) -> Option<&T> {
        self.item.constant()
    }
}


/// A pattern that, failing, reports once, skips whatever `skip`
/// reads, and yields `default`. Made by
/// [PatternExt::clam_while](crate::pattern::PatternExt::clam_while).
pub struct ClamWhile<P: Pattern, S> {
    item: P,
    skip: S,
    default: P::Out,
    messager: Messager<P::In>,
}

impl<P: Pattern, S> ClamWhile<P, S> {
    pub fn new(item: P, skip: S, default: P::Out,
               messager: impl Fn(&mut dyn Feed<P::In>) -> String + 'static)
               -> ClamWhile<P, S> {
        ClamWhile { item, skip, default, messager: Box::new(messager) }
    }
}

impl<P, S> Pattern for ClamWhile<P, S>
    where P: Pattern,
          P::Out: Clone,
          S: Pattern<In = P::In>
{
    type In = P::In;
    type Out = P::Out;

    fn read(&self, s: &mut dyn Feed<P::In>) -> ReadResult<P::Out> {
        if let Some(v) = self.item.read(s)? {
            return Ok(Some(v))
        }
        let message = (self.messager)(s);
        s.error(message)?;
        loop {
            let mut counted = Counted::new(s);
            if self.skip.read(&mut counted)?.is_none() || counted.consumed() == 0 {
                break
            }
        }
        Ok(Some(self.default.clone()))
    }
    fn show(&self, s: &mut dyn Output<P::In>, value: &P::Out) -> ShowResult {
        self.item.show(s, value)
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        self.item.describe(f)
    }
    fn default_value(&self) -> Option<&P::Out> {
        Some(&self.default)
    }
}
