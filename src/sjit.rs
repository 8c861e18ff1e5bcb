// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Brackets around an item, and items joined by separators.

use crate::ccdp::Convert;
use crate::error::{ParseError, ReadResult, ShowError, ShowResult};
use crate::feed::Feed;
use crate::pattern::{Describe, Output, Pattern};
use std::fmt::Formatter;

/// A pattern used as bracket: only whether it reads matters, and it
/// shows its constant.
pub trait Bracket<T> {
    fn read_bracket(&self, s: &mut dyn Feed<T>) -> Result<bool, ParseError>;
    fn show_bracket(&self, s: &mut dyn Output<T>) -> ShowResult;
    fn describe_bracket(&self, f: &mut Formatter<'_>)
                        -> Result<(), std::fmt::Error>;
}

impl<P: Pattern> Bracket<P::In> for P {
    fn read_bracket(&self, s: &mut dyn Feed<P::In>) -> Result<bool, ParseError> {
        Ok(self.read(s)?.is_some())
    }
    fn show_bracket(&self, s: &mut dyn Output<P::In>) -> ShowResult {
        match self.constant() {
            Some(c) => self.show(s, c),
            None => Err(ShowError::NoConstant)
        }
    }
    fn describe_bracket(&self, f: &mut Formatter<'_>)
                        -> Result<(), std::fmt::Error> {
        self.describe(f)
    }
}

pub struct SurroundBy<T, P> {
    left: Option<Box<dyn Bracket<T>>>,
    right: Option<Box<dyn Bracket<T>>>,
    item: P,
}

impl<T, P: Pattern<In = T>> SurroundBy<T, P> {
    pub fn new(left: impl Pattern<In = T> + 'static,
               right: impl Pattern<In = T> + 'static,
               item: P) -> SurroundBy<T, P> {
        SurroundBy { left: Some(Box::new(left)), right: Some(Box::new(right)), item }
    }

    pub fn prefix(left: impl Pattern<In = T> + 'static, item: P) -> SurroundBy<T, P> {
        SurroundBy { left: Some(Box::new(left)), right: None, item }
    }

    pub fn suffix(right: impl Pattern<In = T> + 'static, item: P) -> SurroundBy<T, P> {
        SurroundBy { left: None, right: Some(Box::new(right)), item }
    }
}

impl<T, P: Pattern<In = T>> Pattern for SurroundBy<T, P> {
    type In = T;
    type Out = P::Out;

    fn read(&self, s: &mut dyn Feed<T>) -> ReadResult<P::Out> {
        if let Some(left) = &self.left {
            if !left.read_bracket(s)? {
                return Ok(None)
            }
        }
        let parsed = match self.item.read(s)? {
            Some(v) => v,
            None => return Ok(None)
        };
        if let Some(right) = &self.right {
            if !right.read_bracket(s)? {
                return Ok(None)
            }
        }
        Ok(Some(parsed))
    }
    fn show(&self, s: &mut dyn Output<T>, value: &P::Out) -> ShowResult {
        if let Some(left) = &self.left {
            left.show_bracket(s)?;
        }
        self.item.show(s, value)?;
        if let Some(right) = &self.right {
            right.show_bracket(s)?;
        }
        Ok(())
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        if let Some(left) = &self.left {
            left.describe_bracket(f)?;
        }
        self.item.describe(f)?;
        if let Some(right) = &self.right {
            right.describe_bracket(f)?;
        }
        Ok(())
    }
}


/// Items and the separators between them.
pub type JoinList<I, S> = (Vec<I>, Vec<S>);

type Rescue<T, I, S> = Box<dyn Fn(&mut dyn Feed<T>, &JoinList<I, S>) -> ReadResult<I>>;

/// Reads one or more `item`s separated by `sep`.
///
/// When no item follows a separator, and the separator equals the
/// default value of `sep`, the list ends there (an optional trailing
/// separator, which is dropped from the value). Otherwise the rescue
/// function decides: it may give an item to continue with, the
/// default one reports "expecting item for last separator".
pub struct JoinBy<S: Pattern, P: Pattern> {
    sep: S,
    item: P,
    rescue: Option<Rescue<P::In, P::Out, S::Out>>,
    on_item: Option<Box<dyn Fn(&P::Out)>>,
    on_sep: Option<Box<dyn Fn(&S::Out)>>,
}

impl<S: Pattern, P: Pattern> JoinBy<S, P> {
    pub fn new(sep: S, item: P) -> JoinBy<S, P> {
        JoinBy { sep, item, rescue: None, on_item: None, on_sep: None }
    }

    pub fn rescue(mut self,
                  rescue: impl Fn(&mut dyn Feed<P::In>, &JoinList<P::Out, S::Out>)
                                  -> ReadResult<P::Out> + 'static)
                  -> JoinBy<S, P> {
        self.rescue = Some(Box::new(rescue));
        self
    }

    pub fn on_item(mut self, on_item: impl Fn(&P::Out) + 'static) -> JoinBy<S, P> {
        self.on_item = Some(Box::new(on_item));
        self
    }

    pub fn on_sep(mut self, on_sep: impl Fn(&S::Out) + 'static) -> JoinBy<S, P> {
        self.on_sep = Some(Box::new(on_sep));
        self
    }

    fn read_item(&self, s: &mut dyn Feed<P::In>) -> ReadResult<P::Out> {
        let item = self.item.read(s)?;
        if let (Some(v), Some(on_item)) = (&item, &self.on_item) {
            on_item(v);
        }
        Ok(item)
    }

    /// Only the items; `show` puts `constant` between them.
    pub fn merge_constant_join(self, constant: S::Out)
                               -> impl Pattern<In = P::In, Out = Vec<P::Out>>
        where S: Pattern<In = P::In>,
              S::Out: PartialEq + Clone,
              P::Out: Clone
    {
        Convert::new(self,
                     |(items, _): JoinList<P::Out, S::Out>| items,
                     move |items: &Vec<P::Out>| {
                         let seps = vec![constant.clone(); items.len().saturating_sub(1)];
                         Some((items.clone(), seps))
                     })
    }

    /// Character separators as one string.
    pub fn concat_char_join(self)
                            -> impl Pattern<In = P::In, Out = (Vec<P::Out>, String)>
        where S: Pattern<In = P::In, Out = char>,
              P::Out: Clone
    {
        Convert::new(self,
                     |(items, seps): JoinList<P::Out, char>| (items, seps.into_iter().collect()),
                     |(items, seps): &(Vec<P::Out>, String)| {
                         Some((items.clone(), seps.chars().collect()))
                     })
    }
}

impl<S, P> Pattern for JoinBy<S, P>
    where S: Pattern<In = P::In>,
          S::Out: PartialEq,
          P: Pattern
{
    type In = P::In;
    type Out = JoinList<P::Out, S::Out>;

    fn read(&self, s: &mut dyn Feed<P::In>) -> ReadResult<Self::Out> {
        let mut list = (Vec::new(), Vec::new());
        match self.read_item(s)? {
            Some(v) => list.0.push(v),
            None => return Ok(None)
        }
        while let Some(sep) = self.sep.read(s)? {
            if let Some(on_sep) = &self.on_sep {
                on_sep(&sep);
            }
            let trailing = self.sep.default_value() == Some(&sep);
            list.1.push(sep);
            match self.read_item(s)? {
                Some(v) => list.0.push(v),
                None =>
                    if trailing {
                        list.1.pop();
                        return Ok(Some(list))
                    } else {
                        let rescued = match &self.rescue {
                            Some(rescue) => rescue(s, &list)?,
                            None => {
                                s.error(format!("expecting item for last separator {}",
                                                Describe(&self.sep)))?;
                                None
                            }
                        };
                        match rescued {
                            Some(v) => list.0.push(v),
                            None => return Ok(None)
                        }
                    }
            }
        }
        Ok(Some(list))
    }
    fn show(&self, s: &mut dyn Output<P::In>, value: &Self::Out) -> ShowResult {
        let (items, seps) = value;
        if items.len() != seps.len() + 1 {
            if items.is_empty() && seps.is_empty() {
                return Ok(())
            }
            return Err(ShowError::SeparatorCount {
                items: items.len(),
                separators: seps.len(),
            })
        }
        self.item.show(s, &items[0])?;
        for (sep, item) in seps.iter().zip(&items[1..]) {
            self.sep.show(s, sep)?;
            self.item.show(s, item)?;
        }
        Ok(())
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_str("{")?;
        self.item.describe(f)?;
        f.write_str("...")?;
        self.sep.describe(f)?;
        f.write_str("}")
    }
}
