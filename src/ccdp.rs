// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Wrapping patterns: Convert, Contextual, Deferred, Piped, and the
//! small adapters built via [PatternExt](crate::pattern::PatternExt).

use crate::error::{ParseError, ReadResult, Redefined, ShowError, ShowResult};
use crate::feed::Feed;
use crate::pattern::{DynPattern, Output, Pattern};
use once_cell::unsync::OnceCell;
use std::cell::Cell;
use std::fmt::Formatter;
use std::marker::PhantomData;
use std::rc::Rc;

/// The backward function of a conversion that can't be inverted.
pub fn no_inverse<A, B>(_value: &A) -> Option<B> {
    None
}

/// Maps values with `from` when reading, and with `to` back when
/// showing. `to` returning `None` makes `show` fail with
/// `ShowError::Unsupported`.
pub struct Convert<P, F, G, O> {
    item: P,
    from: F,
    to: G,
    _out: PhantomData<fn() -> O>,
}

impl<P, F, G, O> Convert<P, F, G, O> {
    pub fn new(item: P, from: F, to: G) -> Convert<P, F, G, O> {
        Convert { item, from, to, _out: PhantomData }
    }
}

impl<P, F, G, O> Pattern for Convert<P, F, G, O>
    where P: Pattern,
          F: Fn(P::Out) -> O,
          G: Fn(&O) -> Option<P::Out>
{
    type In = P::In;
    type Out = O;

    fn read(&self, s: &mut dyn Feed<P::In>) -> ReadResult<O> {
        Ok(self.item.read(s)?.map(&self.from))
    }
    fn show(&self, s: &mut dyn Output<P::In>, value: &O) -> ShowResult {
        match (self.to)(value) {
            Some(v) => self.item.show(s, &v),
            None => Err(ShowError::Unsupported("convert back"))
        }
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        self.item.describe(f)
    }
}


/// Reads `head`, then the body with the pattern that `body_of`
/// selects for the head value.
pub struct Contextual<H, B> {
    head: H,
    body_of: B,
}

impl<H, B> Contextual<H, B> {
    pub fn new(head: H, body_of: B) -> Contextual<H, B> {
        Contextual { head, body_of }
    }
}

impl<H, B, Q> Pattern for Contextual<H, B>
    where H: Pattern,
          B: Fn(&H::Out) -> Q,
          Q: Pattern<In = H::In>
{
    type In = H::In;
    type Out = (H::Out, Q::Out);

    fn read(&self, s: &mut dyn Feed<H::In>) -> ReadResult<Self::Out> {
        let context = match self.head.read(s)? {
            Some(v) => v,
            None => return Ok(None)
        };
        let body = (self.body_of)(&context).read(s)?;
        Ok(body.map(|body| (context, body)))
    }
    fn show(&self, s: &mut dyn Output<H::In>, value: &Self::Out) -> ShowResult {
        let (context, body) = value;
        self.head.show(s, context)?;
        (self.body_of)(context).show(s, body)
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        self.head.describe(f)?;
        f.write_str("@")
    }
}


/// Indirection for recursive grammars. Clones share the target:
///
/// ```
/// use biparse::ccdp::Deferred;
/// use biparse::atom::item;
/// use biparse::pattern::PatternExt;
/// use biparse::surd::Decide;
///
/// let nested: Deferred<char, usize> = Deferred::declare();
/// let inner = nested.clone();
/// nested.define(Decide::new()
///     .case((item('('), inner, item(')')).convert_forward(|(_, n, _)| n + 1))
///     .case(item('.').convert_forward(|_| 0))
///     .convert_forward(|(_, n)| n)).unwrap();
/// assert_eq!(nested.read_str("((.))").unwrap(), Some(2));
/// ```
///
/// Self references are cycles of `Rc`s, so a recursive grammar is
/// never freed.
pub struct Deferred<T, O> {
    target: Rc<OnceCell<DynPattern<T, O>>>,
    supplier: Option<Rc<dyn Fn() -> DynPattern<T, O>>>,
    // Nesting of `describe` calls, to print "recurse" instead of
    // looping.
    depth: Rc<Cell<usize>>,
}

impl<T, O> Clone for Deferred<T, O> {
    fn clone(&self) -> Self {
        Deferred {
            target: self.target.clone(),
            supplier: self.supplier.clone(),
            depth: self.depth.clone(),
        }
    }
}

impl<T: 'static, O: 'static> Deferred<T, O> {
    /// A pattern to be given with [define](Deferred::define) later.
    pub fn declare() -> Deferred<T, O> {
        Deferred {
            target: Rc::new(OnceCell::new()),
            supplier: None,
            depth: Rc::new(Cell::new(0)),
        }
    }

    /// A pattern made by `supplier` on first use.
    pub fn from_fn(supplier: impl Fn() -> DynPattern<T, O> + 'static) -> Deferred<T, O> {
        Deferred {
            target: Rc::new(OnceCell::new()),
            supplier: Some(Rc::new(supplier)),
            depth: Rc::new(Cell::new(0)),
        }
    }

    pub fn define(&self, pattern: impl Pattern<In = T, Out = O> + 'static)
                  -> Result<(), Redefined> {
        self.target.set(Box::new(pattern)).map_err(|_| Redefined)?;
        log::debug!("recursive pattern defined");
        Ok(())
    }

    pub fn is_defined(&self) -> bool {
        self.target.get().is_some()
    }

    fn resolve(&self) -> Option<&DynPattern<T, O>> {
        if let Some(p) = self.target.get() {
            return Some(p)
        }
        let supplier = self.supplier.as_ref()?;
        Some(self.target.get_or_init(|| (**supplier)()))
    }
}

impl<T: 'static, O: 'static> Pattern for Deferred<T, O> {
    type In = T;
    type Out = O;

    fn read(&self, s: &mut dyn Feed<T>) -> ReadResult<O> {
        self.resolve().ok_or(ParseError::Undefined)?.read(s)
    }
    fn show(&self, s: &mut dyn Output<T>, value: &O) -> ShowResult {
        self.resolve().ok_or(ShowError::Undefined)?.show(s, value)
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        if self.depth.get() > 0 {
            return f.write_str("recurse")
        }
        match self.resolve() {
            None => f.write_str("(undefined)"),
            Some(p) => {
                self.depth.set(self.depth.get() + 1);
                let r = p.describe(f);
                self.depth.set(self.depth.get() - 1);
                r
            }
        }
    }
}


/// Post-processing of the result of `item`, with access to the
/// feed. `op` also sees the not-parsed case.
pub struct Piped<P, F> {
    item: P,
    op: F,
}

impl<P, F> Piped<P, F> {
    pub fn new(item: P, op: F) -> Piped<P, F> {
        Piped { item, op }
    }
}

impl<P, F> Pattern for Piped<P, F>
    where P: Pattern,
          F: Fn(&mut dyn Feed<P::In>, Option<P::Out>) -> ReadResult<P::Out>
{
    type In = P::In;
    type Out = P::Out;

    fn read(&self, s: &mut dyn Feed<P::In>) -> ReadResult<P::Out> {
        let value = self.item.read(s)?;
        (self.op)(s, value)
    }
    fn show(&self, s: &mut dyn Output<P::In>, value: &P::Out) -> ShowResult {
        self.item.show(s, value)
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_str("(Piped: ")?;
        self.item.describe(f)?;
        f.write_str(")")
    }
}

pub struct AlsoDo<P, F> {
    item: P,
    op: F,
}

impl<P, F> AlsoDo<P, F> {
    pub fn new(item: P, op: F) -> AlsoDo<P, F> {
        AlsoDo { item, op }
    }
}

impl<P, F> Pattern for AlsoDo<P, F>
    where P: Pattern,
          F: Fn(&mut dyn Feed<P::In>, &P::Out)
{
    type In = P::In;
    type Out = P::Out;

    fn read(&self, s: &mut dyn Feed<P::In>) -> ReadResult<P::Out> {
        let value = self.item.read(s)?;
        if let Some(v) = &value {
            (self.op)(s, v);
        }
        Ok(value)
    }
    fn show(&self, s: &mut dyn Output<P::In>, value: &P::Out) -> ShowResult {
        self.item.show(s, value)
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        self.item.describe(f)
    }
    fn default_value(&self) -> Option<&P::Out> {
        self.item.default_value()
    }
    fn constant(&self) -> Option<&P::Out> {
        self.item.constant()
    }
}


/// Reads the default value when `item` fails.
pub struct Optional<P: Pattern> {
    item: P,
    default: P::Out,
}

impl<P: Pattern> Optional<P> {
    pub fn new(item: P, default: P::Out) -> Optional<P> {
        Optional { item, default }
    }
}

impl<P> Pattern for Optional<P>
    where P: Pattern,
          P::Out: Clone
{
    type In = P::In;
    type Out = P::Out;

    fn read(&self, s: &mut dyn Feed<P::In>) -> ReadResult<P::Out> {
        Ok(Some(self.item.read(s)?.unwrap_or_else(|| self.default.clone())))
    }
    fn show(&self, s: &mut dyn Output<P::In>, value: &P::Out) -> ShowResult {
        self.item.show(s, value)
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        self.item.describe(f)?;
        f.write_str("?")
    }
    fn default_value(&self) -> Option<&P::Out> {
        Some(&self.default)
    }
    fn constant(&self) -> Option<&P::Out> {
        self.item.constant()
    }
}

pub struct ToConstant<P: Pattern> {
    item: P,
    constant: P::Out,
}

impl<P: Pattern> ToConstant<P> {
    pub fn new(item: P, constant: P::Out) -> ToConstant<P> {
        ToConstant { item, constant }
    }
}

impl<P: Pattern> Pattern for ToConstant<P> {
    type In = P::In;
    type Out = P::Out;

    fn read(&self, s: &mut dyn Feed<P::In>) -> ReadResult<P::Out> {
        self.item.read(s)
    }
    fn show(&self, s: &mut dyn Output<P::In>, value: &P::Out) -> ShowResult {
        self.item.show(s, value)
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        self.item.describe(f)
    }
    fn default_value(&self) -> Option<&P::Out> {
        self.item.default_value()
    }
    fn constant(&self) -> Option<&P::Out> {
        Some(&self.constant)
    }
}

pub struct ShowBy<P, F> {
    item: P,
    show: F,
}

impl<P, F> ShowBy<P, F> {
    pub fn new(item: P, show: F) -> ShowBy<P, F> {
        ShowBy { item, show }
    }
}

impl<P, F> Pattern for ShowBy<P, F>
    where P: Pattern,
          F: Fn(&mut dyn Output<P::In>, &P::Out) -> ShowResult
{
    type In = P::In;
    type Out = P::Out;

    fn read(&self, s: &mut dyn Feed<P::In>) -> ReadResult<P::Out> {
        self.item.read(s)
    }
    fn show(&self, s: &mut dyn Output<P::In>, value: &P::Out) -> ShowResult {
        (self.show)(s, value)
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        self.item.describe(f)
    }
    fn default_value(&self) -> Option<&P::Out> {
        self.item.default_value()
    }
}

pub struct Named<P> {
    item: P,
    name: String,
}

impl<P> Named<P> {
    pub fn new(item: P, name: &str) -> Named<P> {
        Named { item, name: name.into() }
    }
}

impl<P: Pattern> Pattern for Named<P> {
    type In = P::In;
    type Out = P::Out;

    fn read(&self, s: &mut dyn Feed<P::In>) -> ReadResult<P::Out> {
        self.item.read(s)
    }
    fn show(&self, s: &mut dyn Output<P::In>, value: &P::Out) -> ShowResult {
        self.item.show(s, value)
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_str(&self.name)
    }
    fn default_value(&self) -> Option<&P::Out> {
        self.item.default_value()
    }
    fn constant(&self) -> Option<&P::Out> {
        self.item.constant()
    }
}
