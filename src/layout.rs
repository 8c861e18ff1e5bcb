// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Trees structured by indentation (the off-side rule).
//!
//! A [LayoutPattern](LayoutPattern) reads `item`s, each followed by
//! the indentation of the next line as measured by `layout`. An item
//! followed by `tail` (e.g. a colon) opens a block: the lines after
//! it, as long as they are indented deeper, are its children.
//!
//! ```
//! use biparse::atom::element_in_range;
//! use biparse::atom::item;
//! use biparse::fold::as_string;
//! use biparse::layout::{line_indent, Deep, LayoutPattern};
//! use biparse::pattern::PatternExt;
//! use biparse::surd::Repeat;
//!
//! let word = Repeat::new(as_string(), element_in_range('a'..='z'));
//! let tree = LayoutPattern::new(word, item(':'), line_indent());
//! let text = "a:\n  b\n  c\nd\n";
//! let root = tree.read_str(text).unwrap().unwrap();
//! assert_eq!(root, Deep::Root(vec![
//!     Deep::Nest { item: "a".into(), tail: ':', children: vec![
//!         Deep::Term("b".into()), Deep::Term("c".into())] },
//!     Deep::Term("d".into())]));
//! assert_eq!(tree.indent_step(2).show_string(&root).unwrap(), text);
//! ```

use crate::atom::item;
use crate::error::{ReadResult, ShowError, ShowResult};
use crate::feed::{Feed, FeedExt};
use crate::fold::{as_count, Fold};
use crate::pattern::{Output, Pattern, PatternExt};
use crate::surd::Repeat;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deep<T, L> {
    Root(Vec<Deep<T, L>>),
    /// An item with tail, and the block following it.
    Nest { item: T, tail: L, children: Vec<Deep<T, L>> },
    Term(T),
}

impl<T, L> Deep<T, L> {
    pub fn item(&self) -> Option<&T> {
        match self {
            Deep::Root(_) => None,
            Deep::Nest { item, .. } => Some(item),
            Deep::Term(item) => Some(item)
        }
    }

    pub fn children(&self) -> &[Deep<T, L>] {
        match self {
            Deep::Root(nodes) => nodes,
            Deep::Nest { children, .. } => children,
            Deep::Term(_) => &[]
        }
    }
}

fn write_nodes<T: Display, L: Display>(f: &mut Formatter<'_>, nodes: &[Deep<T, L>])
                                       -> Result<(), std::fmt::Error> {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        node.fmt(f)?;
    }
    Ok(())
}

impl<T: Display, L: Display> Display for Deep<T, L> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Deep::Root(nodes) => {
                f.write_str("Root [")?;
                write_nodes(f, nodes)?;
                f.write_str("]")
            }
            Deep::Nest { item, tail, children } => {
                f.write_fmt(format_args!("{}{} {{ ", item, tail))?;
                write_nodes(f, children)?;
                f.write_str(" }")
            }
            Deep::Term(item) => item.fmt(f)
        }
    }
}


/// Line break followed by spaces, measuring the spaces.
pub fn line_indent() -> impl Pattern<In = char, Out = usize> {
    let spaces = Fold::<char>::with_unfold(as_count(), |n: &usize| vec![' '; *n]);
    (item('\n'), Repeat::new(spaces, item(' ')).many())
        .merge_first(|_: &usize| '\n')
}

type RescueLayout<I> = Box<dyn Fn(&mut dyn Feed<I>) -> ReadResult<usize>>;

/// The item pattern of a block, chosen from its head.
pub type ItemPattern<I, T> = Rc<dyn Pattern<In = I, Out = T>>;
type DecideItem<I, T, L> = Box<dyn Fn(&T, &L) -> Option<ItemPattern<I, T>>>;

pub struct LayoutPattern<P: Pattern, Tl: Pattern, Ly> {
    item: P,
    tail: Tl,
    layout: Ly,
    zero: usize,
    indent_step: usize,
    rescue_layout: Option<RescueLayout<P::In>>,
    decide_item: Option<DecideItem<P::In, P::Out, Tl::Out>>,
}

type Layer<T, L> = (usize, Vec<Deep<T, L>>);

impl<P, Tl, Ly> LayoutPattern<P, Tl, Ly>
    where P: Pattern,
          P::Out: Debug,
          Tl: Pattern<In = P::In>,
          Ly: Pattern<In = P::In, Out = usize>
{
    pub fn new(item: P, tail: Tl, layout: Ly) -> LayoutPattern<P, Tl, Ly> {
        LayoutPattern {
            item, tail, layout,
            zero: 0,
            indent_step: 1,
            rescue_layout: None,
            decide_item: None,
        }
    }

    /// The indentation of top level items.
    pub fn zero(mut self, zero: usize) -> LayoutPattern<P, Tl, Ly> {
        self.zero = zero;
        self
    }

    /// Indentation added per block by `show`.
    pub fn indent_step(mut self, indent_step: usize) -> LayoutPattern<P, Tl, Ly> {
        self.indent_step = indent_step;
        self
    }

    /// What to do when `layout` does not read after an item. By
    /// default, the end of input closes all blocks, anything else is
    /// an error.
    pub fn rescue_layout(mut self,
                         rescue: impl Fn(&mut dyn Feed<P::In>) -> ReadResult<usize> + 'static)
                         -> LayoutPattern<P, Tl, Ly> {
        self.rescue_layout = Some(Box::new(rescue));
        self
    }

    /// Reads the children of a block with the pattern `decide` gives
    /// for the item and tail opening it, or with `item` when it gives
    /// `None`. `show` always uses `item`, which hence has to show the
    /// values of all item patterns.
    pub fn decide_item(mut self,
                       decide: impl Fn(&P::Out, &Tl::Out) -> Option<ItemPattern<P::In, P::Out>>
                           + 'static)
                       -> LayoutPattern<P, Tl, Ly> {
        self.decide_item = Some(Box::new(decide));
        self
    }

    fn read_layout(&self, s: &mut dyn Feed<P::In>) -> ReadResult<usize> {
        if let Some(n) = self.layout.read(s)? {
            return Ok(Some(n))
        }
        match &self.rescue_layout {
            Some(rescue) => rescue(s),
            None =>
                if s.at_end() {
                    Ok(Some(self.zero))
                } else {
                    s.error("expecting layout after item".into())?;
                    Ok(None)
                }
        }
    }

    /// Reads the items of one block at indentation `n0`. Returns the
    /// indentation that closed the block, which is below `n0` when
    /// enclosing blocks are closed too.
    fn read_layer(&self, s: &mut dyn Feed<P::In>,
                  layer_item: &dyn Pattern<In = P::In, Out = P::Out>, n0: usize)
                  -> ReadResult<Layer<P::Out, Tl::Out>> {
        let mut items = Vec::new();
        while let Some(parsed) = layer_item.read(s)? {
            match self.tail.read(s)? {
                Some(tail) => {
                    let n1 = match self.read_layout(s)? {
                        Some(n) => n,
                        None => return Ok(None)
                    };
                    if n1 <= n0 {
                        s.error(format!("bad layout-open decrement ({} => {})", n0, n1))?;
                    }
                    let decided = self.decide_item.as_ref()
                        .and_then(|decide| decide(&parsed, &tail));
                    let child_item: &dyn Pattern<In = P::In, Out = P::Out> = match &decided {
                        Some(p) => &**p,
                        None => &self.item
                    };
                    let (closed, children) = match self.read_layer(s, child_item, n1)? {
                        Some(layer) => layer,
                        None => return Ok(None)
                    };
                    items.push(Deep::Nest { item: parsed, tail, children });
                    if closed < n0 {
                        return Ok(Some((closed, items)))
                    }
                    if closed > n0 {
                        s.error(format!("unaligned layout close ({} => {})", n0, closed))?;
                    }
                }
                None => {
                    let n = match self.read_layout(s)? {
                        Some(n) => n,
                        None => return Ok(None)
                    };
                    if n > n0 {
                        s.error(format!("illegal layout increment ({} => {}) near {:?}",
                                        n0, n, parsed))?;
                    }
                    items.push(Deep::Term(parsed));
                    if n < n0 {
                        return Ok(Some((n, items)))
                    }
                }
            }
        }
        Ok(Some((n0, items)))
    }

    // Items in reading order, with the indentation of their line.
    fn flatten<'v>(&self, nodes: &'v [Deep<P::Out, Tl::Out>], level: usize,
                   lines: &mut Vec<(usize, &'v Deep<P::Out, Tl::Out>)>) {
        for node in nodes {
            lines.push((level, node));
            if let Deep::Nest { children, .. } = node {
                self.flatten(children, level + self.indent_step, lines);
            }
        }
    }
}

impl<P, Tl, Ly> Pattern for LayoutPattern<P, Tl, Ly>
    where P: Pattern,
          P::Out: Debug,
          Tl: Pattern<In = P::In>,
          Ly: Pattern<In = P::In, Out = usize>
{
    type In = P::In;
    type Out = Deep<P::Out, Tl::Out>;

    fn read(&self, s: &mut dyn Feed<P::In>) -> ReadResult<Self::Out> {
        let (closed, nodes) = match self.read_layer(s, &self.item, self.zero)? {
            Some(layer) => layer,
            None => return Ok(None)
        };
        if closed != self.zero {
            s.error(format!("terminate indent not zero: {}", closed))?;
        }
        Ok(Some(Deep::Root(nodes)))
    }
    fn show(&self, s: &mut dyn Output<P::In>, value: &Self::Out) -> ShowResult {
        let nodes = match value {
            Deep::Root(nodes) => nodes.as_slice(),
            node => std::slice::from_ref(node)
        };
        let mut lines = Vec::new();
        self.flatten(nodes, self.zero, &mut lines);
        for (i, (_, node)) in lines.iter().enumerate() {
            match node {
                Deep::Nest { item, tail, .. } => {
                    self.item.show(s, item)?;
                    self.tail.show(s, tail)?;
                }
                Deep::Term(item) => self.item.show(s, item)?,
                Deep::Root(_) => return Err(ShowError::Unsupported("nested layout root"))
            }
            let next = lines.get(i + 1).map(|(level, _)| *level).unwrap_or(self.zero);
            self.layout.show(s, &next)?;
        }
        Ok(())
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_str("(Layout: ")?;
        self.item.describe(f)?;
        f.write_str(", ")?;
        self.tail.describe(f)?;
        f.write_str(", ")?;
        self.layout.describe(f)?;
        f.write_str(")")
    }
}
