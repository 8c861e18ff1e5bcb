// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Binary operator chains, by precedence climbing.
//!
//! ```
//! use biparse::fold::as_int;
//! use biparse::infix::{infixl, InfixOp, InfixPattern};
//! use biparse::lexical::digit_for;
//! use biparse::pattern::PatternExt;
//! use biparse::surd::Repeat;
//! use biparse::trie::TriePattern;
//!
//! let ops: TriePattern<char, InfixOp<i64>> = TriePattern::new();
//! ops.register_op(InfixOp::new("+", infixl(1), |a: i64, b| a + b));
//! ops.register_op(InfixOp::new("*", infixl(2), |a: i64, b| a * b));
//! let expr = InfixPattern::new(Repeat::new(as_int(10), digit_for('0'..='9', '0', 0)), ops);
//! assert_eq!(expr.read_str("1+2*3").unwrap(), Some(7));
//! ```

use crate::error::{ReadResult, ShowError, ShowResult};
use crate::feed::Feed;
use crate::pattern::{Output, Pattern};
use crate::trie::TriePattern;
use kstring::KString;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

/// Higher ordinals bind tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precedence {
    pub ordinal: u32,
    pub right_assoc: bool,
}

pub fn infixl(ordinal: u32) -> Precedence {
    Precedence { ordinal, right_assoc: false }
}

pub fn infixr(ordinal: u32) -> Precedence {
    Precedence { ordinal, right_assoc: true }
}

pub type InfixJoin<T> = Rc<dyn Fn(T, T) -> T>;

pub struct InfixOp<T> {
    pub name: KString,
    pub precedence: Precedence,
    pub join: InfixJoin<T>,
}

impl<T> InfixOp<T> {
    pub fn new(name: &str, precedence: Precedence, join: impl Fn(T, T) -> T + 'static)
               -> InfixOp<T> {
        InfixOp {
            name: KString::from_ref(name),
            precedence,
            join: Rc::new(join),
        }
    }

    pub fn ordinal(&self) -> u32 {
        self.precedence.ordinal
    }

    pub fn apply(&self, lhs: T, rhs: T) -> T {
        (self.join)(lhs, rhs)
    }
}

impl<T> Clone for InfixOp<T> {
    fn clone(&self) -> Self {
        InfixOp {
            name: self.name.clone(),
            precedence: self.precedence,
            join: self.join.clone(),
        }
    }
}

// Operators are told apart by name and precedence; the join function
// can't be compared.
impl<T> PartialEq for InfixOp<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.precedence == other.precedence
    }
}

impl<T> Debug for InfixOp<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.write_str(&self.name)
    }
}

impl<T> Display for InfixOp<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.write_str(&self.name)
    }
}

impl<T, M> TriePattern<char, InfixOp<T>, M> {
    /// Registers `op` under its name.
    pub fn register_op(&self, op: InfixOp<T>) {
        let name = op.name.clone();
        self.insert_str(&name, op)
    }
}


type Rescue<I, T> = Box<dyn Fn(&mut dyn Feed<I>, &T, &InfixOp<T>) -> ReadResult<T>>;

/// An `atom`, followed by any number of operator and `atom` pairs,
/// joined into one value.
///
/// An operator not followed by an atom goes to the rescue function;
/// the default one reports "infix <lhs> parse failed at <op>".
/// Showing is not supported, as the value is the joined result.
pub struct InfixPattern<A: Pattern, O> {
    atom: A,
    op: O,
    rescue: Option<Rescue<A::In, A::Out>>,
}

impl<A, O> InfixPattern<A, O>
    where A: Pattern,
          A::Out: Debug,
          O: Pattern<In = A::In, Out = InfixOp<A::Out>>
{
    pub fn new(atom: A, op: O) -> InfixPattern<A, O> {
        InfixPattern { atom, op, rescue: None }
    }

    pub fn rescue(mut self,
                  rescue: impl Fn(&mut dyn Feed<A::In>, &A::Out, &InfixOp<A::Out>)
                                  -> ReadResult<A::Out> + 'static)
                  -> InfixPattern<A, O> {
        self.rescue = Some(Box::new(rescue));
        self
    }

    fn read_rhs(&self, s: &mut dyn Feed<A::In>, lhs: &A::Out, op1: &InfixOp<A::Out>)
                -> ReadResult<A::Out> {
        if let Some(rhs) = self.atom.read(s)? {
            return Ok(Some(rhs))
        }
        match &self.rescue {
            Some(rescue) => rescue(s, lhs, op1),
            None => {
                s.error(format!("infix {:?} parse failed at {}", lhs, op1))?;
                Ok(None)
            }
        }
    }

    /// Joins operators of at least `min` ordinal onto `lhs`. Returns
    /// the operator that stopped the chain, already read, for the
    /// caller to continue with.
    fn climb(&self,
             s: &mut dyn Feed<A::In>,
             mut lhs: A::Out,
             mut pending: Option<InfixOp<A::Out>>,
             min: u32)
             -> ReadResult<(A::Out, Option<InfixOp<A::Out>>)> {
        loop {
            let op1 = match pending.take() {
                Some(op) => op,
                None => match self.op.read(s)? {
                    Some(op) => op,
                    None => return Ok(Some((lhs, None)))
                }
            };
            if op1.ordinal() < min {
                return Ok(Some((lhs, Some(op1))))
            }
            let mut rhs = match self.read_rhs(s, &lhs, &op1)? {
                Some(v) => v,
                None => return Ok(None)
            };
            let mut next = self.op.read(s)?;
            while let Some(op2) = next.take() {
                let tighter = op2.ordinal() > op1.ordinal()
                    || (op2.ordinal() == op1.ordinal() && op1.precedence.right_assoc);
                if !tighter {
                    next = Some(op2);
                    break
                }
                let next_min = if op2.ordinal() > op1.ordinal() {
                    op1.ordinal() + 1
                } else {
                    op1.ordinal()
                };
                match self.climb(s, rhs, Some(op2), next_min)? {
                    Some((joined, stop)) => {
                        rhs = joined;
                        next = stop;
                    }
                    None => return Ok(None)
                }
            }
            lhs = op1.apply(lhs, rhs);
            pending = next;
            if pending.is_none() {
                return Ok(Some((lhs, None)))
            }
        }
    }
}

impl<A, O> Pattern for InfixPattern<A, O>
    where A: Pattern,
          A::Out: Debug,
          O: Pattern<In = A::In, Out = InfixOp<A::Out>>
{
    type In = A::In;
    type Out = A::Out;

    fn read(&self, s: &mut dyn Feed<A::In>) -> ReadResult<A::Out> {
        let base = match self.atom.read(s)? {
            Some(v) => v,
            None => return Ok(None)
        };
        Ok(self.climb(s, base, None, 0)?.map(|(value, _)| value))
    }
    fn show(&self, _s: &mut dyn Output<A::In>, _value: &A::Out) -> ShowResult {
        Err(ShowError::Unsupported("infix show"))
    }
    fn describe(&self, f: &mut Formatter<'_>)
                -> Result<(), std::fmt::Error> {
        f.write_str("InfixChain(")?;
        self.atom.describe(f)?;
        f.write_str(", ")?;
        self.op.describe(f)?;
        f.write_str(")")
    }
}
