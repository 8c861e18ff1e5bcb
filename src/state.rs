// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Per-parse state attached to an input, looked up by type. This is
//! the only place where values are stored type-erased.

use crate::feed::Feed;
use std::any::{Any, TypeId};
use std::collections::HashMap;

#[derive(Default)]
pub struct StateMap {
    entries: HashMap<TypeId, Box<dyn Any>>,
}

impl StateMap {
    pub fn new() -> StateMap {
        StateMap::default()
    }

    /// Replaces a previous value of the same type.
    pub fn insert<S: Any>(&mut self, value: S) {
        self.entries.insert(TypeId::of::<S>(), Box::new(value));
    }

    pub fn get<S: Any>(&self) -> Option<&S> {
        self.entries.get(&TypeId::of::<S>())?.downcast_ref()
    }

    pub fn get_mut<S: Any>(&mut self) -> Option<&mut S> {
        self.entries.get_mut(&TypeId::of::<S>())?.downcast_mut()
    }

    pub fn remove<S: Any>(&mut self) -> Option<S> {
        let b = self.entries.remove(&TypeId::of::<S>())?;
        b.downcast().ok().map(|b| *b)
    }
}

impl std::fmt::Debug for StateMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        f.write_fmt(format_args!("StateMap({} entries)", self.entries.len()))
    }
}

/// The state of type `S` of the input behind `s`, if it has one.
pub fn state_as<'s, T, S: Any>(s: &'s mut (dyn Feed<T> + '_)) -> Option<&'s mut S> {
    s.state()?.get_mut::<S>()
}
