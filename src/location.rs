// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Source location of character inputs.

use kstring::KString;
use std::fmt::{Display, Formatter};

/// Line is one based, column is zero based (only consumed characters
/// advance it), position counts every consumed character.
///
/// The location is mutated in place by the input it belongs to; clone
/// it when keeping it around (error records do).

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: KString,
    pub line: u32,
    pub column: u32,
    pub position: usize,
}

impl SourceLocation {
    pub fn new(file: &str) -> SourceLocation {
        SourceLocation {
            file: KString::from_ref(file),
            line: 1,
            column: 0,
            position: 0,
        }
    }

    pub(crate) fn new_line(&mut self) {
        self.line += 1;
        self.column = 0;
    }
}

impl Display for SourceLocation {
    fn fmt(&self, f: &mut Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        // This follows the "file:line:column: message" convention
        // understood by Emacs and most editors.
        f.write_fmt(format_args!("{}:{}:{}", self.file, self.line, self.column))
    }
}
