// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This is a parser combinator library where every pattern works in
//! both directions, with the following goals:
//! 
//! * Reading a value from a stream of tokens (`Pattern::read`) and
//!   showing it back as tokens (`Pattern::show`) from the same
//!   grammar definition. For a value read by a pattern, reading what
//!   the pattern shows gives the same value again.
//! 
//! * Good error reporting: precise locations for character inputs,
//!   and the choice between failing on the first error or collecting
//!   errors and continuing with recovery values (`recover`).
//! 
//! * The grammar pieces that plain combinators make awkward:
//!   operator precedence (`infix`), keyword tables with longest match
//!   (`trie`), and indentation structured blocks (`layout`).
//! 
//! * Streaming: inputs can be read lazily from file handles, decoding
//!   UTF-8 on the way (`reader`).
//! 
//! There is no backtracking: a pattern that fails may have consumed
//! tokens. Alternatives need to differ in their first token, or be
//! guarded with `atom::peek`. Showing infix chains is not supported.

pub mod location;
pub mod error;
pub mod state;
pub mod feed;
pub mod reader;
pub mod input;
pub mod pattern;
pub mod fold;
pub mod atom;
pub mod surd;
pub mod ccdp;
pub mod recover;
pub mod sjit;
pub mod trie;
pub mod infix;
pub mod layout;
pub mod lexical;
pub mod lexer;
