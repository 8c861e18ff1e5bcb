// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A feed of tokens cut from a character feed by a tokenizer pattern,
//! for grammars over tokens instead of characters.

use crate::error::{End, ParseError};
use crate::feed::Feed;
use crate::location::SourceLocation;
use crate::pattern::Pattern;
use crate::state::StateMap;

/// The stream ends when the tokenizer doesn't read; `peek` then
/// yields `eof`, which is never consumed. Characters left over at
/// that point are reported as "lexer failed" through the error
/// channel of the character feed. Fatal errors while tokenizing end
/// the stream too, see [take_error](LexerFeed::take_error).
pub struct LexerFeed<F, P: Pattern> {
    chars: F,
    tokenizer: P,
    next_one: Option<P::Out>,
    eof: P::Out,
    error: Option<ParseError>,
}

impl<F, P> LexerFeed<F, P>
    where F: Feed<char>,
          P: Pattern<In = char>,
          P::Out: Clone
{
    pub fn new(chars: F, tokenizer: P, eof: P::Out) -> Result<LexerFeed<F, P>, ParseError> {
        let mut feed = LexerFeed { chars, tokenizer, next_one: None, eof, error: None };
        feed.next_one = feed.tokenize()?;
        Ok(feed)
    }

    fn tokenize(&mut self) -> Result<Option<P::Out>, ParseError> {
        if let Some(token) = self.tokenizer.read(&mut self.chars)? {
            return Ok(Some(token))
        }
        if let Ok(c) = self.chars.consume() {
            self.chars.error(format!("lexer failed at {:?}", c))?;
        }
        Ok(None)
    }

    /// The fatal error that ended the stream, if any.
    pub fn take_error(&mut self) -> Option<ParseError> {
        self.error.take()
    }

    pub fn chars_mut(&mut self) -> &mut F {
        &mut self.chars
    }
}

impl<F, P> Feed<P::Out> for LexerFeed<F, P>
    where F: Feed<char>,
          P: Pattern<In = char>,
          P::Out: Clone
{
    fn peek(&self) -> &P::Out {
        self.next_one.as_ref().unwrap_or(&self.eof)
    }
    fn consume(&mut self) -> Result<P::Out, End> {
        let token = self.next_one.take().ok_or(End)?;
        match self.tokenize() {
            Ok(next_one) => self.next_one = next_one,
            Err(e) => self.error = Some(e)
        }
        Ok(token)
    }
    fn at_end(&self) -> bool {
        self.next_one.is_none()
    }
    fn error(&mut self, message: String) -> Result<(), ParseError> {
        self.chars.error(message)
    }
    fn source_loc(&self) -> Option<&SourceLocation> {
        self.chars.source_loc()
    }
    fn state(&mut self) -> Option<&mut StateMap> {
        self.chars.state()
    }
}
