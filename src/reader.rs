// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Get characters from anything implementing `Read`, and a feed on
//! top of that.

// TODO: measure whether the genawaiter generator is a bottleneck
// compared to decoding into a buffer up front.

use crate::error::{End, ParseError};
use crate::feed::Feed;
use std::io::{self, Read};
use anyhow::{Result, anyhow};
use utf8::BufReadDecoder;
use genawaiter::rc::Gen;


pub fn buffered_chars<'r, R>(
    fh: R
) -> impl Iterator<Item=Result<char>> + 'r
    where R: Read + 'r
{
    Gen::new(|co| async move {
        let mut inp = BufReadDecoder::new(io::BufReader::new(fh));
        loop {
            if let Some(r) = inp.next_strict() {
                match r {
                    Ok(x) => {
                        for c in x.chars() {
                            co.yield_(Ok(c)).await;
                        }
                    },
                    Err(e) => {
                        co.yield_(Err(anyhow!("buffered_chars: {}", e))).await;
                        return;
                    }
                }
            } else {
                return;
            }
        }
    }).into_iter()
}

/// Character feed decoding UTF-8 from a `Read`. A decoding or IO
/// error ends the stream early; it is kept and can be taken with
/// [take_io_error](ReaderFeed::take_io_error).
pub struct ReaderFeed<'r> {
    chars: Box<dyn Iterator<Item=Result<char>> + 'r>,
    next_one: char,
    tail_consumed: bool,
    io_error: Option<anyhow::Error>,
}

impl<'r> ReaderFeed<'r> {
    pub fn new(fh: impl Read + 'r) -> Result<ReaderFeed<'r>, ParseError> {
        let mut chars = Box::new(buffered_chars(fh));
        match chars.next() {
            None => Err(ParseError::EmptyInput),
            Some(Err(e)) => Err(ParseError::Io(e)),
            Some(Ok(next_one)) => Ok(ReaderFeed {
                chars,
                next_one,
                tail_consumed: false,
                io_error: None,
            })
        }
    }

    pub fn take_io_error(&mut self) -> Option<anyhow::Error> {
        self.io_error.take()
    }
}

impl<'r> Feed<char> for ReaderFeed<'r> {
    fn peek(&self) -> &char {
        &self.next_one
    }

    fn consume(&mut self) -> Result<char, End> {
        if self.tail_consumed {
            return Err(End)
        }
        match self.chars.next() {
            Some(Ok(c)) => Ok(std::mem::replace(&mut self.next_one, c)),
            Some(Err(e)) => {
                log::warn!("ending input early: {}", e);
                self.io_error = Some(e);
                self.tail_consumed = true;
                Ok(self.next_one)
            }
            None => {
                self.tail_consumed = true;
                Ok(self.next_one)
            }
        }
    }

    fn at_end(&self) -> bool {
        self.tail_consumed
    }
}
