// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Decorating a [Feed](Feed) with error reporting, per token side
//! effects (source location tracking for characters) and per-parse
//! state. An input is created for one parse and dropped after.

use crate::error::{End, ErrorRecord, ParseError};
use crate::feed::{Feed, IteratorFeed, SliceFeed};
use crate::location::SourceLocation;
use crate::reader::ReaderFeed;
use crate::state::StateMap;
use std::any::Any;
use std::fmt::Debug;
use std::io::Read;

/// What [Feed::error](Feed::error) does on an input.
pub enum OnError<T> {
    /// Return a fatal [ParseError](ParseError) tagged with the
    /// location (or the current token).
    Raise,
    /// Record and continue.
    Collect(Vec<ErrorRecord<T>>),
    /// Hand the record to a listener, which decides.
    Listen(Box<dyn FnMut(ErrorRecord<T>) -> Result<(), ParseError>>),
}

/// Side effect run for every consumed token.
pub trait Track<T> {
    /// Returns true if the token following `item` should be swallowed
    /// (consumed together with `item`).
    fn on_item(&mut self, item: &T, next: &T) -> bool;
    fn location(&self) -> Option<&SourceLocation>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrack;

impl<T> Track<T> for NoTrack {
    fn on_item(&mut self, _item: &T, _next: &T) -> bool {
        false
    }
    fn location(&self) -> Option<&SourceLocation> {
        None
    }
}

/// Newline convention of character inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Newline {
    pub eol: char,
    /// Treat `\r\n` as one line break. With `eol == '\r'` the `\n` is
    /// swallowed and not seen by patterns.
    pub crlf: bool,
}

impl Default for Newline {
    fn default() -> Newline {
        Newline { eol: '\n', crlf: false }
    }
}

#[derive(Debug, Clone)]
pub struct LineTracker {
    loc: SourceLocation,
    newline: Newline,
}

impl LineTracker {
    pub fn new(file: &str, newline: Newline) -> LineTracker {
        LineTracker { loc: SourceLocation::new(file), newline }
    }
}

impl Track<char> for LineTracker {
    fn on_item(&mut self, item: &char, next: &char) -> bool {
        let mut swallow = false;
        if self.newline.crlf && *item == '\r' && *next == '\n' {
            if self.newline.eol == '\r' {
                swallow = true;
                self.loc.position += 1;
                self.loc.new_line();
            }
            // else the '\n' will break the line
        } else if *item == self.newline.eol {
            self.loc.new_line();
        } else {
            self.loc.column += 1;
        }
        self.loc.position += 1;
        swallow
    }
    fn location(&self) -> Option<&SourceLocation> {
        Some(&self.loc)
    }
}


pub struct Input<T, F, K = NoTrack> {
    feed: F,
    track: K,
    on_error: OnError<T>,
    on_item: Option<Box<dyn FnMut(&T)>>,
    state: StateMap,
}

pub type CharInput<F> = Input<char, F, LineTracker>;

impl<T, F: Feed<T>> Input<T, F, NoTrack> {
    pub fn new(feed: F) -> Input<T, F, NoTrack> {
        Input::tracked(feed, NoTrack)
    }
}

impl<F: Feed<char>> Input<char, F, LineTracker> {
    pub fn chars(feed: F, file: &str) -> CharInput<F> {
        Input::tracked(feed, LineTracker::new(file, Newline::default()))
    }

    pub fn newline(mut self, newline: Newline) -> CharInput<F> {
        self.track.newline = newline;
        self
    }
}

impl<T, F: Feed<T>, K: Track<T>> Input<T, F, K> {
    pub fn tracked(feed: F, track: K) -> Input<T, F, K> {
        Input {
            feed,
            track,
            on_error: OnError::Raise,
            on_item: None,
            state: StateMap::new(),
        }
    }

    pub fn on_error(mut self, on_error: OnError<T>) -> Input<T, F, K> {
        self.on_error = on_error;
        self
    }

    /// Switch to recording errors instead of raising them; see
    /// [take_errors](Input::take_errors).
    pub fn collect_errors(self) -> Input<T, F, K> {
        self.on_error(OnError::Collect(Vec::new()))
    }

    /// The errors recorded so far (empty unless collecting).
    pub fn take_errors(&mut self) -> Vec<ErrorRecord<T>> {
        match &mut self.on_error {
            OnError::Collect(v) => std::mem::take(v),
            _ => Vec::new()
        }
    }

    /// Additional side effect for every consumed token.
    pub fn on_item(mut self, hook: impl FnMut(&T) + 'static) -> Input<T, F, K> {
        self.on_item = Some(Box::new(hook));
        self
    }

    pub fn with_state<S: Any>(mut self, value: S) -> Input<T, F, K> {
        self.state.insert(value);
        self
    }

    pub fn state_map(&mut self) -> &mut StateMap {
        &mut self.state
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    pub fn feed_mut(&mut self) -> &mut F {
        &mut self.feed
    }
}

impl<T, F, K> Feed<T> for Input<T, F, K>
    where T: Clone + Debug,
          F: Feed<T>,
          K: Track<T>
{
    fn peek(&self) -> &T {
        self.feed.peek()
    }

    fn consume(&mut self) -> Result<T, End> {
        let item = self.feed.consume()?;
        if self.track.on_item(&item, self.feed.peek()) {
            let _ = self.feed.consume();
        }
        if let Some(hook) = &mut self.on_item {
            hook(&item);
        }
        Ok(item)
    }

    fn at_end(&self) -> bool {
        self.feed.at_end()
    }

    fn error(&mut self, message: String) -> Result<(), ParseError> {
        let location = self.track.location().cloned();
        match &mut self.on_error {
            OnError::Raise => {
                if let Some(loc) = location {
                    Err(ParseError::Located(loc, message))
                } else {
                    Err(ParseError::Failed(
                        format!("parse fail near `{:?}`: {}",
                                self.feed.peek(), message)))
                }
            }
            OnError::Collect(v) => {
                log::debug!("recording error: {}", message);
                v.push(ErrorRecord {
                    token: self.feed.peek().clone(),
                    location,
                    message,
                });
                Ok(())
            }
            OnError::Listen(listener) => {
                let record = ErrorRecord {
                    token: self.feed.peek().clone(),
                    location,
                    message,
                };
                listener(record)
            }
        }
    }

    fn source_loc(&self) -> Option<&SourceLocation> {
        self.track.location()
    }

    fn state(&mut self) -> Option<&mut StateMap> {
        Some(&mut self.state)
    }
}


pub fn input_of_str(text: &str, file: &str)
                    -> Result<CharInput<SliceFeed<char>>, ParseError> {
    Ok(Input::chars(SliceFeed::new(text.chars().collect())?, file))
}

pub fn input_of_items<T: Clone>(items: Vec<T>)
                                -> Result<Input<T, SliceFeed<T>>, ParseError> {
    Ok(Input::new(SliceFeed::new(items)?))
}

pub fn input_of_iter<I>(iter: I)
                        -> Result<Input<I::Item, IteratorFeed<I::IntoIter>>, ParseError>
    where I: IntoIterator,
          I::Item: Clone
{
    Ok(Input::new(IteratorFeed::new(iter)?))
}

pub fn input_of_reader<'r>(fh: impl Read + 'r, file: &str)
                           -> Result<CharInput<ReaderFeed<'r>>, ParseError> {
    Ok(Input::chars(ReaderFeed::new(fh)?, file))
}
