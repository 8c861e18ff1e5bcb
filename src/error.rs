// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error types. There are two tiers of failure when reading: a
//! pattern not matching is `Ok(None)` (see
//! [ReadResult](ReadResult)), everything in here is fatal unless an
//! input is collecting errors instead of raising them.

use crate::location::SourceLocation;
use thiserror::Error;

/// Raised by [Feed::consume](crate::feed::Feed::consume) when called
/// past the last token.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no more")]
pub struct End;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("unexpected end of input")]
    End,
    #[error("empty input")]
    EmptyInput,
    #[error("{0}")]
    Failed(String),
    #[error("{0}: {1}")]
    Located(SourceLocation, String),
    #[error("IO error ({0})")]
    Io(anyhow::Error),
    #[error("recursive pattern used before being defined")]
    Undefined,
}

impl From<End> for ParseError {
    fn from(_: End) -> ParseError {
        ParseError::End
    }
}

impl ParseError {
    /// The location the error was raised at, if the input tracks
    /// locations.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            ParseError::Located(loc, _) => Some(loc),
            _ => None
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ShowError {
    #[error("{0} is not supported")]
    Unsupported(&'static str),
    #[error("missing separator: {separators} separators for {items} items")]
    SeparatorCount { items: usize, separators: usize },
    #[error("bad written count {count}, not in {min}..={max}")]
    RepeatCount { count: usize, min: usize, max: usize },
    #[error("bad tuple size ({got}, not {expected})")]
    TupleSize { expected: usize, got: usize },
    #[error("value has no registered path")]
    NotRegistered,
    #[error("surrounding pattern has no constant to show")]
    NoConstant,
    #[error("recursive pattern used before being defined")]
    Undefined,
    #[error("no case {index} among {cases} alternatives")]
    BadCase { index: usize, cases: usize },
}

/// A recursive pattern was given a second definition.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("recursive pattern is already defined")]
pub struct Redefined;

/// Failure of reading back what was shown, or showing what was read.
#[derive(Error, Debug)]
pub enum RoundTripError {
    #[error("read: {0}")]
    Read(#[from] ParseError),
    #[error("show: {0}")]
    Show(#[from] ShowError),
}

/// A reducer refusing an item, e.g. on overflow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct FoldError(pub String);

/// An error recorded by an input in collecting mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorRecord<T> {
    /// The token current when the error was reported.
    pub token: T,
    /// Only available for inputs tracking source locations.
    pub location: Option<SourceLocation>,
    pub message: String,
}

pub type ReadResult<T> = Result<Option<T>, ParseError>;
pub type ShowResult = Result<(), ShowError>;
