//! Interpolation delimiters.
//!
//! The open and close markers are matched one byte per step. A partial match
//! is abandoned as soon as a byte differs; the caller then reconsumes that
//! byte in the state it came from, so matched prefix bytes simply stay part of
//! the surrounding text (or interpolation content).

use thiserror::Error;

/// Default open marker.
pub const DEFAULT_OPEN: &str = "{{";
/// Default close marker.
pub const DEFAULT_CLOSE: &str = "}}";

/// Which delimiter a [`DelimiterError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum DelimiterSide {
    /// The marker that opens an interpolation.
    Open,
    /// The marker that closes an interpolation.
    Close,
}

/// Rejected delimiter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DelimiterError {
    /// An empty marker can never be matched.
    #[error("{0} delimiter must not be empty")]
    Empty(DelimiterSide),
    /// The text state reads `<` as a tag opener before it looks at delimiters.
    #[error("open delimiter {0:?} starts with '<' and would never be recognised")]
    StartsWithTagOpen(String),
}

/// The open/close marker pair for interpolations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    open: Box<[u8]>,
    close: Box<[u8]>,
}

impl Delimiters {
    /// Build a delimiter pair.
    ///
    /// # Errors
    ///
    /// Returns [`DelimiterError::Empty`] if either marker is empty and
    /// [`DelimiterError::StartsWithTagOpen`] if `open` starts with `<`.
    pub fn new(open: &str, close: &str) -> Result<Self, DelimiterError> {
        if open.is_empty() {
            return Err(DelimiterError::Empty(DelimiterSide::Open));
        }
        if close.is_empty() {
            return Err(DelimiterError::Empty(DelimiterSide::Close));
        }
        if open.starts_with('<') {
            return Err(DelimiterError::StartsWithTagOpen(open.to_owned()));
        }
        Ok(Self {
            open: open.as_bytes().into(),
            close: close.as_bytes().into(),
        })
    }

    /// The open marker as bytes.
    #[must_use]
    pub const fn open(&self) -> &[u8] {
        &self.open
    }

    /// The close marker as bytes.
    #[must_use]
    pub const fn close(&self) -> &[u8] {
        &self.close
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            open: DEFAULT_OPEN.as_bytes().into(),
            close: DEFAULT_CLOSE.as_bytes().into(),
        }
    }
}

/// Outcome of feeding one byte to a [`DelimiterMatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStep {
    /// The byte matched and more bytes are needed.
    Partial,
    /// The byte completed the marker.
    Complete,
    /// The byte does not continue the marker; matching was abandoned.
    Mismatch,
}

/// Sliding-window progress through one delimiter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DelimiterMatcher {
    index: Option<usize>,
}

impl DelimiterMatcher {
    /// Begin matching at the first byte of a marker.
    pub const fn start(&mut self) {
        self.index = Some(0);
    }

    /// Forget any partial match.
    pub const fn clear(&mut self) {
        self.index = None;
    }

    /// Position of the next byte to match, `None` when idle.
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        self.index
    }

    /// Feed one byte against `marker`.
    ///
    /// An idle matcher treats the byte as the first one of the marker.
    pub fn step(&mut self, marker: &[u8], c: u8) -> MatchStep {
        let index = self.index.unwrap_or(0);
        if marker.get(index) != Some(&c) {
            self.index = None;
            return MatchStep::Mismatch;
        }
        if index + 1 == marker.len() {
            self.index = None;
            MatchStep::Complete
        } else {
            self.index = Some(index + 1);
            MatchStep::Partial
        }
    }
}
