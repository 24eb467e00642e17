//! Template tokenizer module.
//!
//! A byte-at-a-time state machine. Every handler either stays in its state,
//! switches state for the next byte, or reconsumes the current byte in a new
//! state. Output goes to a [`Sink`] as [`Event`] values carrying offsets into
//! the input.

/// Character classes shared by the tag, attribute and directive states.
pub mod chars;
/// Interpolation delimiters and the sliding-window matcher.
pub mod delimiter;
/// Events emitted by the tokenizer.
pub mod event;
/// Helper methods for state transitions and event emission.
mod helpers;
/// Tokenizer state machine implementation.
pub mod machine;
/// Event sink capability.
pub mod sink;

pub use delimiter::{DelimiterError, Delimiters};
pub use event::{ErrorCode, Event, QuoteType, Shorthand, Span};
pub use machine::{State, Tokenizer, TokenizerOptions, TokenizerStats};
pub use sink::Sink;
