//! Template tokenizer for the Quill compiler front end.
//!
//! # Scope
//!
//! This crate implements a single-pass tokenizer for HTML-like templates:
//! - Tags, attributes and self-closing tags
//! - Directive attributes, long form (`v-on:click.stop`) and shorthand
//!   (`:`, `@`, `#`, `.`), including dynamic `[arg]` arguments
//! - Interpolation with configurable delimiters (`{{ expr }}` by default)
//!
//! The tokenizer never copies input. It reports byte offsets to a [`Sink`]
//! and the consumer slices the input when it needs text.
//!
//! # Not Yet Implemented
//!
//! - Comments, CDATA and processing instructions
//! - Raw-text elements (`script`, `style`, `textarea`) beyond the manual
//!   raw-text switch
//! - Character references

/// Template tokenizer state machine and its event model.
pub mod tokenizer;

pub use tokenizer::{
    DelimiterError, Delimiters, ErrorCode, Event, QuoteType, Shorthand, Sink, Span, State,
    Tokenizer, TokenizerOptions, TokenizerStats,
};

/// Tokenize `input` with the default options and collect every event.
///
/// The returned events always end with [`Event::End`].
#[must_use]
pub fn tokenize(input: &str) -> Vec<Event> {
    tokenize_with(input, TokenizerOptions::default())
}

/// Tokenize `input` with the given options and collect every event.
#[must_use]
pub fn tokenize_with(input: &str, options: TokenizerOptions) -> Vec<Event> {
    let mut tokenizer = Tokenizer::with_options(Vec::new(), options);
    tokenizer.parse(input);
    tokenizer.into_sink()
}
