//! Helper functions for the template tokenizer.
//!
//! This module contains utility functions used throughout the state machine:
//! - State transitions ("switch to", "reconsume in")
//! - Input lookahead
//! - Section bookkeeping and event emission
//! - Diagnostics

use tracing::{debug, trace};

use super::event::{ErrorCode, Event, QuoteType, Span};
use super::machine::{State, Tokenizer};
use super::sink::Sink;

// =============================================================================
// State Transition Helpers
// =============================================================================

impl<S: Sink> Tokenizer<'_, S> {
    /// Transition to a new state. The next byte is dispatched to it on the
    /// next iteration of the main loop.
    pub(super) fn switch_to(&mut self, new_state: State) {
        if self.state != new_state {
            trace!(target: "quill::tokenizer", from = %self.state, to = %new_state, "switch");
            self.stats.state_transitions += 1;
        }
        self.state = new_state;
    }

    /// Transition to a new state and dispatch the current byte to it again,
    /// within the same step. The cursor does not move.
    pub(super) fn reconsume_in(&mut self, new_state: State, c: u8) {
        self.stats.reconsumes += 1;
        self.switch_to(new_state);
        self.dispatch(c);
    }
}

// =============================================================================
// Input Helpers
// =============================================================================

impl<S> Tokenizer<'_, S> {
    /// The byte after the current one, if any.
    pub(super) fn peek(&self) -> Option<u8> {
        self.buffer.get(self.cursor + 1).copied()
    }

    /// `[section_start, cursor)`, empty when no section is open.
    pub(super) fn section(&self) -> Span {
        Span::new(self.section_start.unwrap_or(self.cursor), self.cursor)
    }
}

// =============================================================================
// Event Emission Helpers
// =============================================================================

impl<S: Sink> Tokenizer<'_, S> {
    /// Hand one event to the sink.
    pub(super) fn emit(&mut self, event: Event) {
        trace!(target: "quill::tokenizer", ?event, "emit");
        self.stats.events_emitted += 1;
        self.sink.emit(event);
    }

    /// Emit the text accumulated since the section start, up to `end`.
    /// Nothing is emitted for an empty span.
    pub(super) fn emit_pending_text(&mut self, end: usize) {
        let start = self.section_start.unwrap_or(end);
        if end > start {
            self.emit(Event::Text(Span::new(start, end)));
        }
    }

    /// Long-form directive name, `v-on` in `v-on:click`.
    pub(super) fn emit_dir_name(&mut self) {
        self.emit(Event::DirName {
            span: self.section(),
            shorthand: None,
        });
    }

    /// Directive argument. `[expr]` is reported as a dynamic argument with
    /// the brackets stripped.
    pub(super) fn emit_dir_arg(&mut self) {
        let span = self.section();
        let is_dynamic = matches!(
            self.buffer.get(span.range()),
            Some([b'[', .., b']'])
        );
        if is_dynamic {
            self.emit(Event::DirDynamicArg(Span::new(span.start + 1, span.end - 1)));
        } else {
            self.emit(Event::DirArg(span));
        }
    }

    /// End of an attribute that has no `=value`. The section holds the end of
    /// the name.
    pub(super) fn emit_valueless_attr_end(&mut self) {
        let end = self.section_start.unwrap_or(self.cursor);
        self.emit(Event::AttribEnd {
            quote: QuoteType::NoValue,
            end,
        });
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl<S: Sink> Tokenizer<'_, S> {
    /// Report a non-fatal problem in-stream. Tokenizing always continues.
    pub(super) fn report(&mut self, code: ErrorCode, index: usize) {
        debug!(target: "quill::tokenizer", %code, index, "tokenizer diagnostic");
        self.emit(Event::Error { code, index });
    }
}
