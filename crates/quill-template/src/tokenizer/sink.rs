//! The capability the tokenizer reports to.
//!
//! A tree builder implements [`Sink`] and receives events synchronously, in
//! document order, from inside the scan loop. Events carry offsets only; the
//! sink slices its own copy of the input when it needs text.

use super::event::Event;

/// Receives lexical events from a [`Tokenizer`](super::Tokenizer).
pub trait Sink {
    /// Handle one event. The last event of every parse is [`Event::End`].
    fn emit(&mut self, event: Event);
}

/// Collects events in order.
impl Sink for Vec<Event> {
    fn emit(&mut self, event: Event) {
        self.push(event);
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn emit(&mut self, event: Event) {
        (**self).emit(event);
    }
}
