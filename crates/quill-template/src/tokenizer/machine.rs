use strum_macros::Display;
use tracing::trace;

use super::chars::{is_end_of_tag_section, is_tag_start_char, is_whitespace};
use super::delimiter::{DelimiterMatcher, Delimiters, MatchStep};
use super::event::{ErrorCode, Event, QuoteType, Shorthand, Span};
use super::sink::Sink;

/// The tokenizer state machine. Exactly one state is active at a time and
/// every state has an arm in [`Tokenizer::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum State {
    /// Plain text. The initial state.
    Text,

    /// Matching the open delimiter.
    InterpolationOpen,
    /// Inside `{{ ... }}`.
    Interpolation,
    /// Matching the close delimiter.
    InterpolationClose,

    /// After `<`.
    BeforeTagName,
    /// Reading an opening tag name.
    InTagName,
    /// After `/` inside an opening tag.
    InSelfClosingTag,
    /// After `</`.
    BeforeClosingTagName,
    /// Reading a closing tag name.
    InClosingTagName,
    /// After a closing tag name, skipping to `>`.
    AfterClosingTagName,

    /// Between attributes.
    BeforeAttrName,
    /// Reading a plain attribute name.
    InAttrName,
    /// Reading a `v-` directive name.
    InDirName,
    /// Reading a directive argument.
    InDirArg,
    /// Inside `[...]` of a directive argument.
    InDirDynamicArg,
    /// Reading a directive modifier.
    InDirModifier,
    /// After an attribute or directive name.
    AfterAttrName,
    /// After `=`.
    BeforeAttrValue,
    /// Inside a `"` quoted value.
    InAttrValueDq,
    /// Inside a `'` quoted value.
    InAttrValueSq,
    /// Inside an unquoted value.
    InAttrValueNq,

    /// Reserved: after `<!`.
    BeforeDeclaration,
    /// Reserved: inside `<!...>`.
    InDeclaration,
    /// Reserved: inside `<?...>`.
    InProcessingInstruction,
    /// Reserved: after `<!-`.
    BeforeComment,
    /// Reserved: matching `[CDATA[`.
    CdataSequence,
    /// Reserved: bogus comment.
    InSpecialComment,
    /// Reserved: comment or CDATA body.
    InCommentLike,
    /// Reserved: deciding between `<script` and `<style`.
    BeforeSpecialS,
    /// Reserved: deciding between `<title` and `<textarea`.
    BeforeSpecialT,
    /// Reserved: matching a raw-text element name.
    SpecialStartSequence,
    /// Reserved: raw-text element body.
    InRcdata,
    /// Reserved: character reference.
    InEntity,
    /// Reserved: root tag name of a single-file component.
    InSfcRootTagName,
}

/// Per-instance configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenizerOptions {
    /// Interpolation markers, `{{` and `}}` by default.
    pub delimiters: Delimiters,
    /// Disable interpolation; delimiters are read as text.
    pub v_pre: bool,
}

impl TokenizerOptions {
    /// Replace the interpolation markers.
    #[must_use]
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Turn interpolation recognition off (`true`) or on (`false`).
    #[must_use]
    pub fn with_v_pre(mut self, v_pre: bool) -> Self {
        self.v_pre = v_pre;
        self
    }
}

/// Counters for the last parse.
///
/// `steps` always equals the input length in bytes once a parse returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenizerStats {
    /// Top-level byte dispatches.
    pub steps: u64,
    /// Re-dispatches of the current byte after a state change.
    pub reconsumes: u64,
    /// State changes.
    pub state_transitions: u64,
    /// Events handed to the sink, `End` included.
    pub events_emitted: u64,
}

/// Single-pass template tokenizer.
///
/// Feeds every byte of the input through the state machine once and reports
/// [`Event`]s to the sink `S`. The tokenizer never fails: malformed markup
/// degrades to text, and problems worth knowing about are reported as
/// [`Event::Error`].
///
/// ```
/// use quill_template::{Event, Span, Tokenizer};
///
/// let mut tokenizer = Tokenizer::new(Vec::new());
/// tokenizer.parse("hi {{ name }}");
/// assert_eq!(
///     tokenizer.into_sink(),
///     vec![
///         Event::Text(Span::new(0, 3)),
///         Event::Interpolation(Span::new(5, 11)),
///         Event::End,
///     ]
/// );
/// ```
pub struct Tokenizer<'src, S> {
    pub(super) state: State,
    pub(super) buffer: &'src [u8],
    pub(super) cursor: usize,
    // Start of the token being accumulated; `None` when nothing is pending.
    pub(super) section_start: Option<usize>,
    pub(super) options: TokenizerOptions,
    pub(super) matcher: DelimiterMatcher,
    // Tag syntax is suppressed while set.
    pub(super) in_raw_text: bool,
    pub(super) sink: S,
    pub(super) stats: TokenizerStats,
}

impl<S> Tokenizer<'_, S> {
    /// Create a tokenizer with default options.
    pub fn new(sink: S) -> Self {
        Self::with_options(sink, TokenizerOptions::default())
    }

    /// Create a tokenizer with the given options.
    pub fn with_options(sink: S, options: TokenizerOptions) -> Self {
        Self {
            state: State::Text,
            buffer: &[],
            cursor: 0,
            section_start: Some(0),
            options,
            matcher: DelimiterMatcher::default(),
            in_raw_text: false,
            sink,
            stats: TokenizerStats::default(),
        }
    }

    /// Return to the initial scan state: cursor, state, pending section,
    /// delimiter progress and statistics. Options, the raw-text flag and
    /// the sink are kept.
    pub fn reset(&mut self) {
        self.state = State::Text;
        self.buffer = &[];
        self.cursor = 0;
        self.section_start = Some(0);
        self.matcher.clear();
        self.stats = TokenizerStats::default();
    }

    /// The active state.
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    /// Offset of the next byte to be dispatched.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Counters for the last parse.
    #[must_use]
    pub const fn stats(&self) -> TokenizerStats {
        self.stats
    }

    /// The options this tokenizer was built with.
    #[must_use]
    pub const fn options(&self) -> &TokenizerOptions {
        &self.options
    }

    /// Suppress (`true`) or restore (`false`) tag recognition in text.
    ///
    /// While raw-text mode is on, `<` is ordinary text; interpolation is
    /// still recognised. Nothing switches the mode off automatically.
    pub const fn set_raw_text(&mut self, raw_text: bool) {
        self.in_raw_text = raw_text;
    }

    /// Whether raw-text mode is on.
    #[must_use]
    pub const fn is_raw_text(&self) -> bool {
        self.in_raw_text
    }

    /// The sink.
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// The sink, mutably.
    pub const fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the tokenizer and return the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<'src, S: Sink> Tokenizer<'src, S> {
    /// Tokenize `input` to completion.
    ///
    /// Resets the scan state first, dispatches every byte exactly once, then
    /// flushes whatever section is still open and emits [`Event::End`].
    pub fn parse(&mut self, input: &'src str) {
        self.reset();
        self.buffer = input.as_bytes();
        trace!(target: "quill::tokenizer", len = input.len(), "parse");

        let buffer = self.buffer;
        for &c in buffer {
            self.stats.steps += 1;
            self.dispatch(c);
            self.cursor += 1;
        }

        self.flush();
        self.emit(Event::End);
    }

    /// Route `c` to the handler of the active state.
    pub(super) fn dispatch(&mut self, c: u8) {
        match self.state {
            State::Text => self.handle_text_state(c),
            State::InterpolationOpen => self.handle_interpolation_open_state(c),
            State::Interpolation => self.handle_interpolation_state(c),
            State::InterpolationClose => self.handle_interpolation_close_state(c),
            State::BeforeTagName => self.handle_before_tag_name_state(c),
            State::InTagName => self.handle_in_tag_name_state(c),
            State::InSelfClosingTag => self.handle_in_self_closing_tag_state(c),
            State::BeforeClosingTagName => self.handle_before_closing_tag_name_state(c),
            State::InClosingTagName => self.handle_in_closing_tag_name_state(c),
            State::AfterClosingTagName => self.handle_after_closing_tag_name_state(c),
            State::BeforeAttrName => self.handle_before_attr_name_state(c),
            State::InAttrName => self.handle_in_attr_name_state(c),
            State::InDirName => self.handle_in_dir_name_state(c),
            State::InDirArg => self.handle_in_dir_arg_state(c),
            State::InDirDynamicArg => self.handle_in_dir_dynamic_arg_state(c),
            State::InDirModifier => self.handle_in_dir_modifier_state(c),
            State::AfterAttrName => self.handle_after_attr_name_state(c),
            State::BeforeAttrValue => self.handle_before_attr_value_state(c),
            State::InAttrValueDq => {
                self.handle_in_attr_value_quoted_state(c, b'"', QuoteType::Double);
            }
            State::InAttrValueSq => {
                self.handle_in_attr_value_quoted_state(c, b'\'', QuoteType::Single);
            }
            State::InAttrValueNq => self.handle_in_attr_value_unquoted_state(c),
            State::BeforeDeclaration
            | State::InDeclaration
            | State::InProcessingInstruction
            | State::BeforeComment
            | State::CdataSequence
            | State::InSpecialComment
            | State::InCommentLike
            | State::BeforeSpecialS
            | State::BeforeSpecialT
            | State::SpecialStartSequence
            | State::InRcdata
            | State::InEntity
            | State::InSfcRootTagName => self.handle_reserved_state(c),
        }
    }

    // =========================================================================
    // Text and interpolation
    // =========================================================================

    /// `<` opens a tag unless raw-text mode is on; the first byte of the open
    /// delimiter starts an interpolation match. Everything else accumulates.
    fn handle_text_state(&mut self, c: u8) {
        if c == b'<' && !self.in_raw_text {
            self.emit_pending_text(self.cursor);
            self.switch_to(State::BeforeTagName);
            self.section_start = Some(self.cursor);
        } else if !self.options.v_pre && self.options.delimiters.open().first() == Some(&c) {
            self.matcher.start();
            self.reconsume_in(State::InterpolationOpen, c);
        }
    }

    /// On a full match the text before the delimiter is flushed and the
    /// section moves to the first delimiter byte. A mismatch reconsumes in
    /// text, leaving the matched prefix as ordinary text.
    fn handle_interpolation_open_state(&mut self, c: u8) {
        match self.matcher.step(self.options.delimiters.open(), c) {
            MatchStep::Partial => {}
            MatchStep::Complete => {
                let start = self.cursor + 1 - self.options.delimiters.open().len();
                self.emit_pending_text(start);
                self.switch_to(State::Interpolation);
                self.section_start = Some(start);
            }
            MatchStep::Mismatch => self.reconsume_in(State::Text, c),
        }
    }

    fn handle_interpolation_state(&mut self, c: u8) {
        if self.options.delimiters.close().first() == Some(&c) {
            self.matcher.start();
            self.reconsume_in(State::InterpolationClose, c);
        }
    }

    /// The section starts at the open delimiter, so the content span skips
    /// the open marker and stops before the close marker.
    fn handle_interpolation_close_state(&mut self, c: u8) {
        match self.matcher.step(self.options.delimiters.close(), c) {
            MatchStep::Partial => {}
            MatchStep::Complete => {
                let open_len = self.options.delimiters.open().len();
                let close_len = self.options.delimiters.close().len();
                let start = self.section_start.map_or(self.cursor, |s| s + open_len);
                let end = self.cursor + 1 - close_len;
                self.emit(Event::Interpolation(Span::new(start, end)));
                self.switch_to(State::Text);
                self.section_start = Some(self.cursor + 1);
            }
            MatchStep::Mismatch => self.reconsume_in(State::Interpolation, c),
        }
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// `!` and `?` would start declarations, comments and processing
    /// instructions, which are not tokenized; they are skipped here. Anything
    /// that cannot start a tag turns the `<` back into text.
    fn handle_before_tag_name_state(&mut self, c: u8) {
        match c {
            b'!' | b'?' => {
                trace!(
                    target: "quill::tokenizer",
                    offset = self.cursor,
                    "markup declaration skipped"
                );
            }
            b'/' => self.switch_to(State::BeforeClosingTagName),
            _ if is_tag_start_char(c) => {
                self.switch_to(State::InTagName);
                self.section_start = Some(self.cursor);
            }
            _ => self.reconsume_in(State::Text, c),
        }
    }

    fn handle_in_tag_name_state(&mut self, c: u8) {
        if is_end_of_tag_section(c) {
            self.emit(Event::OpenTagName(self.section()));
            self.section_start = None;
            self.reconsume_in(State::BeforeAttrName, c);
        }
    }

    fn handle_before_closing_tag_name_state(&mut self, c: u8) {
        if is_tag_start_char(c) {
            self.switch_to(State::InClosingTagName);
            self.section_start = Some(self.cursor);
        } else {
            self.reconsume_in(State::Text, c);
        }
    }

    fn handle_in_closing_tag_name_state(&mut self, c: u8) {
        if is_end_of_tag_section(c) {
            self.emit(Event::CloseTag(self.section()));
            self.section_start = None;
            self.reconsume_in(State::AfterClosingTagName, c);
        }
    }

    /// Everything up to `>` is skipped.
    fn handle_after_closing_tag_name_state(&mut self, c: u8) {
        if c == b'>' {
            self.switch_to(State::Text);
            self.section_start = Some(self.cursor + 1);
        }
    }

    fn handle_in_self_closing_tag_state(&mut self, c: u8) {
        if c == b'>' {
            self.emit(Event::SelfClosingTag { end: self.cursor });
            self.switch_to(State::Text);
            self.section_start = Some(self.cursor + 1);
        } else if !is_whitespace(c) {
            self.reconsume_in(State::BeforeAttrName, c);
        }
    }

    // =========================================================================
    // Attributes and directives
    // =========================================================================

    fn handle_before_attr_name_state(&mut self, c: u8) {
        match c {
            b'>' => {
                self.emit(Event::OpenTagEnd { end: self.cursor });
                self.switch_to(State::Text);
                self.section_start = Some(self.cursor + 1);
            }
            b'/' => self.switch_to(State::InSelfClosingTag),
            _ if !is_whitespace(c) => self.handle_attr_start(c),
            _ => {}
        }
    }

    /// Classify the first byte of an attribute.
    ///
    /// - `v-` starts a long-form directive name.
    /// - `:` `@` `#` `.` are directive sigils. The sigil itself is reported as
    ///   the directive name and the argument starts after it.
    /// - Anything else starts a plain attribute name.
    fn handle_attr_start(&mut self, c: u8) {
        if c == b'v' && self.peek() == Some(b'-') {
            self.switch_to(State::InDirName);
            self.section_start = Some(self.cursor);
        } else if let Some(shorthand) = Shorthand::from_sigil(c) {
            self.emit(Event::DirName {
                span: Span::new(self.cursor, self.cursor + 1),
                shorthand: Some(shorthand),
            });
            self.switch_to(State::InDirArg);
            self.section_start = Some(self.cursor + 1);
        } else {
            self.switch_to(State::InAttrName);
            self.section_start = Some(self.cursor);
        }
    }

    fn handle_in_attr_name_state(&mut self, c: u8) {
        if c == b'=' || is_end_of_tag_section(c) {
            self.emit(Event::AttribName(self.section()));
            self.handle_attr_name_end(c);
        }
    }

    /// `v-name`, optionally followed by `:arg` or `.modifier`.
    fn handle_in_dir_name_state(&mut self, c: u8) {
        if c == b'=' || is_end_of_tag_section(c) {
            self.emit_dir_name();
            self.handle_attr_name_end(c);
        } else if c == b':' {
            self.emit_dir_name();
            self.switch_to(State::InDirArg);
            self.section_start = Some(self.cursor + 1);
        } else if c == b'.' {
            self.emit_dir_name();
            self.switch_to(State::InDirModifier);
            self.section_start = Some(self.cursor + 1);
        }
    }

    fn handle_in_dir_arg_state(&mut self, c: u8) {
        if c == b'=' || is_end_of_tag_section(c) {
            self.emit_dir_arg();
            self.handle_attr_name_end(c);
        } else if c == b'[' {
            self.switch_to(State::InDirDynamicArg);
        } else if c == b'.' {
            self.emit_dir_arg();
            self.switch_to(State::InDirModifier);
            self.section_start = Some(self.cursor + 1);
        }
    }

    /// Only one level of brackets is tracked: the first `]` returns to the
    /// argument state. A name terminator before `]` reports the missing
    /// bracket and ends the argument as a static one.
    fn handle_in_dir_dynamic_arg_state(&mut self, c: u8) {
        if c == b']' {
            self.switch_to(State::InDirArg);
        } else if c == b'=' || is_end_of_tag_section(c) {
            self.report(ErrorCode::MissingDynamicDirectiveArgumentEnd, self.cursor);
            self.emit(Event::DirArg(self.section()));
            self.handle_attr_name_end(c);
        }
    }

    /// Chained modifiers (`.stop.prevent`) each produce one event.
    fn handle_in_dir_modifier_state(&mut self, c: u8) {
        if c == b'=' || is_end_of_tag_section(c) {
            self.emit(Event::DirModifier(self.section()));
            self.handle_attr_name_end(c);
        } else if c == b'.' {
            self.emit(Event::DirModifier(self.section()));
            self.section_start = Some(self.cursor + 1);
        }
    }

    /// Shared exit of every name state. The section marks the end of the
    /// name so a valueless attribute can report where it ended.
    fn handle_attr_name_end(&mut self, c: u8) {
        self.section_start = Some(self.cursor);
        self.emit(Event::AttribNameEnd { end: self.cursor });
        self.reconsume_in(State::AfterAttrName, c);
    }

    fn handle_after_attr_name_state(&mut self, c: u8) {
        match c {
            b'=' => self.switch_to(State::BeforeAttrValue),
            b'/' | b'>' => {
                self.emit_valueless_attr_end();
                self.section_start = None;
                self.reconsume_in(State::BeforeAttrName, c);
            }
            _ if !is_whitespace(c) => {
                self.emit_valueless_attr_end();
                self.handle_attr_start(c);
            }
            _ => {}
        }
    }

    fn handle_before_attr_value_state(&mut self, c: u8) {
        match c {
            b'"' => {
                self.switch_to(State::InAttrValueDq);
                self.section_start = Some(self.cursor + 1);
            }
            b'\'' => {
                self.switch_to(State::InAttrValueSq);
                self.section_start = Some(self.cursor + 1);
            }
            _ if !is_whitespace(c) => {
                self.section_start = Some(self.cursor);
                self.reconsume_in(State::InAttrValueNq, c);
            }
            _ => {}
        }
    }

    fn handle_in_attr_value_quoted_state(&mut self, c: u8, quote: u8, quote_type: QuoteType) {
        if c == quote {
            self.emit(Event::AttribData(self.section()));
            self.section_start = None;
            self.emit(Event::AttribEnd {
                quote: quote_type,
                end: self.cursor + 1,
            });
            self.switch_to(State::BeforeAttrName);
        }
    }

    /// Whitespace or `>` ends the value; `>` then also ends the tag.
    fn handle_in_attr_value_unquoted_state(&mut self, c: u8) {
        if is_whitespace(c) || c == b'>' {
            self.emit(Event::AttribData(self.section()));
            self.section_start = None;
            self.emit(Event::AttribEnd {
                quote: QuoteType::Unquoted,
                end: self.cursor,
            });
            self.reconsume_in(State::BeforeAttrName, c);
        }
    }

    /// Comments, CDATA, processing instructions, raw-text elements and
    /// character references are not tokenized yet. Nothing enters these
    /// states; if something does, the byte is read as text.
    fn handle_reserved_state(&mut self, c: u8) {
        trace!(
            target: "quill::tokenizer",
            state = %self.state,
            "reserved state, falling back to text"
        );
        self.reconsume_in(State::Text, c);
    }

    // =========================================================================
    // End of input
    // =========================================================================

    /// Flush the section still open when the input runs out.
    fn flush(&mut self) {
        let end = self.buffer.len();
        match self.state {
            State::Text
            | State::InterpolationOpen
            | State::BeforeTagName
            | State::BeforeClosingTagName
            | State::BeforeDeclaration
            | State::InDeclaration
            | State::InProcessingInstruction
            | State::BeforeComment
            | State::CdataSequence
            | State::InSpecialComment
            | State::InCommentLike
            | State::BeforeSpecialS
            | State::BeforeSpecialT
            | State::SpecialStartSequence
            | State::InRcdata
            | State::InEntity
            | State::InSfcRootTagName => self.emit_pending_text(end),
            State::Interpolation | State::InterpolationClose => {
                let start = self.section_start.unwrap_or(end);
                self.report(ErrorCode::MissingInterpolationEnd, start);
                self.emit_pending_text(end);
            }
            State::InAttrValueDq | State::InAttrValueSq | State::InAttrValueNq => {
                let value = self.section();
                if !value.is_empty() {
                    self.emit(Event::AttribData(value));
                }
            }
            State::InTagName
            | State::InSelfClosingTag
            | State::InClosingTagName
            | State::AfterClosingTagName
            | State::BeforeAttrName
            | State::InAttrName
            | State::InDirName
            | State::InDirArg
            | State::InDirDynamicArg
            | State::InDirModifier
            | State::AfterAttrName
            | State::BeforeAttrValue => self.report(ErrorCode::EofInTag, end),
        }
    }
}
