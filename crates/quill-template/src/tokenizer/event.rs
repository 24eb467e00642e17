use core::fmt;
use core::ops::Range;

use strum_macros::{Display, IntoStaticStr};

/// Half-open byte range `[start, end)` into the tokenizer input.
///
/// Span boundaries always fall on UTF-8 character boundaries of the input
/// the span was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// First byte of the token.
    pub start: usize,
    /// One past the last byte of the token.
    pub end: usize,
}

impl Span {
    /// Create a span. `start` must not exceed `end`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start must be <= end");
        Self { start, end }
    }

    /// Length in bytes.
    #[must_use]
    pub const fn len(self) -> usize {
        self.end - self.start
    }

    /// True for a zero-length span.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// The span as a range, for indexing.
    #[must_use]
    pub const fn range(self) -> Range<usize> {
        self.start..self.end
    }

    /// Slice the text this span covers.
    ///
    /// # Panics
    ///
    /// Panics if `input` is not the text the span was produced from and the
    /// range is out of bounds or not on character boundaries.
    #[must_use]
    pub fn slice(self, input: &str) -> &str {
        &input[self.range()]
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// How an attribute value was written. Tells the consumer whether
/// whitespace or `>` could have ended the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum QuoteType {
    /// Bare attribute, no `=`.
    NoValue,
    /// `name=value`
    Unquoted,
    /// `name='value'`
    Single,
    /// `name="value"`
    Double,
}

/// Sigil forms of the built-in directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum Shorthand {
    /// `:arg`
    #[strum(serialize = "v-bind")]
    Bind,
    /// `@event`
    #[strum(serialize = "v-on")]
    On,
    /// `#name`
    #[strum(serialize = "v-slot")]
    Slot,
    /// `.prop`, a property binding.
    #[strum(serialize = "v-bind")]
    Prop,
}

impl Shorthand {
    /// Classify a directive sigil.
    #[must_use]
    pub const fn from_sigil(c: u8) -> Option<Self> {
        match c {
            b':' => Some(Self::Bind),
            b'@' => Some(Self::On),
            b'#' => Some(Self::Slot),
            b'.' => Some(Self::Prop),
            _ => None,
        }
    }

    /// The sigil this shorthand is written with.
    #[must_use]
    pub const fn sigil(self) -> char {
        match self {
            Self::Bind => ':',
            Self::On => '@',
            Self::Slot => '#',
            Self::Prop => '.',
        }
    }

    /// The long-form directive name, e.g. `v-on` for `@`.
    #[must_use]
    pub fn canonical_name(self) -> &'static str {
        self.into()
    }
}

/// Non-fatal problems noticed while tokenizing. Reported in-stream as
/// [`Event::Error`]; tokenizing always continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorCode {
    /// Input ended inside a tag; the tag is dropped.
    EofInTag,
    /// Input ended inside an interpolation; it is flushed as text.
    MissingInterpolationEnd,
    /// A `[` in a directive argument was never closed.
    MissingDynamicDirectiveArgumentEnd,
}

/// One lexical event. Events hold offsets only; use [`Event::text`] or
/// [`Span::slice`] to read the underlying text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Event {
    /// Literal text between tags and interpolations.
    Text(Span),
    /// Interpolation content, delimiters excluded.
    Interpolation(Span),
    /// Name of an opening tag.
    OpenTagName(Span),
    /// The `>` that ends an opening tag.
    OpenTagEnd {
        /// Offset of the `>`.
        end: usize,
    },
    /// The `/>` that ends a self-closing tag.
    SelfClosingTag {
        /// Offset of the `>`.
        end: usize,
    },
    /// Name of a closing tag.
    CloseTag(Span),
    /// Name of a plain attribute.
    AttribName(Span),
    /// An attribute or directive name has been fully read.
    AttribNameEnd {
        /// Offset just past the name.
        end: usize,
    },
    /// Attribute value, quotes excluded.
    AttribData(Span),
    /// An attribute is complete.
    AttribEnd {
        /// How the value was written.
        quote: QuoteType,
        /// Offset just past the attribute.
        end: usize,
    },
    /// Directive name. For sigil forms the span covers the sigil and
    /// `shorthand` says which directive it stands for.
    DirName {
        /// `v-name` text, or the one-byte sigil.
        span: Span,
        /// Set for `:`, `@`, `#` and `.`.
        shorthand: Option<Shorthand>,
    },
    /// Static directive argument.
    DirArg(Span),
    /// Dynamic directive argument, brackets excluded.
    DirDynamicArg(Span),
    /// One modifier of a directive. Chained modifiers produce one event each.
    DirModifier(Span),
    /// A non-fatal diagnostic.
    Error {
        /// What went wrong.
        code: ErrorCode,
        /// Where it was noticed.
        index: usize,
    },
    /// End of stream. Always the last event of a parse.
    End,
}

impl Event {
    /// The kebab-case name of the event kind, e.g. `open-tag-name`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// The span this event covers, if it carries one.
    #[must_use]
    pub const fn span(&self) -> Option<Span> {
        match *self {
            Self::Text(span)
            | Self::Interpolation(span)
            | Self::OpenTagName(span)
            | Self::CloseTag(span)
            | Self::AttribName(span)
            | Self::AttribData(span)
            | Self::DirName { span, .. }
            | Self::DirArg(span)
            | Self::DirDynamicArg(span)
            | Self::DirModifier(span) => Some(span),
            Self::OpenTagEnd { .. }
            | Self::SelfClosingTag { .. }
            | Self::AttribNameEnd { .. }
            | Self::AttribEnd { .. }
            | Self::Error { .. }
            | Self::End => None,
        }
    }

    /// The text of the event's span in `input`.
    #[must_use]
    pub fn text(self, input: &str) -> Option<&str> {
        self.span().map(|span| span.slice(input))
    }

    /// For [`Event::DirName`], the directive name with shorthand expanded:
    /// `v-on` for both `@click` and `v-on:click`.
    #[must_use]
    pub fn directive_name(self, input: &str) -> Option<&str> {
        match self {
            Self::DirName {
                shorthand: Some(shorthand),
                ..
            } => Some(shorthand.canonical_name()),
            Self::DirName { span, .. } => Some(span.slice(input)),
            _ => None,
        }
    }
}
