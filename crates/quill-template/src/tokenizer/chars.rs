//! Byte classification predicates.
//!
//! All markup syntax is ASCII, so the tokenizer classifies raw bytes. Bytes of
//! multi-byte UTF-8 sequences never match any of these classes.

/// Whitespace as far as tags and attributes are concerned:
/// U+0020 SPACE, U+0009 TAB, U+000A LF, U+000D CR and U+000C FF.
#[must_use]
pub const fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | b'\x0C')
}

/// Only ASCII letters may open a tag name. Anything else after `<` is text.
#[must_use]
pub const fn is_tag_start_char(c: u8) -> bool {
    c.is_ascii_alphabetic()
}

/// Ends a tag name, attribute name or directive segment: `/`, `>` or
/// whitespace.
#[must_use]
pub const fn is_end_of_tag_section(c: u8) -> bool {
    c == b'/' || c == b'>' || is_whitespace(c)
}
