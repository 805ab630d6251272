/*!
# Source-range engine

Token-level adjustments of byte ranges. Rewrite rules never look at raw
bytes themselves; they ask for a deletion range or a token boundary and the
scanner here does the lexing.
*/

use crate::core::Span;
use logos::Logos;

/// Minimal raw C token classification for boundary decisions.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t]+")]
enum BoundaryToken {
    #[token(";")]
    Semi,

    #[token(",")]
    Comma,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    // Anything else ends the scan: newlines, operators, braces.
    #[regex(r"\r?\n")]
    Newline,
}

/// Range expansion: if the token following `span.end` is a `;`, a `,`, or an
/// identifier starting immediately at `span.end`, extend the range over that
/// token. This turns token ranges into char ranges fit for deletion and
/// replacement.
pub fn expand(source: &str, span: Span) -> Span {
    let Some(rest) = source.get(span.end..) else {
        return span;
    };
    let mut lexer = BoundaryToken::lexer(rest);
    match lexer.next() {
        Some(Ok(BoundaryToken::Semi)) | Some(Ok(BoundaryToken::Comma)) => {
            Span::new(span.begin, span.end + lexer.span().end)
        }
        // An identifier only counts when it is glued to the range end.
        Some(Ok(BoundaryToken::Ident)) if lexer.span().start == 0 => {
            Span::new(span.begin, span.end + lexer.span().end)
        }
        _ => span,
    }
}

/// End offset of the first token at or after `offset`, skipping horizontal
/// whitespace. Used for "insert after the token at this location" rules.
pub fn first_token_end(source: &str, offset: usize) -> usize {
    let Some(rest) = source.get(offset..) else {
        return offset;
    };
    let trimmed = rest.trim_start_matches([' ', '\t']);
    let ws = rest.len() - trimmed.len();
    let token_len = match trimmed.chars().next() {
        Some(c) if c.is_alphanumeric() || c == '_' => trimmed
            .find(|ch: char| !ch.is_alphanumeric() && ch != '_')
            .unwrap_or(trimmed.len()),
        Some(c) => c.len_utf8(),
        None => 0,
    };
    offset + ws + token_len
}

/// Extends `begin` backwards over horizontal whitespace and at most one
/// comma. Deleting a trailing list element must absorb its separator.
pub fn absorb_leading_comma(source: &str, begin: usize) -> usize {
    let bytes = source.as_bytes();
    let mut pos = begin;
    while pos > 0 && matches!(bytes[pos - 1], b' ' | b'\t') {
        pos -= 1;
    }
    if pos > 0 && bytes[pos - 1] == b',' {
        pos - 1
    } else {
        begin
    }
}
