//! Typst escaping utilities.
//!
//! Two independent policies, each a single forward scan over bytes:
//!
//! - [`write_content`] escapes bytes that could start markup, code, or math
//!   in Typst content. It ignores context, so it may over-escape but never
//!   lets a reserved byte through unescaped.
//! - [`write_string`] escapes bytes inside a Typst string literal.
//!
//! Unescaped runs are written with a single `write_all` each.

use std::io::{self, Write};

/// Whether `b` must be preceded by a backslash in Typst content.
///
/// Each entry is markup somewhere:
/// - `*` `_` strong/emph at word boundaries, `*` inside `/*` comments
/// - `` ` `` raw, `$` math, `#` scripting, `\` escape and line break
/// - `:` in URLs and terms, `<` `>` labels, `@` references
/// - `=` `-` `+` `.` `/` heading, list, enum, and term markers at line start
/// - `'` `"` smart quotes, `~` non-breaking space, `[` `]` content blocks
pub fn is_reserved(b: u8) -> bool {
    matches!(
        b,
        b'*' | b'_'
            | b'`'
            | b':'
            | b'<'
            | b'>'
            | b'@'
            | b'='
            | b'-'
            | b'+'
            | b'.'
            | b'/'
            | b'$'
            | b'\\'
            | b'\''
            | b'"'
            | b'~'
            | b'#'
            | b'['
            | b']'
    )
}

/// Write `bytes` as Typst content, escaping reserved bytes.
pub fn write_content<W: Write + ?Sized>(w: &mut W, bytes: &[u8]) -> io::Result<()> {
    let mut last = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if is_reserved(b) {
            w.write_all(&bytes[last..i])?;
            w.write_all(b"\\")?;
            // the reserved byte itself starts the next run
            last = i;
        }
    }
    w.write_all(&bytes[last..])
}

/// Write `bytes` as the inside of a Typst string literal.
pub fn write_string<W: Write + ?Sized>(w: &mut W, bytes: &[u8]) -> io::Result<()> {
    let mut last = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let replacement: &[u8] = match b {
            b'\\' | b'"' => {
                w.write_all(&bytes[last..i])?;
                w.write_all(b"\\")?;
                last = i;
                continue;
            }
            b'\n' => b"\\n",
            b'\r' => b"\\r",
            b'\t' => b"\\t",
            _ => continue,
        };
        w.write_all(&bytes[last..i])?;
        w.write_all(replacement)?;
        last = i + 1;
    }
    w.write_all(&bytes[last..])
}

/// Escape `bytes` as Typst content into a new buffer.
pub fn escape_content(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + bytes.len() / 8);
    // Writing into a Vec cannot fail.
    let _ = write_content(&mut out, bytes);
    out
}

/// Escape `bytes` as a Typst string literal body into a new buffer.
pub fn escape_string(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 2);
    let _ = write_string(&mut out, bytes);
    out
}
