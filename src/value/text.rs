//! Card text fields behind a one-byte code page marker.

use std::borrow::Cow;

use encoding_rs::{ISO_8859_5, WINDOWS_1251};

use crate::error::{Error, Result};

const CYRILLIC: u8 = 0x05;
const LATIN_1: u8 = 0x01;

/// Decode a text field.
///
/// A leading `0x05` selects ISO-8859-5 and `0x01` Latin-1, both consuming the
/// marker. Anything else is taken whole as UTF-8, or as Windows-1251 when it
/// is not valid UTF-8.
pub(super) fn decode(r: &[u8]) -> Result<String> {
    let (&marker, rest) = r.split_first().ok_or(Error::Truncated {
        offset: 0,
        needed: 1,
        available: 0,
    })?;

    let text = match marker {
        CYRILLIC => ISO_8859_5.decode_without_bom_handling(rest).0,
        LATIN_1 => encoding_rs::mem::decode_latin1(rest),
        _ => match core::str::from_utf8(r) {
            Ok(s) => Cow::Borrowed(s),
            Err(_) => WINDOWS_1251.decode_without_bom_handling(r).0,
        },
    };

    Ok(normalize(&text))
}

/// Drop padding and collapse each whitespace run to a single space.
///
/// Only spaces are trimmed, and only before NULs are removed, so a space left
/// in front of NUL padding survives as one space.
fn normalize(s: &str) -> String {
    let s = s.trim_matches(' ').replace('\0', "").replace('\u{5}', " ");

    let mut out = String::with_capacity(s.len());
    let mut run = false;
    for c in s.chars() {
        if c.is_ascii_whitespace() {
            if !run {
                out.push(' ');
            }
            run = true;
        } else {
            out.push(c);
            run = false;
        }
    }
    out
}
