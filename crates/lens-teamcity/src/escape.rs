// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! TeamCity attribute value escaping
//!
//! Values inside `key='value'` pairs use `|` as the escape character:
//!
//! | escaped | meaning |
//! |---------|---------|
//! | `\|'`   | `'`     |
//! | `\|n`   | newline |
//! | `\|r`   | carriage return |
//! | `\|[`   | `[`     |
//! | `\|]`   | `]`     |
//! | `\|\|`  | `\|`    |
//! | `\|0xNNNN` | unicode code point |

/// Decode a TeamCity-escaped value
///
/// Unknown escape sequences are kept verbatim.
#[must_use]
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.char_indices();

    while let Some((idx, c)) = chars.next() {
        if c != '|' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some((_, 'n')) => out.push('\n'),
            Some((_, 'r')) => out.push('\r'),
            Some((_, '\'')) => out.push('\''),
            Some((_, '[')) => out.push('['),
            Some((_, ']')) => out.push(']'),
            Some((_, '|')) => out.push('|'),
            Some((_, '0')) => match decode_code_point(&value[idx + 2..]) {
                Some((decoded, consumed)) => {
                    out.push(decoded);
                    for _ in 0..consumed {
                        chars.next();
                    }
                }
                None => out.push_str("|0"),
            },
            Some((_, other)) => {
                out.push('|');
                out.push(other);
            }
            None => out.push('|'),
        }
    }

    out
}

/// Decode `xNNNN` following `|0`, returning the char and how many chars it spans
fn decode_code_point(rest: &str) -> Option<(char, usize)> {
    let hex = rest.strip_prefix('x')?.get(..4)?;
    let code = u32::from_str_radix(hex, 16).ok()?;
    char::from_u32(code).map(|c| (c, 5))
}

/// Encode a value with TeamCity escaping
#[must_use]
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '|' => out.push_str("||"),
            '\'' => out.push_str("|'"),
            '\n' => out.push_str("|n"),
            '\r' => out.push_str("|r"),
            '[' => out.push_str("|["),
            ']' => out.push_str("|]"),
            other => out.push(other),
        }
    }
    out
}
