// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Case conversion helpers
//!
//! Small ASCII-oriented transforms used to turn PHP class and method names
//! into readable labels. Non-ASCII characters pass through untouched.

/// Uppercase the first character
#[must_use]
pub fn capitalize(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercase the first character
#[must_use]
pub fn uncapitalize(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_word_separator(c: char) -> bool {
    c == '_' || c == '-' || c.is_whitespace()
}

/// `isNotSame` / `is not-same` -> `is_not_same`
#[must_use]
pub fn snake_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    let mut prev: Option<char> = None;
    let mut in_gap = false;

    for c in input.chars() {
        if c.is_whitespace() || c == '-' {
            if !in_gap {
                out.push('_');
                in_gap = true;
            }
            prev = Some(c);
            continue;
        }
        in_gap = false;
        if c.is_ascii_uppercase() && prev.is_some_and(|p| p.is_ascii_lowercase()) {
            out.push('_');
        }
        out.push(c);
        prev = Some(c);
    }

    out.to_lowercase()
}

/// `is_not-same` -> `isNotSame`
#[must_use]
pub fn camel_case(input: &str) -> String {
    let lower = input.to_lowercase();
    let chars: Vec<char> = lower.chars().collect();
    let mut out = String::with_capacity(lower.len());
    let mut i = 0;

    while i < chars.len() {
        if is_word_separator(chars[i]) {
            let mut j = i;
            while j < chars.len() && is_word_separator(chars[j]) {
                j += 1;
            }
            if j < chars.len() && chars[j].is_ascii_lowercase() {
                out.push(chars[j].to_ascii_uppercase());
                i = j + 1;
            } else {
                out.extend(&chars[i..j]);
                i = j;
            }
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }

    out
}

/// Turn a class-like name into spaced words: `ExampleFoo` -> `Example Foo`,
/// `foo_bar` -> `Foo Bar`.
///
/// Every run of uppercase letters starts a new word, so `MyHTTPClient`
/// becomes `My HTTPClient`.
#[must_use]
pub fn title_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 4);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_ascii_uppercase() {
            let end = run_end(&chars, i, |c| c.is_ascii_uppercase());
            out.push(' ');
            out.extend(&chars[i..end]);
            i = end;
            continue;
        }

        if is_word_separator(c) {
            let gap_end = run_end(&chars, i, is_word_separator);
            let word_end = match chars.get(gap_end) {
                Some(next) if next.is_ascii_uppercase() => {
                    run_end(&chars, gap_end, |c| c.is_ascii_uppercase())
                }
                Some(next) if next.is_ascii_lowercase() => gap_end + 1,
                _ => {
                    out.extend(&chars[i..gap_end]);
                    i = gap_end;
                    continue;
                }
            };
            let matched: String = chars[i..word_end].iter().collect();
            out.push(' ');
            out.push_str(&drop_first_separator(matched.trim()).to_uppercase());
            i = word_end;
            continue;
        }

        out.push(c);
        i += 1;
    }

    capitalize(out.trim())
}

fn run_end(chars: &[char], start: usize, pred: impl Fn(char) -> bool) -> usize {
    let mut end = start;
    while end < chars.len() && pred(chars[end]) {
        end += 1;
    }
    end
}

fn drop_first_separator(input: &str) -> String {
    match input.find(['_', '-']) {
        Some(idx) => {
            let mut out = String::with_capacity(input.len());
            out.push_str(&input[..idx]);
            out.push_str(&input[idx + 1..]);
            out
        }
        None => input.to_string(),
    }
}
