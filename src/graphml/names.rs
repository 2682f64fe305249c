// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Street names are stored as plain text, except for ways with multiple names,
//! which OSMnx stores as list literals, e.g. `['Illinois Street', 'Ridge Road']`.

use std::borrow::Cow;

/// Parses a list literal of quoted strings, e.g. `['Main Street', "O'Neil Road"]`.
/// Backslash escapes the following character. Returns `None` if `raw` is not such a literal.
fn parse_list_literal(raw: &str) -> Option<Vec<String>> {
    let inner = raw.strip_prefix('[')?.strip_suffix(']')?;
    let mut chars = inner.trim().chars().peekable();
    let mut items = Vec::default();

    loop {
        let quote = match chars.next() {
            None => return Some(items),
            Some(c @ ('\'' | '"')) => c,
            Some(_) => return None,
        };

        let mut item = String::default();
        loop {
            match chars.next()? {
                '\\' => item.push(chars.next()?),
                c if c == quote => break,
                c => item.push(c),
            }
        }
        items.push(item);

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            None => return Some(items),
            Some(',') => while chars.next_if(|c| c.is_whitespace()).is_some() {},
            Some(_) => return None,
        }
    }
}

/// Normalizes a stored street name: list literals are joined with a slash,
/// and blank names are treated as missing.
pub(super) fn parse(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let name = match parse_list_literal(raw) {
        Some(items) => items
            .iter()
            .map(String::as_str)
            .filter(|item| !item.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" / "),
        None => raw.to_string(),
    };

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Formats a street name for storage, so that [parse] returns it unchanged.
/// Names which would be misread are stored as a single-item list literal.
pub(super) fn format(name: &str) -> Cow<'_, str> {
    if parse(name).as_deref() == Some(name) {
        return Cow::Borrowed(name);
    }

    let mut literal = String::with_capacity(name.len() + 4);
    literal.push_str("['");
    for c in name.chars() {
        if c == '\\' || c == '\'' {
            literal.push('\\');
        }
        literal.push(c);
    }
    literal.push_str("']");
    Cow::Owned(literal)
}
