//! Composite header value parsing.
//!
//! Splits a value such as
//! `multipart/related; type="text/xml"; start="<id1>"; boundary=XYZ`
//! into its primary value and ordered parameters. Every header goes
//! through this parser, not only `Content-Type`.

use crate::header::Headers;

/// One entry produced by [`parse`]: either the primary value of a header
/// (`sub_name` is `None`) or one of its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMimeHeader {
    /// Header name as supplied.
    pub name: String,
    /// Primary value or parameter value.
    pub value: String,
    /// Parameter name.
    pub sub_name: Option<String>,
}

impl ParsedMimeHeader {
    fn new(name: &str, value: &str, sub_name: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            sub_name: sub_name.map(str::to_string),
        }
    }

    /// Stores this entry in `headers`.
    pub fn apply_to(&self, headers: &mut Headers) {
        headers.set_header(&self.name, &self.value, self.sub_name.as_deref());
    }
}

/// Parses a header value into its primary value and parameters.
///
/// A value without `;` yields a single entry. Otherwise everything before
/// the first `;` is the primary value, quotes included. Parameters follow
/// as `name=value` where the name is `[A-Za-z0-9_-]+`; a value opened by
/// `"` or `'` has that quote character trimmed and may contain `;`.
/// Parsing stops silently at the first fragment that does not fit, so the
/// entries gathered until then remain valid.
#[must_use]
pub fn parse(name: &str, value: &str) -> Vec<ParsedMimeHeader> {
    let Some((primary, remainder)) = value.split_once(';') else {
        return vec![ParsedMimeHeader::new(name, value.trim(), None)];
    };

    let mut parsed = vec![ParsedMimeHeader::new(name, primary.trim(), None)];
    let mut rest = remainder.trim();

    while !rest.is_empty() {
        let Some((param, after_name)) = split_param_name(rest) else {
            break;
        };
        let Some(delimiter) = after_name.chars().next() else {
            break;
        };
        let quote = matches!(delimiter, '"' | '\'').then_some(delimiter);

        let end = value_end(after_name, quote);
        let raw = after_name[..end].trim();
        if raw.is_empty() {
            break;
        }
        let param_value = quote.map_or(raw, |q| raw.trim_matches(q));
        parsed.push(ParsedMimeHeader::new(name, param_value, Some(param)));

        let tail = &after_name[end..];
        rest = tail.strip_prefix(';').unwrap_or(tail).trim_start();
    }

    parsed
}

/// Parses `value` and stores every entry under `name` in `headers`.
pub fn apply(headers: &mut Headers, name: &str, value: &str) {
    for entry in parse(name, value) {
        entry.apply_to(headers);
    }
}

/// Splits `name=` off the front of `text`.
fn split_param_name(text: &str) -> Option<(&str, &str)> {
    let name_len = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(text.len());
    if name_len == 0 {
        return None;
    }
    let after = text[name_len..].strip_prefix('=')?;
    Some((&text[..name_len], after))
}

/// Byte offset of the `;` (or end) terminating a parameter value.
fn value_end(text: &str, quote: Option<char>) -> usize {
    let unquoted_end = |from: usize| text[from..].find(';').map_or(text.len(), |i| from + i);
    match quote {
        Some(q) => text[1..]
            .find(q)
            .map_or_else(|| unquoted_end(0), |close| unquoted_end(close + 1)),
        None => unquoted_end(0),
    }
}
