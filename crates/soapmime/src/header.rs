//! MIME header handling.
//!
//! Header names are matched case-insensitively while the most recently
//! supplied casing is kept for output. A value is either a plain scalar or
//! a composite `primary; name=value; ...` whose parameters keep their
//! insertion order.

use crate::encoding::to_latin1_lossy;
use std::fmt;

/// Headers that may be forwarded to the HTTP transport.
const HTTP_HEADERS: [&str; 2] = ["content-type", "content-description"];

/// Characters that force a parameter value to be quoted.
const SPECIALS: &str = "()<>@,;:\\\"/[]?=";

/// Value stored under one header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    /// Plain value without parameters.
    Scalar(String),
    /// Primary value followed by ordered `name=value` parameters.
    Composite {
        /// Value before the first parameter.
        primary: String,
        /// Parameters in insertion order, names unique (case-insensitive).
        params: Vec<(String, String)>,
    },
}

impl HeaderValue {
    /// Returns the scalar value or the primary value of a composite.
    #[must_use]
    pub fn primary(&self) -> &str {
        match self {
            Self::Scalar(value) | Self::Composite { primary: value, .. } => value,
        }
    }

    /// Returns a parameter value (case-insensitive name).
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params()
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns all parameters (empty for a scalar).
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        match self {
            Self::Scalar(_) => &[],
            Self::Composite { params, .. } => params,
        }
    }

    fn set_primary(&mut self, value: String) {
        match self {
            Self::Scalar(current) | Self::Composite { primary: current, .. } => *current = value,
        }
    }

    fn set_param(&mut self, name: String, value: String) {
        if let Self::Scalar(primary) = self {
            *self = Self::Composite {
                primary: std::mem::take(primary),
                params: Vec::new(),
            };
        }
        if let Self::Composite { params, .. } = self {
            match params.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(&name)) {
                Some(slot) => slot.1 = value,
                None => params.push((name, value)),
            }
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.primary())?;
        for (key, value) in self.params() {
            if value.contains(|c: char| SPECIALS.contains(c)) {
                write!(f, "; {key}=\"{value}\"")?;
            } else {
                write!(f, "; {key}={value}")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderEntry {
    name: String,
    value: HeaderValue,
}

/// Ordered, case-insensitive collection of MIME headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<HeaderEntry>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entry_mut(&mut self, name: String) -> &mut HeaderEntry {
        let index = match self
            .entries
            .iter()
            .position(|entry| entry.name.eq_ignore_ascii_case(&name))
        {
            Some(index) => {
                self.entries[index].name = name;
                index
            }
            None => {
                self.entries.push(HeaderEntry {
                    name,
                    value: HeaderValue::Scalar(String::new()),
                });
                self.entries.len() - 1
            }
        };
        &mut self.entries[index]
    }

    /// Sets a header value.
    ///
    /// On a composite header only the primary value changes; existing
    /// parameters are kept.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entry_mut(name.into()).value.set_primary(value.into());
    }

    /// Sets one parameter of a header, promoting a scalar to a composite
    /// whose primary value is the former scalar.
    pub fn set_param(
        &mut self,
        name: impl Into<String>,
        param: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.entry_mut(name.into())
            .value
            .set_param(param.into(), value.into());
    }

    /// Sets either the primary value (`sub_name` is `None`) or the
    /// parameter `sub_name` of a header.
    pub fn set_header(&mut self, name: &str, value: &str, sub_name: Option<&str>) {
        match sub_name {
            Some(param) => self.set_param(name, param, value),
            None => self.set(name, value),
        }
    }

    /// Gets the stored value of a header.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&HeaderValue> {
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
            .map(|entry| &entry.value)
    }

    /// Gets the scalar or primary value of a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.value(name).map(HeaderValue::primary)
    }

    /// Gets one parameter of a header.
    #[must_use]
    pub fn get_param(&self, name: &str, param: &str) -> Option<&str> {
        self.value(name).and_then(|value| value.param(param))
    }

    /// Gets the primary value (`sub_name` is `None`) or a parameter.
    #[must_use]
    pub fn header(&self, name: &str, sub_name: Option<&str>) -> Option<&str> {
        match sub_name {
            Some(param) => self.get_param(name, param),
            None => self.get(name),
        }
    }

    /// Removes a header.
    pub fn remove(&mut self, name: &str) {
        self.entries
            .retain(|entry| !entry.name.eq_ignore_ascii_case(name));
    }

    /// Returns an iterator over all headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries
            .iter()
            .map(|entry| (entry.name.as_str(), &entry.value))
    }

    /// Number of distinct headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no header is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders `Content-Type` and `Content-Description` as `Name: value`
    /// strings restricted to ISO-8859-1, for use as HTTP headers.
    #[must_use]
    pub fn http_headers(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| {
                HTTP_HEADERS
                    .iter()
                    .any(|allowed| entry.name.eq_ignore_ascii_case(allowed))
            })
            .map(|entry| format!("{}: {}", entry.name, to_latin1_lossy(&entry.value.to_string())))
            .collect()
    }

    /// Renders every header as a `Name: value` line terminated by CRLF.
    #[must_use]
    pub fn generate(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            write!(f, "{}: {}\r\n", entry.name, entry.value)?;
        }
        Ok(())
    }
}

/// Header operations shared by [`Part`](crate::Part) and
/// [`MultiPart`](crate::MultiPart).
pub trait HeaderBearer {
    /// Borrow the header collection.
    fn headers(&self) -> &Headers;

    /// Mutably borrow the header collection.
    fn headers_mut(&mut self) -> &mut Headers;

    /// Sets a header value or, with `sub_name`, one of its parameters.
    fn set_header(&mut self, name: &str, value: &str, sub_name: Option<&str>) {
        self.headers_mut().set_header(name, value, sub_name);
    }

    /// Gets a header value or, with `sub_name`, one of its parameters.
    fn header(&self, name: &str, sub_name: Option<&str>) -> Option<&str> {
        self.headers().header(name, sub_name)
    }

    /// HTTP-safe rendering of the transport-relevant headers.
    fn headers_for_http(&self) -> Vec<String> {
        self.headers().http_headers()
    }
}
