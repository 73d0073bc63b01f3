//! Line-oriented multipart scanner.
//!
//! The scanner is an explicit state machine fed one LF-terminated line at a
//! time (the LF already removed, a CR possibly left at the end). Header
//! lines seen before the first boundary belong to the outer [`MultiPart`];
//! afterwards they belong to the part being built. Body lines are collected
//! verbatim and joined with LF, so the only normalisation happens once, when
//! a part is finalised.

use super::parsed::ParsedPartList;
use crate::boundary::{is_last_boundary, is_middle_boundary};
use crate::content_type;
use crate::encoding::decode_encoded_words;
use crate::error::{Error, ParseContext, Result};
use crate::header::HeaderBearer;
use crate::multipart::MultiPart;
use crate::part::{Part, trim_angle_brackets};
use tracing::{debug, trace};

/// Scanner states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Reading a header block, possibly with a folded header pending.
    InHeader,
    /// Collecting body lines (or preamble lines before the first boundary).
    InBody,
    /// The terminal boundary was seen; remaining lines are ignored.
    Done,
}

/// Classification of a single input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line {
    /// HTTP status or request line echoed into the body.
    Transport,
    /// Continuation of a folded header.
    Continuation,
    /// Empty or whitespace-only line.
    Blank,
    /// `--boundary`.
    MiddleBoundary,
    /// `--boundary--`.
    LastBoundary,
    /// Anything else.
    Text,
}

/// Multipart scanner over a [`MultiPart`] seeded with transport headers.
pub struct MimeScanner<'a> {
    multipart: &'a mut MultiPart,
    raw: &'a [u8],
    headers_seen: &'a mut Vec<String>,
    state: State,
    current: Option<Part>,
    pending_header: Option<Vec<u8>>,
    body: Vec<u8>,
    hit_first_boundary: bool,
    boundary: Option<String>,
    declared_start: Option<String>,
    main_fixed: bool,
    fixed_start: Option<String>,
    parsed: ParsedPartList,
}

impl<'a> MimeScanner<'a> {
    /// Creates a scanner.
    ///
    /// With `has_transport_headers` the input is expected to open with a
    /// header block of its own, which may override the seeded Content-Type.
    /// Every header line read is appended to `headers_seen` for error
    /// reports.
    pub fn new(
        multipart: &'a mut MultiPart,
        raw: &'a [u8],
        has_transport_headers: bool,
        headers_seen: &'a mut Vec<String>,
    ) -> Self {
        let mut scanner = Self {
            multipart,
            raw,
            headers_seen,
            state: if has_transport_headers {
                State::InHeader
            } else {
                State::InBody
            },
            current: None,
            pending_header: None,
            body: Vec::new(),
            hit_first_boundary: false,
            boundary: None,
            declared_start: None,
            main_fixed: false,
            fixed_start: None,
            parsed: ParsedPartList::default(),
        };
        scanner.refresh_outer_params();
        scanner
    }

    /// Scans all lines and returns the parts in encounter order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedMultipart`] if the boundary is never met or
    /// the terminal boundary is missing, a header decode error if a header
    /// value cannot be decoded, or a body decode error if a part violates
    /// its own transfer encoding or charset.
    pub fn scan<L: AsRef<[u8]>>(mut self, lines: &[L]) -> Result<ParsedPartList> {
        for line in lines {
            if self.state == State::Done {
                break;
            }
            self.feed(line.as_ref())?;
        }
        if let Some(pending) = self.pending_header.take() {
            self.apply_header(&pending)?;
        }

        if !self.hit_first_boundary {
            let reason = match &self.boundary {
                Some(token) => format!("boundary {token:?} never matched"),
                None => "no boundary declared".to_string(),
            };
            return Err(Error::malformed(reason, self.context()));
        }
        if self.state != State::Done {
            return Err(Error::malformed(
                "terminal boundary missing",
                self.context(),
            ));
        }

        debug!(
            parts = self.parsed.len(),
            main = self.parsed.main_count(),
            "Scanned multipart message"
        );
        Ok(self.parsed)
    }

    fn classify(&self, line: &[u8]) -> Line {
        let in_preamble = !self.hit_first_boundary;
        if (in_preamble || self.state == State::InHeader)
            && (line.starts_with(b"HTTP/") || line.starts_with(b"POST"))
        {
            return Line::Transport;
        }
        if self.pending_header.is_some() && matches!(line.first(), Some(b' ' | b'\t')) {
            return Line::Continuation;
        }
        if let Some(token) = &self.boundary {
            if is_middle_boundary(line, token) {
                return Line::MiddleBoundary;
            }
            if is_last_boundary(line, token) {
                return Line::LastBoundary;
            }
        }
        if line.trim_ascii().is_empty() {
            Line::Blank
        } else {
            Line::Text
        }
    }

    fn feed(&mut self, line: &[u8]) -> Result<()> {
        let kind = self.classify(line);
        match kind {
            Line::Transport => {
                trace!("Skipping transport line");
                return Ok(());
            }
            Line::Continuation => {
                if let Some(pending) = self.pending_header.as_mut() {
                    if pending.last() == Some(&b'\r') {
                        pending.pop();
                    }
                    pending.extend_from_slice(line);
                }
                return Ok(());
            }
            _ => {}
        }

        if let Some(pending) = self.pending_header.take() {
            self.apply_header(&pending)?;
            // The header may have declared the boundary this line matches.
            return self.dispatch(self.classify(line), line);
        }
        self.dispatch(kind, line)
    }

    fn dispatch(&mut self, kind: Line, line: &[u8]) -> Result<()> {
        match (self.state, kind) {
            (State::Done, _) | (_, Line::Transport | Line::Continuation) => {}
            (_, Line::MiddleBoundary) => self.on_middle_boundary()?,
            (_, Line::LastBoundary) => self.on_last_boundary()?,
            (State::InHeader, Line::Blank) => self.state = State::InBody,
            (State::InHeader, Line::Text) => self.pending_header = Some(line.to_vec()),
            (State::InBody, Line::Text) if !self.hit_first_boundary => {
                self.state = State::InHeader;
                self.pending_header = Some(line.to_vec());
            }
            (State::InBody, Line::Text | Line::Blank) => {
                self.body.extend_from_slice(line);
                self.body.push(b'\n');
            }
        }
        Ok(())
    }

    fn on_middle_boundary(&mut self) -> Result<()> {
        trace!(parts = self.parsed.len(), "Hit boundary");
        self.finish_part()?;
        self.current = Some(Part::empty());
        self.hit_first_boundary = true;
        self.state = State::InHeader;
        Ok(())
    }

    fn on_last_boundary(&mut self) -> Result<()> {
        trace!(parts = self.parsed.len(), "Hit terminal boundary");
        self.finish_part()?;
        self.hit_first_boundary = true;
        self.state = State::Done;
        Ok(())
    }

    /// Decodes the collected body into the current part and records it.
    fn finish_part(&mut self) -> Result<()> {
        let mut raw = std::mem::take(&mut self.body);
        let Some(mut part) = self.current.take() else {
            if !raw.is_empty() {
                trace!(len = raw.len(), "Discarding preamble");
            }
            return Ok(());
        };

        if raw.last() == Some(&b'\n') {
            raw.pop();
        }
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }

        let content = part.decode_content(&raw).map_err(|err| match err {
            Error::UnsupportedCharset(_) => err,
            other => Error::InvalidEncoding(format!(
                "part <{}>: {other}",
                part.content_id().unwrap_or_default()
            )),
        })?;
        part.set_content(content);

        let is_main = self.is_main(&part);
        debug!(
            content_id = part.content_id().unwrap_or_default(),
            is_main,
            len = part.content().len(),
            "Finalised MIME part"
        );
        self.parsed.push(part, is_main);
        Ok(())
    }

    /// A declared `start` decides alone. Without one, the first part is the
    /// main part and later parts only qualify by sharing its content-id.
    fn is_main(&mut self, part: &Part) -> bool {
        if let Some(start) = &self.declared_start {
            return part.has_content_id(start);
        }
        if !self.main_fixed {
            self.main_fixed = true;
            self.fixed_start = part.content_id().map(str::to_string);
            return true;
        }
        self.fixed_start
            .as_deref()
            .is_some_and(|start| part.has_content_id(start))
    }

    fn apply_header(&mut self, raw: &[u8]) -> Result<()> {
        let text = match std::str::from_utf8(raw) {
            Ok(text) => text,
            Err(err) => {
                let lossy = String::from_utf8_lossy(raw).into_owned();
                let name = lossy.split_once(':').map_or(lossy.as_str(), |(name, _)| name);
                return Err(self.header_error(name.trim(), &lossy, raw.len(), &err.to_string()));
            }
        };
        let Some((name, value)) = text.split_once(':') else {
            trace!(line = text.trim_end(), "Ignoring header line without colon");
            return Ok(());
        };
        let name = name.trim();
        let value = value.trim();

        let decoded = decode_encoded_words(value)
            .map_err(|err| self.header_error(name, value, value.len(), &err.to_string()))?;
        self.headers_seen.push(format!("{name}: {decoded}"));

        let headers = match self.current.as_mut() {
            Some(part) => part.headers_mut(),
            None => self.multipart.headers_mut(),
        };
        content_type::apply(headers, name, &decoded);
        self.refresh_outer_params();
        Ok(())
    }

    fn header_error(&self, header: &str, value: &str, length: usize, reason: &str) -> Error {
        let context = Box::new(self.context());
        if self.hit_first_boundary {
            Error::HeaderValueDecode {
                header: header.to_string(),
                length,
                reason: reason.to_string(),
                context,
            }
        } else {
            Error::UnresolvedHeaderEncoding {
                header: header.to_string(),
                value: value.to_string(),
                reason: reason.to_string(),
                context,
            }
        }
    }

    /// The outer Content-Type is authoritative for boundary and start.
    fn refresh_outer_params(&mut self) {
        self.boundary = self.multipart.boundary().map(str::to_string);
        self.declared_start = self
            .multipart
            .start()
            .map(|start| trim_angle_brackets(start).to_string());
    }

    fn context(&self) -> ParseContext {
        ParseContext::new(self.raw, self.headers_seen.clone())
    }
}
