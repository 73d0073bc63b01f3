//! Multipart/related container.

use crate::boundary;
use crate::error::{Error, Result};
use crate::header::{HeaderBearer, Headers};
use crate::part::{Part, generate_content_id, trim_angle_brackets};
use tracing::trace;

/// A `multipart/related` message: outer headers plus parts keyed by
/// content-id, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiPart {
    headers: Headers,
    main_part_id: Option<String>,
    parts: Vec<(String, Part)>,
}

impl Default for MultiPart {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiPart {
    /// Creates an empty container with the default outer headers
    /// (`MIME-Version: 1.0` and a `multipart/related` content type of
    /// `text/xml` parts in UTF-8).
    #[must_use]
    pub fn new() -> Self {
        let mut headers = Headers::new();
        headers.set("MIME-Version", "1.0");
        headers.set("Content-Type", "multipart/related");
        headers.set_param("Content-Type", "type", "text/xml");
        headers.set_param("Content-Type", "charset", "utf-8");
        Self {
            headers,
            main_part_id: None,
            parts: Vec::new(),
        }
    }

    /// Creates an empty container using `boundary`.
    #[must_use]
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        let mut multipart = Self::new();
        multipart
            .headers
            .set_param("Content-Type", "boundary", boundary);
        multipart
    }

    /// Returns a fresh boundary token.
    #[must_use]
    pub fn generate_boundary() -> String {
        boundary::generate_boundary()
    }

    /// Boundary token from the outer Content-Type.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.headers.get_param("Content-Type", "boundary")
    }

    /// `start` parameter of the outer Content-Type, as declared.
    #[must_use]
    pub fn start(&self) -> Option<&str> {
        self.headers.get_param("Content-Type", "start")
    }

    /// Content-id of the main part.
    #[must_use]
    pub fn main_part_id(&self) -> Option<&str> {
        self.main_part_id.as_deref()
    }

    /// Adds a part.
    ///
    /// A part without a Content-ID gets a generated one. The main part's
    /// id is stamped on the outer `start` parameter; any other part gets a
    /// `Content-Location` equal to its bare content-id. Adding a part
    /// whose content-id is already present replaces the earlier part in
    /// place.
    pub fn add_part(&mut self, mut part: Part, is_main: bool) {
        if part.content_id().is_none_or(str::is_empty) {
            part.set_content_id(&generate_content_id());
        }
        let content_id = part.content_id().unwrap_or_default().to_string();

        if is_main {
            self.headers
                .set_param("Content-Type", "start", format!("<{content_id}>"));
            self.main_part_id = Some(content_id.clone());
        } else {
            part.set_header("Content-Location", &content_id, None);
        }
        trace!(content_id = %content_id, is_main, "Adding MIME part");

        match self.parts.iter_mut().find(|(key, _)| *key == content_id) {
            Some(slot) => slot.1 = part,
            None => self.parts.push((content_id, part)),
        }
    }

    /// Looks up a part by content-id (angle brackets optional).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownContentId`] if no such part exists.
    pub fn part(&self, content_id: &str) -> Result<&Part> {
        let key = trim_angle_brackets(content_id);
        self.parts
            .iter()
            .find(|(id, _)| id == key)
            .map(|(_, part)| part)
            .ok_or_else(|| Error::UnknownContentId(key.to_string()))
    }

    /// Returns the main part.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMainPart`] if no main part was added.
    pub fn main_part(&self) -> Result<&Part> {
        self.main_index()
            .map(|index| &self.parts[index].1)
            .ok_or_else(|| self.no_main_part())
    }

    /// Every part except the main one, in insertion order.
    #[must_use]
    pub fn attachments(&self) -> Vec<&Part> {
        self.parts
            .iter()
            .filter(|(id, _)| Some(id.as_str()) != self.main_part_id.as_deref())
            .map(|(_, part)| part)
            .collect()
    }

    /// All parts in insertion order.
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().map(|(_, part)| part)
    }

    /// Content-ids of all parts in insertion order.
    #[must_use]
    pub fn content_ids(&self) -> Vec<String> {
        self.parts.iter().map(|(id, _)| id.clone()).collect()
    }

    /// Number of parts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether no part was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Splits the container into its main part and the attachments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMainPart`] if no main part was added.
    pub fn into_main_and_attachments(mut self) -> Result<(Part, Vec<Part>)> {
        let index = self.main_index().ok_or_else(|| self.no_main_part())?;
        let (_, main) = self.parts.remove(index);
        let attachments = self.parts.into_iter().map(|(_, part)| part).collect();
        Ok((main, attachments))
    }

    fn main_index(&self) -> Option<usize> {
        let main_id = self.main_part_id.as_deref()?;
        self.parts.iter().position(|(id, _)| id == main_id)
    }

    fn no_main_part(&self) -> Error {
        Error::NoMainPart {
            content_ids: self.content_ids(),
            context: None,
        }
    }
}

impl HeaderBearer for MultiPart {
    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }
}
