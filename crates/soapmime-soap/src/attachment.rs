//! Attachments carried next to a SOAP envelope.

use soapmime::{DEFAULT_CONTENT_TYPE, HeaderBearer, Part, TransferEncoding};

/// Inbound attachment view: content-id, content type and decoded bytes.
pub type AttachmentView<'a> = (&'a str, &'a str, &'a [u8]);

/// Attachment supplied by or handed to the SOAP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapAttachment {
    id: String,
    filename: Option<String>,
    content_type: String,
    content: Vec<u8>,
}

impl SoapAttachment {
    /// Creates an attachment identified by `id`.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        content_type: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            id: id.into(),
            filename: None,
            content_type: content_type.into(),
            content: content.into(),
        }
    }

    /// Sets the filename announced in `Content-Disposition`.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Builds an attachment from a parsed part.
    ///
    /// The id is the part's content-id and the filename comes from the
    /// `Content-Disposition` header, when present.
    #[must_use]
    pub fn from_part(part: &Part) -> Self {
        Self {
            id: part.content_id().unwrap_or_default().to_string(),
            filename: part
                .header("Content-Disposition", Some("filename"))
                .map(str::to_string),
            content_type: part.content_type().unwrap_or(DEFAULT_CONTENT_TYPE).to_string(),
            content: part.content().to_vec(),
        }
    }

    /// Attachment id, used as the part's content-id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Filename, if any.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Content type.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Raw content.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Builds the binary MIME part carrying this attachment.
    #[must_use]
    pub fn to_part(&self) -> Part {
        let mut part = Part::new(self.content.clone())
            .with_content_type(&self.content_type)
            .with_transfer_encoding(TransferEncoding::Binary)
            .with_content_id(&self.id);
        if let Some(filename) = &self.filename {
            part.set_header("Content-Disposition", "attachment", None);
            part.set_header("Content-Disposition", filename, Some("filename"));
        }
        part
    }
}

/// Ordered list of attachments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoapAttachmentList {
    attachments: Vec<SoapAttachment>,
}

impl SoapAttachmentList {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            attachments: Vec::new(),
        }
    }

    /// Appends an attachment.
    pub fn push(&mut self, attachment: SoapAttachment) {
        self.attachments.push(attachment);
    }

    /// Whether the list holds any attachment.
    #[must_use]
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }

    /// Number of attachments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }

    /// Attachment ids in list order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.attachments.iter().map(|a| a.id.clone()).collect()
    }

    /// Looks an attachment up by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&SoapAttachment> {
        self.attachments.iter().find(|a| a.id == id)
    }

    /// Attachments as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[SoapAttachment] {
        &self.attachments
    }

    /// Iterates over the attachments.
    pub fn iter(&self) -> std::slice::Iter<'_, SoapAttachment> {
        self.attachments.iter()
    }

    /// Builds one MIME part per attachment.
    #[must_use]
    pub fn to_parts(&self) -> Vec<Part> {
        self.attachments.iter().map(SoapAttachment::to_part).collect()
    }
}

impl FromIterator<SoapAttachment> for SoapAttachmentList {
    fn from_iter<I: IntoIterator<Item = SoapAttachment>>(iter: I) -> Self {
        Self {
            attachments: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a Part> for SoapAttachmentList {
    fn from_iter<I: IntoIterator<Item = &'a Part>>(iter: I) -> Self {
        iter.into_iter().map(SoapAttachment::from_part).collect()
    }
}

impl IntoIterator for SoapAttachmentList {
    type Item = SoapAttachment;
    type IntoIter = std::vec::IntoIter<SoapAttachment>;

    fn into_iter(self) -> Self::IntoIter {
        self.attachments.into_iter()
    }
}

impl<'a> IntoIterator for &'a SoapAttachmentList {
    type Item = &'a SoapAttachment;
    type IntoIter = std::slice::Iter<'a, SoapAttachment>;

    fn into_iter(self) -> Self::IntoIter {
        self.attachments.iter()
    }
}

/// Lists inbound parts as `(content-id, content type, bytes)` views.
#[must_use]
pub fn attachment_views(parts: &[Part]) -> Vec<AttachmentView<'_>> {
    parts
        .iter()
        .map(|part| {
            (
                part.content_id().unwrap_or_default(),
                part.content_type().unwrap_or(DEFAULT_CONTENT_TYPE),
                part.content(),
            )
        })
        .collect()
}
