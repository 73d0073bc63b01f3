//! Error types for the SOAP attachment layer.

/// Result type alias for SOAP attachment operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SOAP attachment error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// MIME codec error.
    #[error(transparent)]
    Mime(#[from] soapmime::Error),

    /// Numeric SOAP version other than 1 (SOAP 1.1) or 2 (SOAP 1.2).
    #[error("Invalid SOAP version: {0}")]
    InvalidSoapVersion(u32),

    /// Attachments were supplied while no attachment type is configured.
    #[error("SOAP action {action} cannot carry attachments without an attachment type: {}", ids.join(", "))]
    AttachmentsNotEnabled {
        /// SOAP action of the rejected request.
        action: String,
        /// Ids of the rejected attachments.
        ids: Vec<String>,
    },

    /// XML reference could not be read.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML fragment does not carry a usable attachment reference.
    #[error("Invalid attachment reference: {0}")]
    InvalidReference(String),

    /// Reference to an attachment the message does not carry.
    #[error("Unknown attachment: {0}")]
    UnknownAttachment(String),
}
