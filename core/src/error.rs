//! Error types for the timeline API client.
//!
//! # Design
//! A non-2xx status on an XML endpoint is *not* an error here: the service
//! always answers with a status envelope, so callers inspect
//! `status.code` / `success()` instead. Errors are reserved for failures that
//! leave no usable envelope behind: the transport gave up, the body is not a
//! document, or a typed field could not be read.

use crate::http::HttpMethod;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by request building, dispatch and unmarshalling.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Connection, timeout or I/O failure reported by the transport. Never retried.
    #[error("transport error: {0}")]
    Transport(String),

    /// A `date` or `datetime` element held text that is not ISO-8601.
    #[error("malformed date in <{field}>: {value:?}")]
    MalformedDate { field: String, value: String },

    /// An `integer` element held text that is not a number (strict coercion only).
    #[error("malformed number in <{field}>: {value:?}")]
    MalformedNumber { field: String, value: String },

    /// The response body has no root element.
    #[error("response body has no root element")]
    EmptyDocument,

    /// The request was configured with a method the service does not accept.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(HttpMethod),

    /// Malformed markup reported by quick-xml.
    #[error("XML processing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Text or attribute content that could not be decoded or unescaped.
    #[error("invalid XML content: {0}")]
    XmlContent(String),

    /// A configuration value could not be read.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The `image` parameter could not be read.
    #[error("failed to read image: {0}")]
    Image(#[from] std::io::Error),
}
