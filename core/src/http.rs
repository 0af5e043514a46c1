//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. The core builds `HttpRequest`
//! values and parses `HttpResponse` values without touching the network; a
//! [`Transport`](crate::transport::Transport) (or any other host code) moves
//! the bytes. Response bodies are kept as raw bytes because image endpoints
//! return binary payloads.

use std::fmt;

/// HTTP method for a request.
///
/// The service only speaks `GET` and `POST`; the other variants exist so a
/// misconfigured operation is reported as
/// [`ApiError::UnsupportedMethod`](crate::ApiError::UnsupportedMethod)
/// rather than silently rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute and already carries the encoded query string for `GET`
/// requests. For `POST` requests the encoded parameters are in `body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase, e.g. `OK`. `UreqTransport` fills in the standard
    /// phrase for the status code.
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// `Content-Type` without parameters: `text/xml; charset=utf-8` gives
    /// `text/xml`.
    pub fn media_type(&self) -> Option<&str> {
        self.content_type()
            .and_then(|value| value.split(';').next())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// True for any 2xx status.
    pub fn is_success(&self) -> bool {
        self.status / 100 == 2
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let response = HttpResponse {
            status: 200,
            reason: "OK".to_string(),
            headers: vec![("Content-Type".to_string(), "image/png".to_string())],
            body: Vec::new(),
        };
        assert_eq!(response.content_type(), Some("image/png"));
        assert_eq!(response.header("x-missing"), None);
    }

    #[test]
    fn media_type_drops_parameters() {
        let mut response = HttpResponse {
            status: 200,
            reason: "OK".to_string(),
            headers: vec![("content-type".to_string(), "text/xml; charset=utf-8".to_string())],
            body: Vec::new(),
        };
        assert_eq!(response.media_type(), Some("text/xml"));
        assert_eq!(response.content_type(), Some("text/xml; charset=utf-8"));

        response.headers[0].1 = " ; charset=utf-8".to_string();
        assert_eq!(response.media_type(), None);
    }

    #[test]
    fn only_2xx_is_success() {
        let mut response = HttpResponse {
            status: 204,
            ..HttpResponse::default()
        };
        assert!(response.is_success());
        response.status = 302;
        assert!(!response.is_success());
        response.status = 404;
        assert!(!response.is_success());
    }

    #[test]
    fn method_displays_as_verb() {
        assert_eq!(HttpMethod::Post.to_string(), "POST");
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
    }
}
