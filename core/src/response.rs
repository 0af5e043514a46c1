//! Turning an `HttpResponse` into a typed response.
//!
//! # Design
//! XML endpoints always answer with an envelope, whatever the HTTP status,
//! so the body is parsed regardless of status and the caller inspects the
//! envelope. Image endpoints skip parsing on 2xx and hand back the bytes;
//! on failure the service sends an XML envelope, which is parsed as usual.

use tracing::{debug, warn};

use crate::error::{ApiError, Result};
use crate::http::HttpResponse;
use crate::mapping::{Coercion, Mapped};
use crate::model::{
    ListCategoryResponse, RawDataResponse, ResponseStatus, SearchArticleResponse,
    SearchTimelineResponse, ShowArticleResponse, ShowTimelineResponse, ShowUserResponse,
    StatusResponse,
};
use crate::xml::parse_document;

/// A response type that can be produced from a raw HTTP response.
pub trait ApiResponse: Sized {
    fn from_http(response: &HttpResponse, coercion: Coercion) -> Result<Self>;
}

/// Parse the body as XML and unmarshal its root element into `T`.
pub fn parse_xml<T: Mapped>(response: &HttpResponse, coercion: Coercion) -> Result<T> {
    let root = parse_document(&response.body)?.ok_or(ApiError::EmptyDocument)?;
    debug!(status = response.status, root = root.name(), "parsing response document");
    T::unmarshal_with(&root, coercion)
}

macro_rules! xml_response {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ApiResponse for $ty {
                fn from_http(response: &HttpResponse, coercion: Coercion) -> Result<Self> {
                    parse_xml(response, coercion)
                }
            }
        )+
    };
}

xml_response!(
    StatusResponse,
    ShowTimelineResponse,
    ShowArticleResponse,
    SearchTimelineResponse,
    SearchArticleResponse,
    ShowUserResponse,
    ListCategoryResponse,
);

impl ApiResponse for RawDataResponse {
    fn from_http(response: &HttpResponse, coercion: Coercion) -> Result<Self> {
        if !response.is_success() {
            warn!(status = response.status, "image request failed, parsing error envelope");
            return parse_xml(response, coercion);
        }
        Ok(RawDataResponse {
            status: Some(ResponseStatus {
                code: Some(i64::from(response.status)),
                message: Some(response.reason.clone()),
                language: None,
            }),
            data: Some(response.body.clone()),
            content_type: response.media_type().map(str::to_owned),
        })
    }
}
