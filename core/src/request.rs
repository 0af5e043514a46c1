//! Query encoding and `HttpRequest` construction.
//!
//! # Design
//! Every parameter becomes `key=value` with the value percent-encoded
//! byte-wise from UTF-8; only `[A-Za-z0-9_.-]` is left as-is, so spaces are
//! `%20` (never `+`). List values repeat the key once per element. `GET`
//! requests carry the query after `?`; `POST` requests carry it as a
//! form-url-encoded body.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest};
use crate::operations::Operation;
use crate::params::{ParamValue, Params};

/// Characters escaped in keys' values: everything except `[A-Za-z0-9_.-]`.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'_').remove(b'.').remove(b'-');

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Percent-encode a single value.
pub fn encode_value(value: &str) -> String {
    utf8_percent_encode(value, QUERY_ENCODE_SET).to_string()
}

/// `key=encoded-value`.
pub fn encode_pair(key: &str, value: &str) -> String {
    format!("{key}={}", encode_value(value))
}

/// One encoded pair per text value and per list element, in parameter order.
///
/// Image sources must have been resolved to text by the operation; any left
/// over are dropped.
pub fn encode_pairs(params: &Params) -> Vec<String> {
    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params.iter() {
        match value {
            ParamValue::Text(text) => pairs.push(encode_pair(key, text)),
            ParamValue::List(values) => {
                pairs.extend(values.iter().map(|v| encode_pair(key, v)));
            }
            ParamValue::Image(_) => {
                warn!(key, "dropping unresolved image parameter; this operation does not upload images");
            }
        }
    }
    pairs
}

/// Encoded pairs joined with `&`.
pub fn encode_query(params: &Params) -> String {
    encode_pairs(params).join("&")
}

/// Build the HTTP request for `operation` with `params`.
///
/// Runs the operation's `prepare` step (image encoding for uploads), then
/// places the encoded parameters according to the operation's method.
pub fn build_request<O: Operation + ?Sized>(
    config: &Config,
    operation: &O,
    params: Params,
) -> Result<HttpRequest> {
    let params = operation.prepare(params)?;
    let method = operation.method();
    let url = format!("{}{}", config.base_url(), operation.path());
    let query = encode_query(&params);
    let mut headers = vec![("user-agent".to_string(), config.user_agent.clone())];

    let request = match method {
        HttpMethod::Get => HttpRequest {
            method,
            url: if query.is_empty() { url } else { format!("{url}?{query}") },
            headers,
            body: None,
        },
        HttpMethod::Post => {
            headers.push(("content-type".to_string(), FORM_CONTENT_TYPE.to_string()));
            HttpRequest {
                method,
                url,
                headers,
                body: Some(query),
            }
        }
        other => return Err(ApiError::UnsupportedMethod(other)),
    };

    debug!(method = %request.method, url = %request.url, "built request");
    Ok(request)
}
