//! Blocking HTTP execution.
//!
//! The core never opens sockets itself; [`Transport`] is the seam where a
//! built [`HttpRequest`] is executed. [`UreqTransport`] is the default.

use std::time::Duration;

use tracing::debug;

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one request to completion. Failures are not retried.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// [`Transport`] backed by a ureq agent.
///
/// 4xx and 5xx responses are returned as data: the service puts an error
/// envelope in the body.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Agent with the connect and read timeouts from `config`.
    pub fn new(config: &Config) -> Self {
        let read = limit(config.read_timeout());
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(limit(config.connect_timeout()))
            .timeout_recv_response(read)
            .timeout_recv_body(read)
            .build()
            .new_agent();
        Self { agent }
    }
}

/// A zero timeout means no limit.
fn limit(timeout: Duration) -> Option<Duration> {
    (!timeout.is_zero()).then_some(timeout)
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.send(request.body.as_deref().unwrap_or_default().as_bytes())
            }
            other => return Err(ApiError::UnsupportedMethod(other)),
        };
        let mut response = result.map_err(transport_error)?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_vec().map_err(transport_error)?;
        debug!(status = status.as_u16(), bytes = body.len(), url = %request.url, "received response");

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

fn transport_error(err: ureq::Error) -> ApiError {
    ApiError::Transport(err.to_string())
}
