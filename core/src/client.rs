//! Stateless request builder and response parser for the timeline API.
//!
//! # Design
//! `TimelineClient` holds only a [`Config`] and carries no mutable state
//! between calls. Every operation goes through the same two steps: `build`
//! produces an `HttpRequest` and `parse` consumes an `HttpResponse`. The
//! caller executes the round-trip in between, keeping this layer free of
//! I/O. [`TimelineApi`](crate::api::TimelineApi) pairs it with a transport.

use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};
use crate::operations::Operation;
use crate::params::Params;
use crate::request::build_request;
use crate::response::ApiResponse;

/// Name of the credential parameter.
pub const TIMELINE_KEY_PARAM: &str = "timeline_key";

#[derive(Debug, Clone, Default)]
pub struct TimelineClient {
    config: Config,
}

impl TimelineClient {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the request for `operation`, adding the configured
    /// `timeline_key` (replacing any caller-supplied one).
    pub fn build<O: Operation + ?Sized>(&self, operation: &O, mut params: Params) -> Result<HttpRequest> {
        if let Some(key) = &self.config.timeline_key {
            params.set(TIMELINE_KEY_PARAM, key);
        }
        build_request(&self.config, operation, params)
    }

    /// Parse `response` as `R`, using the configured integer coercion.
    pub fn parse<R: ApiResponse>(&self, response: &HttpResponse) -> Result<R> {
        debug!(status = response.status, bytes = response.body.len(), "parsing response");
        R::from_http(response, self.config.coercion)
    }
}
