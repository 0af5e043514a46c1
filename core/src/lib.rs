//! Synchronous client for the TimeLine XML-over-HTTP API.
//!
//! # Overview
//! Requests are built from an [`Operation`] and a [`Params`] set, executed
//! by a [`Transport`], and the XML body is mapped into typed responses by a
//! declarative schema per type. [`TimelineApi`] wires the three together
//! behind one method per service operation; [`TimelineClient`] exposes the
//! build and parse halves for callers that do their own I/O.
//!
//! # Design
//! - [`mapping`] is the object-XML engine: each type owns a static
//!   [`Schema`] and one generic `populate` walks an element's children
//!   against it.
//! - Non-2xx statuses are not errors on XML endpoints; the envelope is
//!   parsed and `success()` reports the outcome.
//! - Everything is blocking and immutable after construction, so a client
//!   can be shared across threads.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod mapping;
pub mod model;
pub mod operations;
pub mod params;
pub mod request;
pub mod response;
pub mod transport;
pub mod xml;

pub use api::TimelineApi;
pub use client::TimelineClient;
pub use config::Config;
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use mapping::{Coercion, Mapped, Schema};
pub use model::{
    Article, Category, Envelope, ListCategoryResponse, RawDataResponse, ResponseStatus,
    SearchArticleResponse, SearchTimelineResponse, ShowArticleResponse, ShowTimelineResponse,
    ShowUserResponse, StatusResponse, Summary, Timeline, User,
};
pub use operations::Operation;
pub use params::{ImageSource, ParamValue, Params};
pub use response::ApiResponse;
pub use transport::{Transport, UreqTransport};
