//! One type per service endpoint.
//!
//! # Design
//! An [`Operation`] knows its path, its HTTP method and the response type
//! its body is parsed into. Operations that address a single entity carry
//! the id in the path; the facade also sends it as an `id` parameter, which
//! is what the service expects.
//!
//! Article uploads are the only operations with a `prepare` step: an `image`
//! parameter is read completely and replaced by its base64 text.

use std::fs::File;
use std::io::Read;

use base64::Engine;
use tracing::debug;

use crate::error::Result;
use crate::http::HttpMethod;
use crate::model::{
    ListCategoryResponse, RawDataResponse, SearchArticleResponse, SearchTimelineResponse,
    ShowArticleResponse, ShowTimelineResponse, ShowUserResponse, StatusResponse,
};
use crate::params::{ImageSource, ParamValue, Params};
use crate::response::ApiResponse;

/// A request shape: where it goes, how it is sent and what comes back.
pub trait Operation {
    type Response: ApiResponse;

    /// Path relative to the configured base path, e.g. `timelines/show/42`.
    fn path(&self) -> String;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    /// Rewrite parameters before encoding.
    fn prepare(&self, params: Params) -> Result<Params> {
        Ok(params)
    }
}

macro_rules! entity_operation {
    ($(#[$doc:meta])* $name:ident, $method:ident, $prefix:literal => $response:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name {
            pub id: i64,
        }

        impl Operation for $name {
            type Response = $response;

            fn path(&self) -> String {
                format!(concat!($prefix, "/{}"), self.id)
            }

            fn method(&self) -> HttpMethod {
                HttpMethod::$method
            }
        }
    };
}

macro_rules! collection_operation {
    ($(#[$doc:meta])* $name:ident, $method:ident, $path:literal => $response:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl Operation for $name {
            type Response = $response;

            fn path(&self) -> String {
                $path.to_string()
            }

            fn method(&self) -> HttpMethod {
                HttpMethod::$method
            }
        }
    };
}

entity_operation!(ShowTimeline, Get, "timelines/show" => ShowTimelineResponse);
entity_operation!(ShowArticle, Get, "articles/show" => ShowArticleResponse);
entity_operation!(
    /// Binary image attached to an article.
    GetArticleImage, Get, "articles/image" => RawDataResponse
);
entity_operation!(UpdateTimeline, Post, "timelines/update" => ShowTimelineResponse);
entity_operation!(DeleteTimeline, Post, "timelines/delete" => StatusResponse);
entity_operation!(DeleteArticle, Post, "articles/delete" => StatusResponse);
entity_operation!(ShowUser, Get, "users/show" => ShowUserResponse);
entity_operation!(
    /// Profile image of a user.
    GetUserImage, Get, "users/image" => RawDataResponse
);

collection_operation!(CreateTimeline, Post, "timelines/create" => ShowTimelineResponse);
collection_operation!(SearchTimeline, Get, "timelines/search" => SearchTimelineResponse);
collection_operation!(SearchArticle, Get, "articles/search" => SearchArticleResponse);
collection_operation!(ListCategories, Get, "categories/list" => ListCategoryResponse);
collection_operation!(
    /// The user the configured key belongs to.
    ShowOneself, Get, "users/me" => ShowUserResponse
);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateArticle;

impl Operation for CreateArticle {
    type Response = ShowArticleResponse;

    fn path(&self) -> String {
        "articles/create".to_string()
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn prepare(&self, params: Params) -> Result<Params> {
        encode_image(params)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateArticle {
    pub id: i64,
}

impl Operation for UpdateArticle {
    type Response = ShowArticleResponse;

    fn path(&self) -> String {
        format!("articles/update/{}", self.id)
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn prepare(&self, params: Params) -> Result<Params> {
        encode_image(params)
    }
}

/// Replace an `image` source with the base64 text of its full contents.
///
/// Text values are taken to be encoded already and are left alone.
fn encode_image(mut params: Params) -> Result<Params> {
    for (key, value) in params.iter_mut() {
        if key != "image" {
            continue;
        }
        if let ParamValue::Image(source) = value {
            let bytes = read_image(source)?;
            debug!(bytes = bytes.len(), "encoding image upload");
            *value = ParamValue::Text(base64::engine::general_purpose::STANDARD.encode(bytes));
        }
    }
    Ok(params)
}

fn read_image(source: &mut ImageSource) -> Result<Vec<u8>> {
    match source {
        ImageSource::Bytes(bytes) => Ok(std::mem::take(bytes)),
        ImageSource::Path(path) => {
            let mut bytes = Vec::new();
            File::open(path.as_path())?.read_to_end(&mut bytes)?;
            Ok(bytes)
        }
        ImageSource::Reader(reader) => {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes)?;
            Ok(bytes)
        }
    }
}
