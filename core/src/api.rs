//! Blocking facade: one method per service operation.
//!
//! Each method builds the request through [`TimelineClient`], runs it on the
//! transport and parses the body into the operation's response type.
//! Operations on a single entity send its id both in the path and as the
//! `id` parameter.

use crate::client::TimelineClient;
use crate::config::Config;
use crate::error::Result;
use crate::model::{
    ListCategoryResponse, RawDataResponse, SearchArticleResponse, SearchTimelineResponse,
    ShowArticleResponse, ShowTimelineResponse, ShowUserResponse, StatusResponse,
};
use crate::operations::{
    CreateArticle, CreateTimeline, DeleteArticle, DeleteTimeline, GetArticleImage, GetUserImage,
    ListCategories, Operation, SearchArticle, SearchTimeline, ShowArticle, ShowOneself,
    ShowTimeline, ShowUser, UpdateArticle, UpdateTimeline,
};
use crate::params::Params;
use crate::transport::{Transport, UreqTransport};

/// Timeline API client.
///
/// ```no_run
/// use timeline_core::{Config, Params, TimelineApi};
///
/// let api = TimelineApi::new(Config::new().with_timeline_key("my-key"));
/// let found = api.search_timeline(Params::new().with("phrase", "history"))?;
/// for timeline in found.timelines.unwrap_or_default() {
///     println!("{:?}", timeline.title);
/// }
/// # Ok::<(), timeline_core::ApiError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TimelineApi<T = UreqTransport> {
    client: TimelineClient,
    transport: T,
}

impl TimelineApi<UreqTransport> {
    pub fn new(config: Config) -> Self {
        let transport = UreqTransport::new(&config);
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> TimelineApi<T> {
    pub fn with_transport(config: Config, transport: T) -> Self {
        Self {
            client: TimelineClient::new(config),
            transport,
        }
    }

    pub fn client(&self) -> &TimelineClient {
        &self.client
    }

    pub fn config(&self) -> &Config {
        self.client.config()
    }

    /// Run any operation with the given parameters.
    pub fn call<O: Operation>(&self, operation: &O, params: Params) -> Result<O::Response> {
        let request = self.client.build(operation, params)?;
        let response = self.transport.execute(&request)?;
        self.client.parse(&response)
    }

    pub fn find_timeline(&self, id: i64) -> Result<ShowTimelineResponse> {
        self.call(&ShowTimeline { id }, with_id(id, Params::new()))
    }

    pub fn find_article(&self, id: i64) -> Result<ShowArticleResponse> {
        self.call(&ShowArticle { id }, with_id(id, Params::new()))
    }

    pub fn get_article_image(&self, id: i64) -> Result<RawDataResponse> {
        self.call(&GetArticleImage { id }, with_id(id, Params::new()))
    }

    pub fn create_timeline(&self, fields: Params) -> Result<ShowTimelineResponse> {
        self.call(&CreateTimeline, fields)
    }

    pub fn update_timeline(&self, id: i64, fields: Params) -> Result<ShowTimelineResponse> {
        self.call(&UpdateTimeline { id }, with_id(id, fields))
    }

    /// `fields` may carry an [`ImageSource`](crate::ImageSource) under
    /// `image`; it is read and sent as base64.
    pub fn create_article(&self, fields: Params) -> Result<ShowArticleResponse> {
        self.call(&CreateArticle, fields)
    }

    pub fn update_article(&self, id: i64, fields: Params) -> Result<ShowArticleResponse> {
        self.call(&UpdateArticle { id }, with_id(id, fields))
    }

    pub fn search_timeline(&self, filters: Params) -> Result<SearchTimelineResponse> {
        self.call(&SearchTimeline, filters)
    }

    pub fn search_article(&self, filters: Params) -> Result<SearchArticleResponse> {
        self.call(&SearchArticle, filters)
    }

    pub fn delete_timeline(&self, id: i64) -> Result<StatusResponse> {
        self.call(&DeleteTimeline { id }, with_id(id, Params::new()))
    }

    pub fn delete_article(&self, id: i64) -> Result<StatusResponse> {
        self.call(&DeleteArticle { id }, with_id(id, Params::new()))
    }

    /// A user's profile, or the key owner's own profile when `id` is `None`.
    pub fn show_user(&self, id: Option<i64>) -> Result<ShowUserResponse> {
        match id {
            Some(id) => self.call(&ShowUser { id }, with_id(id, Params::new())),
            None => self.call(&ShowOneself, Params::new()),
        }
    }

    pub fn get_user_image(&self, id: i64) -> Result<RawDataResponse> {
        self.call(&GetUserImage { id }, with_id(id, Params::new()))
    }

    pub fn list_categories(&self) -> Result<ListCategoryResponse> {
        self.call(&ListCategories, Params::new())
    }
}

fn with_id(id: i64, mut params: Params) -> Params {
    params.set("id", id);
    params
}
