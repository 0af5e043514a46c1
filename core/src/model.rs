//! Entities and response envelopes of the timeline service.
//!
//! # Design
//! Every type here is plain data with a [`Schema`] declaring where each field
//! comes from. Element names follow the service, not Rust naming: `page_view`
//! fills `page_views`, `image` fills `image_url`, and so on.
//!
//! Fields are `Option` because the service omits what it does not know.
//! List fields are `Option<Vec<_>>`: `None` means the section was absent,
//! `Some(vec![])` means it was present and empty.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset};

use crate::mapping::{Mapped, Schema};

// ---------------------------------------------------------------------------
// Shared types
// ---------------------------------------------------------------------------

/// The `status` block carried by every response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseStatus {
    pub code: Option<i64>,
    pub message: Option<String>,
    pub language: Option<String>,
}

impl Mapped for ResponseStatus {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<ResponseStatus>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::<Self>::new()
                .integer("code", "code", |s, v| s.code = Some(v))
                .string("message", "message", |s, v| s.message = Some(v))
                .string("language", "language", |s, v| s.language = Some(v))
        })
    }
}

/// Pagination metadata of a search result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: Option<i64>,
    pub page: Option<i64>,
    pub page_count: Option<i64>,
}

impl Mapped for Summary {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<Summary>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::<Self>::new()
                .integer("total", "total", |s, v| s.total = Some(v))
                .integer("page", "page", |s, v| s.page = Some(v))
                .integer("page_count", "page_count", |s, v| s.page_count = Some(v))
        })
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub label_for_vaxis: Option<String>,
    /// Raw flag text; see [`Timeline::is_commentable`].
    pub commentable: Option<String>,
    pub open_level: Option<i64>,
    /// Whitespace-separated member names.
    pub opened_for: Option<String>,
    pub lock_level: Option<i64>,
    /// Whitespace-separated member names.
    pub locked_for: Option<String>,
    pub articles_count: Option<i64>,
    pub initial_position: Option<String>,
    pub time_scale: Option<String>,
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub score: Option<i64>,
    pub point: Option<i64>,
    pub page_views: Option<i64>,
    pub category: Option<String>,
}

impl Timeline {
    /// Whether others may comment. Only the literal `true` counts.
    pub fn is_commentable(&self) -> bool {
        self.commentable.as_deref() == Some("true")
    }

    /// Members allowed to browse: everyone in `opened_for` and `locked_for`,
    /// without duplicates, in first-seen order.
    pub fn readable_members(&self) -> Vec<String> {
        let mut members: Vec<String> = Vec::new();
        for member in list_members(self.opened_for.as_deref())
            .into_iter()
            .chain(list_members(self.locked_for.as_deref()))
        {
            if !members.contains(&member) {
                members.push(member);
            }
        }
        members
    }

    /// Members allowed to post articles.
    pub fn writable_members(&self) -> Vec<String> {
        list_members(self.locked_for.as_deref())
    }
}

fn list_members(source: Option<&str>) -> Vec<String> {
    source
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

impl Mapped for Timeline {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<Timeline>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::<Self>::new()
                .integer("id", "id", |t, v| t.id = Some(v))
                .string("title", "title", |t, v| t.title = Some(v))
                .string("link", "link", |t, v| t.link = Some(v))
                .string("description", "description", |t, v| t.description = Some(v))
                .string("owner", "owner", |t, v| t.owner = Some(v))
                .string("label_for_vaxis", "label_for_vaxis", |t, v| t.label_for_vaxis = Some(v))
                .string("commentable", "commentable", |t, v| t.commentable = Some(v))
                .integer("open_level", "open_level", |t, v| t.open_level = Some(v))
                .string("opened_for", "opened_for", |t, v| t.opened_for = Some(v))
                .integer("lock_level", "lock_level", |t, v| t.lock_level = Some(v))
                .string("locked_for", "locked_for", |t, v| t.locked_for = Some(v))
                .integer("articles_count", "articles_count", |t, v| t.articles_count = Some(v))
                .string("initial_position", "initial_position", |t, v| t.initial_position = Some(v))
                .string("time_scale", "time_scale", |t, v| t.time_scale = Some(v))
                .datetime("updated_at", "updated_at", |t, v| t.updated_at = Some(v))
                .datetime("created_at", "created_at", |t, v| t.created_at = Some(v))
                .integer("score", "score", |t, v| t.score = Some(v))
                .integer("point", "point", |t, v| t.point = Some(v))
                .integer("page_view", "page_views", |t, v| t.page_views = Some(v))
                .string("category", "category", |t, v| t.category = Some(v))
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Article {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub start_time: Option<DateTime<FixedOffset>>,
    pub end_time: Option<DateTime<FixedOffset>>,
    pub grade: Option<String>,
    pub image_url: Option<String>,
    pub link: Option<String>,
    pub related_urls: Option<Vec<String>>,
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub created_at: Option<DateTime<FixedOffset>>,
}

impl Mapped for Article {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<Article>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::<Self>::new()
                .integer("id", "id", |a, v| a.id = Some(v))
                .string("title", "title", |a, v| a.title = Some(v))
                .string("description", "description", |a, v| a.description = Some(v))
                .string("owner", "owner", |a, v| a.owner = Some(v))
                .datetime("start_time", "start_time", |a, v| a.start_time = Some(v))
                .datetime("end_time", "end_time", |a, v| a.end_time = Some(v))
                .string("grade", "grade", |a, v| a.grade = Some(v))
                .string("image", "image_url", |a, v| a.image_url = Some(v))
                .string("link", "link", |a, v| a.link = Some(v))
                .strings("related_links", "related_urls", "url", |a, v| a.related_urls = Some(v))
                .datetime("updated_at", "updated_at", |a, v| a.updated_at = Some(v))
                .datetime("created_at", "created_at", |a, v| a.created_at = Some(v))
        })
    }
}

/// A category; top-level categories carry only a display name and nest
/// their sub-categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Category {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub sub_categories: Option<Vec<Category>>,
}

impl Mapped for Category {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<Category>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::<Self>::new()
                .string("name", "name", |c, v| c.name = Some(v))
                .string("display_name", "display_name", |c, v| c.display_name = Some(v))
                .array("sub_categories", "sub_categories", "sub_category", |c, v| {
                    c.sub_categories = Some(v)
                })
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub nickname: Option<String>,
    pub link: Option<String>,
    pub introduction: Option<String>,
    pub image_url: Option<String>,
}

impl Mapped for User {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<User>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::<Self>::new()
                .string("nickname", "nickname", |u, v| u.nickname = Some(v))
                .string("link", "link", |u, v| u.link = Some(v))
                .string("introduction", "introduction", |u, v| u.introduction = Some(v))
                .string("image", "image_url", |u, v| u.image_url = Some(v))
        })
    }
}

/// The `result` block of a timeline search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTimelineResult {
    pub summary: Option<Summary>,
    pub timelines: Option<Vec<Timeline>>,
}

impl Mapped for SearchTimelineResult {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<SearchTimelineResult>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::<Self>::new()
                .nested("summary", "summary", None, |r, v| r.summary = v)
                .array("timelines", "timelines", "timeline", |r, v| r.timelines = Some(v))
        })
    }
}

/// The `result` block of an article search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchArticleResult {
    pub summary: Option<Summary>,
    pub articles: Option<Vec<Article>>,
}

impl Mapped for SearchArticleResult {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<SearchArticleResult>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::<Self>::new()
                .nested("summary", "summary", None, |r, v| r.summary = v)
                .array("articles", "articles", "article", |r, v| r.articles = Some(v))
        })
    }
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// A response carrying a `status` block.
pub trait Envelope: Mapped {
    fn status(&self) -> Option<&ResponseStatus>;

    fn set_status(&mut self, status: Option<ResponseStatus>);

    /// `None` when the response had no status block, otherwise whether its
    /// code is exactly 200.
    fn success(&self) -> Option<bool> {
        self.status().map(|status| status.code == Some(200))
    }
}

/// Base schema shared by every envelope.
pub fn envelope_schema<T: Envelope>() -> Schema<T> {
    Schema::<T>::new().nested::<ResponseStatus>("status", "status", None, |r, v| r.set_status(v))
}

macro_rules! impl_envelope {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Envelope for $ty {
                fn status(&self) -> Option<&ResponseStatus> {
                    self.status.as_ref()
                }

                fn set_status(&mut self, status: Option<ResponseStatus>) {
                    self.status = status;
                }
            }
        )+
    };
}

impl_envelope!(
    StatusResponse,
    ShowTimelineResponse,
    ShowArticleResponse,
    SearchTimelineResponse,
    SearchArticleResponse,
    ShowUserResponse,
    ListCategoryResponse,
    RawDataResponse,
);

/// A bare status envelope, returned by deletions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: Option<ResponseStatus>,
}

impl Mapped for StatusResponse {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<StatusResponse>> = OnceLock::new();
        SCHEMA.get_or_init(envelope_schema::<Self>)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowTimelineResponse {
    pub status: Option<ResponseStatus>,
    pub timeline: Option<Timeline>,
}

impl Mapped for ShowTimelineResponse {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<ShowTimelineResponse>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            envelope_schema::<Self>().merge(Schema::<Self>::new().nested(
                "result",
                "timeline",
                Some("timeline"),
                |r, v| r.timeline = v,
            ))
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowArticleResponse {
    pub status: Option<ResponseStatus>,
    pub article: Option<Article>,
}

impl Mapped for ShowArticleResponse {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<ShowArticleResponse>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            envelope_schema::<Self>().merge(Schema::<Self>::new().nested(
                "result",
                "article",
                Some("article"),
                |r, v| r.article = v,
            ))
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowUserResponse {
    pub status: Option<ResponseStatus>,
    pub user: Option<User>,
}

impl Mapped for ShowUserResponse {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<ShowUserResponse>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            envelope_schema::<Self>().merge(Schema::<Self>::new().nested(
                "result",
                "user",
                Some("user"),
                |r, v| r.user = v,
            ))
        })
    }
}

/// A page of timelines. The service wraps `summary` and the list in a
/// `result` block; both are lifted onto the response after population.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTimelineResponse {
    pub status: Option<ResponseStatus>,
    pub summary: Option<Summary>,
    pub timelines: Option<Vec<Timeline>>,
    result: Option<SearchTimelineResult>,
}

impl Mapped for SearchTimelineResponse {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<SearchTimelineResponse>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            envelope_schema::<Self>().merge(
                Schema::<Self>::new()
                    .nested("result", "result", None, |r, v| r.result = v)
                    .private("result")
                    .finish_with(|r| {
                        if let Some(result) = r.result.take() {
                            r.summary = result.summary;
                            r.timelines = result.timelines;
                        }
                    }),
            )
        })
    }
}

/// A page of articles, flattened like [`SearchTimelineResponse`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchArticleResponse {
    pub status: Option<ResponseStatus>,
    pub summary: Option<Summary>,
    pub articles: Option<Vec<Article>>,
    result: Option<SearchArticleResult>,
}

impl Mapped for SearchArticleResponse {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<SearchArticleResponse>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            envelope_schema::<Self>().merge(
                Schema::<Self>::new()
                    .nested("result", "result", None, |r, v| r.result = v)
                    .private("result")
                    .finish_with(|r| {
                        if let Some(result) = r.result.take() {
                            r.summary = result.summary;
                            r.articles = result.articles;
                        }
                    }),
            )
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListCategoryResponse {
    pub status: Option<ResponseStatus>,
    pub categories: Option<Vec<Category>>,
}

impl Mapped for ListCategoryResponse {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<ListCategoryResponse>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            envelope_schema::<Self>().merge(Schema::<Self>::new().array(
                "result",
                "categories",
                "categories/category",
                |r, v| r.categories = Some(v),
            ))
        })
    }
}

/// Binary payload (image) with its content type.
///
/// On success the body is never parsed; `status` is synthesized from the
/// HTTP status code. Its message is the standard reason phrase for that code,
/// since the transport does not expose the phrase the server sent.
/// `content_type` is the media type alone, without parameters such as
/// `charset`. On failure the service sends a regular XML envelope and only
/// `status` is filled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDataResponse {
    pub status: Option<ResponseStatus>,
    pub data: Option<Vec<u8>>,
    pub content_type: Option<String>,
}

impl Mapped for RawDataResponse {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<RawDataResponse>> = OnceLock::new();
        SCHEMA.get_or_init(envelope_schema::<Self>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::mapping::Coercion;
    use crate::xml::parse_document;

    fn unmarshal<T: Mapped>(xml: &str) -> T {
        let root = parse_document(xml.as_bytes()).unwrap().unwrap();
        T::unmarshal(&root).unwrap()
    }

    fn status(code: i64, message: &str) -> Option<ResponseStatus> {
        Some(ResponseStatus {
            code: Some(code),
            message: Some(message.to_string()),
            language: Some("ja".to_string()),
        })
    }

    #[test]
    fn show_timeline_response() {
        let r: ShowTimelineResponse = unmarshal(include_str!("../../test-vectors/show_timeline.xml"));
        assert_eq!(r.status, status(200, "OK"));
        assert_eq!(r.success(), Some(true));

        let tl = r.timeline.unwrap();
        assert_eq!(tl.id, Some(12345));
        assert_eq!(tl.title.as_deref(), Some("Test TimeLine"));
        assert_eq!(tl.link.as_deref(), Some("http://timeline.nifty.com/some/timeline/url"));
        assert_eq!(tl.description.as_deref(), Some("テスト。"));
        assert_eq!(tl.owner.as_deref(), Some("test-owner"));
        assert_eq!(tl.label_for_vaxis.as_deref(), Some("test-vaxis"));
        assert_eq!(tl.commentable.as_deref(), Some("true"));
        assert!(tl.is_commentable());
        assert_eq!(tl.open_level, Some(1));
        assert_eq!(tl.opened_for.as_deref(), Some("test-readable"));
        assert_eq!(tl.lock_level, Some(0));
        assert_eq!(tl.locked_for.as_deref(), Some("test-writable"));
        assert_eq!(tl.articles_count, Some(987));
        assert_eq!(tl.initial_position.as_deref(), Some("recent"));
        assert_eq!(tl.time_scale.as_deref(), Some("ten_years"));
        assert_eq!(tl.updated_at.unwrap().to_rfc3339(), "2007-07-24T12:34:56+09:00");
        assert_eq!(tl.created_at.unwrap().to_rfc3339(), "2007-01-02T01:02:03+09:00");
        assert_eq!(tl.score, Some(123));
        assert_eq!(tl.point, Some(234));
        assert_eq!(tl.page_views, Some(7654));
        assert_eq!(tl.category.as_deref(), Some("テスト"));
    }

    #[test]
    fn show_timeline_response_400() {
        let r: ShowTimelineResponse =
            unmarshal(include_str!("../../test-vectors/show_timeline_400.xml"));
        assert_eq!(
            r.status,
            status(400, "タイムラインが存在しないかプライベートモードのタイムラインが指定されています。")
        );
        assert_eq!(r.success(), Some(false));
        assert!(r.timeline.is_none());
    }

    #[test]
    fn show_article_response() {
        let r: ShowArticleResponse = unmarshal(include_str!("../../test-vectors/show_article.xml"));
        assert_eq!(r.status, status(200, "OK"));

        let a = r.article.unwrap();
        assert_eq!(a.id, Some(12345));
        assert_eq!(a.title.as_deref(), Some("テスト中"));
        assert_eq!(a.description.as_deref(), Some("テストです。"));
        assert_eq!(a.owner.as_deref(), Some("test-user"));
        assert_eq!(a.start_time.unwrap().to_rfc3339(), "2007-07-24T12:34:56+09:00");
        assert_eq!(a.end_time.unwrap().to_rfc3339(), "2007-07-25T01:02:03+09:00");
        assert_eq!(a.grade.as_deref(), Some("test-grade"));
        assert_eq!(a.image_url.as_deref(), Some("http://timeline.nifty.com/some/image/url"));
        assert_eq!(a.link.as_deref(), Some("http://timeline.nifty.com/url/for/an/article"));
        assert_eq!(a.updated_at.unwrap().to_rfc3339(), "2007-07-25T02:03:04+09:00");
        assert_eq!(a.created_at.unwrap().to_rfc3339(), "2007-07-25T03:04:05+09:00");
        assert_eq!(
            a.related_urls.unwrap(),
            ["http://www.example.com/related", "http://foo.nifty.com/nowhere"]
        );
    }

    #[test]
    fn show_article_response_400() {
        let r: ShowArticleResponse =
            unmarshal(include_str!("../../test-vectors/show_article_400.xml"));
        assert_eq!(r.status.as_ref().and_then(|s| s.code), Some(400));
        assert!(r.article.is_none());
    }

    #[test]
    fn search_timeline_response() {
        let r: SearchTimelineResponse =
            unmarshal(include_str!("../../test-vectors/search_timeline.xml"));
        assert_eq!(r.status, status(200, "OK"));
        assert_eq!(
            r.summary,
            Some(Summary { total: Some(123), page: Some(3), page_count: Some(15) })
        );
        let timelines = r.timelines.unwrap();
        assert_eq!(timelines.len(), 2);
        assert_eq!(timelines[0].id, Some(987));
        assert_eq!(timelines[0].title.as_deref(), Some("１件目"));
        assert_eq!(timelines[1].id, Some(654));
        assert_eq!(timelines[1].title.as_deref(), Some("２件目"));
    }

    #[test]
    fn search_timeline_response_empty() {
        let r: SearchTimelineResponse =
            unmarshal(include_str!("../../test-vectors/search_timeline_empty.xml"));
        assert_eq!(r.success(), Some(true));
        assert_eq!(
            r.summary,
            Some(Summary { total: Some(0), page: Some(1), page_count: Some(1) })
        );
        assert_eq!(r.timelines, Some(vec![]));
    }

    #[test]
    fn search_timeline_response_400() {
        let r: SearchTimelineResponse =
            unmarshal(include_str!("../../test-vectors/search_timeline_400.xml"));
        assert_eq!(r.status, status(400, "APIのパラメータが不正です。"));
        assert!(r.summary.is_none());
        assert!(r.timelines.is_none());
    }

    #[test]
    fn search_article_response() {
        let r: SearchArticleResponse =
            unmarshal(include_str!("../../test-vectors/search_article.xml"));
        assert_eq!(
            r.summary,
            Some(Summary { total: Some(1234), page: Some(1), page_count: Some(123) })
        );
        let articles = r.articles.unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].id, Some(123));
        assert_eq!(articles[0].title.as_deref(), Some("１件目"));
        assert_eq!(articles[1].id, Some(456));
        assert_eq!(articles[1].title.as_deref(), Some("２件目"));
    }

    #[test]
    fn search_article_response_empty() {
        let r: SearchArticleResponse =
            unmarshal(include_str!("../../test-vectors/search_article_empty.xml"));
        assert_eq!(r.summary.as_ref().and_then(|s| s.total), Some(0));
        assert_eq!(r.articles, Some(vec![]));
    }

    #[test]
    fn search_article_response_400() {
        let r: SearchArticleResponse =
            unmarshal(include_str!("../../test-vectors/search_article_400.xml"));
        assert_eq!(
            r.status,
            status(400, "検索方法に timeline_id, phrase, time_spec のどれかを指定してください")
        );
        assert!(r.summary.is_none());
        assert!(r.articles.is_none());
    }

    #[test]
    fn show_user_response() {
        let r: ShowUserResponse = unmarshal(include_str!("../../test-vectors/show_user.xml"));
        assert_eq!(r.status, status(200, "OK"));
        let user = r.user.unwrap();
        assert_eq!(user.nickname.as_deref(), Some("timeline-staff"));
        assert_eq!(user.link.as_deref(), Some("http://stage.timeline.nifty.com/people/show/1"));
        assert_eq!(user.introduction.as_deref(), Some("timeline staffです。"));
        assert_eq!(
            user.image_url.as_deref(),
            Some("http://stage.timeline.nifty.com/portal/show_user_profile_image/1")
        );
    }

    #[test]
    fn show_user_response_400() {
        let r: ShowUserResponse = unmarshal(include_str!("../../test-vectors/show_user_400.xml"));
        assert_eq!(r.status, status(400, "対象のユーザが見つかりません"));
        assert!(r.user.is_none());
    }

    #[test]
    fn list_category_response() {
        let r: ListCategoryResponse =
            unmarshal(include_str!("../../test-vectors/list_category.xml"));
        assert_eq!(r.status, status(200, "OK"));

        let categories = r.categories.unwrap();
        assert_eq!(categories.len(), 7);

        let first = &categories[0];
        assert_eq!(first.display_name.as_deref(), Some("時間・歴史"));
        assert!(first.name.is_none());
        let subs = first.sub_categories.as_ref().unwrap();
        assert_eq!(subs.len(), 4);
        assert_eq!(subs[0].name.as_deref(), Some("personal"));
        assert_eq!(subs[0].display_name.as_deref(), Some("自分史"));
        assert!(subs[0].sub_categories.is_none());
        assert_eq!(subs[3].name.as_deref(), Some("event"));
        assert_eq!(subs[3].display_name.as_deref(), Some("イベント"));

        let last = &categories[6];
        assert_eq!(last.display_name.as_deref(), Some("ビジネス"));
        assert!(last.name.is_none());
        let subs = last.sub_categories.as_ref().unwrap();
        assert_eq!(subs.len(), 4);
        assert_eq!(subs[3].name.as_deref(), Some("work"));
        assert_eq!(subs[3].display_name.as_deref(), Some("仕事"));
        assert!(subs[3].sub_categories.is_none());
    }

    #[test]
    fn success_is_tri_state() {
        let r: StatusResponse = unmarshal("<response/>");
        assert_eq!(r.success(), None);

        let r: StatusResponse = unmarshal("<response><status><code>200</code></status></response>");
        assert_eq!(r.success(), Some(true));

        let r: StatusResponse = unmarshal("<response><status><code>201</code></status></response>");
        assert_eq!(r.success(), Some(false));

        let r: StatusResponse = unmarshal("<response><status><message>?</message></status></response>");
        assert_eq!(r.success(), Some(false));
    }

    #[test]
    fn malformed_timestamp_fails_whole_response() {
        let root = parse_document(
            "<response><result><timeline><created_at>soon</created_at></timeline></result></response>"
                .as_bytes(),
        )
        .unwrap()
        .unwrap();
        let err = ShowTimelineResponse::unmarshal_with(&root, Coercion::Lenient).unwrap_err();
        assert!(matches!(err, ApiError::MalformedDate { .. }));
    }

    #[test]
    fn search_response_keeps_result_private() {
        let schema = SearchArticleResponse::schema();
        assert!(schema.get("result").unwrap().is_private());
        assert!(!schema.get("status").unwrap().is_private());
        assert!(schema.has_finish());
    }

    #[test]
    fn commentable_requires_literal_true() {
        let mut t = Timeline::default();
        assert!(!t.is_commentable());
        t.commentable = Some("true".into());
        assert!(t.is_commentable());
        t.commentable = Some("false".into());
        assert!(!t.is_commentable());
        t.commentable = Some("unknown-value".into());
        assert!(!t.is_commentable());
        t.commentable = Some("TRUE".into());
        assert!(!t.is_commentable());
    }

    #[test]
    fn readable_members_is_union_of_both_lists() {
        let mut t = Timeline::default();
        assert!(t.readable_members().is_empty());

        t.opened_for = Some("user1".into());
        assert_eq!(t.readable_members(), ["user1"]);

        t.opened_for = Some("user1 user2  user3".into());
        assert_eq!(t.readable_members(), ["user1", "user2", "user3"]);

        t.locked_for = Some("write1 write2 write3".into());
        let mut members = t.readable_members();
        members.sort();
        assert_eq!(members, ["user1", "user2", "user3", "write1", "write2", "write3"]);

        t.opened_for = Some("user1 user2 user3 rw1 rw2".into());
        t.locked_for = Some("write1 write2 write3 rw1 rw2".into());
        let mut members = t.readable_members();
        members.sort();
        assert_eq!(
            members,
            ["rw1", "rw2", "user1", "user2", "user3", "write1", "write2", "write3"]
        );
    }

    #[test]
    fn writable_members_is_locked_for_only() {
        let mut t = Timeline::default();
        assert!(t.writable_members().is_empty());

        t.locked_for = Some("write1\twrite2\nwrite3".into());
        t.opened_for = Some("read1 read2 read3".into());
        assert_eq!(t.writable_members(), ["write1", "write2", "write3"]);
    }
}
