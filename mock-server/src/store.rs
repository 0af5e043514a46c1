//! In-memory timelines, articles and users.

use std::collections::BTreeMap;

use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::form::Form;

/// Key accepted for the seeded user.
pub const MOCK_KEY: &str = "mock-timeline-key";
/// Id of the seeded user.
pub const MOCK_USER_ID: i64 = 1;

const PAGE_SIZE: usize = 20;

/// An error envelope: status code and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub code: u16,
    pub message: String,
}

impl Failure {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(401, "timeline_key が正しくありません")
    }
}

pub type Outcome<T> = Result<T, Failure>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineRecord {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub owner: String,
    pub label_for_vaxis: String,
    pub commentable: bool,
    pub open_level: i64,
    pub opened_for: String,
    pub lock_level: i64,
    pub locked_for: String,
    pub articles_count: i64,
    pub initial_position: String,
    pub time_scale: String,
    pub category: String,
    pub page_views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub data: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub id: i64,
    pub timeline_id: i64,
    pub title: String,
    pub description: String,
    pub owner: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub grade: String,
    pub link: Option<String>,
    pub related_links: Vec<String>,
    pub image: Option<Image>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub key: String,
    pub nickname: String,
    pub introduction: String,
    pub image: Option<Image>,
}

/// One page of search hits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
    pub items: Vec<T>,
}

impl<T: Clone> Page<T> {
    fn of(hits: Vec<&T>, page: usize) -> Self {
        let total = hits.len();
        let page_count = total.div_ceil(PAGE_SIZE).max(1);
        let items = hits
            .into_iter()
            .skip((page - 1).saturating_mul(PAGE_SIZE))
            .take(PAGE_SIZE)
            .cloned()
            .collect();
        Self {
            total,
            page,
            page_count,
            items,
        }
    }
}

#[derive(Debug)]
pub struct Store {
    next_timeline_id: i64,
    next_article_id: i64,
    timelines: BTreeMap<i64, TimelineRecord>,
    articles: BTreeMap<i64, ArticleRecord>,
    users: BTreeMap<i64, UserRecord>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Empty store with the seeded user.
    pub fn new() -> Self {
        let mut users = BTreeMap::new();
        users.insert(
            MOCK_USER_ID,
            UserRecord {
                id: MOCK_USER_ID,
                key: MOCK_KEY.to_string(),
                nickname: "timeline-staff".to_string(),
                introduction: "timeline staffです。".to_string(),
                image: Some(Image {
                    data: vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'],
                    content_type: "image/png".to_string(),
                }),
            },
        );
        Self {
            next_timeline_id: 1,
            next_article_id: 1,
            timelines: BTreeMap::new(),
            articles: BTreeMap::new(),
            users,
        }
    }

    /// The user owning `timeline_key`.
    pub fn authenticate(&self, form: &Form) -> Outcome<&UserRecord> {
        let key = form.get("timeline_key").ok_or_else(Failure::unauthorized)?;
        self.users
            .values()
            .find(|user| user.key == key)
            .ok_or_else(Failure::unauthorized)
    }

    pub fn user(&self, id: i64) -> Outcome<&UserRecord> {
        self.users
            .get(&id)
            .ok_or_else(|| Failure::bad_request("対象のユーザが見つかりません"))
    }

    pub fn timeline(&self, id: i64) -> Outcome<&TimelineRecord> {
        self.timelines.get(&id).ok_or_else(missing_timeline)
    }

    pub fn article(&self, id: i64) -> Outcome<&ArticleRecord> {
        self.articles.get(&id).ok_or_else(missing_article)
    }

    pub fn create_timeline(&mut self, owner: &str, form: &Form) -> Outcome<TimelineRecord> {
        let title = required(form, "title")?;
        let now = Utc::now();
        let record = TimelineRecord {
            id: self.next_timeline_id,
            title,
            description: form.get("description").unwrap_or_default().to_string(),
            owner: owner.to_string(),
            label_for_vaxis: form.get("label_for_vaxis").unwrap_or_default().to_string(),
            commentable: form.get("commentable") == Some("true"),
            open_level: form.get_i64("open_level").unwrap_or(0),
            opened_for: form.get_all("opened_for").join(" "),
            lock_level: form.get_i64("lock_level").unwrap_or(0),
            locked_for: form.get_all("locked_for").join(" "),
            articles_count: 0,
            initial_position: form.get("initial_position").unwrap_or("recent").to_string(),
            time_scale: form.get("time_scale").unwrap_or("year").to_string(),
            category: form.get("category").unwrap_or_default().to_string(),
            page_views: 0,
            created_at: now,
            updated_at: now,
        };
        self.next_timeline_id += 1;
        self.timelines.insert(record.id, record.clone());
        Ok(record)
    }

    pub fn update_timeline(&mut self, id: i64, form: &Form) -> Outcome<TimelineRecord> {
        let record = self.timelines.get_mut(&id).ok_or_else(missing_timeline)?;
        if let Some(title) = form.get("title") {
            record.title = title.to_string();
        }
        if let Some(description) = form.get("description") {
            record.description = description.to_string();
        }
        if let Some(category) = form.get("category") {
            record.category = category.to_string();
        }
        if let Some(commentable) = form.get("commentable") {
            record.commentable = commentable == "true";
        }
        if let Some(level) = form.get_i64("open_level") {
            record.open_level = level;
        }
        if let Some(level) = form.get_i64("lock_level") {
            record.lock_level = level;
        }
        if form.get("opened_for").is_some() {
            record.opened_for = form.get_all("opened_for").join(" ");
        }
        if form.get("locked_for").is_some() {
            record.locked_for = form.get_all("locked_for").join(" ");
        }
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    /// Removes the timeline and its articles.
    pub fn delete_timeline(&mut self, id: i64) -> Outcome<()> {
        self.timelines.remove(&id).ok_or_else(missing_timeline)?;
        self.articles.retain(|_, article| article.timeline_id != id);
        Ok(())
    }

    pub fn search_timelines(&self, form: &Form) -> Outcome<Page<TimelineRecord>> {
        let page = page_number(form)?;
        let phrase = form.get("phrase");
        let category = form.get("category");
        let hits = self
            .timelines
            .values()
            .filter(|t| phrase.is_none_or(|p| t.title.contains(p) || t.description.contains(p)))
            .filter(|t| category.is_none_or(|c| t.category == c))
            .collect();
        Ok(Page::of(hits, page))
    }

    pub fn create_article(&mut self, owner: &str, form: &Form) -> Outcome<ArticleRecord> {
        let timeline_id = form
            .get_i64("timeline_id")
            .ok_or_else(|| Failure::bad_request("timeline_id を指定してください"))?;
        let title = required(form, "title")?;
        let image = decode_image(form)?;
        let timeline = self.timelines.get_mut(&timeline_id).ok_or_else(missing_timeline)?;
        timeline.articles_count += 1;

        let now = Utc::now();
        let record = ArticleRecord {
            id: self.next_article_id,
            timeline_id,
            title,
            description: form.get("description").unwrap_or_default().to_string(),
            owner: owner.to_string(),
            start_time: form
                .get("start_time")
                .map(str::to_string)
                .unwrap_or_else(|| timestamp(&now)),
            end_time: form.get("end_time").map(str::to_string),
            grade: form.get("grade").unwrap_or("1").to_string(),
            link: form.get("link").map(str::to_string),
            related_links: form.get_all("related_link"),
            image,
            created_at: now,
            updated_at: now,
        };
        self.next_article_id += 1;
        self.articles.insert(record.id, record.clone());
        Ok(record)
    }

    pub fn update_article(&mut self, id: i64, form: &Form) -> Outcome<ArticleRecord> {
        let image = decode_image(form)?;
        let record = self.articles.get_mut(&id).ok_or_else(missing_article)?;
        if let Some(title) = form.get("title") {
            record.title = title.to_string();
        }
        if let Some(description) = form.get("description") {
            record.description = description.to_string();
        }
        if let Some(start_time) = form.get("start_time") {
            record.start_time = start_time.to_string();
        }
        if let Some(end_time) = form.get("end_time") {
            record.end_time = Some(end_time.to_string());
        }
        if let Some(grade) = form.get("grade") {
            record.grade = grade.to_string();
        }
        if let Some(link) = form.get("link") {
            record.link = Some(link.to_string());
        }
        if form.get("related_link").is_some() {
            record.related_links = form.get_all("related_link");
        }
        if image.is_some() {
            record.image = image;
        }
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    pub fn delete_article(&mut self, id: i64) -> Outcome<()> {
        let article = self.articles.remove(&id).ok_or_else(missing_article)?;
        if let Some(timeline) = self.timelines.get_mut(&article.timeline_id) {
            timeline.articles_count -= 1;
        }
        Ok(())
    }

    pub fn search_articles(&self, form: &Form) -> Outcome<Page<ArticleRecord>> {
        let timeline_id = form.get_i64("timeline_id");
        let phrase = form.get("phrase");
        if timeline_id.is_none() && phrase.is_none() {
            return Err(Failure::bad_request(
                "検索方法に timeline_id, phrase, time_spec のどれかを指定してください",
            ));
        }
        let page = page_number(form)?;
        let hits = self
            .articles
            .values()
            .filter(|a| timeline_id.is_none_or(|id| a.timeline_id == id))
            .filter(|a| phrase.is_none_or(|p| a.title.contains(p) || a.description.contains(p)))
            .collect();
        Ok(Page::of(hits, page))
    }
}

pub fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn required(form: &Form, key: &str) -> Outcome<String> {
    match form.get(key) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(Failure::bad_request(format!("{key} を指定してください"))),
    }
}

fn page_number(form: &Form) -> Outcome<usize> {
    match form.get("page") {
        None => Ok(1),
        Some(text) => match text.trim().parse::<usize>() {
            Ok(page) if page >= 1 => Ok(page),
            _ => Err(Failure::bad_request("APIのパラメータが不正です。")),
        },
    }
}

/// Base64 `image` parameter, whitespace tolerated.
fn decode_image(form: &Form) -> Outcome<Option<Image>> {
    let Some(encoded) = form.get("image") else {
        return Ok(None);
    };
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let data = base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|_| Failure::bad_request("画像データが不正です"))?;
    Ok(Some(Image {
        data,
        content_type: form.get("image_type").unwrap_or("image/jpeg").to_string(),
    }))
}

fn missing_timeline() -> Failure {
    Failure::bad_request("タイムラインが存在しないかプライベートモードのタイムラインが指定されています。")
}

fn missing_article() -> Failure {
    Failure::bad_request("記事が存在しません")
}
