//! In-memory stand-in for the TimeLine API.
//!
//! Serves every endpoint under `/api/v1/` with the service's XML envelopes.
//! The HTTP status mirrors the envelope code. Parameters are read from the
//! query string and the form body alike; mutating endpoints and `users/me`
//! require the seeded [`MOCK_KEY`] as `timeline_key`.

pub mod categories;
pub mod form;
pub mod store;
pub mod xml;

use std::sync::Arc;

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

pub use crate::store::{Store, MOCK_KEY, MOCK_USER_ID};

use crate::categories::CATEGORIES;
use crate::form::Form;
use crate::store::{Failure, Outcome};
use crate::xml::{envelope, status_only, ToXml};

pub type Db = Arc<RwLock<Store>>;

const XML_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

pub fn app() -> Router {
    app_with(Store::new())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    let api = Router::new()
        .route("/timelines/show/{id}", get(show_timeline))
        .route("/timelines/create", post(create_timeline))
        .route("/timelines/update/{id}", post(update_timeline))
        .route("/timelines/delete/{id}", post(delete_timeline))
        .route("/timelines/search", get(search_timelines))
        .route("/articles/show/{id}", get(show_article))
        .route("/articles/create", post(create_article))
        .route("/articles/update/{id}", post(update_article))
        .route("/articles/delete/{id}", post(delete_article))
        .route("/articles/search", get(search_articles))
        .route("/articles/image/{id}", get(article_image))
        .route("/users/show/{id}", get(show_user))
        .route("/users/me", get(show_oneself))
        .route("/users/image/{id}", get(user_image))
        .route("/categories/list", get(list_categories));
    Router::new().nest("/api/v1", api).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock timeline API listening");
    }
    axum::serve(listener, app()).await
}

fn xml_response(code: u16, body: Vec<u8>) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, XML_CONTENT_TYPE)], body).into_response()
}

fn fail(failure: Failure) -> Response {
    debug!(code = failure.code, message = %failure.message, "request failed");
    xml_response(failure.code, status_only(failure.code, &failure.message))
}

fn respond<T: ToXml>(outcome: Outcome<T>) -> Response {
    match outcome {
        Ok(result) => xml_response(200, envelope(200, "OK", Some(&result))),
        Err(failure) => fail(failure),
    }
}

fn respond_status(outcome: Outcome<()>) -> Response {
    match outcome {
        Ok(()) => xml_response(200, status_only(200, "OK")),
        Err(failure) => fail(failure),
    }
}

fn parse_id(raw: &str) -> Outcome<i64> {
    raw.parse()
        .map_err(|_| Failure::bad_request("APIのパラメータが不正です。"))
}

/// Nickname of the key's owner.
fn authorized(store: &Store, form: &Form) -> Outcome<String> {
    store.authenticate(form).map(|user| user.nickname.clone())
}

fn image_response(image: &store::Image) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, image.content_type.clone())],
        image.data.clone(),
    )
        .into_response()
}

async fn show_timeline(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let store = db.read().await;
    respond(parse_id(&id).and_then(|id| store.timeline(id).cloned()))
}

async fn create_timeline(State(db): State<Db>, RawQuery(query): RawQuery, body: String) -> Response {
    let form = Form::merged(query.as_deref(), &body);
    let mut store = db.write().await;
    let outcome = authorized(&store, &form).and_then(|owner| store.create_timeline(&owner, &form));
    if let Ok(timeline) = &outcome {
        debug!(id = timeline.id, "created timeline");
    }
    respond(outcome)
}

async fn update_timeline(
    State(db): State<Db>,
    Path(id): Path<String>,
    RawQuery(query): RawQuery,
    body: String,
) -> Response {
    let form = Form::merged(query.as_deref(), &body);
    let mut store = db.write().await;
    respond(
        authorized(&store, &form)
            .and_then(|_| parse_id(&id))
            .and_then(|id| store.update_timeline(id, &form)),
    )
}

async fn delete_timeline(
    State(db): State<Db>,
    Path(id): Path<String>,
    RawQuery(query): RawQuery,
    body: String,
) -> Response {
    let form = Form::merged(query.as_deref(), &body);
    let mut store = db.write().await;
    respond_status(
        authorized(&store, &form)
            .and_then(|_| parse_id(&id))
            .and_then(|id| store.delete_timeline(id)),
    )
}

async fn search_timelines(State(db): State<Db>, RawQuery(query): RawQuery) -> Response {
    let form = Form::merged(query.as_deref(), "");
    let store = db.read().await;
    respond(store.search_timelines(&form))
}

async fn show_article(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let store = db.read().await;
    respond(parse_id(&id).and_then(|id| store.article(id).cloned()))
}

async fn create_article(State(db): State<Db>, RawQuery(query): RawQuery, body: String) -> Response {
    let form = Form::merged(query.as_deref(), &body);
    let mut store = db.write().await;
    let outcome = authorized(&store, &form).and_then(|owner| store.create_article(&owner, &form));
    if let Ok(article) = &outcome {
        debug!(id = article.id, timeline_id = article.timeline_id, "created article");
    }
    respond(outcome)
}

async fn update_article(
    State(db): State<Db>,
    Path(id): Path<String>,
    RawQuery(query): RawQuery,
    body: String,
) -> Response {
    let form = Form::merged(query.as_deref(), &body);
    let mut store = db.write().await;
    respond(
        authorized(&store, &form)
            .and_then(|_| parse_id(&id))
            .and_then(|id| store.update_article(id, &form)),
    )
}

async fn delete_article(
    State(db): State<Db>,
    Path(id): Path<String>,
    RawQuery(query): RawQuery,
    body: String,
) -> Response {
    let form = Form::merged(query.as_deref(), &body);
    let mut store = db.write().await;
    respond_status(
        authorized(&store, &form)
            .and_then(|_| parse_id(&id))
            .and_then(|id| store.delete_article(id)),
    )
}

async fn search_articles(State(db): State<Db>, RawQuery(query): RawQuery) -> Response {
    let form = Form::merged(query.as_deref(), "");
    let store = db.read().await;
    respond(store.search_articles(&form))
}

async fn article_image(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let store = db.read().await;
    let image = parse_id(&id)
        .and_then(|id| store.article(id))
        .and_then(|article| {
            article
                .image
                .as_ref()
                .ok_or_else(|| Failure::bad_request("画像が登録されていません"))
        });
    match image {
        Ok(image) => image_response(image),
        Err(failure) => fail(failure),
    }
}

async fn show_user(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let store = db.read().await;
    respond(parse_id(&id).and_then(|id| store.user(id).cloned()))
}

async fn show_oneself(State(db): State<Db>, RawQuery(query): RawQuery) -> Response {
    let form = Form::merged(query.as_deref(), "");
    let store = db.read().await;
    respond(store.authenticate(&form).cloned())
}

async fn user_image(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let store = db.read().await;
    let image = parse_id(&id).and_then(|id| store.user(id)).and_then(|user| {
        user.image
            .as_ref()
            .ok_or_else(|| Failure::bad_request("画像が登録されていません"))
    });
    match image {
        Ok(image) => image_response(image),
        Err(failure) => fail(failure),
    }
}

async fn list_categories() -> Response {
    xml_response(200, envelope(200, "OK", Some(CATEGORIES)))
}
