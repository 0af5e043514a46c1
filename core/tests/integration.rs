//! End-to-end lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every `TimelineApi`
//! operation over real HTTP through `UreqTransport`. Validates that request
//! encoding, transport and XML mapping agree with an actual server.

use std::net::SocketAddr;
use std::time::Duration;

use chrono::{FixedOffset, TimeZone};
use timeline_core::{ApiError, Config, Envelope, ImageSource, Params, TimelineApi};

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });
    addr
}

fn config(addr: SocketAddr) -> Config {
    Config::new()
        .with_host(addr.ip().to_string())
        .with_port(addr.port())
}

#[test]
fn timeline_and_article_lifecycle() {
    let addr = start_server();
    let api = TimelineApi::new(config(addr).with_timeline_key(mock_server::MOCK_KEY));

    // Step 1: categories are served as a nested tree.
    let categories = api.list_categories().unwrap().categories.unwrap();
    assert_eq!(categories.len(), 7);
    assert!(categories[0].name.is_none());
    assert_eq!(categories[0].display_name.as_deref(), Some("時間・歴史"));
    let subs = categories[6].sub_categories.as_ref().unwrap();
    assert_eq!(subs[3].name.as_deref(), Some("work"));

    // Step 2: create a timeline with multibyte text and member lists.
    let created = api
        .create_timeline(
            Params::new()
                .with("title", "テスト年表")
                .with("description", "a & b <c>")
                .with("category", "history")
                .with("commentable", "true")
                .with("opened_for", ["reader1", "both"])
                .with("locked_for", ["writer1", "both"]),
        )
        .unwrap();
    assert_eq!(created.success(), Some(true));
    let timeline = created.timeline.unwrap();
    let timeline_id = timeline.id.unwrap();
    assert_eq!(timeline.title.as_deref(), Some("テスト年表"));
    assert_eq!(timeline.description.as_deref(), Some("a & b <c>"));
    assert_eq!(timeline.owner.as_deref(), Some("timeline-staff"));
    assert!(timeline.is_commentable());
    assert_eq!(timeline.readable_members(), ["reader1", "both", "writer1"]);
    assert_eq!(timeline.writable_members(), ["writer1", "both"]);
    assert!(timeline.created_at.is_some());

    // Step 3: fetch and update.
    let found = api.find_timeline(timeline_id).unwrap().timeline.unwrap();
    assert_eq!(found.id, Some(timeline_id));
    assert_eq!(found.articles_count, Some(0));

    let updated = api
        .update_timeline(timeline_id, Params::new().with("title", "renamed"))
        .unwrap()
        .timeline
        .unwrap();
    assert_eq!(updated.title.as_deref(), Some("renamed"));

    // Step 4: post an article with an image and related links.
    let jst = FixedOffset::east_opt(9 * 3600).unwrap();
    let start = jst.with_ymd_and_hms(2007, 8, 9, 12, 34, 56).unwrap();
    let image = vec![0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
    let article = api
        .create_article(
            Params::new()
                .with("timeline_id", timeline_id)
                .with("title", "最初の記事")
                .with("start_time", start)
                .with("related_link", ["http://a.example/1", "http://b.example/2?x=y"])
                .with("image", ImageSource::Bytes(image.clone()))
                .with("image_type", "image/jpeg"),
        )
        .unwrap()
        .article
        .unwrap();
    let article_id = article.id.unwrap();
    assert_eq!(article.title.as_deref(), Some("最初の記事"));
    assert_eq!(article.start_time, Some(start));
    assert_eq!(
        article.related_urls.unwrap(),
        ["http://a.example/1", "http://b.example/2?x=y"]
    );
    assert!(article.image_url.is_some());

    // Step 5: the image comes back byte for byte.
    let fetched = api.get_article_image(article_id).unwrap();
    assert_eq!(fetched.status.as_ref().and_then(|s| s.code), Some(200));
    assert_eq!(fetched.data, Some(image));
    assert_eq!(fetched.content_type.as_deref(), Some("image/jpeg"));

    // Step 6: update the article and search for it.
    let article = api
        .update_article(article_id, Params::new().with("grade", 3_i64))
        .unwrap()
        .article
        .unwrap();
    assert_eq!(article.grade.as_deref(), Some("3"));

    let page = api
        .search_article(Params::new().with("timeline_id", timeline_id))
        .unwrap();
    let summary = page.summary.unwrap();
    assert_eq!((summary.total, summary.page, summary.page_count), (Some(1), Some(1), Some(1)));
    assert_eq!(page.articles.unwrap()[0].id, Some(article_id));

    let page = api
        .search_timeline(Params::new().with("phrase", "renamed"))
        .unwrap();
    assert_eq!(page.timelines.unwrap().len(), 1);

    // Step 7: delete the article, then the timeline.
    assert_eq!(api.delete_article(article_id).unwrap().success(), Some(true));
    let missing = api.get_article_image(article_id).unwrap();
    assert_eq!(missing.success(), Some(false));
    assert!(missing.data.is_none());

    assert_eq!(api.delete_timeline(timeline_id).unwrap().success(), Some(true));
    let gone = api.find_timeline(timeline_id).unwrap();
    assert_eq!(gone.status.unwrap().code, Some(400));
    assert!(gone.timeline.is_none());
}

#[test]
fn users_and_failures() {
    let addr = start_server();
    let api = TimelineApi::new(config(addr).with_timeline_key(mock_server::MOCK_KEY));

    let me = api.show_user(None).unwrap().user.unwrap();
    assert_eq!(me.nickname.as_deref(), Some("timeline-staff"));

    let user = api.show_user(Some(mock_server::MOCK_USER_ID)).unwrap().user.unwrap();
    assert_eq!(user, me);

    let image = api.get_user_image(mock_server::MOCK_USER_ID).unwrap();
    assert_eq!(image.content_type.as_deref(), Some("image/png"));
    assert!(image.data.unwrap().starts_with(b"\x89PNG"));

    let unknown = api.show_user(Some(999)).unwrap();
    assert_eq!(unknown.success(), Some(false));
    assert!(unknown.user.is_none());

    // Article search without criteria is answered with an error envelope.
    let rejected = api.search_article(Params::new()).unwrap();
    assert_eq!(rejected.status.unwrap().code, Some(400));
    assert!(rejected.summary.is_none());
    assert!(rejected.articles.is_none());

    // Without a key, mutating operations are refused by the server.
    let anonymous = TimelineApi::new(config(addr));
    let refused = anonymous.create_timeline(Params::new().with("title", "x")).unwrap();
    assert_eq!(refused.status.unwrap().code, Some(401));
}

#[test]
fn sub_second_read_timeout_still_reaches_server() {
    let addr = start_server();
    let api = TimelineApi::new(
        config(addr).with_timeouts(Duration::from_secs(5), Duration::from_millis(500)),
    );
    assert_eq!(api.config().read_timeout(), Duration::from_millis(500));
    let categories = api.list_categories().unwrap();
    assert_eq!(categories.success(), Some(true));
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = TimelineApi::new(config(addr));
    let err = api.list_categories().unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
