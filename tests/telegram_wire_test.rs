//! Bot API wire tests against a local mock server
//! Run with: cargo test --test telegram_wire_test

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stock_notifier::application::delivery::{DeliveryEngine, DeliveryOutcome};
use stock_notifier::application::errors::TransportError;
use stock_notifier::application::messaging::MessageParser;
use stock_notifier::application::routing::TopicRouter;
use stock_notifier::domain::entities::{Content, GroupDestination, Recipient, TopicRegistry};
use stock_notifier::domain::traits::{Bot, Host, TopicChannel};
use stock_notifier::infrastructure::adapters::telegram::types::next_offset;
use stock_notifier::infrastructure::adapters::{TelegramAdapter, TopicHttpClient};

const TOKEN: &str = "123:abc";

#[derive(Default)]
struct CountingHost {
    reboots: AtomicUsize,
}

#[async_trait]
impl Host for CountingHost {
    async fn reboot(&self) {
        self.reboots.fetch_add(1, Ordering::SeqCst);
    }

    async fn exit(&self, _code: i32) {}
}

fn ok(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": result }))
}

fn group() -> GroupDestination {
    GroupDestination::parse("-100777").unwrap()
}

#[tokio::test]
async fn topic_post_sends_exact_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .and(body_json(json!({
            "chat_id": "-100777",
            "message_thread_id": 42,
            "text": "<b>In stock</b>",
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        })))
        .respond_with(ok(json!({ "message_id": 9 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = TopicHttpClient::with_base_url(TOKEN, &server.uri());
    let result = client.post_to_thread(&group(), 42, "<b>In stock</b>").await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn topic_post_rejection_carries_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = TopicHttpClient::with_base_url(TOKEN, &server.uri());
    let err = client.post_to_thread(&group(), 42, "hi").await.unwrap_err();

    assert!(matches!(err, TransportError::Api { status: 500, .. }));
}

#[tokio::test]
async fn chat_not_found_maps_to_unresolvable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found",
        })))
        .mount(&server)
        .await;

    let adapter = TelegramAdapter::with_base_url(TOKEN, &server.uri());
    let err = adapter
        .send_message(&Recipient::parse("@nobody").unwrap(), "hi")
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Unresolvable(_)));
}

#[tokio::test]
async fn refused_connection_is_transient() {
    let adapter = TelegramAdapter::with_base_url(TOKEN, "http://127.0.0.1:1");
    let err = adapter
        .send_message(&Recipient::parse("1001").unwrap(), "hi")
        .await
        .unwrap_err();

    assert!(err.is_transient());
}

#[tokio::test]
async fn start_records_bot_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/bot{}/getMe", TOKEN)))
        .respond_with(ok(json!({ "id": 77, "first_name": "Notifier", "username": "notifier_bot" })))
        .mount(&server)
        .await;

    let adapter = TelegramAdapter::with_base_url(TOKEN, &server.uri());
    adapter.start().await.unwrap();

    let info = adapter.bot_info();
    assert_eq!(info.id, "77");
    assert_eq!(info.username, "notifier_bot");
}

#[tokio::test]
async fn polled_updates_become_commands() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/getUpdates", TOKEN)))
        .respond_with(ok(json!([
            {
                "update_id": 10,
                "message": {
                    "message_id": 1,
                    "from": { "id": 1001, "username": "operator" },
                    "chat": { "id": 1001 },
                    "text": "/status@notifier_bot"
                }
            },
            { "update_id": 11 }
        ])))
        .mount(&server)
        .await;

    let adapter = TelegramAdapter::with_base_url(TOKEN, &server.uri());
    let updates = adapter.get_updates(0, 0).await.unwrap();
    assert_eq!(next_offset(&updates, 0), 12);

    let parser = MessageParser::new();
    let messages: Vec<_> = updates
        .into_iter()
        .filter_map(|u| u.into_message(&parser))
        .collect();

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].chat_id, "1001");
    match &messages[0].content {
        Content::Command { name, .. } => assert_eq!(name, "status"),
        other => panic!("expected a command, got {:?}", other),
    }
}

#[tokio::test]
async fn downloads_follow_file_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/getFile", TOKEN)))
        .and(body_json(json!({ "file_id": "doc-1" })))
        .respond_with(ok(json!({ "file_id": "doc-1", "file_path": "documents/file_3.yaml" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/file/bot{}/documents/file_3.yaml", TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"telegram: {}\n".to_vec()))
        .mount(&server)
        .await;

    let adapter = TelegramAdapter::with_base_url(TOKEN, &server.uri());
    let bytes = adapter.download_file("doc-1").await.unwrap();

    assert_eq!(bytes, b"telegram: {}\n");
}

fn router_against(server: &MockServer, host: Arc<CountingHost>) -> TopicRouter {
    let bot = Arc::new(TelegramAdapter::with_base_url(TOKEN, &server.uri()));
    let engine = Arc::new(DeliveryEngine::new(bot, host));
    let channel = Arc::new(TopicHttpClient::with_base_url(TOKEN, &server.uri()));
    let registry = TopicRegistry::from_raw([("stock", "42")]);

    TopicRouter::new(channel, engine, Arc::new(registry))
        .with_group(Some(group()))
        .with_recipient(Recipient::parse("1001"))
}

#[tokio::test]
async fn router_posts_to_thread_without_direct_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "message_thread_id": 42 })))
        .respond_with(ok(json!({ "message_id": 1 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "chat_id": "1001" })))
        .respond_with(ok(json!({ "message_id": 2 })))
        .expect(0)
        .mount(&server)
        .await;

    let router = router_against(&server, Arc::new(CountingHost::default()));

    assert!(router.route("stock", "Stock available").await);
}

#[tokio::test]
async fn router_falls_back_to_direct_message_on_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "message_thread_id": 42 })))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "chat_id": "1001", "text": "Stock available" })))
        .respond_with(ok(json!({ "message_id": 2 })))
        .expect(1)
        .mount(&server)
        .await;

    let host = Arc::new(CountingHost::default());
    let router = router_against(&server, host.clone());

    assert!(!router.route("stock", "Stock available").await);
    assert_eq!(host.reboots.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn engine_abandons_unresolvable_recipient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "description": "Bad Request: chat not found",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let host = Arc::new(CountingHost::default());
    let bot = Arc::new(TelegramAdapter::with_base_url(TOKEN, &server.uri()));
    let engine = DeliveryEngine::new(bot, host.clone());

    let outcome = engine
        .send_text(Recipient::parse("@ghost").as_ref(), "hello")
        .await;

    assert_eq!(outcome, DeliveryOutcome::Abandoned);
    assert_eq!(host.reboots.load(Ordering::SeqCst), 0);
}
