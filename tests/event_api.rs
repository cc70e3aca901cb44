use chrono::NaiveDate;
use eventra_lib::models::{EndDate, EventDraft, EventId, EventPatch, Role};
use eventra_lib::{ApiError, EventApi, EventBackend};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn event_json(id: &str, location: &str) -> serde_json::Value {
    json!({
        "id": id,
        "role": "user",
        "event_name": "Sunday 10K",
        "desc": "Community run",
        "location": location,
        "landmark_name": "Besant Nagar",
        "user_name": "Priya",
        "email": "priya@example.com",
        "start_date": "2025-11-02",
        "end_date": "0000-00-00",
        "is_deleted": false
    })
}

fn draft() -> EventDraft {
    EventDraft {
        role: None,
        event_name: "Sunday 10K".to_string(),
        desc: "Community run".to_string(),
        location: "12.99,80.22".to_string(),
        landmark_name: None,
        user_name: "Priya".to_string(),
        email: "priya@example.com".to_string(),
        start_date: NaiveDate::from_ymd_opt(2025, 11, 2).expect("date"),
        end_date: None,
    }
}

#[tokio::test]
async fn lists_events() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/getevents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            event_json("1", "12.99,80.22"),
            event_json("2", "Chepauk Stadium")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let api = EventApi::new(server.uri());
    let events = api.list_events().await.expect("events");
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].id, EventId::new("1"));
    assert_eq!(events[1].location, "Chepauk Stadium");
    assert_eq!(events[0].end_date, EndDate::Open);
}

#[tokio::test]
async fn empty_listing_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/getevents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let events = EventApi::new(server.uri())
        .list_events()
        .await
        .expect("events");
    assert!(events.is_empty());
}

#[tokio::test]
async fn listing_error_uses_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/getevents"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({ "message": "maintenance window" })),
        )
        .mount(&server)
        .await;

    let err = EventApi::new(server.uri())
        .list_events()
        .await
        .expect_err("should fail");
    assert_eq!(err, ApiError::Fetch("maintenance window".to_string()));
}

#[tokio::test]
async fn listing_error_without_message_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/getevents"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = EventApi::new(server.uri())
        .list_events()
        .await
        .expect_err("should fail");
    assert_eq!(err.message(), "Failed to fetch events");
}

#[tokio::test]
async fn malformed_listing_is_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/getevents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "events": [] })))
        .mount(&server)
        .await;

    let err = EventApi::new(server.uri())
        .list_events()
        .await
        .expect_err("should fail");
    assert_eq!(err, ApiError::Fetch("Failed to fetch events".to_string()));
}

#[tokio::test]
async fn unreachable_backend_is_a_fetch_error() {
    let err = EventApi::new("http://127.0.0.1:9")
        .list_events()
        .await
        .expect_err("should fail");
    assert_eq!(err, ApiError::Fetch("Failed to fetch events".to_string()));
}

#[tokio::test]
async fn create_sends_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/events"))
        .and(body_json(json!({
            "role": "user",
            "event_name": "Sunday 10K",
            "desc": "Community run",
            "location": "12.99,80.22",
            "landmark_name": "",
            "user_name": "Priya",
            "email": "priya@example.com",
            "start_date": "2025-11-02",
            "end_date": "0000-00-00",
            "is_deleted": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(event_json("77", "12.99,80.22")))
        .expect(1)
        .mount(&server)
        .await;

    let created = EventApi::new(server.uri())
        .create_event(&draft())
        .await
        .expect("created");
    assert_eq!(created.id, EventId::new("77"));
    assert_eq!(created.role, Role::User);
}

#[tokio::test]
async fn create_error_carries_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/events"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "duplicate name" })),
        )
        .mount(&server)
        .await;

    let err = EventApi::new(server.uri())
        .create_event(&draft())
        .await
        .expect_err("should fail");
    assert_eq!(err, ApiError::Create("duplicate name".to_string()));
}

#[tokio::test]
async fn update_and_delete_hit_event_paths() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/events/5"))
        .and(body_json(json!({ "desc": "Moved indoors" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(event_json("5", "1,2")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/events/5"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/events/6"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "not found" })))
        .mount(&server)
        .await;

    let api = EventApi::new(server.uri());
    let patch = EventPatch {
        desc: Some("Moved indoors".to_string()),
        ..EventPatch::default()
    };
    let updated = api
        .update_event(&EventId::new("5"), &patch)
        .await
        .expect("updated");
    assert_eq!(updated.id, EventId::new("5"));

    let ack = api.delete_event(&EventId::new("5")).await.expect("deleted");
    assert_eq!(ack.message, None);

    let err = api
        .delete_event(&EventId::new("6"))
        .await
        .expect_err("should fail");
    assert_eq!(err, ApiError::Delete("not found".to_string()));
}
