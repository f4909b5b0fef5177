//! Shared helpers for infra integration tests.
#![allow(dead_code)]

use std::path::PathBuf;

use serde_json::json;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path of a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).expect("fixture should be readable")
}

/// Mount a Google Calendar API that already has `calendar_id` named
/// `calendar_name`, one previously pushed event, and accepts deletes and
/// inserts.
pub async fn mount_google_calendar(server: &MockServer, calendar_id: &str, calendar_name: &str) {
    Mock::given(method("GET"))
        .and(path("/users/me/calendarList"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": calendar_id, "summary": calendar_name}]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/calendars/{calendar_id}/events")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "old-1",
                "summary": "Trip: W0001",
                "start": {"date": "2025-06-20"},
                "extendedProperties": {"private": {"createdBy": "crewcal"}}
            }]
        })))
        .mount(server)
        .await;

    Mock::given(method("DELETE"))
        .and(path_regex(format!(r"^/calendars/{calendar_id}/events/[^/]+$")))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/calendars/{calendar_id}/events")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "new-event"})))
        .mount(server)
        .await;
}
