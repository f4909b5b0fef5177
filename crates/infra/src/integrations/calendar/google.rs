//! Google Calendar v3 adapter for [`TripCalendar`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono_tz::Tz;
use crewcal_core::TripCalendar;
use crewcal_domain::constants::{APP_EVENT_MARKER, APP_EVENT_MARKER_KEY};
use crewcal_domain::{CalendarEntry, CrewCalError, DateWindow, Result, TripEvent};
use reqwest::{Method, StatusCode};
use tracing::{debug, info, instrument, warn};
use urlencoding::encode;

use super::oauth::AccessTokenProvider;
use super::types::{CalendarListResponse, CreatedResource, EventInsert, EventsResponse, NewCalendar};
use crate::errors::status_error;
use crate::http::HttpClient;

pub const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Events listed per page.
const PAGE_SIZE: &str = "250";

/// Google Calendar client authenticated through an [`AccessTokenProvider`].
pub struct GoogleCalendarClient {
    http: HttpClient,
    tokens: Arc<dyn AccessTokenProvider>,
    base_url: String,
}

impl GoogleCalendarClient {
    pub fn new(http: HttpClient, tokens: Arc<dyn AccessTokenProvider>) -> Self {
        Self { http, tokens, base_url: GOOGLE_CALENDAR_API_BASE.to_string() }
    }

    /// Point the client at another API root (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn authorized(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder> {
        let token = self.tokens.access_token().await?;
        Ok(self.http.request(method, self.url(path)).bearer_auth(token))
    }

    async fn find_calendar(&self, name: &str) -> Result<Option<String>> {
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.authorized(Method::GET, "users/me/calendarList").await?;
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: CalendarListResponse = self.http.send_json(request).await?;
            if let Some(found) =
                page.items.into_iter().find(|item| item.summary.as_deref() == Some(name))
            {
                return Ok(Some(found.id));
            }

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => return Ok(None),
            }
        }
    }
}

fn validate_timezone(timezone: &str) -> Result<()> {
    timezone
        .parse::<Tz>()
        .map(|_| ())
        .map_err(|_| CrewCalError::Config(format!("unknown timezone: {timezone}")))
}

#[async_trait]
impl TripCalendar for GoogleCalendarClient {
    #[instrument(skip(self))]
    async fn ensure_calendar(&self, name: &str, timezone: &str) -> Result<String> {
        validate_timezone(timezone)?;

        if let Some(id) = self.find_calendar(name).await? {
            debug!(calendar_id = %id, "using existing calendar");
            return Ok(id);
        }

        let request = self
            .authorized(Method::POST, "calendars")
            .await?
            .json(&NewCalendar { summary: name, time_zone: timezone });
        let created: CreatedResource = self.http.send_json(request).await?;
        info!(calendar_id = %created.id, "created calendar");
        Ok(created.id)
    }

    #[instrument(skip(self))]
    async fn list_app_events(
        &self,
        calendar_id: &str,
        window: DateWindow,
    ) -> Result<Vec<CalendarEntry>> {
        let path = format!("calendars/{}/events", encode(calendar_id));
        let marker = format!("{APP_EVENT_MARKER_KEY}={APP_EVENT_MARKER}");
        let time_min = format!("{}T00:00:00Z", window.start);
        let time_max = format!("{}T00:00:00Z", window.end);

        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("privateExtendedProperty", marker.as_str()),
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("singleEvents", "true"),
                ("maxResults", PAGE_SIZE),
            ];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.as_str()));
            }

            let request = self.authorized(Method::GET, &path).await?.query(&query);
            let page: EventsResponse = self.http.send_json(request).await?;
            entries.extend(page.items.into_iter().map(CalendarEntry::from));

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        debug!(count = entries.len(), "listed app events");
        Ok(entries)
    }

    #[instrument(skip(self))]
    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<()> {
        let path = format!("calendars/{}/events/{}", encode(calendar_id), encode(event_id));
        let request = self.authorized(Method::DELETE, &path).await?;
        let response = self.http.send(request).await?;
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }
        // Already gone.
        if status == StatusCode::GONE || status == StatusCode::NOT_FOUND {
            warn!(%event_id, %status, "event already deleted");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body))
    }

    #[instrument(skip(self, trip), fields(pairing = %trip.pairing_code, start = %trip.start_date))]
    async fn insert_trip(
        &self,
        calendar_id: &str,
        trip: &TripEvent,
        timezone: &str,
    ) -> Result<String> {
        let path = format!("calendars/{}/events", encode(calendar_id));
        let request = self
            .authorized(Method::POST, &path)
            .await?
            .json(&EventInsert::all_day(trip, timezone));
        let created: CreatedResource = self.http.send_json(request).await?;
        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use crewcal_domain::PayFigures;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::integrations::calendar::oauth::StaticAccessToken;

    fn client(server: &MockServer) -> GoogleCalendarClient {
        let http = HttpClient::builder().max_attempts(1).build().unwrap();
        GoogleCalendarClient::new(http, Arc::new(StaticAccessToken("token-1".into())))
            .with_base_url(server.uri())
    }

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, day).unwrap()
    }

    fn trip() -> TripEvent {
        TripEvent {
            summary: "Trip: A1".into(),
            pairing_code: "A1".into(),
            start_date: date(7, 3),
            end_date: date(7, 6),
            description: "Pairing: A1".into(),
            pay: PayFigures::default(),
            day_count: 3,
        }
    }

    #[tokio::test]
    async fn ensure_calendar_reuses_existing_by_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me/calendarList"))
            .and(header("authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"id": "primary", "summary": "crew@example.com"},
                    {"id": "cal-7", "summary": "Crew Schedule"}
                ]
            })))
            .mount(&server)
            .await;

        let id = client(&server).ensure_calendar("Crew Schedule", "America/Chicago").await.unwrap();
        assert_eq!(id, "cal-7");
    }

    #[tokio::test]
    async fn ensure_calendar_pages_then_creates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me/calendarList"))
            .and(query_param("pageToken", "p2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/me/calendarList"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "primary", "summary": "Personal"}],
                "nextPageToken": "p2"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/calendars"))
            .and(body_partial_json(json!({"summary": "Crew Schedule", "timeZone": "UTC"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "new-cal"})))
            .expect(1)
            .mount(&server)
            .await;

        let id = client(&server).ensure_calendar("Crew Schedule", "UTC").await.unwrap();
        assert_eq!(id, "new-cal");
    }

    #[tokio::test]
    async fn unknown_timezone_is_rejected_before_any_request() {
        let server = MockServer::start().await;
        let err =
            client(&server).ensure_calendar("Crew Schedule", "Mars/Olympus").await.unwrap_err();
        assert!(matches!(err, CrewCalError::Config(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_app_events_filters_by_marker_and_window() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/cal-1/events"))
            .and(query_param("privateExtendedProperty", "createdBy=crewcal"))
            .and(query_param("timeMin", "2025-05-01T00:00:00Z"))
            .and(query_param("timeMax", "2026-07-01T00:00:00Z"))
            .and(query_param("singleEvents", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "id": "evt-1",
                    "summary": "Trip: A1",
                    "start": {"date": "2025-07-03"},
                    "extendedProperties": {"private": {"createdBy": "crewcal"}}
                }]
            })))
            .mount(&server)
            .await;

        let window = DateWindow::new(date(5, 1), NaiveDate::from_ymd_opt(2026, 7, 1).unwrap());
        let entries = client(&server).list_app_events("cal-1", window).await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].start_date, Some(date(7, 3)));
        assert!(entries[0].is_app_event());
    }

    #[tokio::test]
    async fn delete_tolerates_missing_event() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/calendars/cal-1/events/gone"))
            .respond_with(ResponseTemplate::new(410))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/calendars/cal-1/events/locked"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = client(&server);
        client.delete_event("cal-1", "gone").await.unwrap();
        let err = client.delete_event("cal-1", "locked").await.unwrap_err();
        assert!(matches!(err, CrewCalError::Auth(_)));
    }

    #[tokio::test]
    async fn insert_trip_posts_all_day_event() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/calendars/cal-1/events"))
            .and(body_partial_json(json!({
                "summary": "Trip: A1",
                "start": {"date": "2025-07-03"},
                "end": {"date": "2025-07-06"},
                "reminders": {"useDefault": false},
                "extendedProperties": {"private": {"createdBy": "crewcal"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "evt-9"})))
            .expect(1)
            .mount(&server)
            .await;

        let id = client(&server).insert_trip("cal-1", &trip(), "America/Chicago").await.unwrap();
        assert_eq!(id, "evt-9");
    }
}
