//! Saved schedule page through parsing, grouping and the Google adapter.

mod support;

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use crewcal_core::{group_days, ScheduleSyncService, SyncOptions};
use crewcal_domain::DayKind;
use crewcal_infra::integrations::calendar::StaticAccessToken;
use crewcal_infra::parsing::parse_master_schedule_at;
use crewcal_infra::{parse_master_schedule, FileScheduleSource, GoogleCalendarClient, HttpClient};
use support::{fixture, fixture_path, mount_google_calendar};
use wiremock::MockServer;

fn july(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
}

#[test]
fn fixture_rows_become_day_records() {
    let parsed = parse_master_schedule_at(&fixture("master_schedule.html"), july(1)).unwrap();

    assert_eq!((parsed.month, parsed.year), (7, 2025));
    // The row without a date title is skipped.
    assert_eq!(parsed.days.len(), 9);

    assert_eq!(parsed.days[0].kind, DayKind::DayOff);
    assert_eq!(parsed.days[0].date(), july(1));

    let first = &parsed.days[1];
    assert_eq!(first.pairing_code.as_deref(), Some("W1234"));
    assert_eq!(first.start.time(), NaiveTime::from_hms_opt(6, 15, 0).unwrap());
    assert_eq!(first.end.time(), NaiveTime::from_hms_opt(18, 40, 0).unwrap());
    assert!(first.description.contains("BLOCK: 12:34"));

    let overnight = &parsed.days[2];
    assert_eq!(overnight.end, july(4).and_hms_opt(1, 10, 0).unwrap());
    assert!(overnight.description.contains("Layover: DEN Westin"));

    let untimed = &parsed.days[3];
    assert_eq!(untimed.start.time(), NaiveTime::from_hms_opt(10, 0, 0).unwrap());
    assert_eq!(untimed.end.time(), NaiveTime::from_hms_opt(23, 59, 0).unwrap());

    let fallback = parsed.days.last().unwrap();
    assert_eq!(fallback.kind, DayKind::DayOff);
    assert_eq!(fallback.date(), july(13));
}

#[test]
fn fixture_groups_into_trips() {
    let parsed = parse_master_schedule(&fixture("master_schedule.html")).unwrap();
    let trips = group_days(&parsed.days);

    let spans: Vec<_> = trips
        .iter()
        .map(|trip| (trip.pairing_code.as_str(), trip.start_date, trip.end_date, trip.day_count))
        .collect();
    assert_eq!(
        spans,
        vec![
            ("W1234", july(2), july(5), 3),
            ("W5678", july(6), july(7), 1),
            ("W9999", july(7), july(9), 2),
            ("W9999", july(12), july(13), 1),
        ]
    );

    let first = &trips[0];
    assert!(first.description.starts_with(
        "Pairing: W1234\nCheck-in: 06:15\nBlock out: 07:15\n\
         BLOCK: 12:34\nCREDIT: 15:00\nVALUE: $1,234.56\n\nDay 1 - Wed, Jul 02\n"
    ));
    assert!(first.description.contains("\n\nDay 2 - Thu, Jul 03\nReport: 19:30"));
    assert!(first.description.contains("\n\nDay 3 - Fri, Jul 04\nCheck-In: 10:00"));
    assert_eq!(first.pay.credit.as_deref(), Some("15:00"));
}

#[tokio::test]
async fn sync_replaces_pushed_events_in_google_calendar() {
    let server = MockServer::start().await;
    mount_google_calendar(&server, "cal-1", "Crew Schedule").await;

    let http = HttpClient::builder().max_attempts(1).build().unwrap();
    let calendar = GoogleCalendarClient::new(http, Arc::new(StaticAccessToken("token".into())))
        .with_base_url(server.uri());
    let source = FileScheduleSource::new(fixture_path("master_schedule.html"));

    let service = ScheduleSyncService::new(
        Arc::new(source),
        Arc::new(calendar),
        parse_master_schedule,
        "Crew Schedule",
        "America/Chicago",
    )
    .with_today(july(1));

    let report = service.sync(&SyncOptions::default()).await.unwrap();

    assert_eq!(report.calendar_id.as_deref(), Some("cal-1"));
    assert_eq!(report.trips_found, 4);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.inserted, 4);
    assert_eq!(report.failures, 0);

    let requests = server.received_requests().await.unwrap();
    let methods: Vec<&str> = requests.iter().map(|r| r.method.as_str()).collect();
    let first_post = methods.iter().position(|m| *m == "POST").unwrap();
    let last_delete = methods.iter().rposition(|m| *m == "DELETE").unwrap();
    assert!(last_delete < first_post);
}
