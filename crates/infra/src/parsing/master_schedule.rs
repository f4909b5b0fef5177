//! Master schedule page parser.
//!
//! The page has a `div.sg-header-text` ("July 2025") and one
//! `div.sg-data-row` per day. A row with a non-blank `div.sg-pairing` is a
//! trip day; everything else is a day off. Row details live in
//! `div.sg-description-row` label/data pairs.

use chrono::{Datelike, Days, Local, NaiveDate, NaiveDateTime, NaiveTime};
use crewcal_core::ParsedSchedule;
use crewcal_domain::{CrewCalError, DayRecord, Result};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::collapsed_text;

static HEADER: Lazy<Selector> = Lazy::new(|| selector("div.sg-header-text"));
static DATA_ROW: Lazy<Selector> = Lazy::new(|| selector("div.sg-data-row"));
static PAIRING: Lazy<Selector> = Lazy::new(|| selector("div.sg-pairing"));
static DATE_CELL: Lazy<Selector> = Lazy::new(|| selector(r#"[title^="Date:"]"#));
static DESCRIPTION_ROW: Lazy<Selector> = Lazy::new(|| selector("div.sg-description-row"));
static DESCRIPTION_LABEL: Lazy<Selector> = Lazy::new(|| selector(".sg-description-label"));
static DESCRIPTION_DATA: Lazy<Selector> = Lazy::new(|| selector(".sg-description-data"));

const START_LABELS: [&str; 2] = ["check-in", "report"];
const END_LABELS: [&str; 2] = ["release", "debrief"];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("schedule selector should compile - this is a bug")
}

/// Parse a master schedule page, using today's month when the header is
/// missing.
pub fn parse_master_schedule(html: &str) -> Result<ParsedSchedule> {
    parse_master_schedule_at(html, Local::now().date_naive())
}

/// Parse a master schedule page with an explicit fallback month.
///
/// Rows whose date cannot be resolved are skipped with a warning. Fails
/// only when the page has neither a header nor any schedule rows.
pub fn parse_master_schedule_at(html: &str, fallback: NaiveDate) -> Result<ParsedSchedule> {
    let document = Html::parse_document(html);

    let header = document.select(&HEADER).next().map(collapsed_text);
    let rows: Vec<ElementRef<'_>> = document.select(&DATA_ROW).collect();
    if header.is_none() && rows.is_empty() {
        return Err(CrewCalError::Parse("page does not contain a master schedule".into()));
    }

    let (month, year) = match header.as_deref().and_then(parse_month_year) {
        Some(found) => found,
        None => {
            warn!(header = ?header, "schedule header missing or unreadable, using current month");
            (fallback.month(), fallback.year())
        }
    };

    let mut days = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        match parse_row(row, month, year) {
            Some(day) => days.push(day),
            None => warn!(row = index, "skipping schedule row without a resolvable date"),
        }
    }

    debug!(month, year, days = days.len(), "parsed master schedule");
    Ok(ParsedSchedule { month, year, days })
}

fn parse_row(row: ElementRef<'_>, month: u32, year: i32) -> Option<DayRecord> {
    let date = row_date(row, month, year)?;

    let pairing = row
        .select(&PAIRING)
        .next()
        .map(collapsed_text)
        .filter(|code| !code.is_empty());

    let Some(code) = pairing else {
        return Some(DayRecord::day_off(date));
    };

    let details = description_lines(row);
    let start_time = find_time(&details, &START_LABELS).unwrap_or(NaiveTime::MIN);
    let end_time = find_time(&details, &END_LABELS).unwrap_or_else(end_of_day);

    let Some((start, end)) = duty_span(date, start_time, end_time) else {
        warn!(%date, pairing = %code, "overnight duty ends past the calendar range");
        return None;
    };

    let description =
        details.iter().map(|(label, value)| format!("{label} {value}")).collect::<Vec<_>>();

    Some(DayRecord::trip_day(code, start, end, description.join("\n")))
}

/// Start and end of a duty day; an end earlier than the start rolls over
/// to the next day.
fn duty_span(
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let end_date = if end_time < start_time { date.checked_add_days(Days::new(1))? } else { date };
    Some((date.and_time(start_time), end_date.and_time(end_time)))
}

fn row_date(row: ElementRef<'_>, month: u32, year: i32) -> Option<NaiveDate> {
    let cell = row.select(&DATE_CELL).next()?;

    let titled = cell
        .value()
        .attr("title")
        .and_then(|title| title.trim().strip_prefix("Date:"))
        .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%m/%d/%Y").ok());
    if titled.is_some() {
        return titled;
    }

    let day: u32 = collapsed_text(cell).parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn description_lines(row: ElementRef<'_>) -> Vec<(String, String)> {
    row.select(&DESCRIPTION_ROW)
        .filter_map(|line| {
            let label = line.select(&DESCRIPTION_LABEL).next().map(collapsed_text)?;
            let value =
                line.select(&DESCRIPTION_DATA).next().map(collapsed_text).unwrap_or_default();
            Some((label, value))
        })
        .collect()
}

fn find_time(details: &[(String, String)], labels: &[&str]) -> Option<NaiveTime> {
    details.iter().find_map(|(label, value)| {
        let label = label.trim_end_matches(':').trim().to_ascii_lowercase();
        if labels.contains(&label.as_str()) {
            parse_clock(value)
        } else {
            None
        }
    })
}

/// `HH:MM`, `H:MM` or `HHMM`, possibly followed by other text.
fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let token = raw.split_whitespace().next()?;
    let digits: String = token.chars().filter(char::is_ascii_digit).collect();
    if !(3..=4).contains(&digits.len()) {
        return None;
    }
    let (hours, minutes) = digits.split_at(digits.len() - 2);
    NaiveTime::from_hms_opt(hours.parse().ok()?, minutes.parse().ok()?, 0)
}

fn parse_month_year(header: &str) -> Option<(u32, i32)> {
    let mut parts = header.split_whitespace();
    let month_name = parts.next()?;
    let year: i32 = parts.next()?.parse().ok()?;
    let date = NaiveDate::parse_from_str(&format!("1 {month_name} {year}"), "%d %B %Y")
        .or_else(|_| NaiveDate::parse_from_str(&format!("1 {month_name} {year}"), "%d %b %Y"))
        .ok()?;
    Some((date.month(), year))
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_year_header_forms() {
        assert_eq!(parse_month_year("July 2025"), Some((7, 2025)));
        assert_eq!(parse_month_year("Dec 2024"), Some((12, 2024)));
        assert_eq!(parse_month_year("Schedule"), None);
    }

    #[test]
    fn clock_forms() {
        assert_eq!(parse_clock("06:15"), NaiveTime::from_hms_opt(6, 15, 0));
        assert_eq!(parse_clock("0615 L"), NaiveTime::from_hms_opt(6, 15, 0));
        assert_eq!(parse_clock("7:05"), NaiveTime::from_hms_opt(7, 5, 0));
        assert_eq!(parse_clock("25:00"), None);
        assert_eq!(parse_clock("--"), None);
    }

    #[test]
    fn overnight_duty_rolls_one_day() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 3).unwrap();
        let report = NaiveTime::from_hms_opt(19, 30, 0).unwrap();
        let debrief = NaiveTime::from_hms_opt(1, 10, 0).unwrap();

        let (start, end) = duty_span(date, report, debrief).unwrap();
        assert_eq!(start, date.and_time(report));
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 7, 4).unwrap().and_time(debrief));

        assert!(duty_span(NaiveDate::MAX, report, debrief).is_none());
        assert!(duty_span(NaiveDate::MAX, debrief, report).is_some());
    }

    #[test]
    fn missing_header_uses_fallback_month() {
        let html = r#"<div class="sg-data-row"><div title="Date: 3/4/2024">4</div></div>"#;
        let fallback = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let parsed = parse_master_schedule_at(html, fallback).unwrap();
        assert_eq!((parsed.month, parsed.year), (10, 2026));
        assert_eq!(parsed.days[0].date(), NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
    }

    #[test]
    fn non_schedule_page_is_an_error() {
        let fallback = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let err = parse_master_schedule_at("<html><body>Sign in</body></html>", fallback);
        assert!(matches!(err, Err(CrewCalError::Parse(_))));
    }
}
