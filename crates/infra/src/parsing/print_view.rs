//! Print view parser.
//!
//! Each pairing is a `table.pairing-details` whose `td.pairing-header`
//! reads `Pairing <code> - MM/DD/YYYY`, followed by `tr.flight-row` and
//! `tr.crew-row` rows.

use chrono::NaiveDate;
use crewcal_domain::{CrewAssignment, FlightLeg, PairingDetail};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::collapsed_text;

static TABLE: Lazy<Selector> = Lazy::new(|| selector("table.pairing-details"));
static HEADER: Lazy<Selector> = Lazy::new(|| selector("td.pairing-header"));
static FLIGHT_ROW: Lazy<Selector> = Lazy::new(|| selector("tr.flight-row"));
static CREW_ROW: Lazy<Selector> = Lazy::new(|| selector("tr.crew-row"));
static CELL: Lazy<Selector> = Lazy::new(|| selector("td"));

static HEADER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Pairing\s+(\w+)\s*-\s*(\d{1,2}/\d{1,2}/\d{4})")
        .expect("HEADER_REGEX should compile - this is a bug")
});

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("print view selector should compile - this is a bug")
}

/// Parse every pairing table on the page.
///
/// Tables without a recognisable header are skipped; short rows are
/// ignored.
pub fn parse_print_view(html: &str) -> Vec<PairingDetail> {
    let document = Html::parse_document(html);

    let pairings: Vec<PairingDetail> = document
        .select(&TABLE)
        .enumerate()
        .filter_map(|(index, table)| {
            let parsed = parse_table(table);
            if parsed.is_none() {
                warn!(table = index, "skipping pairing table without a readable header");
            }
            parsed
        })
        .collect();

    debug!(pairings = pairings.len(), "parsed print view");
    pairings
}

fn parse_table(table: ElementRef<'_>) -> Option<PairingDetail> {
    let header = table.select(&HEADER).next().map(collapsed_text)?;
    let caps = HEADER_REGEX.captures(&header)?;
    let pairing_code = caps.get(1)?.as_str().to_string();
    let start_date = NaiveDate::parse_from_str(caps.get(2)?.as_str(), "%m/%d/%Y").ok()?;

    let flights = table
        .select(&FLIGHT_ROW)
        .filter_map(|row| {
            let [flight_number, departure_airport, arrival_airport] = leading_cells(row)?;
            Some(FlightLeg { flight_number, departure_airport, arrival_airport })
        })
        .collect();

    let crew = table
        .select(&CREW_ROW)
        .filter_map(|row| {
            let [name, position, employee_id] = leading_cells(row)?;
            Some(CrewAssignment { name, position, employee_id })
        })
        .collect();

    Some(PairingDetail { pairing_code, start_date, flights, crew })
}

fn leading_cells(row: ElementRef<'_>) -> Option<[String; 3]> {
    let mut cells = row.select(&CELL).map(collapsed_text);
    Some([cells.next()?, cells.next()?, cells.next()?])
}
