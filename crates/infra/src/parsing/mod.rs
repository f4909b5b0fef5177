//! HTML parsing for crew portal pages.
//!
//! - [`master_schedule`]: the monthly grid, one row per calendar day
//! - [`print_view`]: the printable pairing detail tables

pub mod master_schedule;
pub mod print_view;

pub use master_schedule::{parse_master_schedule, parse_master_schedule_at};
pub use print_view::parse_print_view;

use scraper::ElementRef;

/// Element text with runs of whitespace collapsed to single spaces.
pub(crate) fn collapsed_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}
