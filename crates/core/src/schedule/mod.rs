//! Schedule grouping: per-day records in, calendar-ready trips out.

pub mod description;
pub mod grouping;
pub mod ports;
