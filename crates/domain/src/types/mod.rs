//! Domain types and models

pub mod auth;
pub mod calendar;
pub mod pairing;
pub mod schedule;

pub use auth::{AuthSession, Credentials, SignUpRequest};
pub use calendar::{CalendarEntry, DateWindow};
pub use pairing::{CrewAssignment, FlightLeg, PairingDetail, PairingRecord};
pub use schedule::{DayKind, DayRecord, PayFigures, TripEvent};
