//! Schedule-to-calendar sync use case.

pub mod service;
