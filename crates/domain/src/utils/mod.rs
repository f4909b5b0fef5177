//! Pure helpers shared by the other crates.

pub mod duration;
