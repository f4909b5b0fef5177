//! Schedule sources
//!
//! The portal is never scraped from here; schedule pages arrive as saved
//! files.

pub mod file;

pub use file::FileScheduleSource;
