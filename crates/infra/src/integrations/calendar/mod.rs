//! Google Calendar integration
//!
//! OAuth login and token storage, plus the [`TripCalendar`] adapter that
//! pushes trip events.
//!
//! [`TripCalendar`]: crewcal_core::TripCalendar

pub mod google;
pub mod oauth;
pub mod token_store;
mod types;

pub use google::{GoogleCalendarClient, GOOGLE_CALENDAR_API_BASE};
pub use oauth::{
    AccessTokenProvider, GoogleOAuth, GoogleOAuthSettings, OAuthCallbackServer, PkceChallenge,
    StaticAccessToken,
};
pub use token_store::{
    token_store_for, FileTokenStore, KeyringTokenStore, TokenSet, TokenStore,
};
