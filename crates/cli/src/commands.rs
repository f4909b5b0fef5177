//! Command implementations.
//!
//! Each command builds the adapters it needs from [`Config`] and prints its
//! result as JSON on stdout.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use crewcal_core::{
    group_days_with, AuthProvider, GroupingPolicy, PairingRepository, ScheduleSource,
    ScheduleSyncService, SyncOptions,
};
use crewcal_domain::{Config, CrewCalError, Credentials, SignUpRequest, TripEvent};
use crewcal_infra::{
    parse_master_schedule, parse_print_view, token_store_for, FileScheduleSource,
    GoogleCalendarClient, GoogleOAuth, GoogleOAuthSettings, HttpClient, SupabaseAuth,
    SupabaseClient, SupabasePairingRepository,
};
use serde::Serialize;
use tracing::info;

#[derive(Serialize)]
struct IndexedTrip<'a> {
    index: usize,
    #[serde(flatten)]
    trip: &'a TripEvent,
}

#[derive(Serialize)]
struct AuthStatus {
    connected: bool,
    email: Option<String>,
    expires_in_seconds: Option<i64>,
    has_refresh_token: bool,
}

/// Source for commands that push stored pairings and never read a page.
struct NoSchedulePage;

#[async_trait]
impl ScheduleSource for NoSchedulePage {
    async fn fetch_schedule_html(&self) -> crewcal_domain::Result<String> {
        Err(CrewCalError::InvalidInput("this command does not read a schedule page".into()))
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Merge CLI flags with the configured sync defaults.
pub fn sync_options(
    config: &Config,
    user_id: Option<String>,
    preserve_past: bool,
    selected_indices: Option<Vec<usize>>,
    dry_run: bool,
) -> SyncOptions {
    SyncOptions {
        user_id,
        preserve_past: preserve_past || config.sync.preserve_past,
        selected_indices,
        dry_run,
    }
}

fn google_oauth(config: &Config) -> Result<GoogleOAuth> {
    let settings = GoogleOAuthSettings::from_config(&config.google)?;
    let store = token_store_for(config.google.token_path.as_deref());
    Ok(GoogleOAuth::new(settings, store, config.google.account.clone())?)
}

fn supabase(config: &Config) -> Result<SupabaseClient> {
    let settings = config
        .supabase
        .as_ref()
        .context("Supabase is not configured (SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY)")?;
    Ok(SupabaseClient::new(settings)?)
}

fn sync_service(
    config: &Config,
    source: Arc<dyn ScheduleSource>,
    repository: Option<Arc<dyn PairingRepository>>,
) -> Result<ScheduleSyncService> {
    let oauth = Arc::new(google_oauth(config)?);
    let calendar = GoogleCalendarClient::new(HttpClient::new()?, oauth);

    let mut service = ScheduleSyncService::new(
        source,
        Arc::new(calendar),
        parse_master_schedule,
        config.google.calendar_name.clone(),
        config.google.timezone.clone(),
    )
    .with_policy(GroupingPolicy::from_padded_flag(config.sync.padded_span));

    if let Some(repository) = repository {
        service = service.with_repository(repository);
    }
    Ok(service)
}

pub async fn cmd_parse(config: &Config, file: &Path, print_view: bool) -> Result<()> {
    let html = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    if print_view {
        return print_json(&parse_print_view(&html));
    }

    let parsed = parse_master_schedule(&html)?;
    let trips =
        group_days_with(&parsed.days, &GroupingPolicy::from_padded_flag(config.sync.padded_span));
    info!(month = parsed.month, year = parsed.year, trips = trips.len(), "parsed schedule");

    let indexed: Vec<_> =
        trips.iter().enumerate().map(|(index, trip)| IndexedTrip { index, trip }).collect();
    print_json(&indexed)
}

pub async fn cmd_sync(config: &Config, file: &Path, options: &SyncOptions) -> Result<()> {
    let source =
        FileScheduleSource::new(file).with_archive_dir(config.portal.archive_dir.as_deref());

    let repository = match &options.user_id {
        Some(_) => {
            let repository: Arc<dyn PairingRepository> =
                Arc::new(SupabasePairingRepository::new(supabase(config)?));
            Some(repository)
        }
        None => None,
    };

    let service = sync_service(config, Arc::new(source), repository)?;
    let report = service.sync(options).await?;
    print_json(&report)
}

pub async fn cmd_push_stored(config: &Config, user_id: &str, options: &SyncOptions) -> Result<()> {
    let repository: Arc<dyn PairingRepository> =
        Arc::new(SupabasePairingRepository::new(supabase(config)?));
    let service = sync_service(config, Arc::new(NoSchedulePage), Some(repository))?;
    let report = service.push_stored(user_id, options).await?;
    print_json(&report)
}

pub async fn cmd_auth_login(config: &Config, timeout_secs: u64) -> Result<()> {
    let oauth = google_oauth(config)?;
    let tokens = oauth
        .login(Duration::from_secs(timeout_secs), |url| {
            eprintln!("Open this URL in your browser to connect Google Calendar:\n\n  {url}\n");
        })
        .await?;

    eprintln!("Connected {}", tokens.email.as_deref().unwrap_or("Google account"));
    Ok(())
}

pub async fn cmd_auth_status(config: &Config) -> Result<()> {
    let status = match google_oauth(config)?.status().await? {
        Some(tokens) => AuthStatus {
            connected: true,
            expires_in_seconds: tokens.expires_at.map(|at| (at - Utc::now()).num_seconds()),
            has_refresh_token: tokens.refresh_token.is_some(),
            email: tokens.email,
        },
        None => AuthStatus {
            connected: false,
            email: None,
            expires_in_seconds: None,
            has_refresh_token: false,
        },
    };
    print_json(&status)
}

pub async fn cmd_auth_logout(config: &Config) -> Result<()> {
    google_oauth(config)?.logout().await?;
    eprintln!("Google tokens removed");
    Ok(())
}

pub async fn cmd_account_signup(
    config: &Config,
    email: String,
    username: String,
    password: String,
) -> Result<()> {
    let auth = SupabaseAuth::new(supabase(config)?);
    let request = SignUpRequest { credentials: Credentials { email, password }, username };
    let session = auth.sign_up(&request).await?;
    print_json(&session)
}

pub async fn cmd_account_login(config: &Config, email: String, password: String) -> Result<()> {
    let auth = SupabaseAuth::new(supabase(config)?);
    let session = auth.sign_in(&Credentials { email, password }).await?;
    print_json(&session)
}

pub async fn cmd_account_logout(config: &Config, access_token: &str) -> Result<()> {
    SupabaseAuth::new(supabase(config)?).sign_out(access_token).await?;
    eprintln!("Signed out");
    Ok(())
}

pub async fn cmd_pairings(config: &Config, user_id: &str) -> Result<()> {
    let repository = SupabasePairingRepository::new(supabase(config)?);
    let pairings = repository.list_pairings(user_id).await?;
    print_json(&pairings)
}
