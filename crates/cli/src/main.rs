//! CrewCal - crew schedule to Google Calendar
//!
//! The `crewcal` command turns a saved crew portal schedule page into
//! all-day trip events.
//!
//! ## Commands
//!
//! - `parse`: Show the trips (or print-view details) found in a page
//! - `sync`: Replace previously pushed trips with the page's trips
//! - `push-stored`: Push pairings already stored for a user
//! - `auth`: Connect, inspect or disconnect the Google account
//! - `account`: Supabase sign-up, sign-in and sign-out
//! - `pairings`: List stored pairings for a user

mod commands;
mod telemetry;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crewcal_infra::config;

#[derive(Parser)]
#[command(name = "crewcal")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sync a crew schedule into Google Calendar", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Config file (TOML or JSON); probed when omitted
    #[arg(short, long, global = true, env = "CREWCAL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a saved schedule page and print the grouped trips
    Parse {
        /// Saved master schedule (or print view) HTML
        file: PathBuf,

        /// Treat the page as the detailed print view
        #[arg(long)]
        print_view: bool,
    },

    /// Push the trips in a saved schedule page to Google Calendar
    Sync {
        /// Saved master schedule HTML
        file: PathBuf,

        /// Store the trips for this Supabase user before pushing
        #[arg(long)]
        user_id: Option<String>,

        /// Keep trips that already started
        #[arg(long)]
        preserve_past: bool,

        /// Only push these trips (indices from `parse`)
        #[arg(long, value_delimiter = ',')]
        select: Option<Vec<usize>>,

        /// Group and report without touching storage or the calendar
        #[arg(long)]
        dry_run: bool,
    },

    /// Push pairings already stored for a user
    PushStored {
        #[arg(long)]
        user_id: String,

        /// Keep trips that already started
        #[arg(long)]
        preserve_past: bool,
    },

    /// Google account connection
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Supabase account
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// List stored pairings for a user
    Pairings {
        #[arg(long)]
        user_id: String,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Connect a Google account through the browser
    Login {
        /// Seconds to wait for the browser redirect
        #[arg(long, default_value = "300")]
        timeout: u64,
    },
    /// Show the stored Google connection
    Status,
    /// Forget the stored Google tokens
    Logout,
}

#[derive(Subcommand)]
enum AccountAction {
    /// Create an account
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long, env = "CREWCAL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign in and print the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CREWCAL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Invalidate a session
    Logout {
        #[arg(long, env = "CREWCAL_ACCESS_TOKEN", hide_env_values = true)]
        access_token: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = config::load_or_default(cli.config).context("Failed to load configuration")?;

    let level = if cli.verbose { "debug" } else { config.logging.level.as_str() };
    telemetry::init_tracing(cli.json || config.logging.json, level);

    match cli.command {
        Commands::Parse { file, print_view } => {
            commands::cmd_parse(&config, &file, print_view).await
        }
        Commands::Sync { file, user_id, preserve_past, select, dry_run } => {
            let options = commands::sync_options(&config, user_id, preserve_past, select, dry_run);
            commands::cmd_sync(&config, &file, &options).await
        }
        Commands::PushStored { user_id, preserve_past } => {
            let options = commands::sync_options(&config, None, preserve_past, None, false);
            commands::cmd_push_stored(&config, &user_id, &options).await
        }
        Commands::Auth { action } => match action {
            AuthAction::Login { timeout } => commands::cmd_auth_login(&config, timeout).await,
            AuthAction::Status => commands::cmd_auth_status(&config).await,
            AuthAction::Logout => commands::cmd_auth_logout(&config).await,
        },
        Commands::Account { action } => match action {
            AccountAction::Signup { email, username, password } => {
                commands::cmd_account_signup(&config, email, username, password).await
            }
            AccountAction::Login { email, password } => {
                commands::cmd_account_login(&config, email, password).await
            }
            AccountAction::Logout { access_token } => {
                commands::cmd_account_logout(&config, &access_token).await
            }
        },
        Commands::Pairings { user_id } => commands::cmd_pairings(&config, &user_id).await,
    }
}
