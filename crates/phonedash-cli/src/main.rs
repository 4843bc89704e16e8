//! phonedash - an interactive shell for the phone-data dashboard API.
//!
//! Signs in, then runs a small command loop. Every input line counts as
//! activity; after the idle threshold the session is logged out, as it is
//! when the server answers 401.

mod commands;

use std::io::{self, Write};

use anyhow::{Context, Result};
use phonedash_core::{ApiClient, ApiError, AuthStatus, ClientConfig, IdleMonitor, SessionStore};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{Command, HELP};

/// Failed password attempts before giving up on an interactive login
const MAX_LOGIN_ATTEMPTS: u32 = 3;

type InputLines = Lines<BufReader<Stdin>>;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("phonedash starting");

    let config = ClientConfig::from_env().context("Failed to load configuration")?;
    let session = SessionStore::new();
    let api = ApiClient::new(config.clone(), session.clone())
        .context("Failed to create API client")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if !login_interactive(&api, &mut lines).await? {
        eprintln!("Login failed, exiting.");
        return Ok(());
    }

    let monitor = IdleMonitor::from_config(&config, session.clone());
    let result = run_shell(&api, &monitor, &mut lines).await;

    api.logout();
    info!("phonedash shutting down");
    result
}

async fn run_shell(api: &ApiClient, monitor: &IdleMonitor, lines: &mut InputLines) -> Result<()> {
    let mut session_rx = api.session().subscribe();
    let mut was_logged_in = api.session().is_logged_in();

    loop {
        prompt(api)?;

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                monitor.touch();

                let Some(command) = Command::parse(&line) else {
                    continue;
                };
                if command == Command::Quit {
                    break;
                }
                run_command(api, command, lines).await?;
            }
            changed = session_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let (logged_in, status) = {
                    let state = session_rx.borrow_and_update();
                    (state.snapshot().is_logged_in(), state.snapshot().status)
                };
                if let Some(notice) = logout_notice(was_logged_in, logged_in, status, monitor.is_idle()) {
                    println!("\n{}", notice);
                }
                was_logged_in = logged_in;
            }
        }
    }

    Ok(())
}

/// Message for a session that just ended, if any.
/// Re-login passes through LOADING; only a real logout is announced.
fn logout_notice(
    was_logged_in: bool,
    logged_in: bool,
    status: AuthStatus,
    idle: bool,
) -> Option<&'static str> {
    if !was_logged_in || logged_in || status != AuthStatus::Empty {
        return None;
    }
    if idle {
        Some("Logged out after inactivity. Type 'login' to sign in again.")
    } else {
        Some("Session ended. Type 'login' to sign in again.")
    }
}

async fn run_command(api: &ApiClient, command: Command, lines: &mut InputLines) -> Result<()> {
    match command {
        Command::Phones => {
            if let Some(phones) = report(api.fetch_phone_info().await) {
                for phone in &phones {
                    println!("{}", phone.summary());
                }
                println!("{} phone(s)", phones.len());
            }
        }
        Command::Details => {
            if let Some(phones) = report(api.fetch_phone_scraper().await) {
                for phone in &phones {
                    println!("{}", phone.summary());
                }
                let scraped = phones.iter().filter(|p| p.has_scrape()).count();
                println!("{} phone(s), {} scraped", phones.len(), scraped);
            }
        }
        Command::Pools => {
            if let Some(pools) = report(api.fetch_device_pools().await) {
                for pool in &pools {
                    println!("{}", pool);
                }
            }
        }
        Command::Jobs => {
            if let Some(status) = report(api.fetch_job_status().await) {
                for job in &status.jobs {
                    println!(
                        "{:<24} {:<20} {}",
                        job.job_name,
                        job.last_start_time.as_deref().unwrap_or("-"),
                        job.result.as_deref().unwrap_or("-")
                    );
                }
                if status.queue.is_available() {
                    println!(
                        "scrape queue: {} waiting, {} started",
                        status.queue.current_size, status.queue.started_count
                    );
                } else {
                    println!("scrape queue: unavailable");
                }
            }
        }
        Command::Poll => {
            if let Some(result) = report(api.trigger_cucm_poll().await) {
                println!("{}", result.result);
            }
        }
        Command::Scrape => {
            if let Some(result) = report(api.trigger_phone_scrape().await) {
                println!("{}", result.result);
            }
        }
        Command::WhoAmI => {
            let snapshot = api.session().snapshot();
            if snapshot.is_logged_in() {
                print!("{} ({})", snapshot.username, snapshot.status);
                if let Some(minutes) = snapshot.minutes_until_expiry() {
                    print!(", token expires in {}m", minutes);
                }
                println!();
            } else {
                println!("not logged in");
            }
        }
        Command::Login => {
            if !login_interactive(api, lines).await? {
                println!("Login failed.");
            }
        }
        Command::Logout => api.logout(),
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
        Command::Unknown(word) => println!("Unknown command '{}'. Type 'help'.", word),
    }
    Ok(())
}

/// Print a request error; `None` results were absorbed by the 401 handler
/// and are reported through the session watcher instead.
fn report<T>(result: Result<Option<T>, ApiError>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Request failed");
            eprintln!("Error: {}", e);
            None
        }
    }
}

fn prompt(api: &ApiClient) -> Result<()> {
    let user = api.session().user_name();
    if user.is_empty() {
        print!("phonedash> ");
    } else {
        print!("phonedash ({})> ", user);
    }
    io::stdout().flush()?;
    Ok(())
}

/// Prompt for credentials until login succeeds or attempts run out.
/// Returns false on exhausted attempts or closed input.
async fn login_interactive(api: &ApiClient, lines: &mut InputLines) -> Result<bool> {
    for attempt in 1..=MAX_LOGIN_ATTEMPTS {
        print!("Username: ");
        io::stdout().flush()?;
        let Some(username) = lines.next_line().await? else {
            return Ok(false);
        };
        let username = username.trim().to_string();
        if username.is_empty() {
            continue;
        }

        let password = tokio::task::spawn_blocking(|| rpassword::prompt_password("Password: "))
            .await
            .context("Password prompt task failed")??;

        println!("Authenticating...");
        match api.login(&username, &password).await {
            Ok(auth) => {
                println!("Welcome, {}.", auth.user_name);
                return Ok(true);
            }
            Err(ApiError::Rejected(_)) | Err(ApiError::Unauthorized) => {
                eprintln!("Invalid username or password ({}/{})", attempt, MAX_LOGIN_ATTEMPTS);
            }
            Err(ApiError::Network(e)) if e.is_timeout() => {
                eprintln!("Connection timed out. Please try again.");
            }
            Err(ApiError::Network(e)) if e.is_connect() => {
                eprintln!("Unable to connect to {}.", api.config().base_url);
            }
            Err(e) => eprintln!("Login failed: {}", e),
        }
    }
    Ok(false)
}
