//! Command handlers and shared helpers.

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tabs_client::client::ApiClient;
use tabs_client::config::{Config, normalize_base_url};
use tabs_client::credentials::FileCredentialStore;
use tabs_client::error::ApiError;

pub mod auth;
pub mod categories;
pub mod config;
pub mod expenses;
pub mod profile;

/// Builds the API client: config + file-backed credential store + a
/// session-expired notice on stderr.
pub fn build_client(api_url: Option<&str>) -> Result<ApiClient> {
    let config = Config::load().context("load config")?;
    let base_url = match api_url {
        Some(url) => normalize_base_url(url),
        None => config.resolve_base_url().context("resolve base URL")?,
    };

    tracing::debug!(%base_url, "resolved backend base URL");

    let store = Arc::new(FileCredentialStore::default_location());
    Ok(ApiClient::new(base_url, store).with_session_expired(|| {
        eprintln!("Session expired. Run `tabs login` to sign in again.");
    }))
}

/// Reads one line from stdin after printing a prompt to stderr.
pub fn prompt(label: &str) -> Result<String> {
    eprint!("{label}: ");
    std::io::stderr().flush().context("flush prompt")?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read input")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Asks a yes/no question; only an explicit `y`/`yes` is a yes.
pub fn confirm(question: &str) -> Result<bool> {
    let answer = prompt(&format!("{question} [y/N]"))?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Validates an amount the way the expense forms do: a positive number,
/// sent to the backend with two decimal places.
pub fn parse_amount(input: &str) -> Result<String> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| ApiError::Validation(format!("Invalid amount: {input}")))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(ApiError::Validation("Amount must be a positive number".to_string()).into());
    }
    Ok(format!("{value:.2}"))
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> Result<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::Validation(format!("Invalid date (expected YYYY-MM-DD): {input}")).into())
}

/// Normalizes an email address for the backend.
pub fn normalize_email(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Prompts for a password twice and requires the entries to match.
pub fn prompt_password_twice() -> Result<String> {
    let password = prompt("Password")?;
    let confirm = prompt("Confirm password")?;
    ensure_passwords_match(&password, &confirm)?;
    Ok(password)
}

pub fn ensure_passwords_match(password: &str, confirm: &str) -> Result<()> {
    if password != confirm {
        return Err(ApiError::Validation("Passwords do not match".to_string()).into());
    }
    if password.is_empty() {
        return Err(ApiError::Validation("Password must not be empty".to_string()).into());
    }
    Ok(())
}
