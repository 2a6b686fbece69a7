//! Plumbing shared by every command: flag/env/profile resolution and the
//! small output helpers the text renderings use.

use std::env;
use std::path::PathBuf;

use chukka_core::api::ApiClient;
use chukka_core::session::Session;
use chukka_core::store::Database;
use chukka_core::sync::SyncService;
use chukka_core::util::normalize_text_option;
use chukka_core::{LocalId, RemoteId};
use serde::Serialize;

use crate::cli::KindArg;
use crate::error::CliError;
use crate::profiles::{CliProfile, CliProfilesConfig};
use crate::vault::vault_for;

/// The settings a command runs under once flags, environment, and the
/// profile file have been reconciled.
pub struct CommandContext {
    pub profile_name: String,
    pub profile: CliProfile,
    pub db_path: PathBuf,
}

impl CommandContext {
    pub fn load(cli_db_path: Option<PathBuf>, cli_profile: Option<&str>) -> Result<Self, CliError> {
        let config = CliProfilesConfig::load().map_err(CliError::Config)?;
        let profile_name = config.resolve_profile_name(cli_profile);
        let profile = config.profile(&profile_name).cloned().unwrap_or_default();
        let db_path = resolve_db_path(cli_db_path, &profile);

        Ok(Self {
            profile_name,
            profile,
            db_path,
        })
    }

    /// Open the profile's local database, creating the file and its parent
    /// directories on first use.
    pub fn open_database(&self) -> Result<Database, CliError> {
        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Database::open(&self.db_path)?)
    }

    /// Build an API client whose session lives in this profile's keyring
    /// slot. Local-only commands never call this, so they work without an
    /// API URL configured.
    pub fn open_api(&self) -> Result<ApiClient, CliError> {
        let base_url = self.resolve_api_url()?;
        tracing::debug!(profile = %self.profile_name, url = %base_url, "using remote API");
        let session = Session::hydrate(vault_for(&self.profile_name))?;
        Ok(ApiClient::new(base_url, session)?)
    }

    /// Build the sync service for commands that talk to the server. All of
    /// them need a session, so the signed-in check lives here.
    pub fn open_service(&self) -> Result<SyncService, CliError> {
        let api = self.open_api()?;
        require_signed_in(&api)?;
        Ok(SyncService::new(api, self.open_database()?))
    }

    pub fn resolve_api_url(&self) -> Result<String, CliError> {
        if let Some(url) = normalize_text_option(env::var("CHUKKA_API_URL").ok()) {
            return Ok(url);
        }
        self.profile
            .api_base_url()
            .ok_or(CliError::ApiUrlNotConfigured)
    }
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>, profile: &CliProfile) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os("CHUKKA_DB_PATH").map(PathBuf::from))
        .or_else(|| profile.db_path())
        .unwrap_or_else(default_db_path)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| panic!("Failed to resolve CLI data directory"))
        .join("chukka")
        .join("chukka.db")
}

pub fn require_signed_in(api: &ApiClient) -> Result<(), CliError> {
    if api.session().is_authenticated() {
        Ok(())
    } else {
        Err(CliError::NotSignedIn)
    }
}

pub fn parse_local_id(raw: &str) -> Result<LocalId, CliError> {
    raw.trim()
        .parse()
        .map_err(|_| CliError::InvalidLocalId(raw.to_string()))
}

/// Parse the `--data` JSON into a kind's fields struct.
pub fn parse_fields<T: serde::de::DeserializeOwned>(data: &str) -> Result<T, CliError> {
    serde_json::from_str(data).map_err(CliError::Data)
}

pub fn not_found(kind: KindArg, id: LocalId) -> CliError {
    chukka_core::Error::NotFound(format!("{} {id}", kind.entity())).into()
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a record as `key: value` lines, one per field, nulls as `-` and
/// millisecond timestamps humanized.
pub fn print_record_text<T: Serialize>(record: &T) -> Result<(), CliError> {
    let value = serde_json::to_value(record)?;
    match value {
        serde_json::Value::Object(fields) => {
            for (key, field) in fields {
                println!("{key}: {}", render_field(&key, &field));
            }
        }
        other => println!("{}", render_scalar(&other)),
    }
    Ok(())
}

fn render_field(key: &str, value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Number(number) if key.ends_with("_at") => number
            .as_i64()
            .map_or_else(|| value.to_string(), format_timestamp),
        other => render_scalar(other),
    }
}

fn render_scalar(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "-".to_string(),
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// One listing line: local id, remote id (or `-` while unsynced), a
/// kind-specific label, and how long ago the record changed.
pub fn record_line(
    local_id: LocalId,
    remote_id: Option<RemoteId>,
    label: &str,
    retired: bool,
    updated_at: i64,
    now_ms: i64,
) -> String {
    let remote = remote_id.map_or_else(|| "-".to_string(), |id| id.to_string());
    let relative_time = format_relative_time(updated_at, now_ms);
    let suffix = if retired { "  (retired)" } else { "" };
    format!("{local_id}  {remote:>6}  {label:<32}  {relative_time}{suffix}")
}

pub fn format_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}
