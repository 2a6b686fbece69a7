//! Local store for Chukka
//!
//! One SQLite table per entity kind, accessed through per-kind repository
//! types holding a borrowed connection. Single process, single writer.

mod awards;
mod breeders;
mod clubs;
mod connection;
mod fields;
mod horses;
mod match_children;
mod matches;
mod migrations;
mod players;
mod teams;
mod tournaments;
mod users;

pub use awards::AwardStore;
pub use breeders::BreederStore;
pub use clubs::ClubStore;
pub use connection::Database;
pub use fields::FieldStore;
pub use horses::HorseStore;
pub use match_children::{DutyStore, ParticipationStore};
pub use matches::MatchStore;
pub use players::PlayerStore;
pub use teams::TeamStore;
pub use tournaments::TournamentStore;
pub use users::UserStore;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Error, Result};
use crate::models::{LocalId, RemoteId};

/// Storage operations the generic sync machinery needs from every
/// synchronized kind. Repository types also carry kind-specific methods
/// (listing, deletion) outside this trait.
pub trait EntityStore<E> {
    fn insert(&self, record: &E) -> Result<()>;
    fn get(&self, id: LocalId) -> Result<Option<E>>;
    fn get_by_remote_id(&self, remote_id: RemoteId) -> Result<Option<E>>;
    /// Persist the mutable columns of an existing record. Never touches
    /// `remote_id` or `created_at`.
    fn update(&self, record: &E) -> Result<()>;
}

// The `table` argument of the helpers below is always an entity constant
// (`E::TABLE`), never runtime input, so interpolating it is safe.

/// Look up the local id bound to a remote id, if any.
pub(crate) fn local_id_by_remote(
    conn: &Connection,
    table: &str,
    remote: RemoteId,
) -> Result<Option<LocalId>> {
    let sql = format!("SELECT local_id FROM {table} WHERE remote_id = ?");
    let found: Option<String> = conn
        .query_row(&sql, params![remote.as_i64()], |row| row.get(0))
        .optional()?;
    match found {
        Some(value) => Ok(Some(parse_local_id(0, &value)?)),
        None => Ok(None),
    }
}

/// Remote id of an existing record. `Ok(None)` means the record exists but
/// has never been pushed; a missing record is an error.
pub(crate) fn remote_id_of(
    conn: &Connection,
    table: &str,
    local: LocalId,
) -> Result<Option<RemoteId>> {
    let sql = format!("SELECT remote_id FROM {table} WHERE local_id = ?");
    let found: Option<Option<i64>> = conn
        .query_row(&sql, params![local.as_str()], |row| row.get(0))
        .optional()?;
    match found {
        Some(remote) => Ok(remote.map(RemoteId::from)),
        None => Err(Error::NotFound(format!("{table} record {local}"))),
    }
}

/// Bind a server-issued id to a local record. A record already bound to a
/// different id is never rebound.
pub(crate) fn set_remote_id(
    conn: &Connection,
    table: &str,
    local: LocalId,
    remote: RemoteId,
) -> Result<()> {
    let sql = format!(
        "UPDATE {table} SET remote_id = ?1
         WHERE local_id = ?2 AND (remote_id IS NULL OR remote_id = ?1)"
    );
    let rows = conn.execute(&sql, params![remote.as_i64(), local.as_str()])?;
    if rows == 0 {
        return match remote_id_of(conn, table, local) {
            Ok(Some(bound)) => Err(Error::RemoteIdConflict(format!(
                "{table} record {local} is already bound to remote id {bound}, refusing {remote}"
            ))),
            Ok(None) => Err(Error::NotFound(format!("{table} record {local}"))),
            Err(e) => Err(e),
        };
    }
    Ok(())
}

/// Record that a pull (or a successful push) observed this record now.
pub(crate) fn mark_seen(conn: &Connection, table: &str, local: LocalId, now_ms: i64) -> Result<()> {
    let sql = format!("UPDATE {table} SET last_seen_at = ? WHERE local_id = ?");
    let rows = conn.execute(&sql, params![now_ms, local.as_str()])?;
    if rows == 0 {
        return Err(Error::NotFound(format!("{table} record {local}")));
    }
    Ok(())
}

/// Deactivate synced records that no pull has returned since `cutoff_ms`.
///
/// Only rows that have a remote id and have been seen at least once are
/// candidates; local-only records and records from before seen-tracking are
/// left alone. Returns the number of rows retired.
pub(crate) fn retire_unseen(
    conn: &Connection,
    table: &str,
    cutoff_ms: i64,
    now_ms: i64,
) -> Result<usize> {
    let sql = format!(
        "UPDATE {table} SET is_active = 0, updated_at = ?1
         WHERE is_active = 1
           AND remote_id IS NOT NULL
           AND last_seen_at IS NOT NULL
           AND last_seen_at < ?2"
    );
    Ok(conn.execute(&sql, params![now_ms, cutoff_ms])?)
}

/// Soft delete: flip `is_active` off and bump `updated_at`.
pub(crate) fn soft_delete(conn: &Connection, table: &str, local: LocalId) -> Result<()> {
    let now = chrono::Utc::now().timestamp_millis();
    let sql = format!("UPDATE {table} SET is_active = 0, updated_at = ? WHERE local_id = ?");
    let rows = conn.execute(&sql, params![now, local.as_str()])?;
    if rows == 0 {
        return Err(Error::NotFound(format!("{table} record {local}")));
    }
    Ok(())
}

/// Hard delete: remove the row and let foreign key actions run.
pub(crate) fn hard_delete(conn: &Connection, table: &str, local: LocalId) -> Result<()> {
    let sql = format!("DELETE FROM {table} WHERE local_id = ?");
    let rows = conn.execute(&sql, params![local.as_str()])?;
    if rows == 0 {
        return Err(Error::NotFound(format!("{table} record {local}")));
    }
    Ok(())
}

/// Parse a `local_id` column value.
pub(crate) fn parse_local_id(idx: usize, value: &str) -> rusqlite::Result<LocalId> {
    value
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Parse an optional foreign key column value.
pub(crate) fn parse_opt_local_id(
    idx: usize,
    value: Option<String>,
) -> rusqlite::Result<Option<LocalId>> {
    value.map(|v| parse_local_id(idx, &v)).transpose()
}

/// Parse a `YYYY-MM-DD` date column value.
pub(crate) fn parse_naive_date(idx: usize, value: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Parse an RFC 3339 date-time column value.
pub(crate) fn parse_datetime_utc(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
