//! Tournament storage

use rusqlite::{params, Connection, Row};

use crate::error::{Error, Result};
use crate::models::{LocalId, RemoteId, Tournament};
use crate::store::{self, EntityStore};
use crate::sync::SyncEntity;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct TournamentStore<'a> {
    conn: &'a Connection,
}

impl<'a> TournamentStore<'a> {
    #[must_use]
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// List tournaments, most recent first.
    pub fn list(&self, include_inactive: bool) -> Result<Vec<Tournament>> {
        let sql = format!(
            "SELECT local_id, remote_id, name, location, start_date, end_date,
                    is_active, created_at, updated_at, last_seen_at
             FROM tournaments
             {}
             ORDER BY start_date DESC, name ASC",
            if include_inactive { "" } else { "WHERE is_active = 1" }
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map([], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Soft delete: tournaments are retired, not removed.
    pub fn delete(&self, id: LocalId) -> Result<()> {
        store::soft_delete(self.conn, Tournament::TABLE, id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Tournament> {
        let local_id: String = row.get(0)?;
        let start_date: String = row.get(4)?;
        let end_date: String = row.get(5)?;
        Ok(Tournament {
            local_id: store::parse_local_id(0, &local_id)?,
            remote_id: row.get::<_, Option<i64>>(1)?.map(RemoteId::from),
            name: row.get(2)?,
            location: row.get(3)?,
            start_date: store::parse_naive_date(4, &start_date)?,
            end_date: store::parse_naive_date(5, &end_date)?,
            is_active: row.get::<_, i32>(6)? != 0,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
            last_seen_at: row.get(9)?,
        })
    }
}

impl EntityStore<Tournament> for TournamentStore<'_> {
    fn insert(&self, record: &Tournament) -> Result<()> {
        self.conn.execute(
            "INSERT INTO tournaments (local_id, remote_id, name, location, start_date,
                                      end_date, is_active, created_at, updated_at, last_seen_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                record.local_id.as_str(),
                record.remote_id.map(|id| id.as_i64()),
                record.name,
                record.location,
                record.start_date.format(DATE_FORMAT).to_string(),
                record.end_date.format(DATE_FORMAT).to_string(),
                i32::from(record.is_active),
                record.created_at,
                record.updated_at,
                record.last_seen_at,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: LocalId) -> Result<Option<Tournament>> {
        let result = self.conn.query_row(
            "SELECT local_id, remote_id, name, location, start_date, end_date,
                    is_active, created_at, updated_at, last_seen_at
             FROM tournaments WHERE local_id = ?",
            params![id.as_str()],
            Self::from_row,
        );
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn get_by_remote_id(&self, remote_id: RemoteId) -> Result<Option<Tournament>> {
        let result = self.conn.query_row(
            "SELECT local_id, remote_id, name, location, start_date, end_date,
                    is_active, created_at, updated_at, last_seen_at
             FROM tournaments WHERE remote_id = ?",
            params![remote_id.as_i64()],
            Self::from_row,
        );
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn update(&self, record: &Tournament) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE tournaments
             SET name = ?, location = ?, start_date = ?, end_date = ?,
                 is_active = ?, updated_at = ?, last_seen_at = ?
             WHERE local_id = ?",
            params![
                record.name,
                record.location,
                record.start_date.format(DATE_FORMAT).to_string(),
                record.end_date.format(DATE_FORMAT).to_string(),
                i32::from(record.is_active),
                record.updated_at,
                record.last_seen_at,
                record.local_id.as_str(),
            ],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(format!(
                "tournaments record {}",
                record.local_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TournamentFields;
    use crate::store::Database;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn setup() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn sample(name: &str) -> Tournament {
        Tournament::new_local(
            &TournamentFields {
                name: Some(name.to_string()),
                location: Some("Sydney".to_string()),
                start_date: NaiveDate::from_ymd_opt(2025, 3, 1),
                end_date: NaiveDate::from_ymd_opt(2025, 3, 8),
                ..TournamentFields::default()
            },
            1_000,
        )
        .unwrap()
    }

    #[test]
    fn test_insert_and_get_round_trips_dates() {
        let db = setup();
        let repo = TournamentStore::new(db.connection());

        let tournament = sample("Spring Cup");
        repo.insert(&tournament).unwrap();

        let fetched = repo.get(tournament.local_id).unwrap().unwrap();
        assert_eq!(fetched, tournament);
        assert_eq!(
            fetched.start_date,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_get_by_remote_id() {
        let db = setup();
        let repo = TournamentStore::new(db.connection());

        let mut tournament = sample("Spring Cup");
        tournament.remote_id = Some(RemoteId::new(7));
        repo.insert(&tournament).unwrap();

        let fetched = repo.get_by_remote_id(RemoteId::new(7)).unwrap().unwrap();
        assert_eq!(fetched.local_id, tournament.local_id);
        assert!(repo.get_by_remote_id(RemoteId::new(8)).unwrap().is_none());
    }

    #[test]
    fn test_update_persists_fields_but_not_remote_id() {
        let db = setup();
        let repo = TournamentStore::new(db.connection());

        let mut tournament = sample("Spring Cup");
        tournament.remote_id = Some(RemoteId::new(7));
        repo.insert(&tournament).unwrap();

        tournament.name = "Autumn Open".to_string();
        tournament.remote_id = Some(RemoteId::new(99)); // must not be written
        repo.update(&tournament).unwrap();

        let fetched = repo.get(tournament.local_id).unwrap().unwrap();
        assert_eq!(fetched.name, "Autumn Open");
        assert_eq!(fetched.remote_id, Some(RemoteId::new(7)));
    }

    #[test]
    fn test_delete_is_soft_and_list_filters() {
        let db = setup();
        let repo = TournamentStore::new(db.connection());

        let tournament = sample("Spring Cup");
        repo.insert(&tournament).unwrap();
        repo.delete(tournament.local_id).unwrap();

        // Row still exists, list hides it unless asked
        assert!(repo.get(tournament.local_id).unwrap().is_some());
        assert!(repo.list(false).unwrap().is_empty());
        assert_eq!(repo.list(true).unwrap().len(), 1);
    }

    #[test]
    fn test_update_missing_record() {
        let db = setup();
        let repo = TournamentStore::new(db.connection());

        let err = repo.update(&sample("Ghost")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
