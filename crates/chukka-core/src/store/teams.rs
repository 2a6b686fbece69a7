//! Team storage
//!
//! Teams are hard-deleted; there is no active flag and `delete` removes
//! the row, nulling out team references on matches via FK actions.

use rusqlite::{params, Connection, Row};

use crate::error::{Error, Result};
use crate::models::{LocalId, RemoteId, Team};
use crate::store::{self, EntityStore};
use crate::sync::SyncEntity;

pub struct TeamStore<'a> {
    conn: &'a Connection,
}

impl<'a> TeamStore<'a> {
    #[must_use]
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn list(&self) -> Result<Vec<Team>> {
        let mut stmt = self.conn.prepare(
            "SELECT local_id, remote_id, name, club_local_id,
                    created_at, updated_at, last_seen_at
             FROM teams
             ORDER BY name COLLATE NOCASE ASC",
        )?;
        let records = stmt
            .query_map([], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    pub fn delete(&self, id: LocalId) -> Result<()> {
        store::hard_delete(self.conn, Team::TABLE, id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Team> {
        let local_id: String = row.get(0)?;
        Ok(Team {
            local_id: store::parse_local_id(0, &local_id)?,
            remote_id: row.get::<_, Option<i64>>(1)?.map(RemoteId::from),
            name: row.get(2)?,
            club_local_id: store::parse_opt_local_id(3, row.get(3)?)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
            last_seen_at: row.get(6)?,
        })
    }

    fn get_where<P: rusqlite::Params>(&self, clause: &str, params: P) -> Result<Option<Team>> {
        let sql = format!(
            "SELECT local_id, remote_id, name, club_local_id,
                    created_at, updated_at, last_seen_at
             FROM teams WHERE {clause}"
        );
        let result = self.conn.query_row(&sql, params, Self::from_row);
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl EntityStore<Team> for TeamStore<'_> {
    fn insert(&self, record: &Team) -> Result<()> {
        self.conn.execute(
            "INSERT INTO teams (local_id, remote_id, name, club_local_id,
                                created_at, updated_at, last_seen_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                record.local_id.as_str(),
                record.remote_id.map(|id| id.as_i64()),
                record.name,
                record.club_local_id.map(|id| id.as_str()),
                record.created_at,
                record.updated_at,
                record.last_seen_at,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: LocalId) -> Result<Option<Team>> {
        self.get_where("local_id = ?", params![id.as_str()])
    }

    fn get_by_remote_id(&self, remote_id: RemoteId) -> Result<Option<Team>> {
        self.get_where("remote_id = ?", params![remote_id.as_i64()])
    }

    fn update(&self, record: &Team) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE teams
             SET name = ?, club_local_id = ?, updated_at = ?, last_seen_at = ?
             WHERE local_id = ?",
            params![
                record.name,
                record.club_local_id.map(|id| id.as_str()),
                record.updated_at,
                record.last_seen_at,
                record.local_id.as_str(),
            ],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(format!("teams record {}", record.local_id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Club, ClubFields, TeamFields};
    use crate::store::ClubStore;
    use crate::store::Database;
    use crate::sync::Relations;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_delete_removes_the_row() {
        let db = Database::open_in_memory().unwrap();
        let repo = TeamStore::new(db.connection());
        let relations = Relations::new(db.connection());

        let team = Team::new_local(
            &TeamFields {
                name: Some("La Dolfina".to_string()),
                ..TeamFields::default()
            },
            1_000,
            &relations,
        )
        .unwrap();
        repo.insert(&team).unwrap();
        repo.delete(team.local_id).unwrap();

        assert!(repo.get(team.local_id).unwrap().is_none());
        assert!(matches!(
            repo.delete(team.local_id).unwrap_err(),
            Error::NotFound(_)
        ));
    }

    #[test]
    fn test_club_reference_round_trips() {
        let db = Database::open_in_memory().unwrap();
        let clubs = ClubStore::new(db.connection());
        let repo = TeamStore::new(db.connection());

        let club = Club::new_local(
            &ClubFields {
                name: Some("Ellerstina".to_string()),
                ..ClubFields::default()
            },
            1_000,
        )
        .unwrap();
        clubs.insert(&club).unwrap();

        let relations = Relations::new(db.connection());
        let mut team = Team::new_local(
            &TeamFields {
                name: Some("Ellerstina I".to_string()),
                ..TeamFields::default()
            },
            1_000,
            &relations,
        )
        .unwrap();
        team.club_local_id = Some(club.local_id);
        repo.insert(&team).unwrap();

        let fetched = repo.get(team.local_id).unwrap().unwrap();
        assert_eq!(fetched.club_local_id, Some(club.local_id));
    }
}
