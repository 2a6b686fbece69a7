//! Player storage

use rusqlite::{params, Connection, Row};

use crate::error::{Error, Result};
use crate::models::{LocalId, Player, RemoteId};
use crate::store::{self, EntityStore};
use crate::sync::SyncEntity;

pub struct PlayerStore<'a> {
    conn: &'a Connection,
}

impl<'a> PlayerStore<'a> {
    #[must_use]
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn list(&self, include_inactive: bool) -> Result<Vec<Player>> {
        let sql = format!(
            "SELECT local_id, remote_id, first_name, last_name, handicap,
                    club_local_id, user_local_id, is_active,
                    created_at, updated_at, last_seen_at
             FROM players
             {}
             ORDER BY last_name COLLATE NOCASE ASC, first_name COLLATE NOCASE ASC",
            if include_inactive { "" } else { "WHERE is_active = 1" }
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map([], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    pub fn delete(&self, id: LocalId) -> Result<()> {
        store::soft_delete(self.conn, Player::TABLE, id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Player> {
        let local_id: String = row.get(0)?;
        Ok(Player {
            local_id: store::parse_local_id(0, &local_id)?,
            remote_id: row.get::<_, Option<i64>>(1)?.map(RemoteId::from),
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            handicap: row.get(4)?,
            club_local_id: store::parse_opt_local_id(5, row.get(5)?)?,
            user_local_id: store::parse_opt_local_id(6, row.get(6)?)?,
            is_active: row.get::<_, i32>(7)? != 0,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
            last_seen_at: row.get(10)?,
        })
    }

    fn get_where<P: rusqlite::Params>(&self, clause: &str, params: P) -> Result<Option<Player>> {
        let sql = format!(
            "SELECT local_id, remote_id, first_name, last_name, handicap,
                    club_local_id, user_local_id, is_active,
                    created_at, updated_at, last_seen_at
             FROM players WHERE {clause}"
        );
        let result = self.conn.query_row(&sql, params, Self::from_row);
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl EntityStore<Player> for PlayerStore<'_> {
    fn insert(&self, record: &Player) -> Result<()> {
        self.conn.execute(
            "INSERT INTO players (local_id, remote_id, first_name, last_name, handicap,
                                  club_local_id, user_local_id, is_active,
                                  created_at, updated_at, last_seen_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                record.local_id.as_str(),
                record.remote_id.map(|id| id.as_i64()),
                record.first_name,
                record.last_name,
                record.handicap,
                record.club_local_id.map(|id| id.as_str()),
                record.user_local_id.map(|id| id.as_str()),
                i32::from(record.is_active),
                record.created_at,
                record.updated_at,
                record.last_seen_at,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: LocalId) -> Result<Option<Player>> {
        self.get_where("local_id = ?", params![id.as_str()])
    }

    fn get_by_remote_id(&self, remote_id: RemoteId) -> Result<Option<Player>> {
        self.get_where("remote_id = ?", params![remote_id.as_i64()])
    }

    fn update(&self, record: &Player) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE players
             SET first_name = ?, last_name = ?, handicap = ?, club_local_id = ?,
                 user_local_id = ?, is_active = ?, updated_at = ?, last_seen_at = ?
             WHERE local_id = ?",
            params![
                record.first_name,
                record.last_name,
                record.handicap,
                record.club_local_id.map(|id| id.as_str()),
                record.user_local_id.map(|id| id.as_str()),
                i32::from(record.is_active),
                record.updated_at,
                record.last_seen_at,
                record.local_id.as_str(),
            ],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(format!(
                "players record {}",
                record.local_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlayerFields;
    use crate::store::Database;
    use crate::sync::Relations;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip_and_ordering() {
        let db = Database::open_in_memory().unwrap();
        let repo = PlayerStore::new(db.connection());
        let relations = Relations::new(db.connection());

        for (first, last, handicap) in [
            ("Adolfo", "Cambiaso", 10),
            ("Facundo", "Pieres", 10),
            ("Juan", "Britos", 8),
        ] {
            let player = Player::new_local(
                &PlayerFields {
                    first_name: Some(first.to_string()),
                    last_name: Some(last.to_string()),
                    handicap: Some(handicap),
                    ..PlayerFields::default()
                },
                1_000,
                &relations,
            )
            .unwrap();
            repo.insert(&player).unwrap();
        }

        let players = repo.list(false).unwrap();
        let last_names: Vec<&str> = players.iter().map(|p| p.last_name.as_str()).collect();
        assert_eq!(last_names, ["Britos", "Cambiaso", "Pieres"]);
        assert_eq!(players[1].handicap, 10);
    }
}
