//! Club storage

use rusqlite::{params, Connection, Row};

use crate::error::{Error, Result};
use crate::models::{Club, LocalId, RemoteId};
use crate::store::{self, EntityStore};
use crate::sync::SyncEntity;

pub struct ClubStore<'a> {
    conn: &'a Connection,
}

impl<'a> ClubStore<'a> {
    #[must_use]
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn list(&self, include_inactive: bool) -> Result<Vec<Club>> {
        let sql = format!(
            "SELECT local_id, remote_id, name, city, country, is_active,
                    created_at, updated_at, last_seen_at
             FROM clubs
             {}
             ORDER BY name COLLATE NOCASE ASC",
            if include_inactive { "" } else { "WHERE is_active = 1" }
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map([], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    pub fn delete(&self, id: LocalId) -> Result<()> {
        store::soft_delete(self.conn, Club::TABLE, id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Club> {
        let local_id: String = row.get(0)?;
        Ok(Club {
            local_id: store::parse_local_id(0, &local_id)?,
            remote_id: row.get::<_, Option<i64>>(1)?.map(RemoteId::from),
            name: row.get(2)?,
            city: row.get(3)?,
            country: row.get(4)?,
            is_active: row.get::<_, i32>(5)? != 0,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
            last_seen_at: row.get(8)?,
        })
    }

    fn get_where<P: rusqlite::Params>(&self, clause: &str, params: P) -> Result<Option<Club>> {
        let sql = format!(
            "SELECT local_id, remote_id, name, city, country, is_active,
                    created_at, updated_at, last_seen_at
             FROM clubs WHERE {clause}"
        );
        let result = self.conn.query_row(&sql, params, Self::from_row);
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl EntityStore<Club> for ClubStore<'_> {
    fn insert(&self, record: &Club) -> Result<()> {
        self.conn.execute(
            "INSERT INTO clubs (local_id, remote_id, name, city, country, is_active,
                                created_at, updated_at, last_seen_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                record.local_id.as_str(),
                record.remote_id.map(|id| id.as_i64()),
                record.name,
                record.city,
                record.country,
                i32::from(record.is_active),
                record.created_at,
                record.updated_at,
                record.last_seen_at,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: LocalId) -> Result<Option<Club>> {
        self.get_where("local_id = ?", params![id.as_str()])
    }

    fn get_by_remote_id(&self, remote_id: RemoteId) -> Result<Option<Club>> {
        self.get_where("remote_id = ?", params![remote_id.as_i64()])
    }

    fn update(&self, record: &Club) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE clubs
             SET name = ?, city = ?, country = ?, is_active = ?,
                 updated_at = ?, last_seen_at = ?
             WHERE local_id = ?",
            params![
                record.name,
                record.city,
                record.country,
                i32::from(record.is_active),
                record.updated_at,
                record.last_seen_at,
                record.local_id.as_str(),
            ],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(format!("clubs record {}", record.local_id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClubFields;
    use crate::store::Database;
    use pretty_assertions::assert_eq;

    fn setup() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_round_trip_with_optional_fields() {
        let db = setup();
        let repo = ClubStore::new(db.connection());

        let club = Club::new_local(
            &ClubFields {
                name: Some("Hurlingham".to_string()),
                country: Some("Argentina".to_string()),
                ..ClubFields::default()
            },
            1_000,
        )
        .unwrap();
        repo.insert(&club).unwrap();

        let fetched = repo.get(club.local_id).unwrap().unwrap();
        assert_eq!(fetched, club);
        assert_eq!(fetched.city, None);
    }

    #[test]
    fn test_list_orders_by_name() {
        let db = setup();
        let repo = ClubStore::new(db.connection());

        for name in ["palermo", "Ellerstina", "Hurlingham"] {
            let club = Club::new_local(
                &ClubFields {
                    name: Some(name.to_string()),
                    ..ClubFields::default()
                },
                1_000,
            )
            .unwrap();
            repo.insert(&club).unwrap();
        }

        let names: Vec<String> = repo
            .list(false)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Ellerstina", "Hurlingham", "palermo"]);
    }
}
