//! Breeder storage

use rusqlite::{params, Connection, Row};

use crate::error::{Error, Result};
use crate::models::{Breeder, LocalId, RemoteId};
use crate::store::{self, EntityStore};
use crate::sync::SyncEntity;

pub struct BreederStore<'a> {
    conn: &'a Connection,
}

impl<'a> BreederStore<'a> {
    #[must_use]
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn list(&self, include_inactive: bool) -> Result<Vec<Breeder>> {
        let sql = format!(
            "SELECT local_id, remote_id, name, is_active, created_at, updated_at, last_seen_at
             FROM breeders
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
        store::soft_delete(self.conn, Breeder::TABLE, id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Breeder> {
        let local_id: String = row.get(0)?;
        Ok(Breeder {
            local_id: store::parse_local_id(0, &local_id)?,
            remote_id: row.get::<_, Option<i64>>(1)?.map(RemoteId::from),
            name: row.get(2)?,
            is_active: row.get::<_, i32>(3)? != 0,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
            last_seen_at: row.get(6)?,
        })
    }

    fn get_where<P: rusqlite::Params>(&self, clause: &str, params: P) -> Result<Option<Breeder>> {
        let sql = format!(
            "SELECT local_id, remote_id, name, is_active, created_at, updated_at, last_seen_at
             FROM breeders WHERE {clause}"
        );
        let result = self.conn.query_row(&sql, params, Self::from_row);
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl EntityStore<Breeder> for BreederStore<'_> {
    fn insert(&self, record: &Breeder) -> Result<()> {
        self.conn.execute(
            "INSERT INTO breeders (local_id, remote_id, name, is_active,
                                   created_at, updated_at, last_seen_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                record.local_id.as_str(),
                record.remote_id.map(|id| id.as_i64()),
                record.name,
                i32::from(record.is_active),
                record.created_at,
                record.updated_at,
                record.last_seen_at,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: LocalId) -> Result<Option<Breeder>> {
        self.get_where("local_id = ?", params![id.as_str()])
    }

    fn get_by_remote_id(&self, remote_id: RemoteId) -> Result<Option<Breeder>> {
        self.get_where("remote_id = ?", params![remote_id.as_i64()])
    }

    fn update(&self, record: &Breeder) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE breeders
             SET name = ?, is_active = ?, updated_at = ?, last_seen_at = ?
             WHERE local_id = ?",
            params![
                record.name,
                i32::from(record.is_active),
                record.updated_at,
                record.last_seen_at,
                record.local_id.as_str(),
            ],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(format!(
                "breeders record {}",
                record.local_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BreederFields;
    use crate::store::Database;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let repo = BreederStore::new(db.connection());

        let breeder = Breeder::new_local(
            &BreederFields {
                name: Some("La Irenita".to_string()),
                ..BreederFields::default()
            },
            1_000,
        )
        .unwrap();
        repo.insert(&breeder).unwrap();

        let fetched = repo.get(breeder.local_id).unwrap().unwrap();
        assert_eq!(fetched, breeder);
    }
}
