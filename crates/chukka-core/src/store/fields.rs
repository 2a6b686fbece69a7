//! Field storage

use rusqlite::{params, Connection, Row};

use crate::error::{Error, Result};
use crate::models::{Field, LocalId, RemoteId};
use crate::store::{self, EntityStore};
use crate::sync::SyncEntity;

pub struct FieldStore<'a> {
    conn: &'a Connection,
}

impl<'a> FieldStore<'a> {
    #[must_use]
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn list(&self, include_inactive: bool) -> Result<Vec<Field>> {
        let sql = format!(
            "SELECT local_id, remote_id, name, location, is_active,
                    created_at, updated_at, last_seen_at
             FROM fields
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
        store::soft_delete(self.conn, Field::TABLE, id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Field> {
        let local_id: String = row.get(0)?;
        Ok(Field {
            local_id: store::parse_local_id(0, &local_id)?,
            remote_id: row.get::<_, Option<i64>>(1)?.map(RemoteId::from),
            name: row.get(2)?,
            location: row.get(3)?,
            is_active: row.get::<_, i32>(4)? != 0,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
            last_seen_at: row.get(7)?,
        })
    }

    fn get_where<P: rusqlite::Params>(&self, clause: &str, params: P) -> Result<Option<Field>> {
        let sql = format!(
            "SELECT local_id, remote_id, name, location, is_active,
                    created_at, updated_at, last_seen_at
             FROM fields WHERE {clause}"
        );
        let result = self.conn.query_row(&sql, params, Self::from_row);
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl EntityStore<Field> for FieldStore<'_> {
    fn insert(&self, record: &Field) -> Result<()> {
        self.conn.execute(
            "INSERT INTO fields (local_id, remote_id, name, location, is_active,
                                 created_at, updated_at, last_seen_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                record.local_id.as_str(),
                record.remote_id.map(|id| id.as_i64()),
                record.name,
                record.location,
                i32::from(record.is_active),
                record.created_at,
                record.updated_at,
                record.last_seen_at,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: LocalId) -> Result<Option<Field>> {
        self.get_where("local_id = ?", params![id.as_str()])
    }

    fn get_by_remote_id(&self, remote_id: RemoteId) -> Result<Option<Field>> {
        self.get_where("remote_id = ?", params![remote_id.as_i64()])
    }

    fn update(&self, record: &Field) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE fields
             SET name = ?, location = ?, is_active = ?, updated_at = ?, last_seen_at = ?
             WHERE local_id = ?",
            params![
                record.name,
                record.location,
                i32::from(record.is_active),
                record.updated_at,
                record.last_seen_at,
                record.local_id.as_str(),
            ],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(format!(
                "fields record {}",
                record.local_id
            )));
        }
        Ok(())
    }
}
