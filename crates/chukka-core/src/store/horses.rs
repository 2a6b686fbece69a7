//! Horse storage

use rusqlite::{params, Connection, Row};

use crate::error::{Error, Result};
use crate::models::{Horse, LocalId, RemoteId};
use crate::store::{self, EntityStore};
use crate::sync::SyncEntity;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct HorseStore<'a> {
    conn: &'a Connection,
}

impl<'a> HorseStore<'a> {
    #[must_use]
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn list(&self, include_inactive: bool) -> Result<Vec<Horse>> {
        let sql = format!(
            "SELECT local_id, remote_id, name, birth_date, breeder_local_id,
                    owner_local_id, is_active, created_at, updated_at, last_seen_at
             FROM horses
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
        store::soft_delete(self.conn, Horse::TABLE, id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Horse> {
        let local_id: String = row.get(0)?;
        let birth_date: Option<String> = row.get(3)?;
        Ok(Horse {
            local_id: store::parse_local_id(0, &local_id)?,
            remote_id: row.get::<_, Option<i64>>(1)?.map(RemoteId::from),
            name: row.get(2)?,
            birth_date: birth_date
                .map(|d| store::parse_naive_date(3, &d))
                .transpose()?,
            breeder_local_id: store::parse_opt_local_id(4, row.get(4)?)?,
            owner_local_id: store::parse_opt_local_id(5, row.get(5)?)?,
            is_active: row.get::<_, i32>(6)? != 0,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
            last_seen_at: row.get(9)?,
        })
    }

    fn get_where<P: rusqlite::Params>(&self, clause: &str, params: P) -> Result<Option<Horse>> {
        let sql = format!(
            "SELECT local_id, remote_id, name, birth_date, breeder_local_id,
                    owner_local_id, is_active, created_at, updated_at, last_seen_at
             FROM horses WHERE {clause}"
        );
        let result = self.conn.query_row(&sql, params, Self::from_row);
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl EntityStore<Horse> for HorseStore<'_> {
    fn insert(&self, record: &Horse) -> Result<()> {
        self.conn.execute(
            "INSERT INTO horses (local_id, remote_id, name, birth_date, breeder_local_id,
                                 owner_local_id, is_active, created_at, updated_at, last_seen_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                record.local_id.as_str(),
                record.remote_id.map(|id| id.as_i64()),
                record.name,
                record
                    .birth_date
                    .map(|d| d.format(DATE_FORMAT).to_string()),
                record.breeder_local_id.map(|id| id.as_str()),
                record.owner_local_id.map(|id| id.as_str()),
                i32::from(record.is_active),
                record.created_at,
                record.updated_at,
                record.last_seen_at,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: LocalId) -> Result<Option<Horse>> {
        self.get_where("local_id = ?", params![id.as_str()])
    }

    fn get_by_remote_id(&self, remote_id: RemoteId) -> Result<Option<Horse>> {
        self.get_where("remote_id = ?", params![remote_id.as_i64()])
    }

    fn update(&self, record: &Horse) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE horses
             SET name = ?, birth_date = ?, breeder_local_id = ?, owner_local_id = ?,
                 is_active = ?, updated_at = ?, last_seen_at = ?
             WHERE local_id = ?",
            params![
                record.name,
                record
                    .birth_date
                    .map(|d| d.format(DATE_FORMAT).to_string()),
                record.breeder_local_id.map(|id| id.as_str()),
                record.owner_local_id.map(|id| id.as_str()),
                i32::from(record.is_active),
                record.updated_at,
                record.last_seen_at,
                record.local_id.as_str(),
            ],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(format!(
                "horses record {}",
                record.local_id
            )));
        }
        Ok(())
    }
}
