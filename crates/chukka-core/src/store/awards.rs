//! Award storage

use rusqlite::{params, Connection, Row};

use crate::error::{Error, Result};
use crate::models::{Award, LocalId, RemoteId};
use crate::store::{self, EntityStore};
use crate::sync::SyncEntity;

pub struct AwardStore<'a> {
    conn: &'a Connection,
}

impl<'a> AwardStore<'a> {
    #[must_use]
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn list(&self, include_inactive: bool) -> Result<Vec<Award>> {
        let sql = format!(
            "SELECT local_id, remote_id, name, tournament_local_id, player_local_id,
                    is_active, created_at, updated_at, last_seen_at
             FROM awards
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
        store::soft_delete(self.conn, Award::TABLE, id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Award> {
        let local_id: String = row.get(0)?;
        Ok(Award {
            local_id: store::parse_local_id(0, &local_id)?,
            remote_id: row.get::<_, Option<i64>>(1)?.map(RemoteId::from),
            name: row.get(2)?,
            tournament_local_id: store::parse_opt_local_id(3, row.get(3)?)?,
            player_local_id: store::parse_opt_local_id(4, row.get(4)?)?,
            is_active: row.get::<_, i32>(5)? != 0,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
            last_seen_at: row.get(8)?,
        })
    }

    fn get_where<P: rusqlite::Params>(&self, clause: &str, params: P) -> Result<Option<Award>> {
        let sql = format!(
            "SELECT local_id, remote_id, name, tournament_local_id, player_local_id,
                    is_active, created_at, updated_at, last_seen_at
             FROM awards WHERE {clause}"
        );
        let result = self.conn.query_row(&sql, params, Self::from_row);
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl EntityStore<Award> for AwardStore<'_> {
    fn insert(&self, record: &Award) -> Result<()> {
        self.conn.execute(
            "INSERT INTO awards (local_id, remote_id, name, tournament_local_id,
                                 player_local_id, is_active, created_at, updated_at, last_seen_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                record.local_id.as_str(),
                record.remote_id.map(|id| id.as_i64()),
                record.name,
                record.tournament_local_id.map(|id| id.as_str()),
                record.player_local_id.map(|id| id.as_str()),
                i32::from(record.is_active),
                record.created_at,
                record.updated_at,
                record.last_seen_at,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: LocalId) -> Result<Option<Award>> {
        self.get_where("local_id = ?", params![id.as_str()])
    }

    fn get_by_remote_id(&self, remote_id: RemoteId) -> Result<Option<Award>> {
        self.get_where("remote_id = ?", params![remote_id.as_i64()])
    }

    fn update(&self, record: &Award) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE awards
             SET name = ?, tournament_local_id = ?, player_local_id = ?,
                 is_active = ?, updated_at = ?, last_seen_at = ?
             WHERE local_id = ?",
            params![
                record.name,
                record.tournament_local_id.map(|id| id.as_str()),
                record.player_local_id.map(|id| id.as_str()),
                i32::from(record.is_active),
                record.updated_at,
                record.last_seen_at,
                record.local_id.as_str(),
            ],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(format!(
                "awards record {}",
                record.local_id
            )));
        }
        Ok(())
    }
}
