//! User storage
//!
//! Rows appear here when an account signs in on this device; there is no
//! user collection to pull.

use rusqlite::{params, Connection, Row};

use crate::error::{Error, Result};
use crate::models::{LocalId, RemoteId, User, UserDto};
use crate::store;

pub struct UserStore<'a> {
    conn: &'a Connection,
}

impl<'a> UserStore<'a> {
    #[must_use]
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Mirror an auth response's user object: update the existing row for
    /// this remote id, or insert one.
    pub fn upsert_from_dto(&self, dto: &UserDto, now_ms: i64) -> Result<User> {
        if let Some(mut existing) = self.get_by_remote_id(dto.id)? {
            existing.merge_dto(dto, now_ms);
            self.update(&existing)?;
            return Ok(existing);
        }
        let user = User::from_dto(dto, now_ms);
        self.insert(&user)?;
        Ok(user)
    }

    pub fn insert(&self, record: &User) -> Result<()> {
        self.conn.execute(
            "INSERT INTO users (local_id, remote_id, email, display_name,
                                created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                record.local_id.as_str(),
                record.remote_id.as_i64(),
                record.email,
                record.display_name,
                record.created_at,
                record.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, id: LocalId) -> Result<Option<User>> {
        self.get_where("local_id = ?", params![id.as_str()])
    }

    pub fn get_by_remote_id(&self, remote_id: RemoteId) -> Result<Option<User>> {
        self.get_where("remote_id = ?", params![remote_id.as_i64()])
    }

    pub fn update(&self, record: &User) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE users SET email = ?, display_name = ?, updated_at = ?
             WHERE local_id = ?",
            params![
                record.email,
                record.display_name,
                record.updated_at,
                record.local_id.as_str(),
            ],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(format!("users record {}", record.local_id)));
        }
        Ok(())
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<User> {
        let local_id: String = row.get(0)?;
        Ok(User {
            local_id: store::parse_local_id(0, &local_id)?,
            remote_id: RemoteId::new(row.get(1)?),
            email: row.get(2)?,
            display_name: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    fn get_where<P: rusqlite::Params>(&self, clause: &str, params: P) -> Result<Option<User>> {
        let sql = format!(
            "SELECT local_id, remote_id, email, display_name, created_at, updated_at
             FROM users WHERE {clause}"
        );
        let result = self.conn.query_row(&sql, params, Self::from_row);
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Database;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_upsert_is_stable_per_remote_id() {
        let db = Database::open_in_memory().unwrap();
        let repo = UserStore::new(db.connection());

        let first = repo
            .upsert_from_dto(
                &UserDto {
                    id: RemoteId::new(3),
                    email: "ana@example.com".to_string(),
                    display_name: None,
                },
                1_000,
            )
            .unwrap();

        let second = repo
            .upsert_from_dto(
                &UserDto {
                    id: RemoteId::new(3),
                    email: "ana@example.com".to_string(),
                    display_name: Some("Ana".to_string()),
                },
                2_000,
            )
            .unwrap();

        // Same local row, refreshed fields
        assert_eq!(second.local_id, first.local_id);
        assert_eq!(second.display_name.as_deref(), Some("Ana"));

        let count: i64 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
