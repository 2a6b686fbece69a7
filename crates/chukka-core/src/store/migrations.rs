//! Database migrations

use crate::error::Result;
use rusqlite::Connection;

/// Current schema version
const CURRENT_VERSION: i32 = 2;

/// Run all pending migrations
pub fn run(conn: &mut Connection) -> Result<()> {
    let version = get_version(conn)?;

    if version < 1 {
        migrate_v1(conn)?;
    }
    if version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

/// Get the current schema version
fn get_version(conn: &Connection) -> Result<i32> {
    let exists: i32 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if exists == 0 {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;

    Ok(version)
}

/// Migration to version 1: Initial schema
///
/// One table per entity kind. `local_id` is the primary key everywhere;
/// `remote_id` is the unique server-issued join key, null until first push
/// or pull. Relationships reference `local_id` columns: non-owning
/// associations nullify on delete, owned children (tournament -> matches,
/// match -> duties/participations) cascade.
fn migrate_v1(conn: &mut Connection) -> Result<()> {
    let statements = [
        // Schema version tracking
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        // Users are mirrored from auth responses, never synced as a collection
        "CREATE TABLE IF NOT EXISTS users (
            local_id TEXT PRIMARY KEY,
            remote_id INTEGER NOT NULL UNIQUE,
            email TEXT NOT NULL,
            display_name TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS clubs (
            local_id TEXT PRIMARY KEY,
            remote_id INTEGER UNIQUE,
            name TEXT NOT NULL,
            city TEXT,
            country TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS breeders (
            local_id TEXT PRIMARY KEY,
            remote_id INTEGER UNIQUE,
            name TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS fields (
            local_id TEXT PRIMARY KEY,
            remote_id INTEGER UNIQUE,
            name TEXT NOT NULL,
            location TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        // Teams are hard-deleted, hence no is_active column
        "CREATE TABLE IF NOT EXISTS teams (
            local_id TEXT PRIMARY KEY,
            remote_id INTEGER UNIQUE,
            name TEXT NOT NULL,
            club_local_id TEXT REFERENCES clubs(local_id) ON DELETE SET NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS tournaments (
            local_id TEXT PRIMARY KEY,
            remote_id INTEGER UNIQUE,
            name TEXT NOT NULL,
            location TEXT NOT NULL DEFAULT '',
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS players (
            local_id TEXT PRIMARY KEY,
            remote_id INTEGER UNIQUE,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            handicap INTEGER NOT NULL DEFAULT 0,
            club_local_id TEXT REFERENCES clubs(local_id) ON DELETE SET NULL,
            user_local_id TEXT REFERENCES users(local_id) ON DELETE SET NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS horses (
            local_id TEXT PRIMARY KEY,
            remote_id INTEGER UNIQUE,
            name TEXT NOT NULL,
            birth_date TEXT,
            breeder_local_id TEXT REFERENCES breeders(local_id) ON DELETE SET NULL,
            owner_local_id TEXT REFERENCES players(local_id) ON DELETE SET NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS awards (
            local_id TEXT PRIMARY KEY,
            remote_id INTEGER UNIQUE,
            name TEXT NOT NULL,
            tournament_local_id TEXT REFERENCES tournaments(local_id) ON DELETE SET NULL,
            player_local_id TEXT REFERENCES players(local_id) ON DELETE SET NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        // Matches are hard-deleted and destroyed with their tournament
        "CREATE TABLE IF NOT EXISTS matches (
            local_id TEXT PRIMARY KEY,
            remote_id INTEGER UNIQUE,
            tournament_local_id TEXT NOT NULL
                REFERENCES tournaments(local_id) ON DELETE CASCADE,
            home_team_local_id TEXT REFERENCES teams(local_id) ON DELETE SET NULL,
            away_team_local_id TEXT REFERENCES teams(local_id) ON DELETE SET NULL,
            field_local_id TEXT REFERENCES fields(local_id) ON DELETE SET NULL,
            starts_at TEXT,
            home_score INTEGER NOT NULL DEFAULT 0,
            away_score INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'scheduled',
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_matches_tournament ON matches(tournament_local_id)",
        "CREATE INDEX IF NOT EXISTS idx_matches_starts ON matches(starts_at)",
        // Local-only children of matches; remote_id kept for schema
        // uniformity, the API has no endpoints for these
        "CREATE TABLE IF NOT EXISTS duties (
            local_id TEXT PRIMARY KEY,
            remote_id INTEGER UNIQUE,
            match_local_id TEXT NOT NULL
                REFERENCES matches(local_id) ON DELETE CASCADE,
            player_local_id TEXT REFERENCES players(local_id) ON DELETE SET NULL,
            role TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_duties_match ON duties(match_local_id)",
        "CREATE TABLE IF NOT EXISTS participations (
            local_id TEXT PRIMARY KEY,
            remote_id INTEGER UNIQUE,
            match_local_id TEXT NOT NULL
                REFERENCES matches(local_id) ON DELETE CASCADE,
            player_local_id TEXT NOT NULL
                REFERENCES players(local_id) ON DELETE CASCADE,
            team_local_id TEXT REFERENCES teams(local_id) ON DELETE SET NULL,
            horse_local_id TEXT REFERENCES horses(local_id) ON DELETE SET NULL,
            position INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_participations_match ON participations(match_local_id)",
        // Record migration version
        "INSERT INTO schema_version (version) VALUES (1)",
    ];

    let tx = conn.transaction()?;
    for stmt in statements {
        tx.execute(stmt, [])?;
    }
    tx.commit()?;

    tracing::info!("Migrated database to version 1");
    Ok(())
}

/// Migration to version 2: pull staleness tracking
///
/// `last_seen_at` records the most recent pull that returned the record;
/// records a pull has not returned for a while can be retired explicitly.
fn migrate_v2(conn: &mut Connection) -> Result<()> {
    let statements = [
        "ALTER TABLE clubs ADD COLUMN last_seen_at INTEGER",
        "ALTER TABLE breeders ADD COLUMN last_seen_at INTEGER",
        "ALTER TABLE fields ADD COLUMN last_seen_at INTEGER",
        "ALTER TABLE teams ADD COLUMN last_seen_at INTEGER",
        "ALTER TABLE tournaments ADD COLUMN last_seen_at INTEGER",
        "ALTER TABLE players ADD COLUMN last_seen_at INTEGER",
        "ALTER TABLE horses ADD COLUMN last_seen_at INTEGER",
        "ALTER TABLE awards ADD COLUMN last_seen_at INTEGER",
        "ALTER TABLE matches ADD COLUMN last_seen_at INTEGER",
        "INSERT INTO schema_version (version) VALUES (2)",
    ];

    let tx = conn.transaction()?;
    for stmt in statements {
        tx.execute(stmt, [])?;
    }
    tx.commit()?;

    tracing::info!("Migrated database to version {CURRENT_VERSION}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Connection {
        Connection::open_in_memory().unwrap()
    }

    #[test]
    fn test_migrations() {
        let mut conn = setup();
        run(&mut conn).unwrap();

        let version = get_version(&conn).unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_migrations_idempotent() {
        let mut conn = setup();
        run(&mut conn).unwrap();
        run(&mut conn).unwrap(); // Should not fail

        let version = get_version(&conn).unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_all_entity_tables_exist() {
        let mut conn = setup();
        run(&mut conn).unwrap();

        for table in [
            "users",
            "clubs",
            "breeders",
            "fields",
            "teams",
            "tournaments",
            "players",
            "horses",
            "awards",
            "matches",
            "duties",
            "participations",
        ] {
            let exists: i32 = conn
                .query_row(
                    "SELECT EXISTS(
                        SELECT 1 FROM sqlite_master
                        WHERE type = 'table' AND name = ?
                    )",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(exists, 1, "missing table {table}");
        }
    }
}
