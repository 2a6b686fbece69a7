//! Match storage
//!
//! Matches are hard-deleted; duties and participations hanging off a match
//! are destroyed with it via FK cascade.

use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};

use crate::error::{Error, Result};
use crate::models::{LocalId, Match, RemoteId};
use crate::store::{self, EntityStore};
use crate::sync::SyncEntity;

pub struct MatchStore<'a> {
    conn: &'a Connection,
}

impl<'a> MatchStore<'a> {
    #[must_use]
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// All matches, scheduled ones first in start order, unscheduled last.
    pub fn list(&self) -> Result<Vec<Match>> {
        let mut stmt = self.conn.prepare(
            "SELECT local_id, remote_id, tournament_local_id, home_team_local_id,
                    away_team_local_id, field_local_id, starts_at, home_score,
                    away_score, status, created_at, updated_at, last_seen_at
             FROM matches
             ORDER BY starts_at IS NULL, starts_at ASC",
        )?;
        let records = stmt
            .query_map([], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    pub fn list_by_tournament(&self, tournament: LocalId) -> Result<Vec<Match>> {
        let mut stmt = self.conn.prepare(
            "SELECT local_id, remote_id, tournament_local_id, home_team_local_id,
                    away_team_local_id, field_local_id, starts_at, home_score,
                    away_score, status, created_at, updated_at, last_seen_at
             FROM matches
             WHERE tournament_local_id = ?
             ORDER BY starts_at IS NULL, starts_at ASC",
        )?;
        let records = stmt
            .query_map(params![tournament.as_str()], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    pub fn delete(&self, id: LocalId) -> Result<()> {
        store::hard_delete(self.conn, Match::TABLE, id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Match> {
        let local_id: String = row.get(0)?;
        let tournament: String = row.get(2)?;
        let starts_at: Option<String> = row.get(6)?;
        let status: String = row.get(9)?;
        Ok(Match {
            local_id: store::parse_local_id(0, &local_id)?,
            remote_id: row.get::<_, Option<i64>>(1)?.map(RemoteId::from),
            tournament_local_id: store::parse_local_id(2, &tournament)?,
            home_team_local_id: store::parse_opt_local_id(3, row.get(3)?)?,
            away_team_local_id: store::parse_opt_local_id(4, row.get(4)?)?,
            field_local_id: store::parse_opt_local_id(5, row.get(5)?)?,
            starts_at: starts_at
                .map(|v| store::parse_datetime_utc(6, &v))
                .transpose()?,
            home_score: row.get(7)?,
            away_score: row.get(8)?,
            status: status
                .parse()
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)))?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
            last_seen_at: row.get(12)?,
        })
    }

    fn get_where<P: rusqlite::Params>(&self, clause: &str, params: P) -> Result<Option<Match>> {
        let sql = format!(
            "SELECT local_id, remote_id, tournament_local_id, home_team_local_id,
                    away_team_local_id, field_local_id, starts_at, home_score,
                    away_score, status, created_at, updated_at, last_seen_at
             FROM matches WHERE {clause}"
        );
        let result = self.conn.query_row(&sql, params, Self::from_row);
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl EntityStore<Match> for MatchStore<'_> {
    fn insert(&self, record: &Match) -> Result<()> {
        self.conn.execute(
            "INSERT INTO matches (local_id, remote_id, tournament_local_id,
                                  home_team_local_id, away_team_local_id, field_local_id,
                                  starts_at, home_score, away_score, status,
                                  created_at, updated_at, last_seen_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                record.local_id.as_str(),
                record.remote_id.map(|id| id.as_i64()),
                record.tournament_local_id.as_str(),
                record.home_team_local_id.map(|id| id.as_str()),
                record.away_team_local_id.map(|id| id.as_str()),
                record.field_local_id.map(|id| id.as_str()),
                record.starts_at.map(|dt| dt.to_rfc3339()),
                record.home_score,
                record.away_score,
                record.status.as_str(),
                record.created_at,
                record.updated_at,
                record.last_seen_at,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: LocalId) -> Result<Option<Match>> {
        self.get_where("local_id = ?", params![id.as_str()])
    }

    fn get_by_remote_id(&self, remote_id: RemoteId) -> Result<Option<Match>> {
        self.get_where("remote_id = ?", params![remote_id.as_i64()])
    }

    fn update(&self, record: &Match) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE matches
             SET tournament_local_id = ?, home_team_local_id = ?, away_team_local_id = ?,
                 field_local_id = ?, starts_at = ?, home_score = ?, away_score = ?,
                 status = ?, updated_at = ?, last_seen_at = ?
             WHERE local_id = ?",
            params![
                record.tournament_local_id.as_str(),
                record.home_team_local_id.map(|id| id.as_str()),
                record.away_team_local_id.map(|id| id.as_str()),
                record.field_local_id.map(|id| id.as_str()),
                record.starts_at.map(|dt| dt.to_rfc3339()),
                record.home_score,
                record.away_score,
                record.status.as_str(),
                record.updated_at,
                record.last_seen_at,
                record.local_id.as_str(),
            ],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(format!(
                "matches record {}",
                record.local_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        MatchFields, MatchStatus, Tournament, TournamentFields,
    };
    use crate::store::{Database, TournamentStore};
    use crate::sync::Relations;
    use pretty_assertions::assert_eq;

    fn setup_with_tournament() -> (Database, Tournament) {
        let db = Database::open_in_memory().unwrap();
        let tournaments = TournamentStore::new(db.connection());
        let mut tournament = Tournament::new_local(
            &TournamentFields {
                name: Some("Spring Cup".to_string()),
                ..TournamentFields::default()
            },
            1_000,
        )
        .unwrap();
        tournament.remote_id = Some(RemoteId::new(7));
        tournaments.insert(&tournament).unwrap();
        (db, tournament)
    }

    #[test]
    fn test_round_trip_with_status_and_times() {
        let (db, tournament) = setup_with_tournament();
        let repo = MatchStore::new(db.connection());
        let relations = Relations::new(db.connection());

        let mut game = Match::new_local(
            &MatchFields {
                tournament_id: Some(RemoteId::new(7)),
                starts_at: Some("2025-03-01T14:30:00Z".parse().unwrap()),
                ..MatchFields::default()
            },
            1_000,
            &relations,
        )
        .unwrap();
        game.status = MatchStatus::InProgress;
        game.home_score = 5;
        repo.insert(&game).unwrap();

        let fetched = repo.get(game.local_id).unwrap().unwrap();
        assert_eq!(fetched, game);
        assert_eq!(fetched.tournament_local_id, tournament.local_id);
        assert_eq!(fetched.status, MatchStatus::InProgress);
    }

    #[test]
    fn test_list_by_tournament_and_cascade() {
        let (db, tournament) = setup_with_tournament();
        let repo = MatchStore::new(db.connection());
        let relations = Relations::new(db.connection());

        let game = Match::new_local(
            &MatchFields {
                tournament_id: Some(RemoteId::new(7)),
                ..MatchFields::default()
            },
            1_000,
            &relations,
        )
        .unwrap();
        repo.insert(&game).unwrap();

        assert_eq!(repo.list_by_tournament(tournament.local_id).unwrap().len(), 1);

        // Hard-deleting the tournament row takes its matches with it
        db.connection()
            .execute(
                "DELETE FROM tournaments WHERE local_id = ?",
                params![tournament.local_id.as_str()],
            )
            .unwrap();
        assert!(repo.get(game.local_id).unwrap().is_none());
    }
}
