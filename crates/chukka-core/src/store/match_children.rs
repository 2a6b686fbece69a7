//! Storage for local-only match children: duties and participations

use rusqlite::{params, Connection, Row};

use crate::error::{Error, Result};
use crate::models::{Duty, LocalId, Participation, RemoteId};
use crate::store;

pub struct DutyStore<'a> {
    conn: &'a Connection,
}

impl<'a> DutyStore<'a> {
    #[must_use]
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, record: &Duty) -> Result<()> {
        self.conn.execute(
            "INSERT INTO duties (local_id, remote_id, match_local_id, player_local_id,
                                 role, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                record.local_id.as_str(),
                record.remote_id.map(|id| id.as_i64()),
                record.match_local_id.as_str(),
                record.player_local_id.map(|id| id.as_str()),
                record.role,
                record.created_at,
                record.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, id: LocalId) -> Result<Option<Duty>> {
        let result = self.conn.query_row(
            "SELECT local_id, remote_id, match_local_id, player_local_id,
                    role, created_at, updated_at
             FROM duties WHERE local_id = ?",
            params![id.as_str()],
            Self::from_row,
        );
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_for_match(&self, game: LocalId) -> Result<Vec<Duty>> {
        let mut stmt = self.conn.prepare(
            "SELECT local_id, remote_id, match_local_id, player_local_id,
                    role, created_at, updated_at
             FROM duties WHERE match_local_id = ?
             ORDER BY role COLLATE NOCASE ASC",
        )?;
        let records = stmt
            .query_map(params![game.as_str()], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    pub fn update(&self, record: &Duty) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE duties
             SET match_local_id = ?, player_local_id = ?, role = ?, updated_at = ?
             WHERE local_id = ?",
            params![
                record.match_local_id.as_str(),
                record.player_local_id.map(|id| id.as_str()),
                record.role,
                record.updated_at,
                record.local_id.as_str(),
            ],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(format!(
                "duties record {}",
                record.local_id
            )));
        }
        Ok(())
    }

    pub fn delete(&self, id: LocalId) -> Result<()> {
        store::hard_delete(self.conn, "duties", id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Duty> {
        let local_id: String = row.get(0)?;
        let match_id: String = row.get(2)?;
        Ok(Duty {
            local_id: store::parse_local_id(0, &local_id)?,
            remote_id: row.get::<_, Option<i64>>(1)?.map(RemoteId::from),
            match_local_id: store::parse_local_id(2, &match_id)?,
            player_local_id: store::parse_opt_local_id(3, row.get(3)?)?,
            role: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

pub struct ParticipationStore<'a> {
    conn: &'a Connection,
}

impl<'a> ParticipationStore<'a> {
    #[must_use]
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, record: &Participation) -> Result<()> {
        self.conn.execute(
            "INSERT INTO participations (local_id, remote_id, match_local_id,
                                         player_local_id, team_local_id, horse_local_id,
                                         position, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                record.local_id.as_str(),
                record.remote_id.map(|id| id.as_i64()),
                record.match_local_id.as_str(),
                record.player_local_id.as_str(),
                record.team_local_id.map(|id| id.as_str()),
                record.horse_local_id.map(|id| id.as_str()),
                record.position,
                record.created_at,
                record.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, id: LocalId) -> Result<Option<Participation>> {
        let result = self.conn.query_row(
            "SELECT local_id, remote_id, match_local_id, player_local_id, team_local_id,
                    horse_local_id, position, created_at, updated_at
             FROM participations WHERE local_id = ?",
            params![id.as_str()],
            Self::from_row,
        );
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_for_match(&self, game: LocalId) -> Result<Vec<Participation>> {
        let mut stmt = self.conn.prepare(
            "SELECT local_id, remote_id, match_local_id, player_local_id, team_local_id,
                    horse_local_id, position, created_at, updated_at
             FROM participations WHERE match_local_id = ?
             ORDER BY position IS NULL, position ASC",
        )?;
        let records = stmt
            .query_map(params![game.as_str()], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    pub fn update(&self, record: &Participation) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE participations
             SET match_local_id = ?, player_local_id = ?, team_local_id = ?,
                 horse_local_id = ?, position = ?, updated_at = ?
             WHERE local_id = ?",
            params![
                record.match_local_id.as_str(),
                record.player_local_id.as_str(),
                record.team_local_id.map(|id| id.as_str()),
                record.horse_local_id.map(|id| id.as_str()),
                record.position,
                record.updated_at,
                record.local_id.as_str(),
            ],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(format!(
                "participations record {}",
                record.local_id
            )));
        }
        Ok(())
    }

    pub fn delete(&self, id: LocalId) -> Result<()> {
        store::hard_delete(self.conn, "participations", id)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Participation> {
        let local_id: String = row.get(0)?;
        let match_id: String = row.get(2)?;
        let player_id: String = row.get(3)?;
        Ok(Participation {
            local_id: store::parse_local_id(0, &local_id)?,
            remote_id: row.get::<_, Option<i64>>(1)?.map(RemoteId::from),
            match_local_id: store::parse_local_id(2, &match_id)?,
            player_local_id: store::parse_local_id(3, &player_id)?,
            team_local_id: store::parse_opt_local_id(4, row.get(4)?)?,
            horse_local_id: store::parse_opt_local_id(5, row.get(5)?)?,
            position: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        DutyFields, Match, MatchFields, ParticipationFields, Player, PlayerFields, RemoteId,
        Tournament, TournamentFields,
    };
    use crate::store::{Database, EntityStore, MatchStore, PlayerStore, TournamentStore};
    use crate::sync::Relations;
    use pretty_assertions::assert_eq;

    fn setup_match(db: &Database) -> Match {
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
        MatchStore::new(db.connection()).insert(&game).unwrap();
        game
    }

    #[test]
    fn test_duty_lifecycle_and_cascade() {
        let db = Database::open_in_memory().unwrap();
        let game = setup_match(&db);
        let repo = DutyStore::new(db.connection());

        let duty = Duty::new_local(
            &DutyFields {
                match_id: Some(game.local_id),
                role: Some("umpire".to_string()),
                ..DutyFields::default()
            },
            1_000,
        )
        .unwrap();
        repo.insert(&duty).unwrap();
        assert_eq!(repo.list_for_match(game.local_id).unwrap().len(), 1);

        MatchStore::new(db.connection())
            .delete(game.local_id)
            .unwrap();
        assert!(repo.get(duty.local_id).unwrap().is_none());
    }

    #[test]
    fn test_participation_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let game = setup_match(&db);

        let relations = Relations::new(db.connection());
        let player = Player::new_local(
            &PlayerFields {
                first_name: Some("Adolfo".to_string()),
                last_name: Some("Cambiaso".to_string()),
                ..PlayerFields::default()
            },
            1_000,
            &relations,
        )
        .unwrap();
        PlayerStore::new(db.connection()).insert(&player).unwrap();

        let repo = ParticipationStore::new(db.connection());
        let participation = Participation::new_local(
            &ParticipationFields {
                match_id: Some(game.local_id),
                player_id: Some(player.local_id),
                position: Some(1),
                ..ParticipationFields::default()
            },
            1_000,
        )
        .unwrap();
        repo.insert(&participation).unwrap();

        let fetched = repo.get(participation.local_id).unwrap().unwrap();
        assert_eq!(fetched, participation);
        assert_eq!(fetched.position, Some(1));
    }
}
