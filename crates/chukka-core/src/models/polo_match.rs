//! Match model and wire mapping
//!
//! The wire schema names the sides `team1`/`team2`; locally they are home
//! and away. Matches are the only kind pulled per tournament rather than
//! from a flat collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::api::ListShape;
use crate::error::{Error, Result};
use crate::models::{DeletePolicy, EntityKind, Field, LocalId, RemoteId, Team, Tournament};
use crate::sync::{MapOutcome, Relations, SyncEntity};

/// Lifecycle state of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    InProgress,
    Finished,
    Cancelled,
}

impl MatchStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::InProgress => "in_progress",
            Self::Finished => "finished",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "in_progress" => Ok(Self::InProgress),
            "finished" => Ok(Self::Finished),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(Error::InvalidInput(format!(
                "unknown match status: {other}"
            ))),
        }
    }
}

/// A match as stored locally. Hard-deleted; owned children (duties,
/// participations) go with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub local_id: LocalId,
    pub remote_id: Option<RemoteId>,
    /// Owning tournament; a match cannot exist without one
    pub tournament_local_id: LocalId,
    pub home_team_local_id: Option<LocalId>,
    pub away_team_local_id: Option<LocalId>,
    pub field_local_id: Option<LocalId>,
    pub starts_at: Option<DateTime<Utc>>,
    pub home_score: i32,
    pub away_score: i32,
    pub status: MatchStatus,
    pub created_at: i64,
    pub updated_at: i64,
    pub last_seen_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tournament_id: Option<RemoteId>,
    #[serde(rename = "team1_id", skip_serializing_if = "Option::is_none")]
    pub home_team_id: Option<RemoteId>,
    #[serde(rename = "team2_id", skip_serializing_if = "Option::is_none")]
    pub away_team_id: Option<RemoteId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_id: Option<RemoteId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(rename = "score1", skip_serializing_if = "Option::is_none")]
    pub home_score: Option<i32>,
    #[serde(rename = "score2", skip_serializing_if = "Option::is_none")]
    pub away_score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MatchStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchDto {
    pub id: RemoteId,
    #[serde(flatten)]
    pub fields: MatchFields,
}

struct ResolvedRefs {
    tournament: Option<LocalId>,
    home_team: Option<LocalId>,
    away_team: Option<LocalId>,
    field: Option<LocalId>,
}

impl Match {
    /// Create a local-only match. The tournament reference is mandatory;
    /// teams may be attached later.
    pub fn new_local(fields: &MatchFields, now_ms: i64, relations: &Relations<'_>) -> Result<Self> {
        let tournament = relations
            .resolve_input_ref(Tournament::TABLE, "tournament", fields.tournament_id)?
            .ok_or_else(|| {
                Error::InvalidInput("a match requires a tournament_id".to_string())
            })?;
        let refs = ResolvedRefs {
            tournament: Some(tournament),
            home_team: relations.resolve_input_ref(Team::TABLE, "team1", fields.home_team_id)?,
            away_team: relations.resolve_input_ref(Team::TABLE, "team2", fields.away_team_id)?,
            field: relations.resolve_input_ref(Field::TABLE, "field", fields.field_id)?,
        };
        let mut game = Self::with_defaults(tournament, now_ms);
        game.apply(fields, &refs, now_ms);
        Ok(game)
    }

    pub fn apply_edit(
        &mut self,
        fields: &MatchFields,
        now_ms: i64,
        relations: &Relations<'_>,
    ) -> Result<()> {
        let refs = ResolvedRefs {
            tournament: relations.resolve_input_ref(
                Tournament::TABLE,
                "tournament",
                fields.tournament_id,
            )?,
            home_team: relations.resolve_input_ref(Team::TABLE, "team1", fields.home_team_id)?,
            away_team: relations.resolve_input_ref(Team::TABLE, "team2", fields.away_team_id)?,
            field: relations.resolve_input_ref(Field::TABLE, "field", fields.field_id)?,
        };
        self.apply(fields, &refs, now_ms);
        Ok(())
    }

    fn resolve(fields: &MatchFields, relations: &Relations<'_>) -> Result<MapOutcome<ResolvedRefs>> {
        let tournament =
            match relations.resolve_ref(Tournament::TABLE, "tournament", fields.tournament_id)? {
                MapOutcome::Applied(tournament) => tournament,
                MapOutcome::Unresolved(reason) => return Ok(MapOutcome::Unresolved(reason)),
            };
        let home_team = match relations.resolve_ref(Team::TABLE, "team1", fields.home_team_id)? {
            MapOutcome::Applied(team) => team,
            MapOutcome::Unresolved(reason) => return Ok(MapOutcome::Unresolved(reason)),
        };
        let away_team = match relations.resolve_ref(Team::TABLE, "team2", fields.away_team_id)? {
            MapOutcome::Applied(team) => team,
            MapOutcome::Unresolved(reason) => return Ok(MapOutcome::Unresolved(reason)),
        };
        let field = match relations.resolve_ref(Field::TABLE, "field", fields.field_id)? {
            MapOutcome::Applied(field) => field,
            MapOutcome::Unresolved(reason) => return Ok(MapOutcome::Unresolved(reason)),
        };
        Ok(MapOutcome::Applied(ResolvedRefs {
            tournament,
            home_team,
            away_team,
            field,
        }))
    }

    fn with_defaults(tournament: LocalId, now_ms: i64) -> Self {
        Self {
            local_id: LocalId::new(),
            remote_id: None,
            tournament_local_id: tournament,
            home_team_local_id: None,
            away_team_local_id: None,
            field_local_id: None,
            starts_at: None,
            home_score: 0,
            away_score: 0,
            status: MatchStatus::default(),
            created_at: now_ms,
            updated_at: now_ms,
            last_seen_at: None,
        }
    }

    fn apply(&mut self, fields: &MatchFields, refs: &ResolvedRefs, now_ms: i64) {
        if let Some(tournament) = refs.tournament {
            self.tournament_local_id = tournament;
        }
        if let Some(team) = refs.home_team {
            self.home_team_local_id = Some(team);
        }
        if let Some(team) = refs.away_team {
            self.away_team_local_id = Some(team);
        }
        if let Some(field) = refs.field {
            self.field_local_id = Some(field);
        }
        if let Some(starts_at) = fields.starts_at {
            self.starts_at = Some(starts_at);
        }
        if let Some(score) = fields.home_score {
            self.home_score = score;
        }
        if let Some(score) = fields.away_score {
            self.away_score = score;
        }
        if let Some(status) = fields.status {
            self.status = status;
        }
        self.updated_at = now_ms;
    }
}

impl SyncEntity for Match {
    type Dto = MatchDto;

    const KIND: EntityKind = EntityKind::Match;
    const COLLECTION: &'static str = "matches";
    const TABLE: &'static str = "matches";
    const LIST_SHAPE: ListShape = ListShape::Bare;
    const DELETE_POLICY: DeletePolicy = DeletePolicy::Hard;

    fn local_id(&self) -> LocalId {
        self.local_id
    }

    fn remote_id(&self) -> Option<RemoteId> {
        self.remote_id
    }

    fn remote_id_of(dto: &MatchDto) -> RemoteId {
        dto.id
    }

    fn from_remote(
        dto: &MatchDto,
        now_ms: i64,
        relations: &Relations<'_>,
    ) -> Result<MapOutcome<Self>> {
        let refs = match Self::resolve(&dto.fields, relations)? {
            MapOutcome::Applied(refs) => refs,
            MapOutcome::Unresolved(reason) => return Ok(MapOutcome::Unresolved(reason)),
        };
        let Some(tournament) = refs.tournament else {
            return Ok(MapOutcome::Unresolved(format!(
                "match {} carries no tournament reference",
                dto.id
            )));
        };
        let mut game = Self::with_defaults(tournament, now_ms);
        game.remote_id = Some(dto.id);
        game.apply(&dto.fields, &refs, now_ms);
        game.last_seen_at = Some(now_ms);
        Ok(MapOutcome::Applied(game))
    }

    fn merge_remote(
        &mut self,
        dto: &MatchDto,
        now_ms: i64,
        relations: &Relations<'_>,
    ) -> Result<MapOutcome<()>> {
        let refs = match Self::resolve(&dto.fields, relations)? {
            MapOutcome::Applied(refs) => refs,
            MapOutcome::Unresolved(reason) => return Ok(MapOutcome::Unresolved(reason)),
        };
        self.apply(&dto.fields, &refs, now_ms);
        self.last_seen_at = Some(now_ms);
        Ok(MapOutcome::Applied(()))
    }

    fn push_payload(&self, relations: &Relations<'_>) -> Result<serde_json::Value> {
        let fields = MatchFields {
            tournament_id: Some(relations.required_payload_ref(
                Tournament::TABLE,
                "tournament",
                Some(self.tournament_local_id),
            )?),
            home_team_id: Some(relations.required_payload_ref(
                Team::TABLE,
                "team1",
                self.home_team_local_id,
            )?),
            away_team_id: Some(relations.required_payload_ref(
                Team::TABLE,
                "team2",
                self.away_team_local_id,
            )?),
            field_id: relations.payload_ref(Field::TABLE, "field", self.field_local_id)?,
            starts_at: self.starts_at,
            home_score: Some(self.home_score),
            away_score: Some(self.away_score),
            status: Some(self.status),
        };
        Ok(serde_json::to_value(fields)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_round_trips_wire_names() {
        for status in [
            MatchStatus::Scheduled,
            MatchStatus::InProgress,
            MatchStatus::Finished,
            MatchStatus::Cancelled,
        ] {
            let wire = serde_json::to_string(&status).unwrap();
            assert_eq!(wire, format!("\"{status}\""));
            let parsed: MatchStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn unknown_status_is_rejected_at_decode() {
        let result = serde_json::from_str::<MatchDto>(
            r#"{"id": 1, "tournament_id": 7, "status": "postponed"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn wire_names_map_to_home_and_away() {
        let dto: MatchDto = serde_json::from_str(
            r#"{"id": 5, "tournament_id": 7, "team1_id": 11, "team2_id": 12,
                "score1": 8, "score2": 6, "status": "finished"}"#,
        )
        .unwrap();
        assert_eq!(dto.fields.home_team_id, Some(RemoteId::new(11)));
        assert_eq!(dto.fields.away_team_id, Some(RemoteId::new(12)));
        assert_eq!(dto.fields.home_score, Some(8));
        assert_eq!(dto.fields.away_score, Some(6));
    }

    #[test]
    fn starts_at_round_trips_iso_datetime() {
        let fields = MatchFields {
            starts_at: Some("2025-03-01T14:30:00Z".parse().unwrap()),
            ..MatchFields::default()
        };
        let wire = serde_json::to_string(&fields).unwrap();
        let back: MatchFields = serde_json::from_str(&wire).unwrap();
        assert_eq!(back.starts_at, fields.starts_at);
    }
}
