//! Match participations: which player rode which horse for which team
//!
//! Like duties these are local-only children of a match; the API never
//! returns or accepts them. `position` is the shirt number (1 through 4)
//! when known.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{LocalId, RemoteId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participation {
    pub local_id: LocalId,
    pub remote_id: Option<RemoteId>,
    pub match_local_id: LocalId,
    pub player_local_id: LocalId,
    pub team_local_id: Option<LocalId>,
    pub horse_local_id: Option<LocalId>,
    pub position: Option<i32>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_id: Option<LocalId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<LocalId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<LocalId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horse_id: Option<LocalId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
}

fn validate_position(position: i32) -> Result<i32> {
    if (1..=4).contains(&position) {
        Ok(position)
    } else {
        Err(Error::InvalidInput(format!(
            "position must be between 1 and 4, got {position}"
        )))
    }
}

impl Participation {
    pub fn new_local(fields: &ParticipationFields, now_ms: i64) -> Result<Self> {
        let match_local_id = fields.match_id.ok_or_else(|| {
            Error::InvalidInput("a participation requires a match_id".to_string())
        })?;
        let player_local_id = fields.player_id.ok_or_else(|| {
            Error::InvalidInput("a participation requires a player_id".to_string())
        })?;
        let position = fields.position.map(validate_position).transpose()?;
        Ok(Self {
            local_id: LocalId::new(),
            remote_id: None,
            match_local_id,
            player_local_id,
            team_local_id: fields.team_id,
            horse_local_id: fields.horse_id,
            position,
            created_at: now_ms,
            updated_at: now_ms,
        })
    }

    pub fn apply_edit(&mut self, fields: &ParticipationFields, now_ms: i64) -> Result<()> {
        if let Some(match_id) = fields.match_id {
            self.match_local_id = match_id;
        }
        if let Some(player_id) = fields.player_id {
            self.player_local_id = player_id;
        }
        if let Some(team_id) = fields.team_id {
            self.team_local_id = Some(team_id);
        }
        if let Some(horse_id) = fields.horse_id {
            self.horse_local_id = Some(horse_id);
        }
        if let Some(position) = fields.position {
            self.position = Some(validate_position(position)?);
        }
        self.updated_at = now_ms;
        Ok(())
    }
}
