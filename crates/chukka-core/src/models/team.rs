//! Team model and wire mapping

use serde::{Deserialize, Serialize};

use crate::api::ListShape;
use crate::error::{Error, Result};
use crate::models::{Club, DeletePolicy, EntityKind, LocalId, RemoteId};
use crate::sync::{MapOutcome, Relations, SyncEntity};
use crate::util::normalize_text_option;

/// A team as stored locally. Teams are hard-deleted, so there is no
/// `is_active` flag on this kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub local_id: LocalId,
    pub remote_id: Option<RemoteId>,
    pub name: String,
    pub club_local_id: Option<LocalId>,
    pub created_at: i64,
    pub updated_at: i64,
    pub last_seen_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Remote id of the club this team belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_id: Option<RemoteId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamDto {
    pub id: RemoteId,
    #[serde(flatten)]
    pub fields: TeamFields,
}

impl Team {
    pub fn new_local(fields: &TeamFields, now_ms: i64, relations: &Relations<'_>) -> Result<Self> {
        if normalize_text_option(fields.name.clone()).is_none() {
            return Err(Error::InvalidInput("team name must not be empty".to_string()));
        }
        let club = relations.resolve_input_ref(Club::TABLE, "club", fields.club_id)?;
        let mut team = Self::with_defaults(now_ms);
        team.apply(fields, club, now_ms);
        Ok(team)
    }

    pub fn apply_edit(
        &mut self,
        fields: &TeamFields,
        now_ms: i64,
        relations: &Relations<'_>,
    ) -> Result<()> {
        let club = relations.resolve_input_ref(Club::TABLE, "club", fields.club_id)?;
        self.apply(fields, club, now_ms);
        Ok(())
    }

    fn with_defaults(now_ms: i64) -> Self {
        Self {
            local_id: LocalId::new(),
            remote_id: None,
            name: String::new(),
            club_local_id: None,
            created_at: now_ms,
            updated_at: now_ms,
            last_seen_at: None,
        }
    }

    fn apply(&mut self, fields: &TeamFields, club: Option<LocalId>, now_ms: i64) {
        if let Some(name) = &fields.name {
            self.name = name.trim().to_string();
        }
        if let Some(club) = club {
            self.club_local_id = Some(club);
        }
        self.updated_at = now_ms;
    }
}

impl SyncEntity for Team {
    type Dto = TeamDto;

    const KIND: EntityKind = EntityKind::Team;
    const COLLECTION: &'static str = "teams";
    const TABLE: &'static str = "teams";
    const LIST_SHAPE: ListShape = ListShape::Bare;
    const DELETE_POLICY: DeletePolicy = DeletePolicy::Hard;

    fn local_id(&self) -> LocalId {
        self.local_id
    }

    fn remote_id(&self) -> Option<RemoteId> {
        self.remote_id
    }

    fn remote_id_of(dto: &TeamDto) -> RemoteId {
        dto.id
    }

    fn from_remote(
        dto: &TeamDto,
        now_ms: i64,
        relations: &Relations<'_>,
    ) -> Result<MapOutcome<Self>> {
        let club = match relations.resolve_ref(Club::TABLE, "club", dto.fields.club_id)? {
            MapOutcome::Applied(club) => club,
            MapOutcome::Unresolved(reason) => return Ok(MapOutcome::Unresolved(reason)),
        };
        let mut team = Self::with_defaults(now_ms);
        team.remote_id = Some(dto.id);
        team.apply(&dto.fields, club, now_ms);
        team.last_seen_at = Some(now_ms);
        Ok(MapOutcome::Applied(team))
    }

    fn merge_remote(
        &mut self,
        dto: &TeamDto,
        now_ms: i64,
        relations: &Relations<'_>,
    ) -> Result<MapOutcome<()>> {
        let club = match relations.resolve_ref(Club::TABLE, "club", dto.fields.club_id)? {
            MapOutcome::Applied(club) => club,
            MapOutcome::Unresolved(reason) => return Ok(MapOutcome::Unresolved(reason)),
        };
        self.apply(&dto.fields, club, now_ms);
        self.last_seen_at = Some(now_ms);
        Ok(MapOutcome::Applied(()))
    }

    fn push_payload(&self, relations: &Relations<'_>) -> Result<serde_json::Value> {
        let fields = TeamFields {
            name: Some(self.name.clone()),
            club_id: relations.payload_ref(Club::TABLE, "club", self.club_local_id)?,
        };
        Ok(serde_json::to_value(fields)?)
    }
}
