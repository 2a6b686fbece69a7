//! Player model and wire mapping

use serde::{Deserialize, Serialize};

use crate::api::ListShape;
use crate::error::{Error, Result};
use crate::models::{Club, DeletePolicy, EntityKind, LocalId, RemoteId, User};
use crate::sync::{MapOutcome, Relations, SyncEntity};
use crate::util::normalize_text_option;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub local_id: LocalId,
    pub remote_id: Option<RemoteId>,
    pub first_name: String,
    pub last_name: String,
    /// Polo handicap in goals, -2..=10 in practice; not range-checked here
    pub handicap: i32,
    pub club_local_id: Option<LocalId>,
    /// Link to the account this player belongs to, when known
    pub user_local_id: Option<LocalId>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub last_seen_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handicap: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_id: Option<RemoteId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<RemoteId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerDto {
    pub id: RemoteId,
    #[serde(flatten)]
    pub fields: PlayerFields,
}

struct ResolvedRefs {
    club: Option<LocalId>,
    user: Option<LocalId>,
}

impl Player {
    pub fn new_local(
        fields: &PlayerFields,
        now_ms: i64,
        relations: &Relations<'_>,
    ) -> Result<Self> {
        if normalize_text_option(fields.first_name.clone()).is_none()
            || normalize_text_option(fields.last_name.clone()).is_none()
        {
            return Err(Error::InvalidInput(
                "player first and last name must not be empty".to_string(),
            ));
        }
        let refs = ResolvedRefs {
            club: relations.resolve_input_ref(Club::TABLE, "club", fields.club_id)?,
            user: relations.resolve_input_ref(User::TABLE, "user", fields.user_id)?,
        };
        let mut player = Self::with_defaults(now_ms);
        player.apply(fields, &refs, now_ms);
        Ok(player)
    }

    pub fn apply_edit(
        &mut self,
        fields: &PlayerFields,
        now_ms: i64,
        relations: &Relations<'_>,
    ) -> Result<()> {
        let refs = ResolvedRefs {
            club: relations.resolve_input_ref(Club::TABLE, "club", fields.club_id)?,
            user: relations.resolve_input_ref(User::TABLE, "user", fields.user_id)?,
        };
        self.apply(fields, &refs, now_ms);
        Ok(())
    }

    fn resolve(fields: &PlayerFields, relations: &Relations<'_>) -> Result<MapOutcome<ResolvedRefs>> {
        let club = match relations.resolve_ref(Club::TABLE, "club", fields.club_id)? {
            MapOutcome::Applied(club) => club,
            MapOutcome::Unresolved(reason) => return Ok(MapOutcome::Unresolved(reason)),
        };
        let user = match relations.resolve_ref(User::TABLE, "user", fields.user_id)? {
            MapOutcome::Applied(user) => user,
            MapOutcome::Unresolved(reason) => return Ok(MapOutcome::Unresolved(reason)),
        };
        Ok(MapOutcome::Applied(ResolvedRefs { club, user }))
    }

    fn with_defaults(now_ms: i64) -> Self {
        Self {
            local_id: LocalId::new(),
            remote_id: None,
            first_name: String::new(),
            last_name: String::new(),
            handicap: 0,
            club_local_id: None,
            user_local_id: None,
            is_active: true,
            created_at: now_ms,
            updated_at: now_ms,
            last_seen_at: None,
        }
    }

    fn apply(&mut self, fields: &PlayerFields, refs: &ResolvedRefs, now_ms: i64) {
        if let Some(first_name) = &fields.first_name {
            self.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = &fields.last_name {
            self.last_name = last_name.trim().to_string();
        }
        if let Some(handicap) = fields.handicap {
            self.handicap = handicap;
        }
        if let Some(club) = refs.club {
            self.club_local_id = Some(club);
        }
        if let Some(user) = refs.user {
            self.user_local_id = Some(user);
        }
        if let Some(is_active) = fields.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now_ms;
    }

    /// Full display name, "First Last".
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

impl SyncEntity for Player {
    type Dto = PlayerDto;

    const KIND: EntityKind = EntityKind::Player;
    const COLLECTION: &'static str = "players";
    const TABLE: &'static str = "players";
    const LIST_SHAPE: ListShape = ListShape::Paginated;
    const DELETE_POLICY: DeletePolicy = DeletePolicy::Soft;

    fn local_id(&self) -> LocalId {
        self.local_id
    }

    fn remote_id(&self) -> Option<RemoteId> {
        self.remote_id
    }

    fn remote_id_of(dto: &PlayerDto) -> RemoteId {
        dto.id
    }

    fn from_remote(
        dto: &PlayerDto,
        now_ms: i64,
        relations: &Relations<'_>,
    ) -> Result<MapOutcome<Self>> {
        let refs = match Self::resolve(&dto.fields, relations)? {
            MapOutcome::Applied(refs) => refs,
            MapOutcome::Unresolved(reason) => return Ok(MapOutcome::Unresolved(reason)),
        };
        let mut player = Self::with_defaults(now_ms);
        player.remote_id = Some(dto.id);
        player.apply(&dto.fields, &refs, now_ms);
        player.last_seen_at = Some(now_ms);
        Ok(MapOutcome::Applied(player))
    }

    fn merge_remote(
        &mut self,
        dto: &PlayerDto,
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
        let fields = PlayerFields {
            first_name: Some(self.first_name.clone()),
            last_name: Some(self.last_name.clone()),
            handicap: Some(self.handicap),
            club_id: relations.payload_ref(Club::TABLE, "club", self.club_local_id)?,
            user_id: relations.payload_ref(User::TABLE, "user", self.user_local_id)?,
            is_active: Some(self.is_active),
        };
        Ok(serde_json::to_value(fields)?)
    }
}
