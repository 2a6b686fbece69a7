//! Award model and wire mapping

use serde::{Deserialize, Serialize};

use crate::api::ListShape;
use crate::error::{Error, Result};
use crate::models::{DeletePolicy, EntityKind, LocalId, Player, RemoteId, Tournament};
use crate::sync::{MapOutcome, Relations, SyncEntity};
use crate::util::normalize_text_option;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    pub local_id: LocalId,
    pub remote_id: Option<RemoteId>,
    pub name: String,
    pub tournament_local_id: Option<LocalId>,
    /// Awarded player, once decided
    pub player_local_id: Option<LocalId>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub last_seen_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tournament_id: Option<RemoteId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<RemoteId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AwardDto {
    pub id: RemoteId,
    #[serde(flatten)]
    pub fields: AwardFields,
}

struct ResolvedRefs {
    tournament: Option<LocalId>,
    player: Option<LocalId>,
}

impl Award {
    pub fn new_local(fields: &AwardFields, now_ms: i64, relations: &Relations<'_>) -> Result<Self> {
        if normalize_text_option(fields.name.clone()).is_none() {
            return Err(Error::InvalidInput(
                "award name must not be empty".to_string(),
            ));
        }
        let refs = ResolvedRefs {
            tournament: relations.resolve_input_ref(
                Tournament::TABLE,
                "tournament",
                fields.tournament_id,
            )?,
            player: relations.resolve_input_ref(Player::TABLE, "player", fields.player_id)?,
        };
        let mut award = Self::with_defaults(now_ms);
        award.apply(fields, &refs, now_ms);
        Ok(award)
    }

    pub fn apply_edit(
        &mut self,
        fields: &AwardFields,
        now_ms: i64,
        relations: &Relations<'_>,
    ) -> Result<()> {
        let refs = ResolvedRefs {
            tournament: relations.resolve_input_ref(
                Tournament::TABLE,
                "tournament",
                fields.tournament_id,
            )?,
            player: relations.resolve_input_ref(Player::TABLE, "player", fields.player_id)?,
        };
        self.apply(fields, &refs, now_ms);
        Ok(())
    }

    fn resolve(fields: &AwardFields, relations: &Relations<'_>) -> Result<MapOutcome<ResolvedRefs>> {
        let tournament =
            match relations.resolve_ref(Tournament::TABLE, "tournament", fields.tournament_id)? {
                MapOutcome::Applied(tournament) => tournament,
                MapOutcome::Unresolved(reason) => return Ok(MapOutcome::Unresolved(reason)),
            };
        let player = match relations.resolve_ref(Player::TABLE, "player", fields.player_id)? {
            MapOutcome::Applied(player) => player,
            MapOutcome::Unresolved(reason) => return Ok(MapOutcome::Unresolved(reason)),
        };
        Ok(MapOutcome::Applied(ResolvedRefs { tournament, player }))
    }

    fn with_defaults(now_ms: i64) -> Self {
        Self {
            local_id: LocalId::new(),
            remote_id: None,
            name: String::new(),
            tournament_local_id: None,
            player_local_id: None,
            is_active: true,
            created_at: now_ms,
            updated_at: now_ms,
            last_seen_at: None,
        }
    }

    fn apply(&mut self, fields: &AwardFields, refs: &ResolvedRefs, now_ms: i64) {
        if let Some(name) = &fields.name {
            self.name = name.trim().to_string();
        }
        if let Some(tournament) = refs.tournament {
            self.tournament_local_id = Some(tournament);
        }
        if let Some(player) = refs.player {
            self.player_local_id = Some(player);
        }
        if let Some(is_active) = fields.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now_ms;
    }
}

impl SyncEntity for Award {
    type Dto = AwardDto;

    const KIND: EntityKind = EntityKind::Award;
    const COLLECTION: &'static str = "awards";
    const TABLE: &'static str = "awards";
    const LIST_SHAPE: ListShape = ListShape::Bare;
    const DELETE_POLICY: DeletePolicy = DeletePolicy::Soft;

    fn local_id(&self) -> LocalId {
        self.local_id
    }

    fn remote_id(&self) -> Option<RemoteId> {
        self.remote_id
    }

    fn remote_id_of(dto: &AwardDto) -> RemoteId {
        dto.id
    }

    fn from_remote(
        dto: &AwardDto,
        now_ms: i64,
        relations: &Relations<'_>,
    ) -> Result<MapOutcome<Self>> {
        let refs = match Self::resolve(&dto.fields, relations)? {
            MapOutcome::Applied(refs) => refs,
            MapOutcome::Unresolved(reason) => return Ok(MapOutcome::Unresolved(reason)),
        };
        let mut award = Self::with_defaults(now_ms);
        award.remote_id = Some(dto.id);
        award.apply(&dto.fields, &refs, now_ms);
        award.last_seen_at = Some(now_ms);
        Ok(MapOutcome::Applied(award))
    }

    fn merge_remote(
        &mut self,
        dto: &AwardDto,
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
        let fields = AwardFields {
            name: Some(self.name.clone()),
            tournament_id: relations.payload_ref(
                Tournament::TABLE,
                "tournament",
                self.tournament_local_id,
            )?,
            player_id: relations.payload_ref(Player::TABLE, "player", self.player_local_id)?,
            is_active: Some(self.is_active),
        };
        Ok(serde_json::to_value(fields)?)
    }
}
