//! Horse model and wire mapping

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::ListShape;
use crate::error::{Error, Result};
use crate::models::{Breeder, DeletePolicy, EntityKind, LocalId, Player, RemoteId};
use crate::sync::{MapOutcome, Relations, SyncEntity};
use crate::util::normalize_text_option;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horse {
    pub local_id: LocalId,
    pub remote_id: Option<RemoteId>,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub breeder_local_id: Option<LocalId>,
    /// Owning player, when known
    pub owner_local_id: Option<LocalId>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub last_seen_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorseFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breeder_id: Option<RemoteId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<RemoteId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HorseDto {
    pub id: RemoteId,
    #[serde(flatten)]
    pub fields: HorseFields,
}

struct ResolvedRefs {
    breeder: Option<LocalId>,
    owner: Option<LocalId>,
}

impl Horse {
    pub fn new_local(fields: &HorseFields, now_ms: i64, relations: &Relations<'_>) -> Result<Self> {
        if normalize_text_option(fields.name.clone()).is_none() {
            return Err(Error::InvalidInput(
                "horse name must not be empty".to_string(),
            ));
        }
        let refs = ResolvedRefs {
            breeder: relations.resolve_input_ref(Breeder::TABLE, "breeder", fields.breeder_id)?,
            owner: relations.resolve_input_ref(Player::TABLE, "owner", fields.owner_id)?,
        };
        let mut horse = Self::with_defaults(now_ms);
        horse.apply(fields, &refs, now_ms);
        Ok(horse)
    }

    pub fn apply_edit(
        &mut self,
        fields: &HorseFields,
        now_ms: i64,
        relations: &Relations<'_>,
    ) -> Result<()> {
        let refs = ResolvedRefs {
            breeder: relations.resolve_input_ref(Breeder::TABLE, "breeder", fields.breeder_id)?,
            owner: relations.resolve_input_ref(Player::TABLE, "owner", fields.owner_id)?,
        };
        self.apply(fields, &refs, now_ms);
        Ok(())
    }

    fn resolve(fields: &HorseFields, relations: &Relations<'_>) -> Result<MapOutcome<ResolvedRefs>> {
        let breeder = match relations.resolve_ref(Breeder::TABLE, "breeder", fields.breeder_id)? {
            MapOutcome::Applied(breeder) => breeder,
            MapOutcome::Unresolved(reason) => return Ok(MapOutcome::Unresolved(reason)),
        };
        let owner = match relations.resolve_ref(Player::TABLE, "owner", fields.owner_id)? {
            MapOutcome::Applied(owner) => owner,
            MapOutcome::Unresolved(reason) => return Ok(MapOutcome::Unresolved(reason)),
        };
        Ok(MapOutcome::Applied(ResolvedRefs { breeder, owner }))
    }

    fn with_defaults(now_ms: i64) -> Self {
        Self {
            local_id: LocalId::new(),
            remote_id: None,
            name: String::new(),
            birth_date: None,
            breeder_local_id: None,
            owner_local_id: None,
            is_active: true,
            created_at: now_ms,
            updated_at: now_ms,
            last_seen_at: None,
        }
    }

    fn apply(&mut self, fields: &HorseFields, refs: &ResolvedRefs, now_ms: i64) {
        if let Some(name) = &fields.name {
            self.name = name.trim().to_string();
        }
        if let Some(birth_date) = fields.birth_date {
            self.birth_date = Some(birth_date);
        }
        if let Some(breeder) = refs.breeder {
            self.breeder_local_id = Some(breeder);
        }
        if let Some(owner) = refs.owner {
            self.owner_local_id = Some(owner);
        }
        if let Some(is_active) = fields.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now_ms;
    }
}

impl SyncEntity for Horse {
    type Dto = HorseDto;

    const KIND: EntityKind = EntityKind::Horse;
    const COLLECTION: &'static str = "horses";
    const TABLE: &'static str = "horses";
    const LIST_SHAPE: ListShape = ListShape::Bare;
    const DELETE_POLICY: DeletePolicy = DeletePolicy::Soft;

    fn local_id(&self) -> LocalId {
        self.local_id
    }

    fn remote_id(&self) -> Option<RemoteId> {
        self.remote_id
    }

    fn remote_id_of(dto: &HorseDto) -> RemoteId {
        dto.id
    }

    fn from_remote(
        dto: &HorseDto,
        now_ms: i64,
        relations: &Relations<'_>,
    ) -> Result<MapOutcome<Self>> {
        let refs = match Self::resolve(&dto.fields, relations)? {
            MapOutcome::Applied(refs) => refs,
            MapOutcome::Unresolved(reason) => return Ok(MapOutcome::Unresolved(reason)),
        };
        let mut horse = Self::with_defaults(now_ms);
        horse.remote_id = Some(dto.id);
        horse.apply(&dto.fields, &refs, now_ms);
        horse.last_seen_at = Some(now_ms);
        Ok(MapOutcome::Applied(horse))
    }

    fn merge_remote(
        &mut self,
        dto: &HorseDto,
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
        let fields = HorseFields {
            name: Some(self.name.clone()),
            birth_date: self.birth_date,
            breeder_id: relations.payload_ref(Breeder::TABLE, "breeder", self.breeder_local_id)?,
            owner_id: relations.payload_ref(Player::TABLE, "owner", self.owner_local_id)?,
            is_active: Some(self.is_active),
        };
        Ok(serde_json::to_value(fields)?)
    }
}
