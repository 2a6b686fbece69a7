//! Playing field model and wire mapping

use serde::{Deserialize, Serialize};

use crate::api::ListShape;
use crate::error::{Error, Result};
use crate::models::{DeletePolicy, EntityKind, LocalId, RemoteId};
use crate::sync::{MapOutcome, Relations, SyncEntity};
use crate::util::normalize_text_option;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub local_id: LocalId,
    pub remote_id: Option<RemoteId>,
    pub name: String,
    pub location: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub last_seen_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDto {
    pub id: RemoteId,
    #[serde(flatten)]
    pub fields: FieldFields,
}

impl Field {
    pub fn new_local(fields: &FieldFields, now_ms: i64) -> Result<Self> {
        if normalize_text_option(fields.name.clone()).is_none() {
            return Err(Error::InvalidInput(
                "field name must not be empty".to_string(),
            ));
        }
        let mut field = Self::with_defaults(now_ms);
        field.apply(fields, now_ms);
        Ok(field)
    }

    pub fn apply_edit(&mut self, fields: &FieldFields, now_ms: i64) {
        self.apply(fields, now_ms);
    }

    fn with_defaults(now_ms: i64) -> Self {
        Self {
            local_id: LocalId::new(),
            remote_id: None,
            name: String::new(),
            location: None,
            is_active: true,
            created_at: now_ms,
            updated_at: now_ms,
            last_seen_at: None,
        }
    }

    fn apply(&mut self, fields: &FieldFields, now_ms: i64) {
        if let Some(name) = &fields.name {
            self.name = name.trim().to_string();
        }
        if let Some(location) = &fields.location {
            self.location = normalize_text_option(Some(location.clone()));
        }
        if let Some(is_active) = fields.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now_ms;
    }
}

impl SyncEntity for Field {
    type Dto = FieldDto;

    const KIND: EntityKind = EntityKind::Field;
    const COLLECTION: &'static str = "fields";
    const TABLE: &'static str = "fields";
    const LIST_SHAPE: ListShape = ListShape::Bare;
    const DELETE_POLICY: DeletePolicy = DeletePolicy::Soft;

    fn local_id(&self) -> LocalId {
        self.local_id
    }

    fn remote_id(&self) -> Option<RemoteId> {
        self.remote_id
    }

    fn remote_id_of(dto: &FieldDto) -> RemoteId {
        dto.id
    }

    fn from_remote(
        dto: &FieldDto,
        now_ms: i64,
        _relations: &Relations<'_>,
    ) -> Result<MapOutcome<Self>> {
        let mut field = Self::with_defaults(now_ms);
        field.remote_id = Some(dto.id);
        field.apply(&dto.fields, now_ms);
        field.last_seen_at = Some(now_ms);
        Ok(MapOutcome::Applied(field))
    }

    fn merge_remote(
        &mut self,
        dto: &FieldDto,
        now_ms: i64,
        _relations: &Relations<'_>,
    ) -> Result<MapOutcome<()>> {
        self.apply(&dto.fields, now_ms);
        self.last_seen_at = Some(now_ms);
        Ok(MapOutcome::Applied(()))
    }

    fn push_payload(&self, _relations: &Relations<'_>) -> Result<serde_json::Value> {
        let fields = FieldFields {
            name: Some(self.name.clone()),
            location: self.location.clone(),
            is_active: Some(self.is_active),
        };
        Ok(serde_json::to_value(fields)?)
    }
}
