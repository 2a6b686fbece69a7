//! Tournament model and wire mapping

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::ListShape;
use crate::error::{Error, Result};
use crate::models::{DeletePolicy, EntityKind, LocalId, RemoteId};
use crate::sync::{MapOutcome, Relations, SyncEntity};
use crate::util::normalize_text_option;

/// A tournament as stored locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub local_id: LocalId,
    pub remote_id: Option<RemoteId>,
    pub name: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
    /// Last time a pull or push confirmed this record server-side (Unix ms)
    pub last_seen_at: Option<i64>,
}

/// Wire-shape tournament fields.
///
/// One struct serves three duties: the mutable part of pulled DTOs, push
/// payload bodies, and user-supplied patches. Absent and null both mean
/// "leave the local value unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// A tournament as returned by the server.
#[derive(Debug, Clone, Deserialize)]
pub struct TournamentDto {
    pub id: RemoteId,
    #[serde(flatten)]
    pub fields: TournamentFields,
}

impl Tournament {
    /// Create a local-only tournament from user-supplied fields.
    ///
    /// The name is required; dates default to the placeholder epoch date when
    /// omitted, same as records materialized from a sparse DTO.
    pub fn new_local(fields: &TournamentFields, now_ms: i64) -> Result<Self> {
        if normalize_text_option(fields.name.clone()).is_none() {
            return Err(Error::InvalidInput(
                "tournament name must not be empty".to_string(),
            ));
        }
        let mut tournament = Self::with_defaults(now_ms);
        tournament.apply(fields, now_ms);
        Ok(tournament)
    }

    /// Apply a user edit. Same partial semantics as a remote merge.
    pub fn apply_edit(&mut self, fields: &TournamentFields, now_ms: i64) {
        self.apply(fields, now_ms);
    }

    fn with_defaults(now_ms: i64) -> Self {
        Self {
            local_id: LocalId::new(),
            remote_id: None,
            name: String::new(),
            location: String::new(),
            start_date: NaiveDate::default(),
            end_date: NaiveDate::default(),
            is_active: true,
            created_at: now_ms,
            updated_at: now_ms,
            last_seen_at: None,
        }
    }

    fn apply(&mut self, fields: &TournamentFields, now_ms: i64) {
        if let Some(name) = &fields.name {
            self.name = name.trim().to_string();
        }
        if let Some(location) = &fields.location {
            self.location = location.trim().to_string();
        }
        if let Some(start_date) = fields.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = fields.end_date {
            self.end_date = end_date;
        }
        if let Some(is_active) = fields.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now_ms;
    }
}

impl SyncEntity for Tournament {
    type Dto = TournamentDto;

    const KIND: EntityKind = EntityKind::Tournament;
    const COLLECTION: &'static str = "tournaments";
    const TABLE: &'static str = "tournaments";
    const LIST_SHAPE: ListShape = ListShape::Paginated;
    const DELETE_POLICY: DeletePolicy = DeletePolicy::Soft;

    fn local_id(&self) -> LocalId {
        self.local_id
    }

    fn remote_id(&self) -> Option<RemoteId> {
        self.remote_id
    }

    fn remote_id_of(dto: &TournamentDto) -> RemoteId {
        dto.id
    }

    fn from_remote(
        dto: &TournamentDto,
        now_ms: i64,
        _relations: &Relations<'_>,
    ) -> Result<MapOutcome<Self>> {
        let mut tournament = Self::with_defaults(now_ms);
        tournament.remote_id = Some(dto.id);
        tournament.apply(&dto.fields, now_ms);
        tournament.last_seen_at = Some(now_ms);
        Ok(MapOutcome::Applied(tournament))
    }

    fn merge_remote(
        &mut self,
        dto: &TournamentDto,
        now_ms: i64,
        _relations: &Relations<'_>,
    ) -> Result<MapOutcome<()>> {
        self.apply(&dto.fields, now_ms);
        self.last_seen_at = Some(now_ms);
        Ok(MapOutcome::Applied(()))
    }

    fn push_payload(&self, _relations: &Relations<'_>) -> Result<serde_json::Value> {
        let fields = TournamentFields {
            name: Some(self.name.clone()),
            location: Some(self.location.clone()),
            start_date: Some(self.start_date),
            end_date: Some(self.end_date),
            is_active: Some(self.is_active),
        };
        Ok(serde_json::to_value(fields)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn dto_decodes_wire_dates() {
        let dto: TournamentDto = serde_json::from_str(
            r#"{"id": 7, "name": "Spring Cup", "location": "Sydney",
                "start_date": "2025-03-01", "end_date": "2025-03-08"}"#,
        )
        .unwrap();
        assert_eq!(dto.id, RemoteId::new(7));
        assert_eq!(
            dto.fields.start_date,
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
        assert_eq!(dto.fields.is_active, None);
    }

    #[test]
    fn dto_tolerates_null_and_unknown_fields() {
        let dto: TournamentDto = serde_json::from_str(
            r#"{"id": 7, "name": "Spring Cup", "location": null, "season": "2025"}"#,
        )
        .unwrap();
        assert_eq!(dto.fields.name.as_deref(), Some("Spring Cup"));
        assert_eq!(dto.fields.location, None);
    }

    #[test]
    fn payload_round_trips_calendar_dates() {
        let fields = TournamentFields {
            name: Some("Spring Cup".to_string()),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            ..TournamentFields::default()
        };
        let wire = serde_json::to_string(&fields).unwrap();
        assert!(wire.contains(r#""start_date":"2025-03-01""#));
        let back: TournamentFields = serde_json::from_str(&wire).unwrap();
        assert_eq!(back.start_date, fields.start_date);
    }

    #[test]
    fn payload_omits_absent_fields() {
        let fields = TournamentFields {
            name: Some("Spring Cup".to_string()),
            ..TournamentFields::default()
        };
        let wire = serde_json::to_string(&fields).unwrap();
        assert_eq!(wire, r#"{"name":"Spring Cup"}"#);
    }

    #[test]
    fn new_local_requires_a_name() {
        let now = 1_700_000_000_000;
        assert!(Tournament::new_local(&TournamentFields::default(), now).is_err());

        let tournament = Tournament::new_local(
            &TournamentFields {
                name: Some("  Autumn Open ".to_string()),
                ..TournamentFields::default()
            },
            now,
        )
        .unwrap();
        assert_eq!(tournament.name, "Autumn Open");
        assert_eq!(tournament.remote_id, None);
        assert!(tournament.is_active);
        assert_eq!(tournament.start_date, NaiveDate::default());
    }
}
