//! Match duties (umpire, referee, timekeeper, ...)
//!
//! Duties are local-only children of a match: the API exposes no endpoint
//! for them, so they are never pulled or pushed. They carry a `remote_id`
//! column for schema uniformity but it stays empty. Parent references use
//! local ids directly.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{LocalId, RemoteId};
use crate::util::normalize_text_option;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duty {
    pub local_id: LocalId,
    pub remote_id: Option<RemoteId>,
    pub match_local_id: LocalId,
    pub player_local_id: Option<LocalId>,
    pub role: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_id: Option<LocalId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<LocalId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Duty {
    pub fn new_local(fields: &DutyFields, now_ms: i64) -> Result<Self> {
        let match_local_id = fields
            .match_id
            .ok_or_else(|| Error::InvalidInput("a duty requires a match_id".to_string()))?;
        let role = normalize_text_option(fields.role.clone())
            .ok_or_else(|| Error::InvalidInput("a duty requires a role".to_string()))?;
        Ok(Self {
            local_id: LocalId::new(),
            remote_id: None,
            match_local_id,
            player_local_id: fields.player_id,
            role,
            created_at: now_ms,
            updated_at: now_ms,
        })
    }

    pub fn apply_edit(&mut self, fields: &DutyFields, now_ms: i64) -> Result<()> {
        if let Some(match_id) = fields.match_id {
            self.match_local_id = match_id;
        }
        if let Some(player_id) = fields.player_id {
            self.player_local_id = Some(player_id);
        }
        if fields.role.is_some() {
            self.role = normalize_text_option(fields.role.clone())
                .ok_or_else(|| Error::InvalidInput("a duty role cannot be blank".to_string()))?;
        }
        self.updated_at = now_ms;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_local_requires_match_and_role() {
        let missing_match = DutyFields {
            role: Some("umpire".to_string()),
            ..DutyFields::default()
        };
        assert!(Duty::new_local(&missing_match, 0).is_err());

        let blank_role = DutyFields {
            match_id: Some(LocalId::new()),
            role: Some("  ".to_string()),
            ..DutyFields::default()
        };
        assert!(Duty::new_local(&blank_role, 0).is_err());
    }

    #[test]
    fn edit_trims_role() {
        let match_id = LocalId::new();
        let mut duty = Duty::new_local(
            &DutyFields {
                match_id: Some(match_id),
                role: Some("umpire".to_string()),
                ..DutyFields::default()
            },
            1_000,
        )
        .unwrap();

        duty.apply_edit(
            &DutyFields {
                role: Some("  referee  ".to_string()),
                ..DutyFields::default()
            },
            2_000,
        )
        .unwrap();

        assert_eq!(duty.role, "referee");
        assert_eq!(duty.match_local_id, match_id);
        assert_eq!(duty.updated_at, 2_000);
    }
}
