//! User accounts mirrored from authentication responses
//!
//! Users are not synchronized as a collection; the only rows that exist
//! locally are accounts that have signed in on this device. Players may
//! reference them.

use serde::{Deserialize, Serialize};

use crate::models::{LocalId, RemoteId};
use crate::util::normalize_text_option;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub local_id: LocalId,
    pub remote_id: RemoteId,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserDto {
    pub id: RemoteId,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl User {
    pub const TABLE: &'static str = "users";

    #[must_use]
    pub fn from_dto(dto: &UserDto, now_ms: i64) -> Self {
        Self {
            local_id: LocalId::new(),
            remote_id: dto.id,
            email: dto.email.trim().to_string(),
            display_name: normalize_text_option(dto.display_name.clone()),
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Refresh the mutable columns from a newer authentication response.
    pub fn merge_dto(&mut self, dto: &UserDto, now_ms: i64) {
        self.email = dto.email.trim().to_string();
        self.display_name = normalize_text_option(dto.display_name.clone());
        self.updated_at = now_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn from_dto_normalizes_optional_name() {
        let dto = UserDto {
            id: RemoteId::new(3),
            email: " ana@example.com ".to_string(),
            display_name: Some("   ".to_string()),
        };
        let user = User::from_dto(&dto, 1_000);
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.display_name, None);
    }
}
