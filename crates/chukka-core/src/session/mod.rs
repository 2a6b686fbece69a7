//! Explicit session context and the secret vault behind it.
//!
//! Replaces ambient global auth state: the session is constructed once at
//! startup (hydrated from the vault), then handed to the transport client
//! and front-ends that need it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{RemoteId, UserDto};

/// Vault key for the bearer token.
pub const KEY_TOKEN: &str = "token";
/// Vault key for the refresh token, when the server issues one.
pub const KEY_REFRESH_TOKEN: &str = "refresh-token";
/// Vault key for the cached user profile JSON blob.
pub const KEY_PROFILE: &str = "cached-profile";

/// Opaque secure key-value store for session secrets.
///
/// Implementations wrap a platform keychain or similar. `get` of a missing
/// key is `Ok(None)` and `delete` of a missing key is a no-op.
pub trait SecretVault: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
}

/// In-memory vault for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryVault {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryVault {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| Error::SecretStorage("vault lock poisoned".to_string()))
    }
}

impl SecretVault for MemoryVault {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Cached user profile attached to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub remote_id: RemoteId,
    pub email: String,
    pub display_name: Option<String>,
}

impl From<UserDto> for UserProfile {
    fn from(user: UserDto) -> Self {
        Self {
            remote_id: user.id,
            email: user.email,
            display_name: user.display_name,
        }
    }
}

/// A signed-in session's state.
#[derive(Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub token: String,
    pub refresh_token: Option<String>,
    pub profile: UserProfile,
}

impl fmt::Debug for ActiveSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ActiveSession")
            .field("token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("profile", &self.profile)
            .finish()
    }
}

/// Explicit session context shared by the transport client and front-ends.
#[derive(Clone)]
pub struct Session {
    vault: Arc<dyn SecretVault>,
    state: Arc<RwLock<Option<ActiveSession>>>,
}

impl Session {
    /// Fresh unauthenticated session over the given vault.
    #[must_use]
    pub fn new(vault: Arc<dyn SecretVault>) -> Self {
        Self {
            vault,
            state: Arc::new(RwLock::new(None)),
        }
    }

    /// Rehydrate from the vault: active only when a token is stored and the
    /// cached profile decodes; anything else starts signed out.
    pub fn hydrate(vault: Arc<dyn SecretVault>) -> Result<Self> {
        let token = vault.get(KEY_TOKEN)?;
        let refresh_token = vault.get(KEY_REFRESH_TOKEN)?;
        let profile_blob = vault.get(KEY_PROFILE)?;

        let state = match (token, profile_blob) {
            (Some(token), Some(blob)) => match serde_json::from_str::<UserProfile>(&blob) {
                Ok(profile) => Some(ActiveSession {
                    token,
                    refresh_token,
                    profile,
                }),
                Err(error) => {
                    tracing::warn!(%error, "stored profile does not decode, starting signed out");
                    None
                }
            },
            _ => None,
        };

        Ok(Self {
            vault,
            state: Arc::new(RwLock::new(state)),
        })
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_ok_and(|state| state.is_some())
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.state
            .read()
            .ok()?
            .as_ref()
            .map(|session| session.token.clone())
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.state
            .read()
            .ok()?
            .as_ref()
            .and_then(|session| session.refresh_token.clone())
    }

    #[must_use]
    pub fn profile(&self) -> Option<UserProfile> {
        self.state
            .read()
            .ok()?
            .as_ref()
            .map(|session| session.profile.clone())
    }

    /// Persist a freshly issued session and publish it in-memory.
    ///
    /// The vault writes happen first; when one fails the in-memory state is
    /// left as it was.
    pub fn activate(&self, session: ActiveSession) -> Result<()> {
        let blob = serde_json::to_string(&session.profile)?;
        self.vault.set(KEY_TOKEN, &session.token)?;
        match &session.refresh_token {
            Some(refresh) => self.vault.set(KEY_REFRESH_TOKEN, refresh)?,
            None => self.vault.delete(KEY_REFRESH_TOKEN)?,
        }
        self.vault.set(KEY_PROFILE, &blob)?;
        *self.write_state()? = Some(session);
        Ok(())
    }

    /// Swap tokens after a refresh, keeping the cached profile.
    pub fn replace_tokens(&self, token: String, refresh_token: Option<String>) -> Result<()> {
        let profile = self
            .profile()
            .ok_or_else(|| Error::InvalidInput("not signed in".to_string()))?;
        self.activate(ActiveSession {
            token,
            refresh_token,
            profile,
        })
    }

    /// Sign out: in-memory state is dropped unconditionally, then the vault
    /// entries are removed.
    pub fn clear(&self) -> Result<()> {
        *self.write_state()? = None;
        self.vault.delete(KEY_TOKEN)?;
        self.vault.delete(KEY_REFRESH_TOKEN)?;
        self.vault.delete(KEY_PROFILE)?;
        Ok(())
    }

    fn write_state(&self) -> Result<std::sync::RwLockWriteGuard<'_, Option<ActiveSession>>> {
        self.state
            .write()
            .map_err(|_| Error::SecretStorage("session state lock poisoned".to_string()))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn profile() -> UserProfile {
        UserProfile {
            remote_id: RemoteId::new(7),
            email: "ines@example.com".to_string(),
            display_name: Some("Inés".to_string()),
        }
    }

    #[test]
    fn hydrate_empty_vault_starts_signed_out() {
        let session = Session::hydrate(Arc::new(MemoryVault::new())).unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
    }

    #[test]
    fn activate_persists_and_hydrates() {
        let vault = Arc::new(MemoryVault::new());
        let session = Session::new(Arc::clone(&vault) as Arc<dyn SecretVault>);
        session
            .activate(ActiveSession {
                token: "tok-1".to_string(),
                refresh_token: Some("ref-1".to_string()),
                profile: profile(),
            })
            .unwrap();
        assert!(session.is_authenticated());

        let rehydrated = Session::hydrate(vault).unwrap();
        assert_eq!(rehydrated.token(), Some("tok-1".to_string()));
        assert_eq!(rehydrated.refresh_token(), Some("ref-1".to_string()));
        assert_eq!(rehydrated.profile(), Some(profile()));
    }

    #[test]
    fn hydrate_with_corrupt_profile_starts_signed_out() {
        let vault = Arc::new(MemoryVault::new());
        vault.set(KEY_TOKEN, "tok-1").unwrap();
        vault.set(KEY_PROFILE, "{not json").unwrap();
        let session = Session::hydrate(vault).unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn clear_removes_vault_entries() {
        let vault = Arc::new(MemoryVault::new());
        let session = Session::new(Arc::clone(&vault) as Arc<dyn SecretVault>);
        session
            .activate(ActiveSession {
                token: "tok-1".to_string(),
                refresh_token: None,
                profile: profile(),
            })
            .unwrap();
        session.clear().unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(vault.get(KEY_TOKEN).unwrap(), None);
        assert_eq!(vault.get(KEY_PROFILE).unwrap(), None);
    }

    #[test]
    fn replace_tokens_requires_active_session() {
        let session = Session::new(Arc::new(MemoryVault::new()));
        assert!(session
            .replace_tokens("tok-2".to_string(), None)
            .is_err());
    }

    #[test]
    fn active_session_debug_redacts_tokens() {
        let session = ActiveSession {
            token: "secret-token".to_string(),
            refresh_token: Some("secret-refresh".to_string()),
            profile: profile(),
        };
        let debug = format!("{session:?}");
        assert!(!debug.contains("secret-token"));
        assert!(!debug.contains("secret-refresh"));
        assert!(debug.contains("[REDACTED]"));
    }
}
