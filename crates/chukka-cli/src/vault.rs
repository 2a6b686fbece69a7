//! OS keyring implementation of the session secret vault.

#[cfg(test)]
use std::collections::HashMap;
use std::sync::Arc;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;

use chukka_core::error::{Error, Result};
use chukka_core::session::SecretVault;

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "chukka-cli";

/// Secret vault over the OS keyring, scoped to one profile.
///
/// Each session key becomes its own keyring entry named
/// `session:<profile>:<key>`, so profiles never share tokens.
pub struct KeyringVault {
    profile: String,
}

impl KeyringVault {
    #[must_use]
    pub fn new(profile_name: &str) -> Self {
        Self {
            profile: profile_name.to_string(),
        }
    }

    fn scoped(&self, key: &str) -> String {
        format!("session:{}:{key}", self.profile)
    }

    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(test)]
    fn test_entries() -> Result<std::sync::MutexGuard<'static, HashMap<String, String>>> {
        Self::test_store()
            .lock()
            .map_err(|error| Error::SecretStorage(error.to_string()))
    }

    #[cfg(not(test))]
    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, &self.scoped(key))
            .map_err(|error| Error::SecretStorage(error.to_string()))
    }
}

impl SecretVault for KeyringVault {
    #[cfg(not(test))]
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(Error::SecretStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(Self::test_entries()?.get(&self.scoped(key)).cloned())
    }

    #[cfg(not(test))]
    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .map_err(|error| Error::SecretStorage(error.to_string()))
    }

    #[cfg(test)]
    fn set(&self, key: &str, value: &str) -> Result<()> {
        Self::test_entries()?.insert(self.scoped(key), value.to_string());
        Ok(())
    }

    #[cfg(not(test))]
    fn delete(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(Error::SecretStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn delete(&self, key: &str) -> Result<()> {
        Self::test_entries()?.remove(&self.scoped(key));
        Ok(())
    }
}

/// The session vault for one profile.
pub fn vault_for(profile_name: &str) -> Arc<dyn SecretVault> {
    Arc::new(KeyringVault::new(profile_name))
}
