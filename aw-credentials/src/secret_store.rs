//! `SecretStore`: a thin, OS-agnostic trait over a secure local
//! credential store.
//!
//! Grounded on `aw_core/cache.py`'s `add_password`/`get_password`/
//! `keychain_item_exists`/`delete_password` quartet, which branches
//! between a raw macOS Keychain `security` CLI call and the `keyring`
//! package depending on platform. The `keyring` crate already performs
//! that OS dispatch internally, so [`KeyringSecretStore`] needs no
//! platform branch of its own.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{CredentialError, Result};

/// The fixed account name every service is stored under, mirroring the
/// original's constant `"com.ralvie.sundial"` account qualifier.
const ACCOUNT: &str = "sundial-credentials";

pub trait SecretStore: Send + Sync {
    fn get(&self, service: &str) -> Option<String>;
    fn set(&self, service: &str, value: &str) -> Result<()>;
    fn exists(&self, service: &str) -> bool;
    fn delete(&self, service: &str) -> Result<()>;
}

/// Production backend: the OS keychain/credential manager via the
/// `keyring` crate.
pub struct KeyringSecretStore;

impl KeyringSecretStore {
    pub fn new() -> Self {
        KeyringSecretStore
    }

    fn entry(service: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(service, ACCOUNT).map_err(|e| CredentialError::SecretStore(e.to_string()))
    }
}

impl Default for KeyringSecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for KeyringSecretStore {
    fn get(&self, service: &str) -> Option<String> {
        Self::entry(service).ok()?.get_password().ok()
    }

    fn set(&self, service: &str, value: &str) -> Result<()> {
        Self::entry(service)?.set_password(value).map_err(|e| CredentialError::SecretStore(e.to_string()))
    }

    fn exists(&self, service: &str) -> bool {
        self.get(service).is_some()
    }

    fn delete(&self, service: &str) -> Result<()> {
        match Self::entry(service)?.delete_password() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(CredentialError::SecretStore(e.to_string())),
        }
    }
}

/// In-memory fake used by tests in place of a real OS keychain.
#[derive(Default)]
pub struct FakeSecretStore {
    entries: Mutex<HashMap<String, String>>,
}

impl FakeSecretStore {
    pub fn new() -> Self {
        FakeSecretStore::default()
    }
}

impl SecretStore for FakeSecretStore {
    fn get(&self, service: &str) -> Option<String> {
        self.entries.lock().unwrap().get(service).cloned()
    }

    fn set(&self, service: &str, value: &str) -> Result<()> {
        self.entries.lock().unwrap().insert(service.to_string(), value.to_string());
        Ok(())
    }

    fn exists(&self, service: &str) -> bool {
        self.entries.lock().unwrap().contains_key(service)
    }

    fn delete(&self, service: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(service);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_store_round_trips() {
        let store = FakeSecretStore::new();
        assert!(!store.exists("sundial"));
        store.set("sundial", "key-material").unwrap();
        assert!(store.exists("sundial"));
        assert_eq!(store.get("sundial"), Some("key-material".to_string()));
        store.delete("sundial").unwrap();
        assert!(!store.exists("sundial"));
    }
}
