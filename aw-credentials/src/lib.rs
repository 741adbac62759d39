//! CredentialGate: the boundary between the encrypted datastore and
//! whatever issues and stores this user's database key.
//!
//! Grounded on `aw_core/util.py` (`load_key`, `decrypt_uuid`,
//! `encrypt_uuid`, `reset_user`) and `aw_core/cache.py`
//! (`cache_user_credentials`, `TTLCache`) — see `DESIGN.md`.

mod cache;
mod cipher;
mod error;
mod identity;
mod secret_store;

pub use cache::CredentialCache;
pub use error::{CredentialError, Result};
pub use identity::{EncryptedDbKey, IdentityProvider, StaticIdentityProvider, UserEmail};
pub use secret_store::{FakeSecretStore, KeyringSecretStore, SecretStore};

/// The logical secret-store service name the local user key is stored
/// under, mirroring `load_key`'s `"SD_KEYS"` service constant.
const USER_KEY_SERVICE: &str = "SD_KEYS";

/// A decrypted database passphrase plus the identity it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseCredentials {
    pub passphrase: String,
    pub user_email: String,
}

pub struct CredentialGate<S: SecretStore, I: IdentityProvider> {
    secret_store: S,
    identity_provider: I,
    cache: CredentialCache,
}

impl<S: SecretStore, I: IdentityProvider> CredentialGate<S, I> {
    pub fn new(secret_store: S, identity_provider: I) -> Self {
        CredentialGate { secret_store, identity_provider, cache: CredentialCache::new() }
    }

    /// Step 1-2 of `EncryptedStore`'s open protocol: fetch identity and
    /// local key, decrypt the database passphrase. Any missing piece
    /// or decryption failure resets local state and returns
    /// [`CredentialError::NotReady`] — never propagates a lower-level
    /// error to the caller.
    pub fn resolve(&self) -> Result<DatabaseCredentials> {
        let Some((encrypted_db_key, user_email)) = self.identity_provider.fetch() else {
            self.reset();
            return Err(CredentialError::NotReady);
        };
        let Some(user_key) = self.secret_store.get(USER_KEY_SERVICE) else {
            self.reset();
            return Err(CredentialError::NotReady);
        };
        if let Some(cached) = self.cache.get(&user_email) {
            return Ok(DatabaseCredentials { passphrase: cached, user_email });
        }
        match cipher::decrypt(&encrypted_db_key, user_key.as_bytes()) {
            Ok(passphrase) => {
                self.cache.insert(user_email.clone(), passphrase.clone());
                Ok(DatabaseCredentials { passphrase, user_email })
            }
            Err(_) => {
                self.reset();
                Err(CredentialError::NotReady)
            }
        }
    }

    /// Encrypts `passphrase` under the local user key, the counterpart
    /// to [`Self::resolve`]'s decryption — used when provisioning a new
    /// identity's `encrypted_db_key`.
    pub fn seal(&self, passphrase: &str) -> Result<EncryptedDbKey> {
        let user_key = self.secret_store.get(USER_KEY_SERVICE).ok_or(CredentialError::NotReady)?;
        cipher::encrypt(passphrase, user_key.as_bytes())
    }

    /// Mirrors `reset_user()`: drops the local key and clears the
    /// credential cache. Stopping running modules is the caller's
    /// responsibility (via `ModuleCoordinator`), not this gate's.
    pub fn reset(&self) {
        let _ = self.secret_store.delete(USER_KEY_SERVICE);
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate_with_key(user_key: &str) -> CredentialGate<FakeSecretStore, StaticIdentityProvider> {
        let secret_store = FakeSecretStore::new();
        secret_store.set(USER_KEY_SERVICE, user_key).unwrap();
        let encrypted = cipher::encrypt("db-passphrase", user_key.as_bytes()).unwrap();
        let identity_provider = StaticIdentityProvider::signed_in(encrypted, "user@example.com");
        CredentialGate::new(secret_store, identity_provider)
    }

    #[test]
    fn resolves_when_identity_and_key_present() {
        let gate = gate_with_key("local-user-key");
        let creds = gate.resolve().unwrap();
        assert_eq!(creds.passphrase, "db-passphrase");
        assert_eq!(creds.user_email, "user@example.com");
    }

    #[test]
    fn not_ready_when_signed_out() {
        let secret_store = FakeSecretStore::new();
        secret_store.set(USER_KEY_SERVICE, "local-user-key").unwrap();
        let gate = CredentialGate::new(secret_store, StaticIdentityProvider::signed_out());
        assert!(matches!(gate.resolve(), Err(CredentialError::NotReady)));
    }

    #[test]
    fn not_ready_when_local_key_absent() {
        let secret_store = FakeSecretStore::new();
        let identity_provider = StaticIdentityProvider::signed_in("anything", "user@example.com");
        let gate = CredentialGate::new(secret_store, identity_provider);
        assert!(matches!(gate.resolve(), Err(CredentialError::NotReady)));
    }

    #[test]
    fn reset_clears_local_key_so_next_resolve_fails() {
        let gate = gate_with_key("local-user-key");
        gate.resolve().unwrap();
        gate.reset();
        assert!(matches!(gate.resolve(), Err(CredentialError::NotReady)));
    }

    #[test]
    fn second_resolve_hits_the_cache_without_redecrypting() {
        let gate = gate_with_key("local-user-key");
        let first = gate.resolve().unwrap();
        // Corrupting the local key proves the second call is served
        // from cache rather than re-decrypting: a fresh decrypt with
        // this key would fail and return `NotReady`.
        gate.secret_store.set(USER_KEY_SERVICE, "a-different-key").unwrap();
        let second = gate.resolve().unwrap();
        assert_eq!(first, second);
    }
}
