//! `IdentityProvider`: the opaque identity-issuing service referenced
//! by spec.md §1 — out of scope to implement for real here, specified
//! only at its interface.

/// Base64-framed, Fernet-shaped ciphertext of the database passphrase,
/// as handed back by the identity service.
pub type EncryptedDbKey = String;
pub type UserEmail = String;

pub trait IdentityProvider: Send + Sync {
    /// Returns `None` when no identity is currently signed in.
    fn fetch(&self) -> Option<(EncryptedDbKey, UserEmail)>;
}

/// Test/offline double: always returns a fixed identity, or none at
/// all once [`StaticIdentityProvider::signed_out`] is used.
pub struct StaticIdentityProvider {
    identity: Option<(EncryptedDbKey, UserEmail)>,
}

impl StaticIdentityProvider {
    pub fn signed_in(encrypted_db_key: impl Into<String>, user_email: impl Into<String>) -> Self {
        StaticIdentityProvider { identity: Some((encrypted_db_key.into(), user_email.into())) }
    }

    pub fn signed_out() -> Self {
        StaticIdentityProvider { identity: None }
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn fetch(&self) -> Option<(EncryptedDbKey, UserEmail)> {
        self.identity.clone()
    }
}
