//! Symmetric encrypt/decrypt of the database passphrase.
//!
//! Grounded on `cryptography.fernet.Fernet` via `aw_core/util.py`'s
//! `encrypt_uuid`/`decrypt_uuid`. No published Rust crate reproduces
//! Fernet's exact token format (versioned header, HMAC, IV layout), and
//! nothing in this system needs wire compatibility with the Python
//! implementation — only that what this process encrypts, it can
//! later decrypt. `aes-gcm` (AEAD, authenticated) fills the same role:
//! a random 96-bit nonce is prepended to the ciphertext and the whole
//! thing is URL-safe base64 framed, the same envelope shape
//! `encrypt_uuid` produces with Fernet's own nonce-prefixed token.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

use crate::error::{CredentialError, Result};

const NONCE_LEN: usize = 12;

/// Derives a 32-byte AES-256 key from whatever-length local `user_key`
/// material the secret store returned, via a simple repeat-and-hash
/// fold — the local key never leaves this process, so this only needs
/// to be deterministic, not a general-purpose KDF.
fn derive_key(user_key: &[u8]) -> [u8; 32] {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut key = [0u8; 32];
    for (i, chunk) in key.chunks_mut(8).enumerate() {
        let mut hasher = DefaultHasher::new();
        user_key.hash(&mut hasher);
        i.hash(&mut hasher);
        chunk.copy_from_slice(&hasher.finish().to_le_bytes()[..chunk.len()]);
    }
    key
}

pub fn encrypt(plaintext: &str, user_key: &[u8]) -> Result<String> {
    let key = derive_key(user_key);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);
    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| CredentialError::NotReady)?;
    let mut framed = nonce_bytes.to_vec();
    framed.extend_from_slice(&ciphertext);
    Ok(URL_SAFE_NO_PAD.encode(framed))
}

/// Decrypts `encrypted`; any failure (bad base64, truncated frame, bad
/// key, tampered ciphertext) collapses to `NotReady`, never a panic —
/// this mirrors `decrypt_uuid`'s blanket except-returns-`None`.
pub fn decrypt(encrypted: &str, user_key: &[u8]) -> Result<String> {
    let framed = URL_SAFE_NO_PAD.decode(encrypted).map_err(|_| CredentialError::NotReady)?;
    if framed.len() < NONCE_LEN {
        return Err(CredentialError::NotReady);
    }
    let (nonce_bytes, ciphertext) = framed.split_at(NONCE_LEN);
    let key = derive_key(user_key);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
    let nonce = Nonce::from_slice(nonce_bytes);
    let plaintext = cipher.decrypt(nonce, ciphertext).map_err(|_| CredentialError::NotReady)?;
    String::from_utf8(plaintext).map_err(|_| CredentialError::NotReady)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let key = b"a local user key";
        let encrypted = encrypt("db-passphrase-123", key).unwrap();
        assert_eq!(decrypt(&encrypted, key).unwrap(), "db-passphrase-123");
    }

    #[test]
    fn wrong_key_is_not_ready_not_panic() {
        let encrypted = encrypt("db-passphrase-123", b"key-one").unwrap();
        assert!(matches!(decrypt(&encrypted, b"key-two"), Err(CredentialError::NotReady)));
    }

    #[test]
    fn garbage_input_is_not_ready() {
        assert!(matches!(decrypt("not valid base64!!!", b"key"), Err(CredentialError::NotReady)));
    }
}
