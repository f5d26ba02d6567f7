//! Frame body encryption: `[12-byte nonce][AES-256-GCM ciphertext]`.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;
use vigil_core::errors::StorageError;

use super::StoreKey;

pub const NONCE_LEN: usize = 12;

fn cipher(key: &StoreKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

/// Encrypt `plaintext` under a fresh random nonce.
pub fn seal(key: &StoreKey, plaintext: &[u8]) -> Result<Vec<u8>, StorageError> {
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let ciphertext = cipher(key)
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| StorageError::Crypto {
            reason: format!("encrypt: {e}"),
        })?;

    let mut body = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    body.extend_from_slice(&nonce_bytes);
    body.extend_from_slice(&ciphertext);
    Ok(body)
}

/// Decrypt a frame body produced by [`seal`].
pub fn open(key: &StoreKey, body: &[u8]) -> Result<Vec<u8>, StorageError> {
    if body.len() < NONCE_LEN {
        return Err(StorageError::Crypto {
            reason: format!("frame body of {} bytes has no nonce", body.len()),
        });
    }
    let (nonce, ciphertext) = body.split_at(NONCE_LEN);
    cipher(key)
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| StorageError::Crypto {
            reason: "authentication failed (wrong key or tampered frame)".into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_then_open() {
        let key = StoreKey::generate();
        let body = seal(&key, b"{\"entry\":\"event\"}").unwrap();
        assert_eq!(open(&key, &body).unwrap(), b"{\"entry\":\"event\"}");
    }

    #[test]
    fn nonces_differ_per_frame() {
        let key = StoreKey::generate();
        let a = seal(&key, b"same").unwrap();
        let b = seal(&key, b"same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let body = seal(&StoreKey::generate(), b"secret").unwrap();
        assert!(open(&StoreKey::generate(), &body).is_err());
    }

    #[test]
    fn tampered_frame_fails() {
        let key = StoreKey::generate();
        let mut body = seal(&key, b"payload").unwrap();
        let last = body.len() - 1;
        body[last] ^= 0x01;
        assert!(open(&key, &body).is_err());
    }
}
