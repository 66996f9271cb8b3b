/// Credential encryption using AES-256-GCM
///
/// Third-party API keys (payment processors, email providers) are stored
/// encrypted at rest. Each encryption uses a fresh random 96-bit nonce;
/// the stored blob is `hex(nonce || ciphertext)`, where the ciphertext
/// includes the GCM authentication tag, so tampered blobs fail to decrypt.
///
/// The 256-bit key is supplied as 64 hex characters through configuration
/// (`CREDENTIAL_KEY`). Losing or rotating the key invalidates every stored
/// credential, which is acceptable: integrations can be re-entered.
///
/// # Example
///
/// ```
/// use repairtix_shared::crypto::CredentialCipher;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let key_hex = "0f".repeat(32);
/// let cipher = CredentialCipher::from_hex_key(&key_hex)?;
///
/// let sealed = cipher.seal("sk_live_abc123")?;
/// assert_eq!(cipher.open(&sealed)?, "sk_live_abc123");
/// # Ok(())
/// # }
/// ```

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    AeadCore, Aes256Gcm, Key, Nonce,
};

/// AES-GCM nonce length in bytes (96 bits)
const NONCE_LEN: usize = 12;

/// Error type for credential encryption operations
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Key is not 64 hex characters / 32 bytes
    #[error("Invalid encryption key: {0}")]
    InvalidKey(String),

    /// Encryption failed
    #[error("Encryption failed")]
    EncryptFailed,

    /// Decryption failed (wrong key or tampered ciphertext)
    #[error("Decryption failed: ciphertext is invalid or was tampered with")]
    DecryptFailed,

    /// Stored blob is not valid hex or is too short
    #[error("Invalid ciphertext encoding: {0}")]
    InvalidEncoding(String),
}

/// AES-256-GCM cipher for sealing and opening credential strings
#[derive(Clone)]
pub struct CredentialCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for CredentialCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose key material through Debug output
        f.debug_struct("CredentialCipher").finish_non_exhaustive()
    }
}

impl CredentialCipher {
    /// Creates a cipher from a 32-byte key
    pub fn new(key_bytes: &[u8]) -> Result<Self, CryptoError> {
        if key_bytes.len() != 32 {
            return Err(CryptoError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                key_bytes.len()
            )));
        }

        let key = Key::<Aes256Gcm>::from_slice(key_bytes);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    /// Creates a cipher from a 64-hex-character key string
    pub fn from_hex_key(key_hex: &str) -> Result<Self, CryptoError> {
        let key_bytes = hex::decode(key_hex.trim())
            .map_err(|e| CryptoError::InvalidKey(format!("not valid hex: {}", e)))?;
        Self::new(&key_bytes)
    }

    /// Encrypts a credential string
    ///
    /// Returns `hex(nonce || ciphertext)`. A fresh random nonce is drawn
    /// for every call, so sealing the same plaintext twice produces
    /// different blobs.
    pub fn seal(&self, plaintext: &str) -> Result<String, CryptoError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::EncryptFailed)?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(nonce.as_slice());
        blob.extend_from_slice(&ciphertext);

        Ok(hex::encode(blob))
    }

    /// Decrypts a sealed credential blob
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::DecryptFailed`] when the blob was sealed with
    /// a different key or has been modified, and
    /// [`CryptoError::InvalidEncoding`] when the blob is not valid hex or
    /// is too short to contain a nonce.
    pub fn open(&self, sealed: &str) -> Result<String, CryptoError> {
        let blob = hex::decode(sealed)
            .map_err(|e| CryptoError::InvalidEncoding(format!("not valid hex: {}", e)))?;

        if blob.len() <= NONCE_LEN {
            return Err(CryptoError::InvalidEncoding(
                "blob too short to contain nonce and ciphertext".to_string(),
            ));
        }

        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CryptoError::DecryptFailed)?;

        String::from_utf8(plaintext)
            .map_err(|_| CryptoError::InvalidEncoding("plaintext is not UTF-8".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cipher() -> CredentialCipher {
        CredentialCipher::from_hex_key(&"ab".repeat(32)).unwrap()
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let cipher = test_cipher();

        for secret in [
            "sk_live_abc123",
            "",
            "SG.long-sendgrid-key.with.dots",
            "unicode-密钥",
        ] {
            let sealed = cipher.seal(secret).unwrap();
            assert_eq!(cipher.open(&sealed).unwrap(), secret);
        }
    }

    #[test]
    fn test_seal_uses_random_nonce() {
        let cipher = test_cipher();

        let a = cipher.seal("same secret").unwrap();
        let b = cipher.seal("same secret").unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn test_tampered_blob_fails() {
        let cipher = test_cipher();
        let sealed = cipher.seal("sk_live_abc123").unwrap();

        // Flip one hex digit somewhere in the ciphertext
        let mut chars: Vec<char> = sealed.chars().collect();
        let last = chars.len() - 1;
        chars[last] = if chars[last] == '0' { '1' } else { '0' };
        let tampered: String = chars.into_iter().collect();

        assert!(matches!(
            cipher.open(&tampered),
            Err(CryptoError::DecryptFailed)
        ));
    }

    #[test]
    fn test_wrong_key_fails() {
        let cipher = test_cipher();
        let other = CredentialCipher::from_hex_key(&"cd".repeat(32)).unwrap();

        let sealed = cipher.seal("sk_live_abc123").unwrap();
        assert!(matches!(other.open(&sealed), Err(CryptoError::DecryptFailed)));
    }

    #[test]
    fn test_invalid_encodings() {
        let cipher = test_cipher();

        assert!(matches!(
            cipher.open("not hex at all!"),
            Err(CryptoError::InvalidEncoding(_))
        ));
        assert!(matches!(
            cipher.open("abcd"),
            Err(CryptoError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_invalid_keys() {
        assert!(CredentialCipher::from_hex_key("tooshort").is_err());
        assert!(CredentialCipher::new(&[0u8; 16]).is_err());
        assert!(CredentialCipher::new(&[0u8; 32]).is_ok());
    }
}
