//! Transport token encryption
//!
//! Seals session tokens with AES-256-CBC before they are handed to clients.
//! The symmetric key is derived from the configured secret with SHA-256, so
//! any non-empty secret string is usable regardless of its length. Every
//! [`seal`] call draws a fresh random IV, so sealing the same plaintext twice
//! yields different transport tokens.
//!
//! Wire format: `base64(iv) ":" base64(ciphertext)`.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES block size, also the IV length
const IV_LENGTH: usize = 16;

/// Errors opening a transport token
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CipherError {
    /// The payload is structurally malformed or does not decrypt
    #[error("invalid transport token payload")]
    InvalidPayload,
}

/// Derive a 32-byte AES key from an arbitrary secret string
fn derive_key(secret: &str) -> [u8; 32] {
    Sha256::digest(secret.as_bytes()).into()
}

/// Encrypt a session token for transport
pub fn seal(plaintext: &str, secret: &str) -> String {
    let key = derive_key(secret);
    let mut iv = [0u8; IV_LENGTH];
    rand::thread_rng().fill_bytes(&mut iv);

    let ciphertext = Aes256CbcEnc::new(&key.into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    format!("{}:{}", BASE64.encode(iv), BASE64.encode(ciphertext))
}

/// Decrypt a transport token produced by [`seal`]
///
/// Fails with [`CipherError::InvalidPayload`] when the two-part structure is
/// missing, the IV has the wrong size, or decryption fails (wrong secret or
/// tampered ciphertext).
pub fn open(token: &str, secret: &str) -> Result<String, CipherError> {
    let (iv_part, ciphertext_part) = token.split_once(':').ok_or(CipherError::InvalidPayload)?;

    let iv = BASE64
        .decode(iv_part)
        .map_err(|_| CipherError::InvalidPayload)?;
    let ciphertext = BASE64
        .decode(ciphertext_part)
        .map_err(|_| CipherError::InvalidPayload)?;

    let iv: [u8; IV_LENGTH] = iv.try_into().map_err(|_| CipherError::InvalidPayload)?;

    let key = derive_key(secret);
    let plaintext = Aes256CbcDec::new(&key.into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| CipherError::InvalidPayload)?;

    String::from_utf8(plaintext).map_err(|_| CipherError::InvalidPayload)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "a perfectly ordinary secret";
    // Long enough that a wrong-key decrypt cannot accidentally produce valid UTF-8
    const PLAINTEXT: &str =
        "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.payload-of-a-signed-session-token.signature";

    #[test]
    fn seal_open_roundtrip() {
        let sealed = seal(PLAINTEXT, SECRET);
        assert_eq!(open(&sealed, SECRET).unwrap(), PLAINTEXT);
    }

    #[test]
    fn seal_is_randomized_but_both_open() {
        let first = seal(PLAINTEXT, SECRET);
        let second = seal(PLAINTEXT, SECRET);
        assert_ne!(first, second);
        assert_eq!(open(&first, SECRET).unwrap(), PLAINTEXT);
        assert_eq!(open(&second, SECRET).unwrap(), PLAINTEXT);
    }

    #[test]
    fn open_with_wrong_secret_fails() {
        let sealed = seal(PLAINTEXT, SECRET);
        assert_eq!(
            open(&sealed, "a different secret"),
            Err(CipherError::InvalidPayload)
        );
    }

    #[test]
    fn open_rejects_missing_separator() {
        assert_eq!(
            open("bm90LWEtdG9rZW4", SECRET),
            Err(CipherError::InvalidPayload)
        );
    }

    #[test]
    fn open_rejects_bad_base64() {
        assert_eq!(
            open("!!not-base64!!:!!neither!!", SECRET),
            Err(CipherError::InvalidPayload)
        );
    }

    #[test]
    fn open_rejects_short_iv() {
        let short_iv = BASE64.encode([0u8; 8]);
        let ciphertext = BASE64.encode([0u8; 16]);
        assert_eq!(
            open(&format!("{}:{}", short_iv, ciphertext), SECRET),
            Err(CipherError::InvalidPayload)
        );
    }

    #[test]
    fn open_rejects_tampered_ciphertext() {
        let sealed = seal(PLAINTEXT, SECRET);
        let (iv_part, _) = sealed.split_once(':').unwrap();
        let tampered = format!("{}:{}", iv_part, BASE64.encode([0xffu8; 32]));
        assert_eq!(open(&tampered, SECRET), Err(CipherError::InvalidPayload));
    }

    #[test]
    fn any_nonempty_secret_works() {
        for secret in ["x", "0123456789abcdef0123456789abcdef", "日本語の秘密"] {
            let sealed = seal(PLAINTEXT, secret);
            assert_eq!(open(&sealed, secret).unwrap(), PLAINTEXT);
        }
    }
}
