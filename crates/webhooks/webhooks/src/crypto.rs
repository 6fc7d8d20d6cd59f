//! AES-256-CBC decryption of encrypted callbacks.
//!
//! When an encrypt key is configured on the platform, callbacks arrive as
//! `{"encrypt": "<base64>"}`. The decoded bytes are a 16-byte IV followed by
//! the ciphertext, encrypted with `sha256(encrypt_key)` as the key.

use aes::cipher::block_padding::{NoPadding, Pkcs7};
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use feishu_core::{FeishuError, FeishuResult};
use serde_json::Value;
use sha2::{Digest, Sha256};

type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

const BLOCK_SIZE: usize = 16;

fn derive_key(encrypt_key: &str) -> [u8; 32] {
    Sha256::digest(encrypt_key.as_bytes()).into()
}

fn require_key(encrypt_key: Option<&str>) -> FeishuResult<&str> {
    encrypt_key
        .filter(|key| !key.is_empty())
        .ok_or(FeishuError::MissingEncryptKey)
}

/// Decrypts an encrypted callback into its JSON payload.
///
/// Fails with [`FeishuError::MissingEncryptKey`] when no key is configured
/// and with [`FeishuError::Decryption`] for malformed input.
pub fn decrypt(encrypt_key: Option<&str>, ciphertext: &str) -> FeishuResult<Value> {
    let encrypt_key = require_key(encrypt_key)?;

    let decoded = STANDARD
        .decode(ciphertext.trim())
        .map_err(|e| FeishuError::decryption(format!("invalid base64: {e}")))?;
    if decoded.len() < 2 * BLOCK_SIZE || decoded.len() % BLOCK_SIZE != 0 {
        return Err(FeishuError::decryption(format!(
            "invalid ciphertext length {}",
            decoded.len()
        )));
    }

    let (iv, body) = decoded.split_at(BLOCK_SIZE);
    let mut plain = Aes256CbcDec::new_from_slices(&derive_key(encrypt_key), iv)
        .map_err(|e| FeishuError::decryption(e.to_string()))?
        .decrypt_padded_vec_mut::<NoPadding>(body)
        .map_err(|_| FeishuError::decryption("ciphertext is not block aligned"))?;

    // Strip trailing padding when the last byte looks like a pad length
    if let Some(&pad) = plain.last() {
        if (1..=BLOCK_SIZE).contains(&(pad as usize)) {
            plain.truncate(plain.len() - pad as usize);
        }
    }

    serde_json::from_slice(&plain)
        .map_err(|e| FeishuError::decryption(format!("decrypted payload is not JSON: {e}")))
}

/// Encrypts a payload the way the platform does, with a random IV.
pub fn encrypt(encrypt_key: &str, payload: &Value) -> FeishuResult<String> {
    let plain = serde_json::to_vec(payload)
        .map_err(|e| FeishuError::decryption(format!("payload is not serializable: {e}")))?;
    let iv: [u8; BLOCK_SIZE] = rand::random();

    let ciphertext = Aes256CbcEnc::new_from_slices(&derive_key(encrypt_key), &iv)
        .map_err(|e| FeishuError::decryption(e.to_string()))?
        .encrypt_padded_vec_mut::<Pkcs7>(&plain);

    let mut out = Vec::with_capacity(BLOCK_SIZE + ciphertext.len());
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(out))
}
