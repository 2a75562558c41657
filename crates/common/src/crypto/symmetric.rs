//! Passphrase-keyed encryption using AES-256 in CFB mode
//!
//! This module wraps private key bytes before they are armored and written to disk.
//! The encrypted format is: `iv (16 bytes) || ciphertext (N bytes)`, where `N` is the
//! length of the plaintext. There is no authentication tag and no length prefix.
//!
//! # Security Considerations
//!
//! - A wrong key does not fail here. Decryption produces garbage of the right length,
//!   and callers must detect that by validating the recovered bytes.
//! - Keys shorter than [`PADDED_KEY_SIZE`] are extended with bytes from a generator
//!   seeded with a constant (see [`pad_key`]). The extension is therefore public and
//!   adds no entropy: a short passphrase yields predictable key material. Replacing
//!   this with a salted KDF changes the on-disk format and needs a new armor tag.

use aes::Aes256;
use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use zeroize::Zeroizing;

/// Size of an AES block, and therefore of the IV, in bytes
pub const BLOCK_SIZE: usize = 16;
/// Size of the AES-256 key every passphrase is padded or truncated to
pub const PADDED_KEY_SIZE: usize = 32;
/// Fixed seed for the key padding generator
const PADDING_SEED: u64 = 42;

type Aes256CfbEnc = cfb_mode::Encryptor<Aes256>;
type Aes256CfbDec = cfb_mode::Decryptor<Aes256>;

/// Errors that can occur during encryption/decryption
#[derive(Debug, thiserror::Error)]
pub enum SymmetricError {
    #[error("no passphrase provided for message encryption or decryption")]
    MissingKey,
    #[error("ciphertext too short, expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("symmetric error: {0}")]
    Default(#[from] anyhow::Error),
}

/// Output of [`encrypt`]: the IV followed by the ciphertext, as one buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload(Vec<u8>);

impl EncryptedPayload {
    /// Wrap bytes previously produced by [`encrypt`]
    ///
    /// # Errors
    ///
    /// Returns [`SymmetricError::Truncated`] if there is not room for an IV.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, SymmetricError> {
        if bytes.len() < BLOCK_SIZE {
            return Err(SymmetricError::Truncated {
                expected: BLOCK_SIZE,
                actual: bytes.len(),
            });
        }
        Ok(Self(bytes))
    }

    pub fn iv(&self) -> &[u8] {
        &self.0[..BLOCK_SIZE]
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.0[BLOCK_SIZE..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for EncryptedPayload {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Normalize an arbitrary-length key to [`PADDED_KEY_SIZE`] bytes
///
/// Long keys are truncated. Short keys are copied to the front of the buffer and the
/// remaining positions are filled, in order, with the low byte of successive outputs
/// of a ChaCha20 generator seeded with a constant. The generator is reseeded on
/// every call, so the same input always pads to the same bytes.
pub fn pad_key(key: &[u8]) -> Zeroizing<[u8; PADDED_KEY_SIZE]> {
    let mut padded = Zeroizing::new([0u8; PADDED_KEY_SIZE]);
    if key.len() >= PADDED_KEY_SIZE {
        padded.copy_from_slice(&key[..PADDED_KEY_SIZE]);
        return padded;
    }

    padded[..key.len()].copy_from_slice(key);
    let mut rng = ChaCha20Rng::seed_from_u64(PADDING_SEED);
    for byte in padded[key.len()..].iter_mut() {
        *byte = rng.next_u64() as u8;
    }
    padded
}

/// Encrypt `message` under `key` with a fresh random IV
///
/// The output is `BLOCK_SIZE + message.len()` bytes long.
///
/// # Errors
///
/// Returns [`SymmetricError::MissingKey`] for an empty key, or an error if the
/// system RNG fails.
pub fn encrypt(message: &[u8], key: &[u8]) -> Result<EncryptedPayload, SymmetricError> {
    if key.is_empty() {
        return Err(SymmetricError::MissingKey);
    }
    let key = pad_key(key);

    let mut out = vec![0u8; BLOCK_SIZE + message.len()];
    let (iv, body) = out.split_at_mut(BLOCK_SIZE);
    getrandom::getrandom(iv).map_err(|e| anyhow::anyhow!("failed to generate iv: {}", e))?;
    body.copy_from_slice(message);

    let cipher = Aes256CfbEnc::new_from_slices(&key[..], iv)
        .map_err(|e| anyhow::anyhow!("failed to construct cipher: {}", e))?;
    cipher.encrypt(body);

    Ok(EncryptedPayload(out))
}

/// Decrypt `iv || ciphertext` produced by [`encrypt`]
///
/// A key other than the one used to encrypt is not detected and yields garbage.
///
/// # Errors
///
/// Returns [`SymmetricError::MissingKey`] for an empty key and
/// [`SymmetricError::Truncated`] if `ciphertext` is shorter than one block.
pub fn decrypt(ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>, SymmetricError> {
    if key.is_empty() {
        return Err(SymmetricError::MissingKey);
    }
    if ciphertext.len() < BLOCK_SIZE {
        return Err(SymmetricError::Truncated {
            expected: BLOCK_SIZE,
            actual: ciphertext.len(),
        });
    }
    let key = pad_key(key);

    let (iv, body) = ciphertext.split_at(BLOCK_SIZE);
    let mut plaintext = body.to_vec();
    let cipher = Aes256CfbDec::new_from_slices(&key[..], iv)
        .map_err(|e| anyhow::anyhow!("failed to construct cipher: {}", e))?;
    cipher.decrypt(&mut plaintext);

    Ok(plaintext)
}
