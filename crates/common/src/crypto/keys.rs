use std::fmt;
use std::ops::Deref;

use rsa::pkcs1::{
    DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey,
};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Modulus size, in bits, of every generated key pair
pub const KEY_SIZE: usize = 4096;

/// Errors that can occur during key operations
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("failed to generate {bits}-bit key pair: {source}")]
    Generation {
        bits: usize,
        #[source]
        source: rsa::Error,
    },
    #[error("key error: {0}")]
    Default(#[from] anyhow::Error),
}

/// RSA public key
///
/// A thin wrapper around `rsa::RsaPublicKey`. The raw byte form is PKCS#1 DER
/// (`RSAPublicKey`), which is what gets armored into `RSA PUBLIC KEY` blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(RsaPublicKey);

impl Deref for PublicKey {
    type Target = RsaPublicKey;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<RsaPublicKey> for PublicKey {
    fn from(key: RsaPublicKey) -> Self {
        PublicKey(key)
    }
}

impl From<PublicKey> for RsaPublicKey {
    fn from(key: PublicKey) -> Self {
        key.0
    }
}

impl PublicKey {
    /// Parse a public key from PKCS#1 DER bytes
    pub fn from_pkcs1_der(bytes: &[u8]) -> Result<Self, KeyError> {
        let key = RsaPublicKey::from_pkcs1_der(bytes)
            .map_err(|e| anyhow::anyhow!("failed to parse public key: {}", e))?;
        Ok(Self(key))
    }

    /// Encode the public key as PKCS#1 DER bytes
    pub fn to_pkcs1_der(&self) -> Result<Vec<u8>, KeyError> {
        let doc = self
            .0
            .to_pkcs1_der()
            .map_err(|e| anyhow::anyhow!("failed to encode public key: {}", e))?;
        Ok(doc.as_bytes().to_vec())
    }

    pub fn modulus(&self) -> &BigUint {
        self.0.n()
    }

    pub fn exponent(&self) -> &BigUint {
        self.0.e()
    }

    /// Size of the modulus in bits
    pub fn bits(&self) -> usize {
        self.0.n().bits()
    }

    /// Lowercase hex SHA-256 of the PKCS#1 DER encoding
    pub fn fingerprint(&self) -> Result<String, KeyError> {
        let der = self.to_pkcs1_der()?;
        Ok(hex::encode(Sha256::digest(&der)))
    }
}

/// RSA private key
///
/// Wraps `rsa::RsaPrivateKey`, which holds the modulus, both exponents and the CRT
/// parameters. The public half is always recoverable with [`PrivateKey::public`].
///
/// `Debug` only reports the modulus size, never key material.
#[derive(Clone, PartialEq)]
pub struct PrivateKey(RsaPrivateKey);

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("bits", &self.0.n().bits())
            .finish_non_exhaustive()
    }
}

impl Deref for PrivateKey {
    type Target = RsaPrivateKey;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<RsaPrivateKey> for PrivateKey {
    fn from(key: RsaPrivateKey) -> Self {
        PrivateKey(key)
    }
}

impl PrivateKey {
    /// Derive the public key from this private key
    pub fn public(&self) -> PublicKey {
        PublicKey(self.0.to_public_key())
    }

    /// Parse and validate a private key from PKCS#1 DER bytes
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a DER `RSAPrivateKey`, or if the
    /// parsed components are not a consistent RSA key.
    pub fn from_pkcs1_der(bytes: &[u8]) -> Result<Self, KeyError> {
        let key = RsaPrivateKey::from_pkcs1_der(bytes)
            .map_err(|e| anyhow::anyhow!("failed to parse private key: {}", e))?;
        key.validate()
            .map_err(|e| anyhow::anyhow!("inconsistent private key: {}", e))?;
        Ok(Self(key))
    }

    /// Encode the private key as PKCS#1 DER bytes
    ///
    /// The returned buffer is wiped when dropped.
    pub fn to_pkcs1_der(&self) -> Result<Zeroizing<Vec<u8>>, KeyError> {
        let doc = self
            .0
            .to_pkcs1_der()
            .map_err(|e| anyhow::anyhow!("failed to encode private key: {}", e))?;
        Ok(Zeroizing::new(doc.as_bytes().to_vec()))
    }
}

/// A private key together with its derived public key
#[derive(Debug, Clone)]
pub struct KeyPair {
    private: PrivateKey,
    public: PublicKey,
}

impl From<PrivateKey> for KeyPair {
    fn from(private: PrivateKey) -> Self {
        let public = private.public();
        Self { private, public }
    }
}

impl KeyPair {
    /// Generate a new [`KEY_SIZE`]-bit key pair from the OS random source
    ///
    /// # Panics
    ///
    /// Panics if the random source or the generator fails. There is nothing a caller
    /// could retry without a working entropy source; use [`KeyPair::try_generate`]
    /// to handle the failure instead.
    pub fn generate() -> Self {
        match Self::try_generate(KEY_SIZE) {
            Ok(pair) => pair,
            Err(e) => {
                tracing::error!("error generating private key: {}", e);
                panic!("unrecoverable key generation failure: {}", e);
            }
        }
    }

    /// Generate a new key pair with a `bits`-bit modulus
    pub fn try_generate(bits: usize) -> Result<Self, KeyError> {
        let mut rng = rand::rngs::OsRng;
        let key = RsaPrivateKey::new(&mut rng, bits)
            .map_err(|source| KeyError::Generation { bits, source })?;
        Ok(PrivateKey(key).into())
    }

    pub fn private(&self) -> &PrivateKey {
        &self.private
    }

    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    pub fn into_parts(self) -> (PrivateKey, PublicKey) {
        (self.private, self.public)
    }
}
