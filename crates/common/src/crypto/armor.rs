//! PEM armor for key files
//!
//! An [`ArmoredBlock`] is a tag plus a byte payload. The tag set is closed: anything
//! other than the three [`KeyTag`]s is rejected when parsing, never guessed at.

use std::fmt;
use std::str::FromStr;

use pem::{EncodeConfig, LineEnding, Pem};
use zeroize::{Zeroize, Zeroizing};

#[derive(Debug, thiserror::Error)]
pub enum ArmorError {
    #[error("malformed armor: {0}")]
    Malformed(#[from] pem::PemError),
    #[error("unrecognized armor tag: {0}")]
    UnknownTag(String),
}

/// The armor tags this crate reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyTag {
    /// Raw PKCS#1 private key bytes
    RsaPrivateKey,
    /// PKCS#1 private key bytes wrapped by [`crate::crypto::symmetric::encrypt`]
    EncryptedRsaPrivateKey,
    /// Raw PKCS#1 public key bytes
    RsaPublicKey,
}

impl KeyTag {
    pub const fn as_str(&self) -> &'static str {
        match self {
            KeyTag::RsaPrivateKey => "RSA PRIVATE KEY",
            KeyTag::EncryptedRsaPrivateKey => "ENCRYPTED RSA PRIVATE KEY",
            KeyTag::RsaPublicKey => "RSA PUBLIC KEY",
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(
            self,
            KeyTag::RsaPrivateKey | KeyTag::EncryptedRsaPrivateKey
        )
    }
}

impl fmt::Display for KeyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyTag {
    type Err = ArmorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RSA PRIVATE KEY" => Ok(KeyTag::RsaPrivateKey),
            "ENCRYPTED RSA PRIVATE KEY" => Ok(KeyTag::EncryptedRsaPrivateKey),
            "RSA PUBLIC KEY" => Ok(KeyTag::RsaPublicKey),
            other => Err(ArmorError::UnknownTag(other.to_string())),
        }
    }
}

/// A tagged payload in PEM form
///
/// The payload may be raw private key bytes, so it is wiped on drop.
pub struct ArmoredBlock {
    tag: KeyTag,
    payload: Zeroizing<Vec<u8>>,
}

impl fmt::Debug for ArmoredBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArmoredBlock")
            .field("tag", &self.tag)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

impl ArmoredBlock {
    pub fn new(tag: KeyTag, payload: Vec<u8>) -> Self {
        Self {
            tag,
            payload: Zeroizing::new(payload),
        }
    }

    pub fn tag(&self) -> KeyTag {
        self.tag
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Encode as PEM with 64-column base64 lines and LF line endings
    ///
    /// The text carries the payload, so it is wiped on drop like the payload itself.
    pub fn encode(&self) -> Zeroizing<String> {
        let pem = Pem::new(self.tag.as_str(), self.payload.to_vec());
        let encoded = Zeroizing::new(pem::encode_config(
            &pem,
            EncodeConfig::new().set_line_ending(LineEnding::LF),
        ));
        pem.into_contents().zeroize();
        encoded
    }

    /// Parse the first PEM block in `input`
    ///
    /// # Errors
    ///
    /// Returns [`ArmorError::Malformed`] if no PEM block can be parsed and
    /// [`ArmorError::UnknownTag`] if its tag is not a [`KeyTag`].
    pub fn parse(input: impl AsRef<[u8]>) -> Result<Self, ArmorError> {
        let pem = pem::parse(input)?;
        let tag = pem.tag().parse::<KeyTag>()?;
        Ok(Self::new(tag, pem.into_contents()))
    }
}
