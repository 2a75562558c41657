//! Cryptographic primitives for keyvault
//!
//! - **Key pairs**: 4096-bit RSA keys, encoded as PKCS#1 DER (`keys`)
//! - **Key protection**: AES-256-CFB keyed by a padded passphrase (`symmetric`)
//! - **Armor**: PEM blocks with a closed set of tags (`armor`)
//! - **Passphrases**: injected providers so callers decide where secrets come from
//!
//! # On-disk Format
//!
//! | tag                         | payload                                       |
//! |-----------------------------|-----------------------------------------------|
//! | `RSA PRIVATE KEY`           | PKCS#1 `RSAPrivateKey` DER                    |
//! | `ENCRYPTED RSA PRIVATE KEY` | `iv (16) \|\| AES-256-CFB(RSAPrivateKey DER)` |
//! | `RSA PUBLIC KEY`            | PKCS#1 `RSAPublicKey` DER                     |

pub mod armor;
mod keys;
mod passphrase;
pub mod symmetric;

pub use armor::{ArmorError, ArmoredBlock, KeyTag};
pub use keys::{KeyError, KeyPair, PrivateKey, PublicKey, KEY_SIZE};
pub use passphrase::{EnvPassphrase, PassphraseError, PassphraseProvider, StaticPassphrase};
pub use symmetric::{EncryptedPayload, SymmetricError};
