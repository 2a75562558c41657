/**
 * Reading and writing armored key files.
 *  - Private keys, optionally passphrase protected
 *  - Public keys
 */
pub mod codec;
/**
 * Cryptographic types and operations.
 *  - RSA key pair generation and PKCS#1 encoding
 *  - Passphrase-keyed symmetric encryption
 *  - PEM armor and passphrase providers
 */
pub mod crypto;
/**
 * Resolution of logical key names to files
 *  under the private and public key directories.
 */
pub mod key_dirs;

pub mod prelude {
    pub use crate::codec::{CodecError, KeyCodec};
    pub use crate::crypto::{
        EnvPassphrase, KeyPair, PassphraseProvider, PrivateKey, PublicKey, StaticPassphrase,
    };
    pub use crate::key_dirs::KeyDirs;
}
