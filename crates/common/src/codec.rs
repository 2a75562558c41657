//! Reading and writing key files
//!
//! A private key file is either unprotected (`RSA PRIVATE KEY`) or passphrase
//! protected (`ENCRYPTED RSA PRIVATE KEY`). The caller picks the mode at save time by
//! passing a [`PassphraseProvider`] or not, and the tag records it. A file only
//! changes mode when it is saved again.
//!
//! # Errors
//!
//! [`CodecError::InvalidKeyFormat`] is the single "could not recover a usable key"
//! signal. The symmetric cipher is unauthenticated, so a wrong passphrase and a
//! corrupted file look the same here: both decrypt to bytes that fail to parse.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::crypto::symmetric::{self, SymmetricError};
use crate::crypto::{
    ArmoredBlock, KeyError, KeyTag, PassphraseError, PassphraseProvider, PrivateKey, PublicKey,
};
use crate::key_dirs::{KeyDirs, KeyDirsError};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("invalid key type: the file you are trying to load may not be a private/public key")]
    InvalidKeyFormat,
    #[error("key file is passphrase protected but no passphrase was supplied")]
    PassphraseRequired,
    #[error(transparent)]
    Path(#[from] KeyDirsError),
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error encrypting private key: {0}")]
    Symmetric(#[from] SymmetricError),
    #[error(transparent)]
    Passphrase(#[from] PassphraseError),
    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Saves and loads armored key files under a pair of key directories
#[derive(Debug, Clone)]
pub struct KeyCodec {
    dirs: KeyDirs,
}

impl KeyCodec {
    pub fn new(dirs: KeyDirs) -> Self {
        Self { dirs }
    }

    pub fn key_dirs(&self) -> &KeyDirs {
        &self.dirs
    }

    /// Write `key` to `destination`, encrypted if a passphrase provider is given
    ///
    /// Without a provider the key is stored in the clear and a warning is logged.
    /// Returns the resolved path of the written file.
    pub fn save_private_key(
        &self,
        key: &PrivateKey,
        destination: impl AsRef<Path>,
        passphrase: Option<&dyn PassphraseProvider>,
    ) -> Result<PathBuf, CodecError> {
        let path = self.dirs.private_key_path(destination)?;
        let key_bytes = key.to_pkcs1_der()?;

        let block = match passphrase {
            Some(provider) => {
                let passphrase = provider.passphrase()?;
                let payload = symmetric::encrypt(&key_bytes, &passphrase)?;
                ArmoredBlock::new(KeyTag::EncryptedRsaPrivateKey, payload.into_bytes())
            }
            None => {
                tracing::warn!("security warning: saving unencrypted private key!");
                ArmoredBlock::new(KeyTag::RsaPrivateKey, key_bytes.to_vec())
            }
        };

        tracing::info!(path = %path.display(), "saving private key to file");
        write_key_file(&path, block.encode().as_bytes(), true)?;
        Ok(path)
    }

    /// Read a private key from `source`, asking for a passphrase if it is protected
    pub fn load_private_key(
        &self,
        source: impl AsRef<Path>,
        passphrase: Option<&dyn PassphraseProvider>,
    ) -> Result<PrivateKey, CodecError> {
        let path = self.dirs.private_key_path(source)?;
        tracing::info!(path = %path.display(), "loading private key from file");

        let block = read_key_file(&path)?;
        let key_bytes = match block.tag() {
            KeyTag::EncryptedRsaPrivateKey => {
                let provider = passphrase.ok_or(CodecError::PassphraseRequired)?;
                let passphrase = provider.passphrase()?;
                let decrypted = symmetric::decrypt(block.payload(), &passphrase).map_err(|e| {
                    tracing::debug!(error = %e, "failed to decrypt private key");
                    CodecError::InvalidKeyFormat
                })?;
                Zeroizing::new(decrypted)
            }
            KeyTag::RsaPrivateKey => Zeroizing::new(block.payload().to_vec()),
            KeyTag::RsaPublicKey => return Err(CodecError::InvalidKeyFormat),
        };

        PrivateKey::from_pkcs1_der(&key_bytes).map_err(|e| {
            tracing::debug!(error = %e, "failed to parse private key");
            CodecError::InvalidKeyFormat
        })
    }

    /// Write `key` to `destination`
    ///
    /// A blank destination is not an error: nothing is written and `None` is returned.
    pub fn save_public_key(
        &self,
        key: &PublicKey,
        destination: impl AsRef<Path>,
    ) -> Result<Option<PathBuf>, CodecError> {
        let destination = destination.as_ref();
        if destination.to_string_lossy().trim().is_empty() {
            tracing::warn!("public key not saved to file; no file path provided");
            return Ok(None);
        }

        let path = self.dirs.public_key_path(destination)?;
        let block = ArmoredBlock::new(KeyTag::RsaPublicKey, key.to_pkcs1_der()?);

        tracing::info!(path = %path.display(), "saving public key to file");
        write_key_file(&path, block.encode().as_bytes(), false)?;
        Ok(Some(path))
    }

    pub fn load_public_key(&self, source: impl AsRef<Path>) -> Result<PublicKey, CodecError> {
        let path = self.dirs.public_key_path(source)?;
        tracing::info!(path = %path.display(), "loading public key from file");

        let block = read_key_file(&path)?;
        if block.tag() != KeyTag::RsaPublicKey {
            return Err(CodecError::InvalidKeyFormat);
        }

        PublicKey::from_pkcs1_der(block.payload()).map_err(|e| {
            tracing::debug!(error = %e, "failed to parse public key");
            CodecError::InvalidKeyFormat
        })
    }
}

fn read_key_file(path: &Path) -> Result<ArmoredBlock, CodecError> {
    let data = fs::read(path).map_err(|source| CodecError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ArmoredBlock::parse(&data).map_err(|e| {
        tracing::debug!(error = %e, "failed to parse armored key file");
        CodecError::InvalidKeyFormat
    })
}

/// Create or truncate `path` and write `contents`; private files are owner-only on unix
///
/// The mode is reset on existing files too, since `OpenOptions::mode` only applies
/// at creation.
fn write_key_file(path: &Path, contents: &[u8], private: bool) -> Result<(), CodecError> {
    let io_err = |source| CodecError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        if private {
            options.mode(0o600);
        }
    }
    #[cfg(not(unix))]
    let _ = private;

    let mut file = options.open(path).map_err(io_err)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if private {
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(io_err)?;
        }
    }
    file.write_all(contents).map_err(io_err)?;
    file.flush().map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use std::cell::Cell;

    use super::*;
    use crate::crypto::{KeyPair, StaticPassphrase};

    /// Counts how often the codec asks for the passphrase
    struct CountingPassphrase {
        inner: StaticPassphrase,
        calls: Cell<usize>,
    }

    impl CountingPassphrase {
        fn new(passphrase: &str) -> Self {
            Self {
                inner: StaticPassphrase::new(passphrase),
                calls: Cell::new(0),
            }
        }
    }

    impl PassphraseProvider for CountingPassphrase {
        fn passphrase(&self) -> Result<Zeroizing<Vec<u8>>, PassphraseError> {
            self.calls.set(self.calls.get() + 1);
            self.inner.passphrase()
        }
    }

    fn setup() -> (KeyCodec, tempfile::TempDir) {
        let temp = tempfile::TempDir::new().unwrap();
        let dirs = KeyDirs::new(temp.path().join("priv_keys"), temp.path().join("pub_keys"));
        dirs.ensure().unwrap();
        (KeyCodec::new(dirs), temp)
    }

    #[test]
    fn test_passphrase_asked_once_per_call() {
        let (codec, _temp) = setup();
        let pair = KeyPair::try_generate(1024).unwrap();
        let passphrase = CountingPassphrase::new("correct-horse");

        codec
            .save_private_key(pair.private(), "node.key", Some(&passphrase))
            .unwrap();
        assert_eq!(passphrase.calls.get(), 1);

        codec.load_private_key("node.key", Some(&passphrase)).unwrap();
        assert_eq!(passphrase.calls.get(), 2);
    }

    #[test]
    fn test_passphrase_not_asked_for_plain_key() {
        let (codec, _temp) = setup();
        let pair = KeyPair::try_generate(1024).unwrap();
        let passphrase = CountingPassphrase::new("unused");

        codec.save_private_key(pair.private(), "node.key", None).unwrap();
        let loaded = codec.load_private_key("node.key", Some(&passphrase)).unwrap();

        assert_eq!(passphrase.calls.get(), 0);
        assert_eq!(&loaded, pair.private());
    }

    #[test]
    fn test_encrypted_key_requires_passphrase() {
        let (codec, _temp) = setup();
        let pair = KeyPair::try_generate(1024).unwrap();
        let passphrase = StaticPassphrase::new("correct-horse");

        codec
            .save_private_key(pair.private(), "node.key", Some(&passphrase))
            .unwrap();
        assert!(matches!(
            codec.load_private_key("node.key", None),
            Err(CodecError::PassphraseRequired)
        ));
    }

    #[test]
    fn test_empty_passphrase() {
        let (codec, temp) = setup();
        let pair = KeyPair::try_generate(1024).unwrap();
        let empty = StaticPassphrase::new("");

        let result = codec.save_private_key(pair.private(), "node.key", Some(&empty));
        assert!(matches!(
            result,
            Err(CodecError::Symmetric(SymmetricError::MissingKey))
        ));
        assert!(!temp.path().join("priv_keys/node.key").exists());

        codec
            .save_private_key(pair.private(), "node.key", Some(&StaticPassphrase::new("x")))
            .unwrap();
        assert!(matches!(
            codec.load_private_key("node.key", Some(&empty)),
            Err(CodecError::InvalidKeyFormat)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_private_key_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let (codec, _temp) = setup();
        let pair = KeyPair::try_generate(1024).unwrap();
        let path = codec.save_private_key(pair.private(), "node.key", None).unwrap();

        let mode = fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_overwritten_private_key_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let (codec, temp) = setup();
        let pair = KeyPair::try_generate(1024).unwrap();
        let existing = temp.path().join("priv_keys/node.key");
        fs::write(&existing, "old contents").unwrap();
        fs::set_permissions(&existing, fs::Permissions::from_mode(0o644)).unwrap();

        let path = codec.save_private_key(pair.private(), "node.key", None).unwrap();
        assert_eq!(path, existing);

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(&codec.load_private_key("node.key", None).unwrap(), pair.private());
    }

    #[test]
    fn test_path_without_file_name() {
        let (codec, _temp) = setup();
        let pair = KeyPair::try_generate(1024).unwrap();

        assert!(matches!(
            codec.save_private_key(pair.private(), "..", None),
            Err(CodecError::Path(KeyDirsError::InvalidPath(_)))
        ));
        assert!(matches!(
            codec.load_public_key("/"),
            Err(CodecError::Path(KeyDirsError::InvalidPath(_)))
        ));
    }
}
