//! Sources of passphrases for protected private keys
//!
//! A [`PassphraseProvider`] is asked for its secret exactly once per save or load of
//! a protected key, and only when one is actually needed.

use zeroize::Zeroizing;

#[derive(Debug, thiserror::Error)]
pub enum PassphraseError {
    #[error("environment variable {0} is not set or not valid unicode")]
    MissingEnv(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("passphrase error: {0}")]
    Default(#[from] anyhow::Error),
}

/// Obtain a secret from the environment or the user on demand
pub trait PassphraseProvider {
    fn passphrase(&self) -> Result<Zeroizing<Vec<u8>>, PassphraseError>;
}

impl<P: PassphraseProvider + ?Sized> PassphraseProvider for &P {
    fn passphrase(&self) -> Result<Zeroizing<Vec<u8>>, PassphraseError> {
        (**self).passphrase()
    }
}

impl<P: PassphraseProvider + ?Sized> PassphraseProvider for Box<P> {
    fn passphrase(&self) -> Result<Zeroizing<Vec<u8>>, PassphraseError> {
        (**self).passphrase()
    }
}

/// A fixed passphrase, for scripting and tests
pub struct StaticPassphrase(Zeroizing<Vec<u8>>);

impl StaticPassphrase {
    pub fn new(passphrase: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(passphrase.into()))
    }
}

impl PassphraseProvider for StaticPassphrase {
    fn passphrase(&self) -> Result<Zeroizing<Vec<u8>>, PassphraseError> {
        Ok(self.0.clone())
    }
}

/// Reads the passphrase from a named environment variable at call time
#[derive(Debug, Clone)]
pub struct EnvPassphrase {
    var: String,
}

impl EnvPassphrase {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl PassphraseProvider for EnvPassphrase {
    fn passphrase(&self) -> Result<Zeroizing<Vec<u8>>, PassphraseError> {
        let value = std::env::var(&self.var)
            .map_err(|_| PassphraseError::MissingEnv(self.var.clone()))?;
        Ok(Zeroizing::new(value.into_bytes()))
    }
}
