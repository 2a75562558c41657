use std::path::PathBuf;

use clap::Args;

use common::crypto::{KeyError, KeyPair, KEY_SIZE};
use common::prelude::CodecError;

use super::passphrase::PassphraseArgs;
use crate::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct Keygen {
    /// Private key file name (defaults to the configured name)
    #[arg(long)]
    pub private: Option<String>,

    /// Public key file name (defaults to the configured name; "" skips it)
    #[arg(long)]
    pub public: Option<String>,

    /// Store the private key unencrypted
    #[arg(long, conflicts_with = "passphrase_env")]
    pub no_passphrase: bool,

    /// Overwrite an existing private key file
    #[arg(long)]
    pub force: bool,

    #[command(flatten)]
    pub passphrase: PassphraseArgs,
}

#[derive(Debug, thiserror::Error)]
pub enum KeygenError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("private key {} already exists; pass --force to replace it", .0.display())]
    KeyExists(PathBuf),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error("failed to save key: {0}")]
    Codec(#[from] CodecError),
}

impl crate::op::Op for Keygen {
    type Error = KeygenError;
    type Output = String;

    fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let codec = state.codec();
        let private_name = self
            .private
            .clone()
            .unwrap_or_else(|| state.config.keys.private.clone());
        let public_name = self
            .public
            .clone()
            .unwrap_or_else(|| state.config.keys.public.clone());

        let existing = codec
            .key_dirs()
            .private_key_path(&private_name)
            .map_err(CodecError::from)?;
        if existing.exists() {
            if !self.force {
                return Err(KeygenError::KeyExists(existing));
            }
            tracing::warn!(path = %existing.display(), "replacing existing private key");
        }

        tracing::info!(bits = KEY_SIZE, "generating RSA key pair");
        let pair = KeyPair::try_generate(KEY_SIZE)?;

        let passphrase = (!self.no_passphrase).then(|| self.passphrase.protect());
        let private_path =
            codec.save_private_key(pair.private(), &private_name, passphrase.as_deref())?;
        let public_path = codec.save_public_key(pair.public(), &public_name)?;

        let mut lines = vec![format!("Private key: {}", private_path.display())];
        if self.no_passphrase {
            lines.push("  (unencrypted)".to_string());
        }
        match public_path {
            Some(path) => lines.push(format!("Public key:  {}", path.display())),
            None => lines.push("Public key:  not saved".to_string()),
        }
        lines.push(format!("Fingerprint: {}", pair.public().fingerprint()?));

        Ok(lines.join("\n"))
    }
}
