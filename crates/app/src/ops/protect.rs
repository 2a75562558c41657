use clap::Args;

use common::prelude::CodecError;

use super::passphrase::{self, PassphraseArgs};
use crate::state::StateError;

/// Resave a private key with a new passphrase, or without one
#[derive(Args, Debug, Clone)]
pub struct Protect {
    /// Private key file name (defaults to the configured name)
    #[arg(long)]
    pub private: Option<String>,

    /// Store the private key unencrypted from now on
    #[arg(long, conflicts_with = "new_passphrase_env")]
    pub no_passphrase: bool,

    /// Read the new passphrase from this environment variable instead of prompting
    #[arg(long, value_name = "VAR")]
    pub new_passphrase_env: Option<String>,

    #[command(flatten)]
    pub passphrase: PassphraseArgs,
}

#[derive(Debug, thiserror::Error)]
pub enum ProtectError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("protect failed: {0}")]
    Codec(#[from] CodecError),
}

impl crate::op::Op for Protect {
    type Error = ProtectError;
    type Output = String;

    fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let codec = state.codec();
        let private_name = self.private.as_ref().unwrap_or(&state.config.keys.private);

        let unlock = self.passphrase.unlock();
        let private_key = codec.load_private_key(private_name, Some(&*unlock))?;

        let protect = (!self.no_passphrase).then(|| {
            passphrase::provider(
                self.new_passphrase_env.as_deref(),
                "New passphrase: ",
                true,
            )
        });
        let path = codec.save_private_key(&private_key, private_name, protect.as_deref())?;

        let mode = if self.no_passphrase {
            "unencrypted"
        } else {
            "passphrase protected"
        };
        Ok(format!("Private key at {} is now {}", path.display(), mode))
    }
}
