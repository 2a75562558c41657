use clap::Args;

use common::prelude::CodecError;

use super::passphrase::PassphraseArgs;
use crate::state::StateError;

/// Write the public half of an existing private key
#[derive(Args, Debug, Clone)]
pub struct ExportPublic {
    /// Private key file name (defaults to the configured name)
    #[arg(long)]
    pub private: Option<String>,

    /// Public key file name (defaults to the configured name)
    #[arg(long)]
    pub public: Option<String>,

    #[command(flatten)]
    pub passphrase: PassphraseArgs,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportPublicError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("export failed: {0}")]
    Codec(#[from] CodecError),
}

impl crate::op::Op for ExportPublic {
    type Error = ExportPublicError;
    type Output = String;

    fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let codec = state.codec();
        let private_name = self.private.as_ref().unwrap_or(&state.config.keys.private);
        let public_name = self.public.as_ref().unwrap_or(&state.config.keys.public);

        let unlock = self.passphrase.unlock();
        let private_key = codec.load_private_key(private_name, Some(&*unlock))?;

        match codec.save_public_key(&private_key.public(), public_name)? {
            Some(path) => Ok(format!("Public key written to {}", path.display())),
            None => Ok("Public key not saved; no file name provided".to_string()),
        }
    }
}
