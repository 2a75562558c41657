use std::path::PathBuf;

use clap::Args;

use common::crypto::{KeyError, PublicKey};
use common::prelude::CodecError;

use super::passphrase::PassphraseArgs;
use crate::state::StateError;

/// Print the size, exponent and fingerprint of a key file
#[derive(Args, Debug, Clone)]
pub struct Inspect {
    /// Private key file name
    #[arg(long, required_unless_present = "public", conflicts_with = "public")]
    pub private: Option<String>,

    /// Public key file name
    #[arg(long)]
    pub public: Option<String>,

    #[command(flatten)]
    pub passphrase: PassphraseArgs,
}

#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("could not load key: {0}")]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Key(#[from] KeyError),
}

impl crate::op::Op for Inspect {
    type Error = InspectError;
    type Output = String;

    fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let codec = state.codec();
        let key_dirs = codec.key_dirs();

        let (kind, path, public_key): (&str, PathBuf, PublicKey) =
            match (&self.private, &self.public) {
                (Some(name), _) => {
                    let unlock = self.passphrase.unlock();
                    let key = codec.load_private_key(name, Some(&*unlock))?;
                    let path = key_dirs.private_key_path(name).map_err(CodecError::from)?;
                    ("private", path, key.public())
                }
                (None, Some(name)) => {
                    let key = codec.load_public_key(name)?;
                    let path = key_dirs.public_key_path(name).map_err(CodecError::from)?;
                    ("public", path, key)
                }
                (None, None) => unreachable!("clap requires one of --private or --public"),
            };

        Ok(format!(
            "Key:         {} ({})\n\
             Modulus:     {} bits\n\
             Exponent:    {}\n\
             Fingerprint: {}",
            path.display(),
            kind,
            public_key.bits(),
            public_key.exponent(),
            public_key.fingerprint()?,
        ))
    }
}
