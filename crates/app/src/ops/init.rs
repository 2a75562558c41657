use clap::Args;

use crate::state::{AppConfig, AppState, KeysConfig, LoggingConfig};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Default private key file name
    #[arg(long, default_value = "node.key")]
    pub private: String,

    /// Default public key file name
    #[arg(long, default_value = "node.pub")]
    pub public: String,

    /// Log level written to the config file
    #[arg(long, default_value = "info")]
    pub default_log_level: String,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),
}

impl crate::op::Op for Init {
    type Error = InitError;
    type Output = String;

    fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            keys: KeysConfig {
                private: self.private.clone(),
                public: self.public.clone(),
            },
            logging: LoggingConfig {
                level: self.default_log_level.clone(),
            },
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let output = format!(
            "Initialized keyvault directory at: {}\n\
             - Private keys: {}\n\
             - Public keys: {}\n\
             - Logs: {}\n\
             - Config: {}",
            state.root_dir.display(),
            state.private_keys_dir.display(),
            state.public_keys_dir.display(),
            state.logs_dir.display(),
            state.config_path.display(),
        );

        Ok(output)
    }
}
