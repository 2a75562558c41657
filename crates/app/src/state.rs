use std::{fs, path::PathBuf};

use common::prelude::{KeyCodec, KeyDirs};
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "keyvault";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const PRIVATE_KEYS_DIR_NAME: &str = "priv_keys";
pub const PUBLIC_KEYS_DIR_NAME: &str = "pub_keys";
pub const LOGS_DIR_NAME: &str = "logs";
pub const LOG_FILE_NAME: &str = "keyvault.log";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub keys: KeysConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default key file names, resolved against the key directories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysConfig {
    /// Private key file name
    #[serde(default = "default_private_key")]
    pub private: String,
    /// Public key file name (empty to skip writing it)
    #[serde(default = "default_public_key")]
    pub public: String,
}

fn default_private_key() -> String {
    "node.key".to_string()
}

fn default_public_key() -> String {
    "node.pub".to_string()
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            private: default_private_key(),
            public: default_public_key(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the keyvault directory (~/.keyvault)
    pub root_dir: PathBuf,
    /// Directory holding private key files
    pub private_keys_dir: PathBuf,
    /// Directory holding public key files
    pub public_keys_dir: PathBuf,
    /// Directory holding the log file
    pub logs_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the keyvault directory path (custom or default ~/.keyvault)
    pub fn root_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new keyvault state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let root_dir = Self::root_dir(custom_path)?;

        if root_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&root_dir)?;

        let state = Self::at(root_dir, config.unwrap_or_default());
        state.key_dirs().ensure()?;
        fs::create_dir_all(&state.logs_dir)?;

        let config_toml = toml::to_string_pretty(&state.config)?;
        fs::write(&state.config_path, config_toml)?;

        Ok(state)
    }

    /// Load existing state from the keyvault directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let root_dir = Self::root_dir(custom_path)?;

        if !root_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = root_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }
        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        let state = Self::at(root_dir, config);
        if !state.private_keys_dir.exists() {
            return Err(StateError::MissingFile(format!("{}/", PRIVATE_KEYS_DIR_NAME)));
        }
        if !state.public_keys_dir.exists() {
            return Err(StateError::MissingFile(format!("{}/", PUBLIC_KEYS_DIR_NAME)));
        }

        Ok(state)
    }

    fn at(root_dir: PathBuf, config: AppConfig) -> Self {
        Self {
            private_keys_dir: root_dir.join(PRIVATE_KEYS_DIR_NAME),
            public_keys_dir: root_dir.join(PUBLIC_KEYS_DIR_NAME),
            logs_dir: root_dir.join(LOGS_DIR_NAME),
            config_path: root_dir.join(CONFIG_FILE_NAME),
            root_dir,
            config,
        }
    }

    pub fn key_dirs(&self) -> KeyDirs {
        KeyDirs::new(&self.private_keys_dir, &self.public_keys_dir)
    }

    /// Key codec bound to this state's key directories
    pub fn codec(&self) -> KeyCodec {
        KeyCodec::new(self.key_dirs())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("keyvault directory not initialized. Run 'keyvault init' first")]
    NotInitialized,

    #[error("keyvault directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error(transparent)]
    KeyDirs(#[from] common::key_dirs::KeyDirsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
