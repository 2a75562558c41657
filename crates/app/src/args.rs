use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "keyvault")]
#[command(about = "Generate RSA key pairs and keep them in passphrase-protected PEM files")]
pub struct Args {
    /// Path to the keyvault directory (defaults to ~/.keyvault)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); overrides the config file
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: crate::Command,
}
