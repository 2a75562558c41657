use std::io::{self, BufRead, Write};

use clap::Args;
use common::crypto::{EnvPassphrase, PassphraseError, PassphraseProvider};
use zeroize::Zeroizing;

/// Where to get the passphrase for an existing key
#[derive(Args, Debug, Clone, Default)]
pub struct PassphraseArgs {
    /// Read the passphrase from this environment variable instead of prompting
    #[arg(long, value_name = "VAR")]
    pub passphrase_env: Option<String>,
}

impl PassphraseArgs {
    /// Provider for unlocking a key; the prompt only appears if the key is protected
    pub fn unlock(&self) -> Box<dyn PassphraseProvider> {
        provider(self.passphrase_env.as_deref(), "Passphrase: ", false)
    }

    /// Provider for protecting a key; interactive entry is asked twice
    pub fn protect(&self) -> Box<dyn PassphraseProvider> {
        provider(self.passphrase_env.as_deref(), "New passphrase: ", true)
    }
}

pub fn provider(
    env_var: Option<&str>,
    prompt: &'static str,
    confirm: bool,
) -> Box<dyn PassphraseProvider> {
    match env_var {
        Some(var) => Box::new(EnvPassphrase::new(var)),
        None => Box::new(PromptPassphrase { prompt, confirm }),
    }
}

/// Prompts on stderr and reads a line from stdin
pub struct PromptPassphrase {
    prompt: &'static str,
    confirm: bool,
}

impl PassphraseProvider for PromptPassphrase {
    fn passphrase(&self) -> Result<Zeroizing<Vec<u8>>, PassphraseError> {
        let first = read_line(self.prompt)?;
        if self.confirm {
            let second = read_line("Confirm passphrase: ")?;
            if first != second {
                return Err(anyhow::anyhow!("passphrases do not match").into());
            }
        }
        Ok(first)
    }
}

fn read_line(prompt: &str) -> Result<Zeroizing<Vec<u8>>, PassphraseError> {
    let mut stderr = io::stderr();
    write!(stderr, "{}", prompt)?;
    stderr.flush()?;

    let mut line = Zeroizing::new(String::new());
    io::stdin().lock().read_line(&mut line)?;
    let trimmed = line.trim_end_matches(&['\r', '\n'][..]);
    Ok(Zeroizing::new(trimmed.as_bytes().to_vec()))
}
