//! Shared test utilities for key file integration tests
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::OnceLock;

use common::codec::KeyCodec;
use common::crypto::KeyPair;
use common::key_dirs::KeyDirs;
use tempfile::TempDir;

/// Modulus size for test keys; full-size generation is far too slow for a test suite
pub const TEST_KEY_BITS: usize = 1024;

/// Passphrase of the committed `tests/fixtures/encrypted.key`
pub const FIXTURE_PASSPHRASE: &str = "abcd";

/// Absolute path of a committed file under `tests/fixtures/`
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Set up a codec over fresh private and public key directories
pub fn setup_test_env() -> (KeyCodec, TempDir) {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let dirs = KeyDirs::new(
        temp_dir.path().join("priv_keys"),
        temp_dir.path().join("pub_keys"),
    );
    dirs.ensure().unwrap();
    (KeyCodec::new(dirs), temp_dir)
}

/// A key pair shared by every test in the binary
pub fn test_keypair() -> &'static KeyPair {
    static PAIR: OnceLock<KeyPair> = OnceLock::new();
    PAIR.get_or_init(|| KeyPair::try_generate(TEST_KEY_BITS).unwrap())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
