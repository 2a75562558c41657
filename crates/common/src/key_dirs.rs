use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum KeyDirsError {
    #[error("no file name in key path: {0}")]
    InvalidPath(String),
    #[error("failed to create directory {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where key files live
///
/// Maps logical key names to files under a private-keys root or a public-keys root.
/// Absolute paths are used verbatim. Anything else is reduced to its final component
/// before joining, so a name can never point outside its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDirs {
    private_keys_dir: PathBuf,
    public_keys_dir: PathBuf,
}

impl KeyDirs {
    pub fn new(private_keys_dir: impl Into<PathBuf>, public_keys_dir: impl Into<PathBuf>) -> Self {
        Self {
            private_keys_dir: private_keys_dir.into(),
            public_keys_dir: public_keys_dir.into(),
        }
    }

    pub fn private_keys_dir(&self) -> &Path {
        &self.private_keys_dir
    }

    pub fn public_keys_dir(&self) -> &Path {
        &self.public_keys_dir
    }

    pub fn private_key_path(&self, name: impl AsRef<Path>) -> Result<PathBuf, KeyDirsError> {
        resolve(&self.private_keys_dir, name.as_ref())
    }

    pub fn public_key_path(&self, name: impl AsRef<Path>) -> Result<PathBuf, KeyDirsError> {
        resolve(&self.public_keys_dir, name.as_ref())
    }

    /// Create both directories if missing (owner-only on unix)
    pub fn ensure(&self) -> Result<(), KeyDirsError> {
        for dir in [&self.private_keys_dir, &self.public_keys_dir] {
            tracing::debug!(dir = %dir.display(), "creating key directory");
            create_dir(dir).map_err(|source| KeyDirsError::Io {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

fn resolve(root: &Path, name: &Path) -> Result<PathBuf, KeyDirsError> {
    let Some(file_name) = name.file_name() else {
        return Err(KeyDirsError::InvalidPath(name.display().to_string()));
    };
    if name.is_absolute() {
        return Ok(name.to_path_buf());
    }
    Ok(root.join(file_name))
}

#[cfg(unix)]
fn create_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(dir)
}

#[cfg(not(unix))]
fn create_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)
}
