//! API key persistence.
//!
//! The recognition credential is a single opaque string stored as a flat
//! file in the application directory. Presence of the file is the only
//! signal that challenge solving is enabled; absence is not an error.

use crate::paths;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Flat-file store for the recognition API key.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store backed by the default per-application key file.
    pub fn from_app_dir() -> Result<Self> {
        paths::ensure_app_dir()?;
        Ok(Self::new(paths::key_path()?))
    }

    /// Read the stored key, if any. Empty files count as absent.
    pub fn load(&self) -> Option<String> {
        let contents = fs::read_to_string(&self.path).ok()?;
        let key = contents.trim();
        if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        }
    }

    /// Persist a key, overwriting any previous value.
    pub fn save(&self, key: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&self.path, key)
            .with_context(|| format!("Failed to write API key to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_as_absent() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("grok.key"));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("grok.key"));

        store.save("gsk_test123").unwrap();
        assert_eq!(store.load().as_deref(), Some("gsk_test123"));
    }

    #[test]
    fn save_overwrites_previous_key() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("grok.key"));

        store.save("first").unwrap();
        store.save("second").unwrap();
        assert_eq!(store.load().as_deref(), Some("second"));
    }

    #[test]
    fn blank_file_counts_as_absent() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("grok.key"));

        store.save("  \n").unwrap();
        assert_eq!(store.load(), None);
    }
}
