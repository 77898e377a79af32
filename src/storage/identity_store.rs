use std::fs;
use std::path::PathBuf;

use crate::common::User;
use crate::error::Result;

/// Persists the signed-in identity so a restart keeps the session.
#[derive(Debug, Clone)]
pub struct IdentityStore {
    path: PathBuf,
}

impl IdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the persisted identity. A missing or unreadable file means nobody
    /// is signed in.
    pub fn load(&self) -> Option<User> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                log::warn!("Failed to read {}: {err}", self.path.display());
                return None;
            }
        };

        match serde_json::from_str::<User>(&content) {
            Ok(user) => Some(user),
            Err(err) => {
                log::warn!(
                    "Ignoring malformed identity file {}: {err}",
                    self.path.display()
                );
                None
            }
        }
    }

    pub fn save(&self, user: &User) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(user)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
