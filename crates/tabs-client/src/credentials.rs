//! Credential storage.
//!
//! Stores the access/refresh token pair in `<base>/tokens.json` with
//! restricted permissions (0600). Tokens are never logged in full.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Access/refresh token pair issued by the backend.
///
/// Created on successful login; the access half is overwritten on each
/// successful refresh; both are deleted on refresh failure or logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    /// The access token (short-lived).
    pub access: String,
    /// The refresh token (long-lived).
    pub refresh: String,
}

/// Persistence capability for the credential pair.
///
/// The request pipeline only ever talks to this trait, so embedders and
/// tests can substitute an in-memory store.
pub trait CredentialStore: Send + Sync {
    /// Returns the stored pair, if any.
    fn get(&self) -> ApiResult<Option<CredentialPair>>;

    /// Stores a new pair, replacing any previous one.
    fn set(&self, pair: &CredentialPair) -> ApiResult<()>;

    /// Overwrites only the access token, keeping the refresh token.
    ///
    /// No-op when nothing is stored.
    fn set_access(&self, access: &str) -> ApiResult<()>;

    /// Deletes the stored pair.
    fn clear(&self) -> ApiResult<()>;
}

/// File-backed store, the production implementation.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Token cache filename under the tabs home directory.
    pub const FILE_NAME: &'static str = "tokens.json";

    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the default location, `<tabs home>/tokens.json`.
    pub fn default_location() -> Self {
        Self::new(crate::config::paths::tokens_path())
    }

    fn load(&self) -> ApiResult<Option<CredentialPair>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            ApiError::Store(format!("Failed to read {}: {e}", self.path.display()))
        })?;
        let pair = serde_json::from_str(&contents).map_err(|e| {
            ApiError::Store(format!("Failed to parse {}: {e}", self.path.display()))
        })?;
        Ok(Some(pair))
    }

    fn save(&self, pair: &CredentialPair) -> ApiResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ApiError::Store(format!("Failed to create directory {}: {e}", parent.display()))
            })?;
        }

        let contents = serde_json::to_string_pretty(pair)
            .map_err(|e| ApiError::Store(format!("Failed to serialize tokens: {e}")))?;

        // Write with restricted permissions
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .map_err(|e| {
                    ApiError::Store(format!(
                        "Failed to open {} for writing: {e}",
                        self.path.display()
                    ))
                })?;
            file.write_all(contents.as_bytes()).map_err(|e| {
                ApiError::Store(format!("Failed to write {}: {e}", self.path.display()))
            })?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents).map_err(|e| {
                ApiError::Store(format!("Failed to write {}: {e}", self.path.display()))
            })?;
        }

        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> ApiResult<Option<CredentialPair>> {
        self.load()
    }

    fn set(&self, pair: &CredentialPair) -> ApiResult<()> {
        self.save(pair)
    }

    fn set_access(&self, access: &str) -> ApiResult<()> {
        if let Some(mut pair) = self.load()? {
            pair.access = access.to_string();
            self.save(&pair)?;
        }
        Ok(())
    }

    fn clear(&self) -> ApiResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ApiError::Store(format!(
                "Failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}

/// In-memory store for tests and embedders that manage persistence
/// themselves.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Option<CredentialPair>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded store.
    pub fn with_pair(pair: CredentialPair) -> Self {
        Self {
            inner: Mutex::new(Some(pair)),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<CredentialPair>> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> ApiResult<Option<CredentialPair>> {
        Ok(self.lock().clone())
    }

    fn set(&self, pair: &CredentialPair) -> ApiResult<()> {
        *self.lock() = Some(pair.clone());
        Ok(())
    }

    fn set_access(&self, access: &str) -> ApiResult<()> {
        if let Some(pair) = self.lock().as_mut() {
            pair.access = access.to_string();
        }
        Ok(())
    }

    fn clear(&self) -> ApiResult<()> {
        *self.lock() = None;
        Ok(())
    }
}

/// Returns a masked version of a token for display (first 8 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 12 {
        return "***".to_string();
    }
    format!("{}...", &token[..8])
}
