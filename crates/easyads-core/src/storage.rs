// ABOUTME: Durable client-side token storage seam used by the session store.
// ABOUTME: Defines the TokenStore trait, its error type, and an in-memory implementation.

use std::sync::Mutex;

use thiserror::Error;

/// Fixed key the session token is persisted under.
pub const TOKEN_KEY: &str = "token";

/// Errors that can occur while reading or writing persisted tokens.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

/// Somewhere the session token survives a restart.
pub trait TokenStore: Send + Sync {
    /// Read the persisted token, if any.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Persist the token, replacing any previous one.
    fn save(&self, token: &str) -> Result<(), StorageError>;

    /// Remove the persisted token. Removing an absent token is not an error.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Process-local token storage. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a token already persisted, as if saved by an earlier run.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        let guard = self.token.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(guard.clone())
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        let mut guard = self.token.lock().map_err(|_| StorageError::Poisoned)?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut guard = self.token.lock().map_err(|_| StorageError::Poisoned)?;
        *guard = None;
        Ok(())
    }
}
