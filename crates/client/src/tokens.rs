//! Durable storage for the access/refresh token pair.
//!
//! Tokens are opaque: nothing here parses or validates them. The file store
//! keeps them across process restarts the way a browser keeps
//! `access_token`/`refresh_token` in local storage.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl fmt::Debug for Tokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |token: &Option<String>| token.as_ref().map(|_| "<redacted>");
        f.debug_struct("Tokens")
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .finish()
    }
}

/// Backing storage for a [`Session`](crate::Session).
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Tokens, StoreError>;
    fn save(&self, tokens: &Tokens) -> Result<(), StoreError>;
}

/// Keeps tokens in a JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Tokens, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Tokens::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, tokens: &Tokens) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(tokens)?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, payload)?;
        if fs::rename(&tmp, &self.path).is_err() {
            fs::copy(&tmp, &self.path)?;
            let _ = fs::remove_file(&tmp);
        }
        Ok(())
    }
}

/// Process-local store, for tests and one-shot sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Tokens>,
}

impl MemoryTokenStore {
    pub fn new(tokens: Tokens) -> Self {
        Self {
            tokens: Mutex::new(tokens),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Tokens, StoreError> {
        Ok(self
            .tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, tokens: &Tokens) -> Result<(), StoreError> {
        *self.tokens.lock().unwrap_or_else(PoisonError::into_inner) = tokens.clone();
        Ok(())
    }
}
