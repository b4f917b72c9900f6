//! Explicit session context shared by every clone of an
//! [`ApiClient`](crate::ApiClient).
//!
//! The session is the single owner of the token pair. It is mutated only by
//! login, a successful refresh, logout and session expiry. Each mutation
//! updates memory, the durable store and the watch channel under one lock,
//! so the stored file always matches the last in-memory pair.
//!
//! Login and logout bump a generation counter. A refresh records the
//! generation it started from and its outcome is dropped if the counter
//! moved in the meantime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::{
    error::StoreError,
    tokens::{MemoryTokenStore, TokenStore, Tokens},
};

/// Authentication state as seen by the UI layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthState {
    Authenticated,
    Unauthenticated,
    /// Credentials were rejected and could not be refreshed. The UI should
    /// send the user back to its login view.
    Expired,
}

#[derive(Default)]
struct Current {
    tokens: Tokens,
    generation: u64,
}

/// The pair as seen when a refresh starts.
pub(crate) struct Snapshot {
    pub(crate) access: Option<String>,
    pub(crate) refresh: Option<String>,
    pub(crate) generation: u64,
}

struct Inner {
    current: Mutex<Current>,
    store: Box<dyn TokenStore>,
    state: watch::Sender<AuthState>,
}

#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("tokens", &self.current().tokens)
            .field("state", &self.state())
            .finish()
    }
}

impl Session {
    /// Opens a session backed by `store`, restoring any persisted tokens.
    ///
    /// An unreadable store starts an unauthenticated session instead of
    /// failing.
    pub fn new(store: impl TokenStore + 'static) -> Self {
        let tokens = match store.load() {
            Ok(tokens) => tokens,
            Err(err) => {
                tracing::warn!("failed to load stored session, starting logged out: {err}");
                Tokens::default()
            }
        };
        let initial = if tokens.access_token.is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        };
        let (state, _) = watch::channel(initial);

        Self {
            inner: Arc::new(Inner {
                current: Mutex::new(Current {
                    tokens,
                    generation: 0,
                }),
                store: Box::new(store),
                state,
            }),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryTokenStore::default())
    }

    fn current(&self) -> MutexGuard<'_, Current> {
        self.inner
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn access_token(&self) -> Option<String> {
        self.current().tokens.access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.current().tokens.refresh_token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().tokens.access_token.is_some()
    }

    pub fn state(&self) -> AuthState {
        *self.inner.state.borrow()
    }

    /// Watches authentication changes, including [`AuthState::Expired`].
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        let current = self.current();
        Snapshot {
            access: current.tokens.access_token.clone(),
            refresh: current.tokens.refresh_token.clone(),
            generation: current.generation,
        }
    }

    /// Stores a freshly issued pair (login).
    pub fn set_tokens(
        &self,
        access: impl Into<String>,
        refresh: impl Into<String>,
    ) -> Result<(), StoreError> {
        let mut current = self.current();
        current.tokens = Tokens {
            access_token: Some(access.into()),
            refresh_token: Some(refresh.into()),
        };
        current.generation += 1;
        self.set_state(AuthState::Authenticated);
        self.inner.store.save(&current.tokens)
    }

    /// Forgets both tokens (logout).
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut current = self.current();
        current.tokens = Tokens::default();
        current.generation += 1;
        self.set_state(AuthState::Unauthenticated);
        self.inner.store.save(&current.tokens)
    }

    /// Replaces the access token after a refresh started at `generation`.
    /// The refresh token only changes when the backend rotated it.
    ///
    /// Returns `false`, leaving the session untouched, if a login or logout
    /// happened since.
    pub(crate) fn apply_refresh(
        &self,
        generation: u64,
        access: String,
        rotated_refresh: Option<String>,
    ) -> bool {
        let mut current = self.current();
        if current.generation != generation {
            return false;
        }
        current.tokens.access_token = Some(access);
        if let Some(refresh) = rotated_refresh {
            current.tokens.refresh_token = Some(refresh);
        }
        self.set_state(AuthState::Authenticated);
        self.persist(&current.tokens);
        true
    }

    /// Clears credentials and tells subscribers the session is over, unless
    /// a login or logout happened after `generation` was observed.
    pub(crate) fn expire(&self, generation: u64) -> bool {
        let mut current = self.current();
        if current.generation != generation {
            return false;
        }
        current.tokens = Tokens::default();
        self.persist(&current.tokens);
        if self.set_state(AuthState::Expired) {
            tracing::info!("session expired");
        }
        true
    }

    /// Durable storage is best effort on the refresh path: the in-memory
    /// pair stays authoritative for this process.
    fn persist(&self, tokens: &Tokens) {
        if let Err(err) = self.inner.store.save(tokens) {
            tracing::error!("failed to persist session: {err}");
        }
    }

    fn set_state(&self, next: AuthState) -> bool {
        self.inner.state.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        })
    }
}
