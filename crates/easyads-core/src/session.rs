// ABOUTME: Session store holding the authentication token and publishing every change.
// ABOUTME: Hydrates from durable storage, exposes login/logout, and never regresses to Loading.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::storage::{StorageError, TokenStore};

/// An established authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub established_at: DateTime<Utc>,
}

/// Observable session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Hydration has not finished yet.
    Loading,
    Authenticated(Session),
    Unauthenticated,
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            SessionState::Authenticated(session) => Some(&session.token),
            _ => None,
        }
    }
}

/// Handle to the session. Clones share the same state, so the handle is
/// passed explicitly to the HTTP client, the route guard, and the views.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn TokenStore>,
    state_tx: Arc<watch::Sender<SessionState>>,
}

impl SessionStore {
    /// Create a store in the `Loading` state. Call [`hydrate`](Self::hydrate)
    /// to resolve it from storage.
    pub fn new(storage: Arc<dyn TokenStore>) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Loading);
        Self {
            storage,
            state_tx: Arc::new(state_tx),
        }
    }

    /// Create a store and hydrate it immediately.
    pub fn hydrated(storage: Arc<dyn TokenStore>) -> Self {
        let store = Self::new(storage);
        store.hydrate();
        store
    }

    /// Resolve the session from durable storage. A missing or unreadable
    /// token resolves to `Unauthenticated`. Does nothing once the session has
    /// already been resolved by hydration or an explicit login/logout.
    pub fn hydrate(&self) -> SessionState {
        if !self.state().is_loading() {
            return self.state();
        }

        let resolved = match self.storage.load() {
            Ok(Some(token)) if !token.is_empty() => {
                tracing::debug!("session hydrated from storage");
                SessionState::Authenticated(Session {
                    token,
                    established_at: Utc::now(),
                })
            }
            Ok(_) => {
                tracing::debug!("no stored session token");
                SessionState::Unauthenticated
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored session token; starting signed out");
                SessionState::Unauthenticated
            }
        };

        // A login/logout may have resolved the session while storage was read.
        self.state_tx.send_if_modified(|state| {
            if state.is_loading() {
                *state = resolved;
                true
            } else {
                false
            }
        });

        self.state()
    }

    /// Store the token and mark the session authenticated. A storage failure
    /// is logged; the in-memory session is still established.
    pub fn login(&self, token: impl Into<String>) {
        let token = token.into();
        if let Err(e) = self.storage.save(&token) {
            tracing::warn!(error = %e, "failed to persist session token; it will not survive a restart");
        }

        self.state_tx.send_replace(SessionState::Authenticated(Session {
            token,
            established_at: Utc::now(),
        }));
        tracing::info!("signed in");
    }

    /// Clear the session and the persisted token. The in-memory session is
    /// always cleared; the error reports a token that could not be removed
    /// from storage.
    pub fn logout(&self) -> Result<(), StorageError> {
        self.state_tx.send_replace(SessionState::Unauthenticated);
        tracing::info!("signed out");
        self.storage.clear()
    }

    /// Log out only if `token` is still the current session token. Returns
    /// whether the session was cleared.
    pub fn invalidate(&self, token: &str) -> bool {
        let cleared = self.state_tx.send_if_modified(|state| {
            if state.token() == Some(token) {
                *state = SessionState::Unauthenticated;
                true
            } else {
                false
            }
        });

        if cleared {
            tracing::warn!("session token rejected by server; signed out");
            if let Err(e) = self.storage.clear() {
                tracing::warn!(error = %e, "failed to remove rejected session token from storage");
            }
        }

        cleared
    }

    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state_tx.borrow().token().map(str::to_string)
    }

    pub fn is_authenticated(&self) -> bool {
        self.state_tx.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.state_tx.borrow().is_loading()
    }

    /// Subscribe to session changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Wait until the session has left `Loading` and return the resolved state.
    pub async fn resolved(&self) -> SessionState {
        let mut rx = self.subscribe();
        match rx.wait_for(|state| !state.is_loading()).await {
            Ok(state) => state.clone(),
            // The sender lives as long as `self`, so this is unreachable in practice.
            Err(_) => self.state(),
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &*self.state_tx.borrow() {
            SessionState::Loading => "loading",
            SessionState::Authenticated(_) => "authenticated",
            SessionState::Unauthenticated => "unauthenticated",
        };
        f.debug_struct("SessionStore").field("state", &state).finish()
    }
}
