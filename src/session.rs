//! Session persistence and the bootstrap state machine.
//!
//! ```text
//! Loading ──bootstrap──▶ Authenticated | Unauthenticated
//! Unauthenticated ──login──▶ Authenticated
//! Authenticated ──logout──▶ Unauthenticated
//! ```
//!
//! Bootstrap never fails: anything that prevents restoring a user is
//! reported as [`RestoreOutcome::Skipped`] and lands in `Unauthenticated`.
//! Logout always lands in `Unauthenticated`, whatever the server says;
//! [`LogoutOutcome`] reports whether the saved session was actually removed.

use std::fmt;

use thiserror::Error;

use crate::client::{ClientError, WordPressClient};
use crate::models::User;
use crate::store::{Store, SESSION_KEY};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Loading,
    Unauthenticated,
    Authenticated(User),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticated(_) => "authenticated",
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Result of reading the persisted session at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum RestoreOutcome {
    Restored(User),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotFound,
    Storage(String),
    Malformed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "no saved session"),
            Self::Storage(e) => write!(f, "storage error: {}", e),
            Self::Malformed(e) => write!(f, "malformed session: {}", e),
        }
    }
}

/// What happened during a logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoutOutcome {
    /// The server answered the logout call with success.
    pub acknowledged: bool,
    /// The saved session was removed. When false the next launch restores it.
    pub cleared: bool,
}

/// Reads and writes the persisted user.
#[derive(Clone)]
pub struct SessionStore {
    store: Store,
}

impl SessionStore {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn restore(&self) -> RestoreOutcome {
        let raw = match self.store.get_raw(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return RestoreOutcome::Skipped(SkipReason::NotFound),
            Err(e) => return RestoreOutcome::Skipped(SkipReason::Storage(format!("{:#}", e))),
        };

        match serde_json::from_str::<User>(&raw) {
            Ok(user) if user.is_well_formed() => RestoreOutcome::Restored(user),
            Ok(_) => RestoreOutcome::Skipped(SkipReason::Malformed("empty username".to_string())),
            Err(e) => RestoreOutcome::Skipped(SkipReason::Malformed(e.to_string())),
        }
    }

    pub fn save(&self, user: &User) -> anyhow::Result<()> {
        self.store.set_json(SESSION_KEY, user)
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        self.store.remove(SESSION_KEY)
    }
}

/// Owns the session state for the life of the process.
pub struct SessionManager {
    store: SessionStore,
    client: WordPressClient,
    state: SessionState,
}

impl SessionManager {
    pub fn new(store: SessionStore, client: WordPressClient) -> Self {
        Self {
            store,
            client,
            state: SessionState::Loading,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn client(&self) -> &WordPressClient {
        &self.client
    }

    /// Restore the saved session. Only the first call reads storage; later
    /// calls return `None` and leave the state alone.
    pub fn bootstrap(&mut self) -> Option<RestoreOutcome> {
        if self.state != SessionState::Loading {
            tracing::debug!("Bootstrap already ran, state is {}", self.state.name());
            return None;
        }

        let outcome = self.store.restore();
        match &outcome {
            RestoreOutcome::Restored(user) => {
                tracing::info!("Restored session for {}", user.display_name());
                self.state = SessionState::Authenticated(user.clone());
            }
            RestoreOutcome::Skipped(SkipReason::NotFound) => {
                tracing::debug!("No saved session");
                self.state = SessionState::Unauthenticated;
            }
            RestoreOutcome::Skipped(reason) => {
                tracing::warn!("Session restore skipped: {}", reason);
                self.state = SessionState::Unauthenticated;
            }
        }
        Some(outcome)
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<User, SessionError> {
        if !matches!(self.state, SessionState::Unauthenticated) {
            return Err(SessionError::InvalidState {
                action: "log in",
                state: self.state.name(),
            });
        }
        if username.trim().is_empty() || password.is_empty() {
            return Err(SessionError::Validation(
                "Please enter both username and password".to_string(),
            ));
        }

        let user = self.client.login(username, password).await?;
        self.store.save(&user)?;

        tracing::info!("Logged in as {}", user.display_name());
        self.state = SessionState::Authenticated(user.clone());
        Ok(user)
    }

    /// End the session. The server call is best-effort and the state becomes
    /// `Unauthenticated` either way.
    pub async fn logout(&mut self) -> Result<LogoutOutcome, SessionError> {
        if !matches!(self.state, SessionState::Authenticated(_)) {
            return Err(SessionError::InvalidState {
                action: "log out",
                state: self.state.name(),
            });
        }

        let acknowledged = match self.client.logout().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Logout error, logging out locally: {}", e);
                false
            }
        };

        let cleared = match self.store.clear() {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Error removing user data: {:#}", e);
                false
            }
        };

        tracing::info!("Logged out");
        self.state = SessionState::Unauthenticated;
        Ok(LogoutOutcome {
            acknowledged,
            cleared,
        })
    }

    /// Re-fetch the user from `auth/user` and persist it.
    pub async fn refresh_user(&mut self) -> Result<User, SessionError> {
        if !matches!(self.state, SessionState::Authenticated(_)) {
            return Err(SessionError::InvalidState {
                action: "refresh the user",
                state: self.state.name(),
            });
        }

        let user = self.client.current_user().await?;
        self.store.save(&user)?;
        self.state = SessionState::Authenticated(user.clone());
        Ok(user)
    }
}
