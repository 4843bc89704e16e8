use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

/// Where the session is in its login lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    /// Initial state, and the state after every logout.
    #[default]
    #[serde(rename = "")]
    Empty,
    Loading,
    Success,
    Error,
}

impl AuthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthStatus::Empty => "",
            AuthStatus::Loading => "loading",
            AuthStatus::Success => "success",
            AuthStatus::Error => "error",
        }
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time copy of the session.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SessionSnapshot {
    pub status: AuthStatus,
    pub token: String,
    pub username: String,
    pub authenticated_at: Option<DateTime<Utc>>,
    /// Server-advertised token expiry; informational only.
    pub expires_at: Option<DateTime<Utc>>,
}

// Manual Debug so the token never lands in logs
impl fmt::Debug for SessionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSnapshot")
            .field("status", &self.status)
            .field("token", &if self.token.is_empty() { "" } else { "<redacted>" })
            .field("username", &self.username)
            .field("authenticated_at", &self.authenticated_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl SessionSnapshot {
    pub fn is_logged_in(&self) -> bool {
        !self.token.is_empty()
    }

    pub fn time_until_expiry(&self) -> Option<Duration> {
        self.expires_at.map(|expiry| expiry - Utc::now())
    }

    /// Get minutes remaining until the advertised expiry (for display)
    pub fn minutes_until_expiry(&self) -> Option<i64> {
        self.time_until_expiry().map(|d| d.num_minutes().max(0))
    }
}

/// The value held by the store: the visible session plus the transition
/// generation used to drop stale login completions.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    snapshot: SessionSnapshot,
    generation: u64,
}

impl SessionState {
    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Proof that a login was started; completing it is a no-op once a newer
/// login or a logout has happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginTicket {
    generation: u64,
}

/// Shared session store.
/// Clone is cheap - all clones observe and mutate the same session.
#[derive(Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<SessionState>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionStore").field(&*self.tx.borrow()).finish()
    }
}

impl SessionStore {
    /// Create an empty (logged out) session
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::default());
        Self { tx: Arc::new(tx) }
    }

    // ===== Transitions =====

    /// Any state -> LOADING. Supersedes any login still in flight and drops
    /// the token of an earlier session.
    pub fn begin_login(&self) -> LoginTicket {
        let mut generation = 0;
        self.tx.send_modify(|state| {
            state.generation += 1;
            state.snapshot = SessionSnapshot {
                status: AuthStatus::Loading,
                ..SessionSnapshot::default()
            };
            generation = state.generation;
        });
        debug!(generation, "Login started");
        LoginTicket { generation }
    }

    /// LOADING -> AUTHENTICATED. Returns false if the ticket is stale.
    pub fn complete_login(
        &self,
        ticket: LoginTicket,
        token: String,
        username: String,
        expires_at: Option<DateTime<Utc>>,
    ) -> bool {
        let applied = self.tx.send_if_modified(|state| {
            if state.generation != ticket.generation {
                return false;
            }
            state.snapshot = SessionSnapshot {
                status: AuthStatus::Success,
                token,
                username,
                authenticated_at: Some(Utc::now()),
                expires_at,
            };
            true
        });
        if applied {
            info!(username = %self.user_name(), "Login successful");
        } else {
            debug!(generation = ticket.generation, "Discarding stale login result");
        }
        applied
    }

    /// LOADING -> ERROR. Returns false if the ticket is stale.
    pub fn fail_login(&self, ticket: LoginTicket) -> bool {
        let applied = self.tx.send_if_modified(|state| {
            if state.generation != ticket.generation {
                return false;
            }
            state.snapshot = SessionSnapshot {
                status: AuthStatus::Error,
                ..SessionSnapshot::default()
            };
            true
        });
        if !applied {
            debug!(generation = ticket.generation, "Discarding stale login failure");
        }
        applied
    }

    /// Any state -> EMPTY. Cannot fail; repeated calls leave the same state.
    pub fn logout(&self) {
        let mut was_logged_in = false;
        self.tx.send_modify(|state| {
            was_logged_in = state.snapshot.is_logged_in();
            state.generation += 1;
            state.snapshot = SessionSnapshot::default();
        });
        if was_logged_in {
            info!("Logged out");
        } else {
            debug!("Logout on an unauthenticated session");
        }
    }

    /// Logout on behalf of a response to a request sent at `generation`.
    /// Does nothing if the session has moved on since; returns whether the
    /// logout happened.
    pub fn logout_if_current(&self, generation: u64) -> bool {
        let applied = self.tx.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            state.generation += 1;
            state.snapshot = SessionSnapshot::default();
            true
        });
        if applied {
            info!("Logged out");
        } else {
            debug!(generation, "Ignoring logout for a superseded session");
        }
        applied
    }

    // ===== Accessors =====

    pub fn is_logged_in(&self) -> bool {
        self.tx.borrow().snapshot.is_logged_in()
    }

    pub fn auth_status(&self) -> AuthStatus {
        self.tx.borrow().snapshot.status
    }

    pub fn user_name(&self) -> String {
        self.tx.borrow().snapshot.username.clone()
    }

    pub fn token(&self) -> String {
        self.tx.borrow().snapshot.token.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().snapshot.clone()
    }

    /// `Authorization` header value for the current session, if logged in
    pub fn bearer_header(&self) -> Option<String> {
        let state = self.tx.borrow();
        if state.snapshot.is_logged_in() {
            Some(format!("Bearer {}", state.snapshot.token))
        } else {
            None
        }
    }

    /// Bearer header together with the generation it belongs to, read
    /// atomically
    pub fn bearer_with_generation(&self) -> (Option<String>, u64) {
        let state = self.tx.borrow();
        let bearer = state
            .snapshot
            .is_logged_in()
            .then(|| format!("Bearer {}", state.snapshot.token));
        (bearer, state.generation)
    }

    pub fn generation(&self) -> u64 {
        self.tx.borrow().generation
    }

    /// Watch for session transitions
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }
}
