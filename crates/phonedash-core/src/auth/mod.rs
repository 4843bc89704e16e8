//! Authentication state for the current user.
//!
//! This module provides:
//! - `SessionStore`: shared handle over the session state machine
//! - `AuthStatus`: the four session states
//! - `SessionSnapshot`: a point-in-time copy of the session
//!
//! Sessions live in memory only; a restart starts logged out.

pub mod session;

pub use session::{AuthStatus, LoginTicket, SessionSnapshot, SessionState, SessionStore};
