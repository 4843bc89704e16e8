//! Core library for phonedash.
//!
//! Provides the pieces a phone-data dashboard client needs to talk to the API:
//! - `config`: client configuration loaded from the environment
//! - `auth`: the session store holding status, bearer token, and username
//! - `api`: the HTTP client with its 401 response interceptor
//! - `idle`: the inactivity monitor that forces a logout
//! - `models`: wire types returned by the phone-data endpoints

pub mod api;
pub mod auth;
pub mod config;
pub mod idle;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthStatus, SessionSnapshot, SessionStore};
pub use config::{ClientConfig, UnauthorizedPolicy};
pub use idle::{ActivityHandle, IdleMonitor};
