//! HTTP client module for the phone-data API.
//!
//! This module provides the `ApiClient`, which performs the credential
//! exchange and sends authenticated requests. Every authenticated response
//! passes through an interceptor that logs the session out on HTTP 401.
//!
//! The bearer token is never stored on the client; it is read from the
//! `SessionStore` when each request is built.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
