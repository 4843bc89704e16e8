//! Wire models for the phone-data API.
//!
//! - `TokenResponse`: body of the credential exchange
//! - `PhoneInfo`: one registered phone with its CUCM (AXL) details
//! - `PhoneScraper`: network and neighbor details scraped from a phone
//! - `DevicePoolList`: the device pools present in the inventory
//! - `JobStatus`, `JobEntry`, `QueueStatus`: sync job and scrape queue state
//! - `TriggerResult`: acknowledgement of a manually queued job

pub mod auth;
pub mod phone;

pub use auth::TokenResponse;
pub use phone::{DevicePoolList, JobEntry, JobStatus, PhoneInfo, PhoneScraper, QueueStatus, TriggerResult};
