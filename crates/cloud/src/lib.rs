//! HTTP client for the external media transformation/delivery service.
//!
//! Wraps the upload, explicit-transformation and delivery endpoints using
//! [`reqwest`]. URL grammar and signing live in `framecut_core`; this crate
//! only moves bytes.

pub mod api;
pub mod config;

pub use api::{MediaApiError, MediaClient};
pub use config::MediaConfig;
