//! Domain logic for the framecut editing service.
//!
//! Everything in this crate is synchronous and free of I/O: the canonical
//! delivery-URL grammar, request signing, legacy URL repair, and the
//! validation rules shared by the HTTP layer and the media client.

pub mod compatibility;
pub mod download;
pub mod error;
pub mod repair;
pub mod signing;
pub mod transformation;
pub mod upload;
