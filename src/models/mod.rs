//! Core data models for the preference poll service.
//!
//! These are plain values passed between the protocol helpers, the services
//! and the HTTP handlers. None of them own any I/O.

pub mod analytics;
pub mod choice;
pub mod media;
pub mod upload;
