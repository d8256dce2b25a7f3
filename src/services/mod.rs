//! Request-independent building blocks behind the HTTP handlers.

pub mod analytics;
pub mod choice_log;
pub mod config_store;
pub mod files;
pub mod media_service;
pub mod multipart;
pub mod range_planner;
pub mod upload_service;
