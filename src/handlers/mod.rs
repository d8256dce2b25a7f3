//! Axum handlers, one module per surface.

pub mod admin_handlers;
pub mod choice_handlers;
pub mod health_handlers;
pub mod media_handlers;
