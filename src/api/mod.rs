//! API route modules
//!
//! One module per route group, each exposing `router()`:
//!
//! - [`health`] - liveness
//! - [`upload`] - photo upload and stored-file serving
//! - [`products`] - print catalog for the configurator
//! - [`orders`] - checkout and customer status lookup
//! - [`admin`] - operator panel: cleanup, order statuses, settings, stats

pub mod admin;
pub mod health;
pub mod orders;
pub mod products;
pub mod upload;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
