//! CotizaCRM Database Layer
//!
//! This crate provides PostgreSQL database access and repository
//! implementations for the CotizaCRM engine. It includes:
//!
//! - Connection pool management with sqlx
//! - Repository implementations for all domain entities
//! - Transaction support for atomic quote-plus-items writes
//! - In-force plan resolution joining subscriptions and plans

pub mod pool;
pub mod repositories;

pub use pool::create_pool;
pub use repositories::*;

// Re-export commonly used types
pub use cotiza_core::{AppError, AppResult};
pub use sqlx::{PgPool, Postgres, Transaction};
