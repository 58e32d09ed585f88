//! CotizaCRM Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the CotizaCRM quoting backend. It includes:
//!
//! - Domain models (Company, CompanyShare, Plan, Quote, etc.)
//! - Typed plan feature flags and limits
//! - Common traits for repositories and collaborators
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
