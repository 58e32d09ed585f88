//! Repository implementations
//!
//! This module contains concrete implementations of all repository traits
//! defined in cotiza-core, using sqlx for PostgreSQL access.

pub mod client_repo;
pub mod company_repo;
pub mod plan_repo;
pub mod product_repo;
pub mod quote_repo;
pub mod share_repo;
pub mod user_repo;

pub use client_repo::PgClientRepository;
pub use company_repo::PgCompanyRepository;
pub use plan_repo::PgPlanRepository;
pub use product_repo::PgProductRepository;
pub use quote_repo::PgQuoteRepository;
pub use share_repo::PgShareRepository;
pub use user_repo::PgUserRepository;

/// Unique-index violation (SQLSTATE 23505); surfaced to callers as a
/// conflict instead of a generic database error
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}
