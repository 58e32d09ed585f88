//! User model
//!
//! Minimal identity record. Authentication itself (tokens, passwords) is
//! handled outside this workspace; the engine only needs to resolve user
//! records, notably for the administrative-override path which must fail
//! closed when the account cannot be found.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,

    /// Login email (unique)
    pub email: String,

    /// Display name
    pub name: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}
