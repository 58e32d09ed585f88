//! Company model
//!
//! A company is the tenancy unit of the system: every client, product and
//! quote belongs to exactly one company, owned by exactly one user and
//! optionally shared with others.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Company lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompanyStatus {
    /// Active company - full read and write access
    #[default]
    Active,
    /// Inactive company - owner keeps read access, all writes are blocked
    Inactive,
    /// Suspended company - billing hold; access rules do not restrict it
    /// beyond what the subscription gates already enforce
    Suspended,
}

impl fmt::Display for CompanyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompanyStatus::Active => write!(f, "active"),
            CompanyStatus::Inactive => write!(f, "inactive"),
            CompanyStatus::Suspended => write!(f, "suspended"),
        }
    }
}

impl CompanyStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(CompanyStatus::Active),
            "inactive" => Some(CompanyStatus::Inactive),
            "suspended" => Some(CompanyStatus::Suspended),
            _ => None,
        }
    }
}

/// Company entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    /// Unique identifier
    pub id: Uuid,

    /// Owning user - the only user with unconditional access
    pub owner_id: Uuid,

    /// Display name
    pub name: String,

    /// Lifecycle status
    pub status: CompanyStatus,

    /// Currency code (ISO 4217) used for quotes issued by this company
    pub currency: String,

    /// Logo object-storage URL, if one was uploaded
    pub logo_url: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Check if the given user owns this company
    #[inline]
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    /// Check if the company blocks write operations
    #[inline]
    pub fn blocks_writes(&self) -> bool {
        matches!(self.status, CompanyStatus::Inactive)
    }
}
