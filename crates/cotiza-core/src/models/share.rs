//! Company share model
//!
//! A share grants a non-owner user scoped access to a company. Shares are
//! created by the owner, carry a typed permission set, and are unique per
//! (company, recipient) pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Share lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShareStatus {
    /// Recipient accepted; permissions are in effect
    Active,
    /// Created but not yet accepted by the recipient
    #[default]
    PendingAcceptance,
    /// Revoked by the owner; grants nothing
    Revoked,
}

impl fmt::Display for ShareStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShareStatus::Active => write!(f, "active"),
            ShareStatus::PendingAcceptance => write!(f, "pending_acceptance"),
            ShareStatus::Revoked => write!(f, "revoked"),
        }
    }
}

impl ShareStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(ShareStatus::Active),
            "pending_acceptance" => Some(ShareStatus::PendingAcceptance),
            "revoked" => Some(ShareStatus::Revoked),
            _ => None,
        }
    }
}

/// Write actions a shared user may be granted on a company.
///
/// Each action maps to exactly one permission flag; an action with no
/// corresponding flag set is denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareAction {
    ViewClients,
    ManageClients,
    ViewQuotes,
    CreateQuotes,
    EditQuotes,
    DeleteQuotes,
    ManageProducts,
    EditSettings,
}

/// Typed permission set carried by a share.
///
/// Flags absent in the stored payload deserialize to `false`: a share only
/// grants what it explicitly names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePermissions {
    #[serde(default)]
    pub can_view_clients: bool,
    #[serde(default)]
    pub can_manage_clients: bool,
    #[serde(default)]
    pub can_view_quotes: bool,
    #[serde(default)]
    pub can_create_quotes: bool,
    #[serde(default)]
    pub can_edit_quotes: bool,
    #[serde(default)]
    pub can_delete_quotes: bool,
    #[serde(default)]
    pub can_manage_products: bool,
    #[serde(default)]
    pub can_edit_settings: bool,
}

impl SharePermissions {
    /// Check whether this permission set allows the given action
    pub fn permits(&self, action: ShareAction) -> bool {
        match action {
            ShareAction::ViewClients => self.can_view_clients,
            ShareAction::ManageClients => self.can_manage_clients,
            ShareAction::ViewQuotes => self.can_view_quotes,
            ShareAction::CreateQuotes => self.can_create_quotes,
            ShareAction::EditQuotes => self.can_edit_quotes,
            ShareAction::DeleteQuotes => self.can_delete_quotes,
            ShareAction::ManageProducts => self.can_manage_products,
            ShareAction::EditSettings => self.can_edit_settings,
        }
    }
}

/// Company share entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyShare {
    /// Unique identifier
    pub id: Uuid,

    /// Shared company
    pub company_id: Uuid,

    /// User receiving access
    pub recipient_id: Uuid,

    /// User who recorded the share (normally the owner)
    pub grantor_id: Uuid,

    /// Permission set in effect while the share is active
    pub permissions: SharePermissions,

    /// Share lifecycle status
    pub status: ShareStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl CompanyShare {
    /// Check if the share currently grants access
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self.status, ShareStatus::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_permissions_deny_everything() {
        let perms = SharePermissions::default();
        assert!(!perms.permits(ShareAction::CreateQuotes));
        assert!(!perms.permits(ShareAction::EditSettings));
    }

    #[test]
    fn test_permission_mapping() {
        let perms = SharePermissions {
            can_create_quotes: true,
            can_view_clients: true,
            ..Default::default()
        };
        assert!(perms.permits(ShareAction::CreateQuotes));
        assert!(perms.permits(ShareAction::ViewClients));
        assert!(!perms.permits(ShareAction::DeleteQuotes));
    }

    #[test]
    fn test_absent_flags_deserialize_false() {
        let perms: SharePermissions =
            serde_json::from_str(r#"{"can_create_quotes": true}"#).unwrap();
        assert!(perms.permits(ShareAction::CreateQuotes));
        assert!(!perms.permits(ShareAction::ManageProducts));
    }

    #[test]
    fn test_share_status() {
        assert_eq!(
            ShareStatus::from_str("pending_acceptance"),
            Some(ShareStatus::PendingAcceptance)
        );
        assert_eq!(ShareStatus::from_str("deleted"), None);
    }
}
