//! Subscription model
//!
//! Links a user to a plan. A user accumulates subscription history; only the
//! most recently created in-force subscription is relevant when resolving
//! plan features.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Subscription status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Trialing,
    Active,
    PastDue,
    Canceled,
    Expired,
    #[default]
    Free,
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Free => "free",
        };
        write!(f, "{}", s)
    }
}

impl SubscriptionStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trialing" => Some(SubscriptionStatus::Trialing),
            "active" => Some(SubscriptionStatus::Active),
            "past_due" => Some(SubscriptionStatus::PastDue),
            "canceled" => Some(SubscriptionStatus::Canceled),
            "expired" => Some(SubscriptionStatus::Expired),
            "free" => Some(SubscriptionStatus::Free),
            _ => None,
        }
    }

    /// Only in-force subscriptions grant plan features
    pub fn is_in_force(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Active | SubscriptionStatus::Trialing | SubscriptionStatus::Free
        )
    }

    /// The in-force statuses, for queries that filter on them
    pub fn in_force_statuses() -> [SubscriptionStatus; 3] {
        [
            SubscriptionStatus::Active,
            SubscriptionStatus::Trialing,
            SubscriptionStatus::Free,
        ]
    }
}

/// Subscription entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// Unique identifier
    pub id: Uuid,

    /// Subscribed user
    pub user_id: Uuid,

    /// Plan granted by this subscription
    pub plan_id: Uuid,

    /// Subscription status
    pub status: SubscriptionStatus,

    /// Creation timestamp; ties are broken by most recent
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Check if this subscription currently grants its plan
    #[inline]
    pub fn is_in_force(&self) -> bool {
        self.status.is_in_force()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_force_statuses() {
        assert!(SubscriptionStatus::Active.is_in_force());
        assert!(SubscriptionStatus::Trialing.is_in_force());
        assert!(SubscriptionStatus::Free.is_in_force());
        assert!(!SubscriptionStatus::PastDue.is_in_force());
        assert!(!SubscriptionStatus::Canceled.is_in_force());
        assert!(!SubscriptionStatus::Expired.is_in_force());
    }

    #[test]
    fn test_in_force_status_list_matches_predicate() {
        for status in SubscriptionStatus::in_force_statuses() {
            assert!(status.is_in_force());
        }
        assert!(!SubscriptionStatus::in_force_statuses()
            .contains(&SubscriptionStatus::PastDue));
        assert!(!SubscriptionStatus::in_force_statuses()
            .contains(&SubscriptionStatus::Canceled));
        assert!(!SubscriptionStatus::in_force_statuses()
            .contains(&SubscriptionStatus::Expired));
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(
            SubscriptionStatus::from_str("past_due"),
            Some(SubscriptionStatus::PastDue)
        );
        assert_eq!(SubscriptionStatus::from_str("paused"), None);
    }
}
