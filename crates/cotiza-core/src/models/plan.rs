//! Plan model with typed feature flags and limits
//!
//! Subscription plans gate what a user may do. The stored `features` payload
//! is an open map; this module gives it a typed shape where every numeric
//! limit is a `Limit` value with an explicit `Unlimited` sentinel instead of
//! magic numbers. At the serde boundary `null`, an absent key, or `-1` all
//! decode to `Unlimited`, preserving the stored "absent key means no
//! restriction" semantics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// A numeric plan limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Limit {
    /// Never exceeded
    #[default]
    Unlimited,
    /// Exceeded once current usage reaches this value
    Max(i64),
}

impl Limit {
    /// Check whether the given usage count exhausts this limit
    #[inline]
    pub fn is_exceeded_by(&self, current: i64) -> bool {
        match self {
            Limit::Unlimited => false,
            Limit::Max(max) => current >= *max,
        }
    }

    /// The numeric maximum, if bounded
    pub fn max(&self) -> Option<i64> {
        match self {
            Limit::Unlimited => None,
            Limit::Max(max) => Some(*max),
        }
    }
}

impl Serialize for Limit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Limit::Unlimited => serializer.serialize_none(),
            Limit::Max(max) => serializer.serialize_some(max),
        }
    }
}

impl<'de> Deserialize<'de> for Limit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // null and any negative value (the stored -1 sentinel) mean unlimited
        let raw = Option::<i64>::deserialize(deserializer)?;
        Ok(match raw {
            None => Limit::Unlimited,
            Some(v) if v < 0 => Limit::Unlimited,
            Some(v) => Limit::Max(v),
        })
    }
}

/// Boolean capability flags a plan may grant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    ProductCatalog,
    CompanySharing,
    CustomBranding,
}

impl Feature {
    /// Stable name used in machine-readable error payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::ProductCatalog => "product_catalog",
            Feature::CompanySharing => "company_sharing",
            Feature::CustomBranding => "custom_branding",
        }
    }
}

/// Numeric limits a plan may impose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    QuotesPerMonth,
    ItemsPerQuote,
    ProductsPerCompany,
    ClientsPerCompany,
    SharesPerCompany,
    SharesForUser,
}

impl LimitKind {
    /// Stable name used in machine-readable error payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitKind::QuotesPerMonth => "max_quotes_per_month",
            LimitKind::ItemsPerQuote => "max_items_per_quote",
            LimitKind::ProductsPerCompany => "max_products_per_company",
            LimitKind::ClientsPerCompany => "max_clients_per_company",
            LimitKind::SharesPerCompany => "max_shares_per_company",
            LimitKind::SharesForUser => "max_shares_for_user",
        }
    }
}

/// Typed feature map of a plan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanFeatures {
    #[serde(default)]
    pub product_catalog: bool,
    #[serde(default)]
    pub company_sharing: bool,
    #[serde(default)]
    pub custom_branding: bool,

    #[serde(default)]
    pub max_quotes_per_month: Limit,
    #[serde(default)]
    pub max_items_per_quote: Limit,
    #[serde(default)]
    pub max_products_per_company: Limit,
    #[serde(default)]
    pub max_clients_per_company: Limit,
    #[serde(default)]
    pub max_shares_per_company: Limit,
    #[serde(default)]
    pub max_shares_for_user: Limit,
}

impl PlanFeatures {
    /// Look up a capability flag
    pub fn flag(&self, feature: Feature) -> bool {
        match feature {
            Feature::ProductCatalog => self.product_catalog,
            Feature::CompanySharing => self.company_sharing,
            Feature::CustomBranding => self.custom_branding,
        }
    }

    /// Look up a numeric limit
    pub fn limit(&self, kind: LimitKind) -> Limit {
        match kind {
            LimitKind::QuotesPerMonth => self.max_quotes_per_month,
            LimitKind::ItemsPerQuote => self.max_items_per_quote,
            LimitKind::ProductsPerCompany => self.max_products_per_company,
            LimitKind::ClientsPerCompany => self.max_clients_per_company,
            LimitKind::SharesPerCompany => self.max_shares_per_company,
            LimitKind::SharesForUser => self.max_shares_for_user,
        }
    }
}

/// Plan entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Unique identifier
    pub id: Uuid,

    /// Human-readable plan name (e.g., "Profesional")
    pub name: String,

    /// Unique plan code (e.g., "PRO-M")
    pub code: String,

    /// Typed feature map
    pub features: PlanFeatures,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_exceeded() {
        assert!(!Limit::Unlimited.is_exceeded_by(i64::MAX));
        assert!(!Limit::Max(10).is_exceeded_by(9));
        assert!(Limit::Max(10).is_exceeded_by(10));
        assert!(Limit::Max(10).is_exceeded_by(11));
        assert!(Limit::Max(0).is_exceeded_by(0));
    }

    #[test]
    fn test_limit_sentinels_deserialize_unlimited() {
        let features: PlanFeatures = serde_json::from_str(
            r#"{
                "max_quotes_per_month": 10,
                "max_items_per_quote": -1,
                "max_products_per_company": null
            }"#,
        )
        .unwrap();

        assert_eq!(features.max_quotes_per_month, Limit::Max(10));
        assert_eq!(features.max_items_per_quote, Limit::Unlimited);
        assert_eq!(features.max_products_per_company, Limit::Unlimited);
        // absent key
        assert_eq!(features.max_shares_per_company, Limit::Unlimited);
    }

    #[test]
    fn test_absent_flags_deserialize_false() {
        let features: PlanFeatures =
            serde_json::from_str(r#"{"product_catalog": true}"#).unwrap();
        assert!(features.flag(Feature::ProductCatalog));
        assert!(!features.flag(Feature::CompanySharing));
    }

    #[test]
    fn test_limit_lookup() {
        let features = PlanFeatures {
            max_shares_for_user: Limit::Max(3),
            ..Default::default()
        };
        assert_eq!(features.limit(LimitKind::SharesForUser), Limit::Max(3));
        assert_eq!(features.limit(LimitKind::QuotesPerMonth), Limit::Unlimited);
    }
}
