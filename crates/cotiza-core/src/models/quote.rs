//! Quote and quote item models
//!
//! A quote belongs to a company and a client, carries integer monetary
//! amounts in minor currency units, and moves through a status lifecycle.
//! The legal transitions live on `QuoteStatus`; applying a transition with
//! its timestamp side effects is the engine's `lifecycle` module.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Quote lifecycle status
///
/// Forward path: draft -> sent -> viewed -> accepted/rejected, with
/// `invoiced` reachable only from `accepted` and `expired` reachable from
/// `sent`/`viewed` (set by an external trigger through the same transition
/// entry point). `rejected`, `invoiced` and `expired` accept no further
/// transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    #[default]
    Draft,
    Sent,
    Viewed,
    Accepted,
    Rejected,
    Expired,
    Invoiced,
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Viewed => "viewed",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Expired => "expired",
            QuoteStatus::Invoiced => "invoiced",
        };
        write!(f, "{}", s)
    }
}

impl QuoteStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(QuoteStatus::Draft),
            "sent" => Some(QuoteStatus::Sent),
            "viewed" => Some(QuoteStatus::Viewed),
            "accepted" => Some(QuoteStatus::Accepted),
            "rejected" => Some(QuoteStatus::Rejected),
            "expired" => Some(QuoteStatus::Expired),
            "invoiced" => Some(QuoteStatus::Invoiced),
            _ => None,
        }
    }

    /// Closed statuses forbid structural edits and deletion
    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self, QuoteStatus::Accepted | QuoteStatus::Invoiced)
    }

    /// Legal transition table. Re-entering the same status is handled
    /// upstream as an idempotent no-op, not here.
    pub fn can_transition_to(&self, next: QuoteStatus) -> bool {
        use QuoteStatus::*;
        matches!(
            (self, next),
            (Draft, Sent)
                | (Sent, Viewed)
                | (Sent, Accepted)
                | (Sent, Rejected)
                | (Sent, Expired)
                | (Viewed, Accepted)
                | (Viewed, Rejected)
                | (Viewed, Expired)
                | (Accepted, Invoiced)
        )
    }
}

/// Discount directive applied to a quote's subtotal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// Percentage points of the subtotal
    Percentage,
    /// Flat amount in minor currency units
    FixedAmount,
    /// No discount
    #[default]
    None,
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiscountType::Percentage => "percentage",
            DiscountType::FixedAmount => "fixed_amount",
            DiscountType::None => "none",
        };
        write!(f, "{}", s)
    }
}

impl DiscountType {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "percentage" => Some(DiscountType::Percentage),
            "fixed_amount" => Some(DiscountType::FixedAmount),
            "none" => Some(DiscountType::None),
            _ => None,
        }
    }
}

/// Quote entity
///
/// All monetary fields are integer minor currency units. The invariant
/// `total = subtotal - discount + tax` holds after every create/update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    /// Unique identifier
    pub id: Uuid,

    /// Owning company
    pub company_id: Uuid,

    /// Addressed client
    pub client_id: Uuid,

    /// Human-assigned number, unique per company
    pub quote_number: String,

    /// Currency code (ISO 4217)
    pub currency: String,

    /// Sum of line items, minor units
    pub subtotal: i64,

    /// Computed discount amount, minor units
    pub discount: i64,

    /// Flat tax amount, minor units
    pub tax: i64,

    /// subtotal - discount + tax, minor units
    pub total: i64,

    /// Lifecycle status
    pub status: QuoteStatus,

    /// Discount directive used to derive `discount`
    pub discount_type: DiscountType,

    /// Percentage points or minor units depending on `discount_type`
    pub discount_value: i64,

    /// Flat tax directive, minor units
    pub tax_amount: i64,

    /// Issue date shown on the document
    pub issue_date: Option<NaiveDate>,

    /// Date after which the quote may be expired
    pub expiry_date: Option<NaiveDate>,

    /// Stamped on first transition into `accepted`
    pub accepted_at: Option<DateTime<Utc>>,

    /// Stamped on first transition into `rejected`
    pub rejected_at: Option<DateTime<Utc>>,

    /// Free-form notes shown on the document
    pub notes: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// Closed quotes forbid structural edits and deletion
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.status.is_closed()
    }

    /// Check the monetary invariant
    pub fn totals_consistent(&self) -> bool {
        self.total == self.subtotal - self.discount + self.tax
    }
}

/// Quote line item
///
/// `description` and `unit_price` are snapshots taken when the item was
/// added; `total_price` is the rounded quantity x unit_price, stored for
/// audit and never recomputed implicitly at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteItem {
    /// Unique identifier
    pub id: Uuid,

    /// Owning quote
    pub quote_id: Uuid,

    /// Referenced catalog product, if any
    pub product_id: Option<Uuid>,

    /// Description snapshot
    pub description: String,

    /// Fractional quantity, >= 0.01
    pub quantity: Decimal,

    /// Unit price snapshot in minor units, >= 0
    pub unit_price: i64,

    /// Rounded quantity x unit_price, minor units
    pub total_price: i64,

    /// Display order within the quote
    pub position: i32,
}
