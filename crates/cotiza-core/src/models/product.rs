//! Product model
//!
//! Company-owned catalog entry. Quote items that reference a product
//! snapshot its description and price at the time of addition; later edits
//! to the product never change existing quote items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier
    pub id: Uuid,

    /// Owning company
    pub company_id: Uuid,

    /// Stock-keeping unit, unique per company
    pub sku: String,

    /// Catalog description
    pub description: String,

    /// Unit price in minor currency units
    pub unit_price: i64,

    /// Whether the product is selectable for new quote items
    pub active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}
