//! Monetary calculator for quote amounts
//!
//! Pure functions, no I/O: the same inputs always produce the same four
//! amounts. All stored amounts are integer minor currency units; the
//! fractional-quantity arithmetic runs in `Decimal` and each derived amount
//! is rounded exactly once, half away from zero. The subtotal is summed in
//! `Decimal` first and rounded once; per-line totals are rounded
//! independently for display and audit.

use cotiza_core::models::DiscountType;
use cotiza_core::{AppError, AppResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// One line of input to the calculator. Product-catalog resolution has
/// already happened upstream; this is the snapshotted quantity and price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    /// Fractional quantity, >= 0.01
    pub quantity: Decimal,
    /// Unit price in minor units, >= 0
    pub unit_price: i64,
}

/// The four derived amounts, minor units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTotals {
    pub subtotal: i64,
    pub discount: i64,
    pub tax: i64,
    pub total: i64,
}

/// Calculator output: totals plus the independently rounded per-line amounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingOutcome {
    pub totals: QuoteTotals,
    pub line_totals: Vec<i64>,
}

/// Smallest legal quantity (0.01)
fn min_quantity() -> Decimal {
    Decimal::new(1, 2)
}

/// Round half away from zero to an integer minor-unit amount
fn round_minor(amount: Decimal) -> AppResult<i64> {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| AppError::InvalidInput("monetary amount out of range".to_string()))
}

/// Compute subtotal, discount, tax and total for a list of line items.
///
/// Fails fast with `InvalidInput` on any malformed numeric input before
/// computing anything; invalid values are never silently clamped.
///
/// The discount is clamped to be non-negative but deliberately NOT clamped
/// to the subtotal: a fixed discount larger than the subtotal drives the
/// total negative.
pub fn price_items(
    items: &[LineItem],
    discount_type: DiscountType,
    discount_value: i64,
    tax_amount: i64,
) -> AppResult<PricingOutcome> {
    // Fail fast on all inputs before any computation
    for (idx, item) in items.iter().enumerate() {
        if item.quantity < min_quantity() {
            return Err(AppError::InvalidInput(format!(
                "item {}: quantity must be at least 0.01",
                idx
            )));
        }
        if item.unit_price < 0 {
            return Err(AppError::InvalidInput(format!(
                "item {}: unit price must not be negative",
                idx
            )));
        }
    }
    if discount_value < 0 {
        return Err(AppError::InvalidInput(
            "discount value must not be negative".to_string(),
        ));
    }
    if tax_amount < 0 {
        return Err(AppError::InvalidInput(
            "tax amount must not be negative".to_string(),
        ));
    }

    // Sum in Decimal, round once for the subtotal; round each line on its own
    let mut raw_sum = Decimal::ZERO;
    let mut line_totals = Vec::with_capacity(items.len());
    for item in items {
        let raw_line = item.quantity * Decimal::from(item.unit_price);
        raw_sum += raw_line;
        line_totals.push(round_minor(raw_line)?);
    }
    let subtotal = round_minor(raw_sum)?;

    let discount = match discount_type {
        DiscountType::Percentage => round_minor(
            Decimal::from(subtotal) * Decimal::from(discount_value) / Decimal::from(100),
        )?,
        DiscountType::FixedAmount => discount_value,
        DiscountType::None => 0,
    }
    .max(0);

    let tax = tax_amount;
    let total = subtotal - discount + tax;

    Ok(PricingOutcome {
        totals: QuoteTotals {
            subtotal,
            discount,
            tax,
            total,
        },
        line_totals,
    })
}
