//! CotizaCRM quoting engine
//!
//! Composes the pieces that carry the system's actual decision logic:
//!
//! - `pricing` - pure monetary calculator for quote amounts
//! - `entitlements` - plan feature flags and limit evaluation
//! - `access` - owner/shared/administrative access resolution
//! - `lifecycle` - quote status state machine with timestamp side effects
//! - `quotes`, `products`, `sharing` - orchestrators tying the above to the
//!   repository boundary
//!
//! The engine is request-scoped and stateless between calls; persistence,
//! routing and token handling live outside this crate.

pub mod access;
pub mod entitlements;
pub mod lifecycle;
pub mod pricing;
pub mod products;
pub mod quotes;
pub mod sharing;

#[cfg(test)]
pub(crate) mod mocks;

pub use access::{AccessClass, AccessGrant, AccessResolver, AccessRole, Actor};
pub use pricing::{LineItem, PricingOutcome, QuoteTotals};
pub use products::{CreateProductInput, ProductOrchestrator};
pub use quotes::{CreateQuoteInput, QuoteItemInput, QuoteOrchestrator, QuoteWithItems, UpdateQuoteInput};
pub use sharing::{CreateShareInput, ShareOrchestrator};
