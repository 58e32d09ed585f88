//! Domain models for the CotizaCRM quoting engine

mod client;
mod company;
mod plan;
mod product;
mod quote;
mod share;
mod subscription;
mod user;

pub use client::Client;
pub use company::{Company, CompanyStatus};
pub use plan::{Feature, Limit, LimitKind, Plan, PlanFeatures};
pub use product::Product;
pub use quote::{DiscountType, Quote, QuoteItem, QuoteStatus};
pub use share::{CompanyShare, ShareAction, SharePermissions, ShareStatus};
pub use subscription::{Subscription, SubscriptionStatus};
pub use user::User;
