//! Plan feature and limit evaluation
//!
//! Operates on an already-resolved plan feature map; never queries storage.
//! The asymmetry is deliberate: a user with no in-force plan fails every
//! limit check (fail closed), while a plan that does not mention a limit by
//! name does not restrict it (unlimited).

use cotiza_core::models::{Feature, LimitKind, PlanFeatures};
use cotiza_core::{AppError, AppResult};

/// Check a boolean capability flag.
///
/// Returns `false` when the plan is absent or the flag is absent/false.
pub fn has_feature(features: Option<&PlanFeatures>, feature: Feature) -> bool {
    features.map(|f| f.flag(feature)).unwrap_or(false)
}

/// Check whether current usage exhausts a numeric limit.
///
/// Returns `true` (exceeded) when there is no in-force plan at all; returns
/// `false` when the plan leaves the limit unlimited; otherwise
/// `current >= limit`.
pub fn limit_exceeded(features: Option<&PlanFeatures>, kind: LimitKind, current: i64) -> bool {
    match features {
        None => true,
        Some(f) => f.limit(kind).is_exceeded_by(current),
    }
}

/// Require a capability flag, or fail with `PlanFeatureNotAllowed`
pub fn ensure_feature(features: Option<&PlanFeatures>, feature: Feature) -> AppResult<()> {
    if has_feature(features, feature) {
        Ok(())
    } else {
        Err(AppError::PlanFeatureNotAllowed(feature.as_str().to_string()))
    }
}

/// Require headroom under a numeric limit, or fail with `PlanLimitExceeded`
pub fn ensure_within_limit(
    features: Option<&PlanFeatures>,
    kind: LimitKind,
    current: i64,
) -> AppResult<()> {
    if !limit_exceeded(features, kind, current) {
        return Ok(());
    }
    let max = features
        .and_then(|f| f.limit(kind).max())
        .unwrap_or(0);
    Err(AppError::PlanLimitExceeded {
        limit: kind.as_str().to_string(),
        max,
    })
}
