//! Quote lifecycle state machine
//!
//! Applies explicit status-update requests against the transition table on
//! `QuoteStatus`, stamping acceptance/rejection timestamps on first entry.
//! Expiry is an external trigger (scheduler or lazy check) calling the same
//! entry point; nothing in here promotes a quote automatically.

use chrono::{DateTime, Utc};
use cotiza_core::models::{Quote, QuoteStatus};
use cotiza_core::{AppError, AppResult};

/// Apply a status transition to a quote in place.
///
/// Returns `Ok(true)` when the quote changed, `Ok(false)` for an idempotent
/// repeat of the current status (timestamps are never re-stamped). Illegal
/// transitions fail with `InvalidTransition` rather than being silently
/// ignored.
pub fn apply_transition(
    quote: &mut Quote,
    next: QuoteStatus,
    now: DateTime<Utc>,
) -> AppResult<bool> {
    if quote.status == next {
        return Ok(false);
    }

    if !quote.status.can_transition_to(next) {
        return Err(AppError::InvalidTransition {
            from: quote.status,
            to: next,
        });
    }

    quote.status = next;
    match next {
        QuoteStatus::Accepted => {
            if quote.accepted_at.is_none() {
                quote.accepted_at = Some(now);
            }
        }
        QuoteStatus::Rejected => {
            if quote.rejected_at.is_none() {
                quote.rejected_at = Some(now);
            }
        }
        _ => {}
    }
    quote.updated_at = now;

    Ok(true)
}

/// Guard structural edits: closed quotes (accepted, invoiced) reject them
pub fn ensure_editable(quote: &Quote) -> AppResult<()> {
    if quote.is_closed() {
        return Err(AppError::QuoteNotEditable(quote.quote_number.clone()));
    }
    Ok(())
}

/// Guard deletion: closed quotes (accepted, invoiced) reject it
pub fn ensure_deletable(quote: &Quote) -> AppResult<()> {
    if quote.is_closed() {
        return Err(AppError::QuoteNotDeletable(quote.quote_number.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::quote_with_status;
    use chrono::Duration;

    #[test]
    fn test_draft_to_sent() {
        let mut quote = quote_with_status(QuoteStatus::Draft);
        let now = Utc::now();
        assert!(apply_transition(&mut quote, QuoteStatus::Sent, now).unwrap());
        assert_eq!(quote.status, QuoteStatus::Sent);
        assert!(quote.accepted_at.is_none());
    }

    #[test]
    fn test_accept_stamps_once() {
        let mut quote = quote_with_status(QuoteStatus::Sent);
        let first = Utc::now();
        assert!(apply_transition(&mut quote, QuoteStatus::Accepted, first).unwrap());
        assert_eq!(quote.accepted_at, Some(first));

        // Idempotent repeat: no change, no re-stamp
        let later = first + Duration::hours(1);
        assert!(!apply_transition(&mut quote, QuoteStatus::Accepted, later).unwrap());
        assert_eq!(quote.accepted_at, Some(first));
    }

    #[test]
    fn test_reject_stamps_once() {
        let mut quote = quote_with_status(QuoteStatus::Viewed);
        let first = Utc::now();
        assert!(apply_transition(&mut quote, QuoteStatus::Rejected, first).unwrap());
        assert_eq!(quote.rejected_at, Some(first));

        let later = first + Duration::minutes(5);
        assert!(!apply_transition(&mut quote, QuoteStatus::Rejected, later).unwrap());
        assert_eq!(quote.rejected_at, Some(first));
    }

    #[test]
    fn test_accepted_to_draft_is_illegal() {
        let mut quote = quote_with_status(QuoteStatus::Accepted);
        let err = apply_transition(&mut quote, QuoteStatus::Draft, Utc::now()).unwrap_err();
        match err {
            AppError::InvalidTransition { from, to } => {
                assert_eq!(from, QuoteStatus::Accepted);
                assert_eq!(to, QuoteStatus::Draft);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // The quote is untouched on failure
        assert_eq!(quote.status, QuoteStatus::Accepted);
    }

    #[test]
    fn test_accepted_to_invoiced() {
        let mut quote = quote_with_status(QuoteStatus::Accepted);
        assert!(apply_transition(&mut quote, QuoteStatus::Invoiced, Utc::now()).unwrap());
        assert_eq!(quote.status, QuoteStatus::Invoiced);
    }

    #[test]
    fn test_expiry_from_sent_and_viewed() {
        let mut quote = quote_with_status(QuoteStatus::Sent);
        assert!(apply_transition(&mut quote, QuoteStatus::Expired, Utc::now()).unwrap());

        let mut quote = quote_with_status(QuoteStatus::Viewed);
        assert!(apply_transition(&mut quote, QuoteStatus::Expired, Utc::now()).unwrap());

        let mut quote = quote_with_status(QuoteStatus::Draft);
        assert!(apply_transition(&mut quote, QuoteStatus::Expired, Utc::now()).is_err());
    }

    #[test]
    fn test_closed_guards() {
        let open = quote_with_status(QuoteStatus::Viewed);
        assert!(ensure_editable(&open).is_ok());
        assert!(ensure_deletable(&open).is_ok());

        for status in [QuoteStatus::Accepted, QuoteStatus::Invoiced] {
            let closed = quote_with_status(status);
            assert!(matches!(
                ensure_editable(&closed).unwrap_err(),
                AppError::QuoteNotEditable(_)
            ));
            assert!(matches!(
                ensure_deletable(&closed).unwrap_err(),
                AppError::QuoteNotDeletable(_)
            ));
        }
    }

    #[test]
    fn test_rejected_quote_remains_deletable() {
        let rejected = quote_with_status(QuoteStatus::Rejected);
        assert!(ensure_deletable(&rejected).is_ok());
    }
}
