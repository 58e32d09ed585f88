//! Unified error handling for CotizaCRM
//!
//! This module provides a comprehensive error type that covers all possible
//! failure scenarios in the quoting engine, with automatic HTTP response
//! mapping for the routing layer.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::models::QuoteStatus;

/// Main application error type
///
/// All errors in the application should be converted to this type.
/// It implements `ResponseError` for automatic HTTP response generation.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Database Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    // ==================== Access Errors ====================
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: insufficient permissions")]
    Forbidden,

    #[error("Company is inactive: {0}")]
    CompanyInactive(String),

    // ==================== Lookup Errors ====================
    #[error("Company not found: {0}")]
    CompanyNotFound(String),

    #[error("Client not found: {0}")]
    ClientNotFound(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Quote not found: {0}")]
    QuoteNotFound(String),

    #[error("Share not found: {0}")]
    ShareNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // ==================== Conflict Errors ====================
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    // ==================== Plan Gating Errors ====================
    #[error("Plan limit exceeded for {limit}: maximum {max}")]
    PlanLimitExceeded { limit: String, max: i64 },

    #[error("Plan does not allow feature: {0}")]
    PlanFeatureNotAllowed(String),

    // ==================== Quote Lifecycle Errors ====================
    #[error("Quote is not editable: {0}")]
    QuoteNotEditable(String),

    #[error("Quote is not deletable: {0}")]
    QuoteNotDeletable(String),

    #[error("Illegal quote status transition: {from} -> {to}")]
    InvalidTransition { from: QuoteStatus, to: QuoteStatus },

    // ==================== Validation Errors ====================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation(_) | AppError::InvalidInput(_) | AppError::MissingField(_) => {
                StatusCode::BAD_REQUEST
            }

            // 401 Unauthorized
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            AppError::Forbidden | AppError::CompanyInactive(_) => StatusCode::FORBIDDEN,

            // 404 Not Found
            AppError::CompanyNotFound(_)
            | AppError::ClientNotFound(_)
            | AppError::ProductNotFound(_)
            | AppError::QuoteNotFound(_)
            | AppError::ShareNotFound(_)
            | AppError::UserNotFound(_)
            | AppError::NotFound(_) => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::Conflict(_) | AppError::AlreadyExists(_) => StatusCode::CONFLICT,

            // 422 Unprocessable Entity
            AppError::PlanLimitExceeded { .. }
            | AppError::PlanFeatureNotAllowed(_)
            | AppError::QuoteNotEditable(_)
            | AppError::QuoteNotDeletable(_)
            | AppError::InvalidTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,

            // 500 Internal Server Error
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the machine-readable error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Transaction(_) => "transaction_error",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden => "forbidden",
            AppError::CompanyInactive(_) => "company_inactive",
            AppError::CompanyNotFound(_) => "company_not_found",
            AppError::ClientNotFound(_) => "client_not_found",
            AppError::ProductNotFound(_) => "product_not_found",
            AppError::QuoteNotFound(_) => "quote_not_found",
            AppError::ShareNotFound(_) => "share_not_found",
            AppError::UserNotFound(_) => "user_not_found",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::AlreadyExists(_) => "already_exists",
            AppError::PlanLimitExceeded { .. } => "plan_limit_exceeded",
            AppError::PlanFeatureNotAllowed(_) => "plan_feature_not_allowed",
            AppError::QuoteNotEditable(_) => "quote_not_editable",
            AppError::QuoteNotDeletable(_) => "quote_not_deletable",
            AppError::InvalidTransition { .. } => "invalid_transition",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::MissingField(_) => "missing_field",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = json!({
            "error": self.error_code(),
            "message": self.to_string(),
            "status": status.as_u16(),
        });

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::CompanyInactive("abc".to_string()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::QuoteNotFound("q-1".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict("quote number taken".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::PlanLimitExceeded {
                limit: "max_quotes_per_month".to_string(),
                max: 10
            }
            .status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::InvalidInput("negative quantity".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Database("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::PlanLimitExceeded {
                limit: "max_shares_per_company".to_string(),
                max: 3
            }
            .error_code(),
            "plan_limit_exceeded"
        );
        assert_eq!(
            AppError::QuoteNotEditable("Q-0001".to_string()).error_code(),
            "quote_not_editable"
        );
        assert_eq!(
            AppError::InvalidTransition {
                from: QuoteStatus::Accepted,
                to: QuoteStatus::Draft
            }
            .error_code(),
            "invalid_transition"
        );
    }
}
