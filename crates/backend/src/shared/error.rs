use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::domain::a004_cart::aggregate::CartError;
use contracts::domain::a005_order::aggregate::OrderTransitionError;
use contracts::domain::a005_order::checkout::CheckoutError;
use contracts::shared::api::ApiMessage;
use thiserror::Error;

/// Error returned by every business handler
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InsufficientStock(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{} not found", what))
    }

    pub fn forbidden() -> Self {
        ApiError::Forbidden("You do not have access to this resource".into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) | ApiError::InsufficientStock(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client; internal details stay in the log
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(e) = &self {
            tracing::error!("Internal error: {:#}", e);
        }
        let status = self.status();
        (status, Json(ApiMessage::error(self.client_message()))).into_response()
    }
}

impl From<CartError> for ApiError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::InsufficientStock { .. } => ApiError::InsufficientStock(e.to_string()),
            CartError::LineNotFound => ApiError::NotFound(e.to_string()),
            CartError::InvalidQuantity(_)
            | CartError::ProductUnavailable(_)
            | CartError::VariantNotFound { .. } => ApiError::Validation(e.to_string()),
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::InsufficientStock { .. } => ApiError::InsufficientStock(e.to_string()),
            CheckoutError::EmptyCart
            | CheckoutError::InvalidQuantity { .. }
            | CheckoutError::ProductUnavailable(_)
            | CheckoutError::VariantNotFound { .. } => ApiError::Validation(e.to_string()),
        }
    }
}

impl From<OrderTransitionError> for ApiError {
    fn from(e: OrderTransitionError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

/// Parses a path id, answering 400 for malformed values
pub fn parse_id(raw: &str) -> ApiResult<uuid::Uuid> {
    uuid::Uuid::parse_str(raw).map_err(|_| ApiError::Validation(format!("Invalid id: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::forbidden().status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("Order").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::InsufficientStock("x".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(anyhow::anyhow!("db down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_message_is_hidden() {
        let err = ApiError::from(anyhow::anyhow!("secret connection string"));
        assert_eq!(err.client_message(), "Internal server error");
        assert_eq!(ApiError::not_found("Order").client_message(), "Order not found");
    }

    #[test]
    fn test_domain_error_mapping() {
        let stock = CheckoutError::InsufficientStock {
            product: "Milk".into(),
            requested: 3,
            available: 1,
        };
        let err = ApiError::from(stock);
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert!(err.client_message().contains("available 1"));

        assert_eq!(
            ApiError::from(CheckoutError::EmptyCart).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(CartError::LineNotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(CartError::InvalidQuantity(0)).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_parse_id() {
        assert!(parse_id("not-a-uuid").is_err());
        let id = uuid::Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
    }
}
