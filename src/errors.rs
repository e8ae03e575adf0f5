use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for the taxi fleet service
#[derive(Debug)]
pub enum TaxiError {
    // HTTP and API errors
    Conflict(String),
    InternalServer(String),

    // Store errors
    StoreConnection(String),
    StoreQuery(String),
    StoreSerialization(String),

    // Fleet errors
    ManufacturerNotFound(String),
    DriverNotFound(String),
    CarNotFound(String),
    PageNotFound(String),

    // Validation errors
    ValidationFailed(Vec<ValidationError>),

    // Configuration and setup errors
    ConfigurationError(String),
    InvalidConfiguration(String),

    // Authentication errors
    InvalidCredentials,
    InactiveAccount,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl fmt::Display for TaxiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            TaxiError::InternalServer(msg) => write!(f, "Internal server error: {}", msg),

            TaxiError::StoreConnection(msg) => write!(f, "Store connection error: {}", msg),
            TaxiError::StoreQuery(msg) => write!(f, "Store query error: {}", msg),
            TaxiError::StoreSerialization(msg) => write!(f, "Store serialization error: {}", msg),

            TaxiError::ManufacturerNotFound(id) => write!(f, "Manufacturer not found: {}", id),
            TaxiError::DriverNotFound(id) => write!(f, "Driver not found: {}", id),
            TaxiError::CarNotFound(id) => write!(f, "Car not found: {}", id),
            TaxiError::PageNotFound(page) => write!(f, "Invalid page: {}", page),

            TaxiError::ValidationFailed(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }

            TaxiError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            TaxiError::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),

            TaxiError::InvalidCredentials => write!(f, "Invalid username or password"),
            TaxiError::InactiveAccount => write!(f, "This account is inactive"),
        }
    }
}

impl std::error::Error for TaxiError {}

impl IntoResponse for TaxiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            TaxiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),

            TaxiError::ValidationFailed(errors) => {
                let details = serde_json::to_value(&errors).ok();
                (StatusCode::BAD_REQUEST, "validation_failed", "Validation errors occurred".to_string(), details)
            }

            TaxiError::ManufacturerNotFound(id) => {
                (StatusCode::NOT_FOUND, "manufacturer_not_found", format!("Manufacturer not found: {}", id), None)
            }
            TaxiError::DriverNotFound(id) => (StatusCode::NOT_FOUND, "driver_not_found", format!("Driver not found: {}", id), None),
            TaxiError::CarNotFound(id) => (StatusCode::NOT_FOUND, "car_not_found", format!("Car not found: {}", id), None),
            TaxiError::PageNotFound(page) => (StatusCode::NOT_FOUND, "page_not_found", format!("Invalid page: {}", page), None),

            TaxiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "invalid_credentials", "Invalid username or password".to_string(), None)
            }
            TaxiError::InactiveAccount => (StatusCode::UNAUTHORIZED, "inactive_account", "This account is inactive".to_string(), None),

            // All other errors are treated as internal server errors
            other => {
                tracing::error!("Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", other.to_string(), None)
            }
        };

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, axum::Json(error_response)).into_response()
    }
}

// Convenience type alias for Results
pub type TaxiResult<T> = Result<T, TaxiError>;

impl From<redis::RedisError> for TaxiError {
    fn from(err: redis::RedisError) -> Self {
        match err.kind() {
            redis::ErrorKind::IoError => TaxiError::StoreConnection(err.to_string()),
            redis::ErrorKind::AuthenticationFailed => TaxiError::StoreConnection("Authentication failed".to_string()),
            redis::ErrorKind::TypeError => TaxiError::StoreSerialization(err.to_string()),
            _ => TaxiError::StoreQuery(err.to_string()),
        }
    }
}

// Stored records are the only JSON this crate decodes itself
impl From<serde_json::Error> for TaxiError {
    fn from(err: serde_json::Error) -> Self {
        TaxiError::StoreSerialization(err.to_string())
    }
}

// Helper functions for creating common errors
impl TaxiError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        TaxiError::Conflict(msg.into())
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        TaxiError::InternalServer(msg.into())
    }

    pub fn manufacturer_not_found(id: impl Into<String>) -> Self {
        TaxiError::ManufacturerNotFound(id.into())
    }

    pub fn driver_not_found(id: impl Into<String>) -> Self {
        TaxiError::DriverNotFound(id.into())
    }

    pub fn car_not_found(id: impl Into<String>) -> Self {
        TaxiError::CarNotFound(id.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = TaxiError::DriverNotFound("drv-231207-a1b2c".to_string());
        assert_eq!(error.to_string(), "Driver not found: drv-231207-a1b2c");
    }

    #[test]
    fn test_validation_details_in_body() {
        let error = TaxiError::ValidationFailed(vec![ValidationError::new(
            "license_number",
            "License number should consist of 8 characters",
        )]);
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(TaxiError::car_not_found("car-1").into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(TaxiError::PageNotFound("3".to_string()).into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(TaxiError::conflict("taken").into_response().status(), StatusCode::CONFLICT);
        assert_eq!(TaxiError::InvalidCredentials.into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            TaxiError::StoreQuery("boom".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_stored_json_errors_map_to_store_serialization() {
        let err = serde_json::from_str::<ValidationError>("{not json").unwrap_err();
        assert!(matches!(TaxiError::from(err), TaxiError::StoreSerialization(_)));
    }

    #[test]
    fn test_helper_functions() {
        assert!(matches!(TaxiError::internal_error("test"), TaxiError::InternalServer(_)));
        assert!(matches!(TaxiError::manufacturer_not_found("test"), TaxiError::ManufacturerNotFound(_)));
    }
}
