// Error handling types shared by the validator, the store and the HTTP layer

use axum::{http::StatusCode, response::IntoResponse, Json};
use sqlx::error::{DatabaseError, ErrorKind};
use tracing::error;

use super::response::ApiResponse;
use super::validation::ValidationResult;

/// Every expected outcome other than success.
///
/// Validation, lookup and constraint failures are ordinary values of this
/// type; only `StorageFault` reports a failure of the storage medium itself.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("Validation failed: {}", .0.join(", "))]
    ValidationFailed(Vec<String>),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Storage fault: {0}")]
    StorageFault(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationFailed(_)
            | ApiError::InvalidArgument(_)
            | ApiError::ConstraintViolation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::StorageFault(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Sorts a sqlx error into constraint, lookup or medium failure.
    ///
    /// The raw error is logged here and never shown to clients.
    pub fn from_storage(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if is_constraint_failure(db_err.as_ref()) => {
                error!(error = %db_err, "Storage rejected a record that passed validation");
                ApiError::ConstraintViolation(constraint_message(db_err.message()))
            }
            sqlx::Error::RowNotFound => ApiError::NotFound("Donation not found".to_string()),
            _ => {
                error!(error = %err, "Storage operation failed");
                ApiError::StorageFault("Storage operation failed".to_string())
            }
        }
    }
}

fn is_constraint_failure(db_err: &dyn DatabaseError) -> bool {
    matches!(
        db_err.kind(),
        ErrorKind::CheckViolation | ErrorKind::NotNullViolation
    ) || db_err.message().contains("CHECK constraint failed")
        || db_err.message().contains("NOT NULL constraint failed")
}

/// Client-facing rule for each constrained column, in `field: message` shape
const COLUMN_RULES: [(&str, &str); 4] = [
    ("donor_name", "Donor name must be between 2 and 100 characters"),
    (
        "donation_type",
        "Donation type must be one of: money, food, clothing, toys, books, household, other",
    ),
    ("quantity", "Quantity must be greater than 0 and not exceed 1000000"),
    ("date", "Date must be a valid ISO 8601 date"),
];

/// Names the column a SQLite constraint message refers to, without echoing
/// the SQL itself.
fn constraint_message(raw: &str) -> String {
    let mut idents = raw
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty());

    idents
        .find_map(|token| COLUMN_RULES.iter().find(|(column, _)| *column == token))
        .map(|(column, rule)| format!("{}: {}", column, rule))
        .unwrap_or_else(|| "Donation violates storage constraints".to_string())
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::from_storage(err)
    }
}

impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        ApiError::ValidationFailed(result.into_messages())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();

        let body: ApiResponse<()> = match self {
            ApiError::ValidationFailed(errors) => {
                ApiResponse::failure("Validation failed", Some(errors))
            }
            ApiError::InvalidArgument(msg) => ApiResponse::failure(&msg, None),
            ApiError::NotFound(msg) => ApiResponse::failure(&msg, None),
            ApiError::ConstraintViolation(msg) => {
                ApiResponse::failure("Donation violates storage constraints", Some(vec![msg]))
            }
            ApiError::StorageFault(_) => ApiResponse::failure("Internal server error", None),
        };

        (status, Json(body)).into_response()
    }
}
