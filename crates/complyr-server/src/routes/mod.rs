pub mod capabilities;
pub mod entitlements;
pub mod health;
pub mod publish;

use crate::error::AppError;

/// Fallback for unmatched paths.
pub async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}
