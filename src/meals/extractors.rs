use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

use crate::{error::AppError, validation::ValidationError};

/// `:id` path segment parsed as a UUID.
pub struct MealId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for MealId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ValidationError::new("id", e.body_text()))?;
        let id = Uuid::parse_str(&raw)
            .map_err(|_| ValidationError::new("id", "must be a valid UUID"))?;
        Ok(MealId(id))
    }
}
