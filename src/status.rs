use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::{
    db::{self, SchemaEntry},
    error::AppError,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(status))
        .route("/status-database", get(status_database))
}

pub async fn status() -> &'static str {
    "server is running"
}

/// Raw `sqlite_schema` listing, diagnostic only.
#[instrument(skip(state))]
pub async fn status_database(
    State(state): State<AppState>,
) -> Result<Json<Vec<SchemaEntry>>, AppError> {
    let entries = db::schema_entries(&state.db).await?;
    Ok(Json(entries))
}
