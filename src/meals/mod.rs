mod dto;
mod extractors;
pub mod handlers;
mod repo;
mod repo_types;

use crate::{session::require_session, state::AppState};
use axum::{middleware, Router};

/// Meal routes behind the session guard.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(handlers::meal_routes())
        .route_layer(middleware::from_fn_with_state(state, require_session))
}
