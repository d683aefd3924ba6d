use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Router,
};
use tracing::{info, instrument};

use crate::{
    error::AppError,
    session::{session_cookie, MaybeSession, SessionId},
    state::AppState,
    users::{dto::CreateUserRequest, repo_types::User},
    validation::ValidJson,
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users", post(create_user))
}

/// POST /users { name }
/// Mints a session cookie on first contact; an existing cookie is reused as is.
#[instrument(skip(state, session, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    ValidJson(payload): ValidJson<CreateUserRequest>,
) -> Result<(StatusCode, HeaderMap), AppError> {
    let mut headers = HeaderMap::new();
    let session = match session {
        Some(s) => s,
        None => {
            let s = SessionId::mint();
            headers.insert(header::SET_COOKIE, session_cookie(&state.config.session, &s)?);
            s
        }
    };

    let name = payload.name.unwrap_or_default();
    let user = User::create(&state.db, name.trim(), &session).await?;

    info!(user_id = %user.id, new_session = headers.contains_key(header::SET_COOKIE), "user created");
    Ok((StatusCode::CREATED, headers))
}
