use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::{read_cookie, SessionId};
use crate::{error::AppError, state::AppState};

/// Rejects requests that carry no session cookie. Whether the session maps to a
/// user is left to [`super::CurrentUser`].
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = read_cookie(req.headers(), &state.config.session.cookie_name) else {
        warn!(method = %req.method(), path = %req.uri().path(), "missing session cookie");
        return Err(AppError::MissingSession);
    };
    req.extensions_mut().insert(SessionId::from(token));
    Ok(next.run(req).await)
}
