use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use super::{read_cookie, SessionId};
use crate::{error::AppError, state::AppState, users::User};

/// Session cookie if the caller sent one.
pub struct MaybeSession(pub Option<SessionId>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = read_cookie(&parts.headers, &state.config.session.cookie_name)
            .map(SessionId::from);
        Ok(MaybeSession(session))
    }
}

/// User owning the caller's session.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = match parts.extensions.get::<SessionId>() {
            Some(s) => s.clone(),
            None => read_cookie(&parts.headers, &state.config.session.cookie_name)
                .map(SessionId::from)
                .ok_or(AppError::MissingSession)?,
        };

        match User::find_by_session(&state.db, &session).await? {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                warn!("no user for session");
                Err(AppError::UnknownSession)
            }
        }
    }
}
