use axum::http::{header, HeaderMap, HeaderValue};

use super::SessionId;
use crate::config::SessionConfig;

/// Value of the named cookie across all `Cookie` headers. Empty values count as absent.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim().trim_matches('"').to_string())
        .filter(|v| !v.is_empty())
}

/// `Set-Cookie` value for a freshly minted session.
pub fn session_cookie(cfg: &SessionConfig, session: &SessionId) -> anyhow::Result<HeaderValue> {
    let value = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        cfg.cookie_name,
        session,
        cfg.max_age_secs()
    );
    Ok(HeaderValue::from_str(&value)?)
}
