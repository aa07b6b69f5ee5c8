use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated user, taken from the session cookie or an
/// `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Identity that owns uploaded files.
    pub email: String,
}

fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(Some)
        .ok_or(AppError::TokenInvalid)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = &state.config.auth;
        let jar = CookieJar::from_headers(&parts.headers);

        let token = match jar.get(&auth.cookie_name) {
            Some(cookie) => cookie.value().to_owned(),
            None => bearer_token(parts)?
                .ok_or(AppError::TokenMissing)?
                .to_owned(),
        };

        let claims = jwt::verify(&auth.jwt_secret, &token).map_err(|e| {
            tracing::debug!("Rejected token: {e}");
            AppError::TokenInvalid
        })?;

        Ok(AuthUser {
            email: claims.email,
        })
    }
}
