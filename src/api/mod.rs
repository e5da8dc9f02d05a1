//! API handlers for Librarium REST endpoints

pub mod auth;
pub mod books;
pub mod borrows;
pub mod health;
pub mod openapi;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::CookieJar;

use crate::{error::AppError, models::user::User, AppState};

/// Name of the cookie that may carry the transport token
pub const SESSION_COOKIE: &str = "token";

/// Extractor for the authenticated user
///
/// Locates the transport token in the `Authorization: Bearer` header or the
/// session cookie, unseals and verifies it, and loads the account. Handlers
/// taking this extractor run strictly after it succeeds, so role checks on
/// the attached user can never see an unauthenticated request.
pub struct AuthenticatedUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.to_string());

        let token = match bearer {
            Some(token) => token,
            None => CookieJar::from_headers(&parts.headers)
                .get(SESSION_COOKIE)
                .map(|cookie| cookie.value().to_string())
                .ok_or_else(|| {
                    AppError::Authentication("Not authorized, token missing".to_string())
                })?,
        };

        let user = state.services.auth.authenticate_token(&token).await?;

        Ok(AuthenticatedUser(user))
    }
}
