//! Bearer-token authentication extractor.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use labhub_domain::user::{ApiToken, User};

use crate::error::ApiError;
use crate::state::{AppState, Backend};

/// The authenticated user of a request.
///
/// Extraction fails with `401` when the token is missing or unknown, so a
/// handler taking `CurrentUser` never runs for anonymous requests.
pub struct CurrentUser(pub User);

impl<B: Backend> FromRequestParts<AppState<B>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<B>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Err(ApiError::unauthorized());
        };
        let ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        let user = state
            .user_service
            .authenticate(&ApiToken::from_plaintext(token), ip)
            .await?;
        Ok(Self(user))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
