// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token extraction and the `Auth` extractor for handlers.
//!
//! Use the `Auth` extractor in handlers that sit behind a permission guard:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(authorized): Auth) -> impl IntoResponse {
//!     // authorized.claims has been verified
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderValue},
};

use super::{AuthError, Authorized, RequiredPermission};
use crate::state::AppState;

/// Pull the bearer token out of an `Authorization` header value.
pub fn bearer_token(header: Option<&HeaderValue>) -> Result<&str, AuthError> {
    let value = header.ok_or(AuthError::MissingAuthHeader)?;
    let value = value.to_str().map_err(|_| AuthError::NotBearerToken)?;
    parse_bearer(value)
}

/// Split `<scheme> <token>` and return the token verbatim.
///
/// The scheme is matched case-insensitively. Exactly two whitespace-separated
/// segments are accepted.
pub fn parse_bearer(value: &str) -> Result<&str, AuthError> {
    if value.is_empty() {
        return Err(AuthError::MissingAuthHeader);
    }

    let mut parts = value.split_whitespace();

    let scheme = parts.next().ok_or(AuthError::InvalidScheme)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidScheme);
    }

    let token = parts.next().ok_or(AuthError::TokenNotFound)?;
    if parts.next().is_some() {
        return Err(AuthError::NotBearerToken);
    }

    Ok(token)
}

/// Extractor for an authorized request.
///
/// Routes wrapped by the permission middleware already carry an `Authorized`
/// value in their extensions. On unguarded routes the token is verified here
/// with no permission requirement.
pub struct Auth(pub Authorized);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // First check if middleware already authorized the request
        if let Some(authorized) = parts.extensions.get::<Authorized>().cloned() {
            return Ok(Auth(authorized));
        }

        let authorized = state
            .guard(RequiredPermission::Any)
            .authorize(parts.headers.get(AUTHORIZATION))
            .await?;

        Ok(Auth(authorized))
    }
}
