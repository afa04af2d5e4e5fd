// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.
//!
//! Every failure in the guard pipeline is one of these variants. Each carries
//! an HTTP status, a machine-readable code and a human-readable description;
//! the description is also the `Display` output.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No authorization header present
    #[error("Authorization header is expected.")]
    MissingAuthHeader,
    /// Scheme is not `Bearer` (or the header is blank)
    #[error("Authorization header must start with \"Bearer\".")]
    InvalidScheme,
    /// `Bearer` without a token
    #[error("Token not found.")]
    TokenNotFound,
    /// More than two segments, or a header value that is not text
    #[error("Authorization header must be bearer token.")]
    NotBearerToken,
    /// Token header carries no `kid`
    #[error("Authorization malformed.")]
    MissingKeyId,
    /// No key in the JWKS matches the token's `kid`
    #[error("Unable to find the appropriate key.")]
    NoMatchingKey,
    /// Malformed token, bad signature, or algorithm outside the allow-list
    #[error("Unable to parse authentication token.")]
    UnparsableToken,
    /// Signature valid but `exp` is in the past
    #[error("Token expired.")]
    TokenExpired,
    /// Audience, issuer or another registered claim did not validate
    #[error("Incorrect claims. Please, check the audience and issuer.")]
    InvalidClaims,
    /// Verified token has no usable `permissions` claim
    #[error("Permissions not included in JWT.")]
    PermissionsMissing,
    /// Required permission is not in the token's permission set
    #[error("Permission not found.")]
    PermissionNotFound,
    /// The identity provider's key set could not be fetched
    #[error("Unable to fetch signing keys from the identity provider.")]
    JwksUnavailable(String),
}

/// JSON body returned for a rejected request.
#[derive(Debug, Serialize)]
pub struct AuthErrorBody {
    pub success: bool,
    pub error: u16,
    pub code: &'static str,
    pub description: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "authorization_header_missing",
            AuthError::InvalidScheme
            | AuthError::TokenNotFound
            | AuthError::NotBearerToken
            | AuthError::MissingKeyId
            | AuthError::NoMatchingKey
            | AuthError::UnparsableToken => "invalid_header",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims | AuthError::PermissionsMissing => "invalid_claims",
            AuthError::PermissionNotFound => "unauthorized",
            AuthError::JwksUnavailable(_) => "jwks_unavailable",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidScheme
            | AuthError::TokenNotFound
            | AuthError::NotBearerToken
            | AuthError::MissingKeyId
            | AuthError::TokenExpired
            | AuthError::InvalidClaims => StatusCode::UNAUTHORIZED,
            AuthError::NoMatchingKey
            | AuthError::UnparsableToken
            | AuthError::PermissionsMissing => StatusCode::BAD_REQUEST,
            AuthError::PermissionNotFound => StatusCode::FORBIDDEN,
            AuthError::JwksUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Whether the failure lies with the infrastructure rather than the caller.
    pub fn is_upstream(&self) -> bool {
        matches!(self, AuthError::JwksUnavailable(_))
    }

    pub fn body(&self) -> AuthErrorBody {
        AuthErrorBody {
            success: false,
            error: self.status_code().as_u16(),
            code: self.error_code(),
            description: self.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::JwksUnavailable(reason) = &self {
            tracing::warn!(%reason, "Rejecting request, signing keys unavailable");
        }
        (self.status_code(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_auth_returns_401() {
        let response = AuthError::MissingAuthHeader.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["code"], "authorization_header_missing");
        assert_eq!(body["error"], 401);
        assert_eq!(body["success"], false);
        assert_eq!(body["description"], "Authorization header is expected.");
    }

    #[tokio::test]
    async fn permission_not_found_returns_403() {
        let response = AuthError::PermissionNotFound.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn taxonomy_matches_status_table() {
        let table = [
            (AuthError::MissingAuthHeader, 401, "authorization_header_missing"),
            (AuthError::InvalidScheme, 401, "invalid_header"),
            (AuthError::TokenNotFound, 401, "invalid_header"),
            (AuthError::NotBearerToken, 401, "invalid_header"),
            (AuthError::MissingKeyId, 401, "invalid_header"),
            (AuthError::NoMatchingKey, 400, "invalid_header"),
            (AuthError::UnparsableToken, 400, "invalid_header"),
            (AuthError::PermissionsMissing, 400, "invalid_claims"),
            (AuthError::InvalidClaims, 401, "invalid_claims"),
            (AuthError::TokenExpired, 401, "token_expired"),
            (AuthError::PermissionNotFound, 403, "unauthorized"),
        ];

        for (error, status, code) in table {
            assert_eq!(error.status_code().as_u16(), status, "{error:?}");
            assert_eq!(error.error_code(), code, "{error:?}");
            assert!(!error.is_upstream());
        }
    }

    #[test]
    fn upstream_outage_is_not_a_client_fault() {
        let error = AuthError::JwksUnavailable("connection refused".to_string());
        assert_eq!(error.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(error.is_upstream());
        assert_ne!(error.error_code(), "unauthorized");
    }

    #[test]
    fn body_serializes_status_code_and_description() {
        let body = serde_json::to_value(AuthError::NoMatchingKey.body()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "error": 400,
                "code": "invalid_header",
                "description": "Unable to find the appropriate key."
            })
        );
    }
}
