// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The permission guard.
//!
//! A `Guard` pairs the shared verifier with one required permission. Each
//! invocation runs extraction, verification and the permission check in that
//! order; the first failure ends the request and the protected operation is
//! never called.
//!
//! ```rust,ignore
//! let guard = Guard::new(verifier, "get:students");
//! let students = guard
//!     .run(headers.get(AUTHORIZATION), |authorized| async move {
//!         list_students(&authorized.claims).await
//!     })
//!     .await?;
//! ```

use std::future::Future;
use std::sync::Arc;

use axum::http::HeaderValue;

use super::extractor::bearer_token;
use super::permissions::{check_permissions, RequiredPermission};
use super::verifier::TokenVerifier;
use super::{AuthError, Authorized};

/// Reusable authorization wrapper for one permission.
#[derive(Clone)]
pub struct Guard {
    verifier: Arc<TokenVerifier>,
    permission: RequiredPermission,
}

impl Guard {
    pub fn new(verifier: Arc<TokenVerifier>, permission: impl Into<RequiredPermission>) -> Self {
        Self {
            verifier,
            permission: permission.into(),
        }
    }

    pub fn permission(&self) -> &RequiredPermission {
        &self.permission
    }

    /// Authorize a request from its `Authorization` header.
    pub async fn authorize(&self, header: Option<&HeaderValue>) -> Result<Authorized, AuthError> {
        let result = self.check(header).await;

        match &result {
            Ok(authorized) => tracing::debug!(
                permission = %self.permission,
                sub = authorized.claims.subject().unwrap_or_default(),
                "Request authorized"
            ),
            Err(e) => tracing::debug!(
                permission = %self.permission,
                code = e.error_code(),
                status = e.status_code().as_u16(),
                "Request rejected"
            ),
        }

        result
    }

    /// Authorize, then run `operation` with the verified token and claims.
    pub async fn run<F, Fut, T>(&self, header: Option<&HeaderValue>, operation: F) -> Result<T, AuthError>
    where
        F: FnOnce(Authorized) -> Fut,
        Fut: Future<Output = T>,
    {
        let authorized = self.authorize(header).await?;
        Ok(operation(authorized).await)
    }

    async fn check(&self, header: Option<&HeaderValue>) -> Result<Authorized, AuthError> {
        let token = bearer_token(header)?;
        let claims = self.verifier.verify(token).await?;
        check_permissions(&self.permission, &claims)?;

        Ok(Authorized {
            token: token.to_string(),
            claims,
        })
    }
}
