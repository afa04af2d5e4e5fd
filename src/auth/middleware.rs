// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Attach a guard to a route with `from_fn_with_state`; on success the
//! `Authorized` value is stored in the request extensions where the `Auth`
//! extractor picks it up.
//!
//! ```rust,ignore
//! let app = Router::new().route(
//!     "/students",
//!     get(list_students).route_layer(axum::middleware::from_fn_with_state(
//!         state.guard("get:students"),
//!         require_permission,
//!     )),
//! );
//! ```

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::Guard;

/// Authentication middleware function.
pub async fn require_permission(
    State(guard): State<Guard>,
    mut request: Request,
    next: Next,
) -> Response {
    match guard.authorize(request.headers().get(AUTHORIZATION)).await {
        Ok(authorized) => {
            request.extensions_mut().insert(authorized);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
