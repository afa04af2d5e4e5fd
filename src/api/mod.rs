// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{auth::require_permission, state::AppState};

pub mod health;
pub mod students;

pub fn router(state: AppState) -> Router {
    let student_routes = get(students::list_students)
        .route_layer(from_fn_with_state(
            state.guard("get:students"),
            require_permission,
        ))
        .merge(post(students::create_student).route_layer(from_fn_with_state(
            state.guard("post:students"),
            require_permission,
        )));

    Router::new()
        .route("/health", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/students", student_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
