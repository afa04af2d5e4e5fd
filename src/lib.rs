// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Permission Gate - JWT bearer authentication and permission guard
//!
//! This crate verifies bearer tokens against an identity provider's published
//! JWKS and enforces a per-route permission string before a protected
//! operation runs.
//!
//! ## Modules
//!
//! - `api` - Sample HTTP API (Axum) wired through the guard
//! - `auth` - Token extraction, JWKS, verification, permission checks, guard
//! - `config` - Environment configuration
//! - `state` - Shared application state

pub mod api;
pub mod auth;
pub mod config;
pub mod state;
