// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer JWT authentication and permission checks for protected routes.
//!
//! ## Auth Flow
//!
//! 1. Client sends `Authorization: Bearer <JWT>` issued by the identity provider
//! 2. Server:
//!    - Extracts the token from the header
//!    - Looks up the signing key by `kid` in the provider's JWKS
//!    - Verifies JWT signature, expiry, issuer, audience
//!    - Checks the route's permission against the `permissions` claim
//! 3. The handler receives the token and its verified claims
//!
//! ## Security
//!
//! - Only allow-listed algorithms are accepted
//! - JWKS is cached with TTL; refreshes are single-flight
//! - Clock skew tolerance defaults to 60 seconds
//! - An unreachable JWKS is reported as 503, never as a permission failure

pub mod claims;
pub mod error;
pub mod extractor;
pub mod guard;
pub mod jwks;
pub mod middleware;
pub mod permissions;
pub mod verifier;

pub use claims::{Authorized, Claims};
pub use error::AuthError;
pub use extractor::Auth;
pub use guard::Guard;
pub use jwks::JwksManager;
pub use middleware::require_permission;
pub use permissions::RequiredPermission;
pub use verifier::TokenVerifier;
