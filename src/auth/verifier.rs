// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT verification against the identity provider's JWKS.
//!
//! ## Order of checks
//!
//! 1. Unverified header decodes and names a `kid`
//! 2. The JWKS holds a key for that `kid`
//! 3. Signature verifies with an allow-listed algorithm
//! 4. `exp`, `aud` and `iss` validate
//!
//! Expiry and claim mismatches are reported separately from every other
//! failure so clients can tell "log in again" from "malformed request".

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, AlgorithmFamily, Validation};

use super::jwks::{decoding_key, JwksManager};
use super::{AuthError, Claims};
use crate::config::{AuthSettings, ConfigError};

/// Claims that must be present in every accepted token.
const REQUIRED_CLAIMS: [&str; 3] = ["exp", "aud", "iss"];

/// Verifies bearer tokens issued by the configured domain.
pub struct TokenVerifier {
    jwks: JwksManager,
    issuer: String,
    audience: String,
    algorithms: Vec<Algorithm>,
    leeway: u64,
}

impl TokenVerifier {
    /// Build a verifier and its key set resolver from settings.
    pub fn from_settings(settings: &AuthSettings) -> Result<Self, ConfigError> {
        let jwks = JwksManager::new(settings.jwks_url()?, settings.fetch_timeout)?
            .with_cache_ttl(settings.cache_ttl)
            .with_min_refresh_interval(settings.min_refresh_interval);
        Ok(Self::new(jwks, settings))
    }

    /// Build a verifier around an existing key set resolver.
    pub fn new(jwks: JwksManager, settings: &AuthSettings) -> Self {
        Self {
            jwks,
            issuer: settings.issuer(),
            audience: settings.audience.clone(),
            algorithms: settings.algorithms.clone(),
            leeway: settings.leeway,
        }
    }

    pub fn jwks(&self) -> &JwksManager {
        &self.jwks
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Verify a token and return its claims.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|e| {
            tracing::debug!(error = %e, "Token header does not decode");
            AuthError::UnparsableToken
        })?;

        let kid = header.kid.as_deref().ok_or(AuthError::MissingKeyId)?;

        let jwk = self
            .jwks
            .find_key(kid)
            .await?
            .ok_or(AuthError::NoMatchingKey)?;
        let key = decoding_key(&jwk)?;
        let validation = self.validation(key.family()).ok_or_else(|| {
            tracing::debug!(kid, family = ?key.family(), "No allow-listed algorithm for key type");
            AuthError::UnparsableToken
        })?;

        let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| {
            tracing::debug!(error = %e, kid, alg = ?header.alg, "Token rejected");
            classify(e.kind())
        })?;

        Ok(token_data.claims)
    }

    /// Validation rules for a key of `family`.
    ///
    /// `decode` refuses an allow-list spanning several key families, so only
    /// the algorithms usable with this key are passed on.
    fn validation(&self, family: AlgorithmFamily) -> Option<Validation> {
        let algorithms: Vec<Algorithm> = self
            .algorithms
            .iter()
            .copied()
            .filter(|alg| alg.family() == family)
            .collect();
        if algorithms.is_empty() {
            return None;
        }

        let mut validation = Validation::default();
        validation.algorithms = algorithms;
        validation.leeway = self.leeway;
        validation.validate_nbf = true;
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&REQUIRED_CLAIMS);
        Some(validation)
    }
}

/// Map a decode failure onto the error taxonomy.
fn classify(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidAudience
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidSubject
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims,
        _ => AuthError::UnparsableToken,
    }
}
