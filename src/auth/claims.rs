// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Decoded JWT claims and the authorized request representation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims decoded from a verified token.
///
/// Kept as the raw claim map so that the payload handed to handlers is exactly
/// what the identity provider signed. Accessors cover the claims the guard
/// itself relies on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// Look up a claim by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Subject (`sub`), the provider's user identifier.
    pub fn subject(&self) -> Option<&str> {
        self.get("sub").and_then(Value::as_str)
    }

    /// Issuer (`iss`).
    pub fn issuer(&self) -> Option<&str> {
        self.get("iss").and_then(Value::as_str)
    }

    /// Expiry (`exp`) as a Unix timestamp.
    pub fn expires_at(&self) -> Option<u64> {
        self.get("exp").and_then(Value::as_u64)
    }

    /// The `permissions` claim as a list of strings.
    ///
    /// Returns `None` when the claim is absent or is not an array. Non-string
    /// entries are skipped.
    pub fn permissions(&self) -> Option<Vec<&str>> {
        let entries = self.get("permissions")?.as_array()?;
        Some(entries.iter().filter_map(Value::as_str).collect())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Claims(map)
    }
}

/// A request that passed the guard.
///
/// Handed to the protected operation: the bearer token as presented plus the
/// claims it was verified to carry.
#[derive(Debug, Clone, PartialEq)]
pub struct Authorized {
    /// Bearer token, verbatim from the `Authorization` header
    pub token: String,
    /// Verified claims
    pub claims: Claims,
}
