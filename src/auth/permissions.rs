// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Permission requirements and the claims membership check.
//!
//! ## Semantics
//!
//! - `RequiredPermission::Named` - the token's `permissions` claim must list
//!   the permission verbatim (e.g. `get:students`)
//! - `RequiredPermission::Any` - a valid token is enough; the `permissions`
//!   claim is not consulted. An empty permission string maps here.

use std::fmt;

use super::{AuthError, Claims};

/// Permission a guarded operation requires.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequiredPermission {
    /// Any authenticated caller
    Any,
    /// Exact permission string that must be present in the token
    Named(String),
}

impl RequiredPermission {
    pub fn named(permission: impl Into<String>) -> Self {
        Self::from(permission.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            RequiredPermission::Any => "",
            RequiredPermission::Named(permission) => permission,
        }
    }
}

impl From<String> for RequiredPermission {
    fn from(permission: String) -> Self {
        if permission.is_empty() {
            RequiredPermission::Any
        } else {
            RequiredPermission::Named(permission)
        }
    }
}

impl From<&str> for RequiredPermission {
    fn from(permission: &str) -> Self {
        Self::from(permission.to_string())
    }
}

impl fmt::Display for RequiredPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredPermission::Any => write!(f, "<any>"),
            RequiredPermission::Named(permission) => write!(f, "{permission}"),
        }
    }
}

/// Check that verified claims grant the required permission.
pub fn check_permissions(required: &RequiredPermission, claims: &Claims) -> Result<(), AuthError> {
    let RequiredPermission::Named(permission) = required else {
        return Ok(());
    };

    let granted = claims.permissions().ok_or(AuthError::PermissionsMissing)?;

    if !granted.contains(&permission.as_str()) {
        return Err(AuthError::PermissionNotFound);
    }

    Ok(())
}
