// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{Guard, RequiredPermission, TokenVerifier};
use crate::config::{AuthSettings, ConfigError};

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(settings: &AuthSettings) -> Result<Self, ConfigError> {
        Ok(Self::from_verifier(TokenVerifier::from_settings(settings)?))
    }

    pub fn from_verifier(verifier: TokenVerifier) -> Self {
        Self {
            verifier: Arc::new(verifier),
        }
    }

    /// A guard for `permission` sharing this state's verifier and key cache.
    pub fn guard(&self, permission: impl Into<RequiredPermission>) -> Guard {
        Guard::new(self.verifier.clone(), permission)
    }
}
