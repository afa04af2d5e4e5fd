// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures: a test RSA key, its JWKS, token minting and a mock
//! identity provider.

#![allow(dead_code)]

use std::time::Duration;

use jsonwebtoken::{encode, get_current_timestamp, Algorithm, EncodingKey, Header};
use permission_gate::config::AuthSettings;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const DOMAIN: &str = "tenant.example.com";
pub const ISSUER: &str = "https://tenant.example.com/";
pub const AUDIENCE: &str = "students-api";
pub const KID: &str = "test-key-1";
pub const EC_KID: &str = "test-ec-key-1";
pub const JWKS_PATH: &str = "/.well-known/jwks.json";

/// Key whose public half is served in the JWKS.
pub const PRIVATE_KEY_PEM: &str = include_str!("../fixtures/rsa_private.pem");
/// Key the provider never published.
pub const ROGUE_KEY_PEM: &str = include_str!("../fixtures/rsa_rogue_private.pem");

/// P-256 key published under `EC_KID` by `mixed_jwks_body`.
pub const EC_PRIVATE_KEY_PEM: &str = include_str!("../fixtures/ec_private.pem");

const MODULUS: &str = "0y7rYHZgEbpj9mo9uShbpzp_HUOE7_q9QPXUArgMsIEEftUnLh-o6h9xBPhTr6t5OGqavGtErg18cg4WuKn8P3n_pFl86tbRktj9yIEuEvE67s_Wo62M6W-5VWWKMDF4KbcJj8o-2JnND1zEU4H5aFG6Cj5xRWXBIZt_edqyBzxpWDRQXv5eK8BTiwV8T6de7Yw0D3z50nC6s8q-Szt1mZKk-HDUczn7BmAEU3RLl2G40xNZYmoYF0W97-y3lq1jwlcLDO04RaZgYgMGgsnL1EFwoLT0lsLnDNAO01wrwXRe0p0sdPUWY0m-s5H1bCX_T_BCoRnSCOH9KAvK1OTu6Q";
const EXPONENT: &str = "AQAB";
const EC_X: &str = "npTReziZoYPbFIKsLGAY6fgHQTokDCYs2VVtIlCDoB8";
const EC_Y: &str = "Or5B-pgglAUWKtwjj_AmhnDGKaBZdiYT60qpPlY0xKg";

/// A JWKS publishing the test key under each of `kids`.
pub fn jwks_body(kids: &[&str]) -> Value {
    let keys: Vec<Value> = kids
        .iter()
        .map(|kid| {
            json!({
                "kty": "RSA",
                "kid": kid,
                "use": "sig",
                "alg": "RS256",
                "n": MODULUS,
                "e": EXPONENT,
            })
        })
        .collect();
    json!({ "keys": keys })
}

/// A JWKS publishing the RSA key under `KID` and the P-256 key under `EC_KID`.
pub fn mixed_jwks_body() -> Value {
    let mut body = jwks_body(&[KID]);
    body["keys"]
        .as_array_mut()
        .expect("keys array")
        .push(json!({
            "kty": "EC",
            "crv": "P-256",
            "kid": EC_KID,
            "use": "sig",
            "alg": "ES256",
            "x": EC_X,
            "y": EC_Y,
        }));
    body
}

/// Claims that pass verification, carrying `permissions`.
pub fn valid_claims(permissions: &[&str]) -> Value {
    let now = get_current_timestamp();
    json!({
        "iss": ISSUER,
        "sub": "auth0|5f7c8ec7c33c6c004bbafe82",
        "aud": AUDIENCE,
        "iat": now,
        "exp": now + 3600,
        "azp": "spa-client",
        "scope": "openid profile",
        "permissions": permissions,
    })
}

pub fn sign(claims: &Value, kid: Option<&str>, algorithm: Algorithm, pem: &str) -> String {
    let mut header = Header::new(algorithm);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("fixture key");
    encode(&header, claims, &key).expect("token")
}

/// ES256 token signed with the published P-256 key under `EC_KID`.
pub fn ec_token(claims: &Value) -> String {
    let mut header = Header::new(Algorithm::ES256);
    header.kid = Some(EC_KID.to_string());
    let key = EncodingKey::from_ec_pem(EC_PRIVATE_KEY_PEM.as_bytes()).expect("fixture key");
    encode(&header, claims, &key).expect("token")
}

/// RS256 token signed with the published key under `KID`.
pub fn token(claims: &Value) -> String {
    sign(claims, Some(KID), Algorithm::RS256, PRIVATE_KEY_PEM)
}

/// Identity provider serving `body` at the well-known path.
pub async fn identity_provider(body: Value, expected_fetches: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected_fetches)
        .mount(&server)
        .await;
    server
}

/// Settings pointing at `server` for keys while keeping the production issuer.
pub fn settings_for(server: &MockServer) -> AuthSettings {
    let mut settings = AuthSettings::new(DOMAIN, AUDIENCE);
    settings.jwks_url = Some(
        format!("{}{}", server.uri(), JWKS_PATH)
            .parse()
            .expect("mock url"),
    );
    settings.fetch_timeout = Duration::from_secs(2);
    settings
}
