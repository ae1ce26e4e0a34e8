//! OAuth2 access tokens for the admin REST surfaces.
//!
//! Admin calls against the document store and the identity provider carry a
//! short-lived access token obtained through the JWT-bearer grant: sign an
//! RS256 assertion with the service-account key, exchange it at the token
//! endpoint, and cache the result until shortly before expiry.

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::credentials::ServiceAccount;

/// OAuth2 scope for document-database access.
pub const SCOPE_DATASTORE: &str = "https://www.googleapis.com/auth/datastore";

/// OAuth2 scope for identity-provider admin access.
pub const SCOPE_IDENTITY: &str = "https://www.googleapis.com/auth/identitytoolkit";

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Assertion lifetime in seconds.
const ASSERTION_TTL: i64 = 3600;

/// Refresh the cached token this many seconds before it expires.
const EXPIRY_MARGIN: i64 = 60;

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: i64,
}

/// Cached OAuth2 token source for a service account.
///
/// One instance is shared by every client that talks to the hosted services;
/// concurrent callers read the cached token and only one refresh runs when
/// it lapses.
pub struct TokenSource {
    http: reqwest::Client,
    account: ServiceAccount,
    signing_key: EncodingKey,
    scope: String,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenSource {
    /// Build a token source for the given scopes.
    ///
    /// Fails when the credential's private key is not valid RSA PEM.
    pub fn new(
        http: reqwest::Client,
        account: ServiceAccount,
        scopes: &[&str],
    ) -> Result<Self, TokenError> {
        let signing_key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())?;
        Ok(Self {
            http,
            signing_key,
            scope: scopes.join(" "),
            account,
            cached: RwLock::new(None),
        })
    }

    /// Current access token, refreshing when absent or near expiry.
    pub async fn token(&self) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();

        if let Some(cached) = self.cached.read().await.as_ref() {
            if cached.expires_at - EXPIRY_MARGIN > now {
                return Ok(cached.value.clone());
            }
        }

        let mut slot = self.cached.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(cached) = slot.as_ref() {
            if cached.expires_at - EXPIRY_MARGIN > now {
                return Ok(cached.value.clone());
            }
        }

        let fresh = self.fetch(now).await?;
        let value = fresh.value.clone();
        *slot = Some(fresh);
        Ok(value)
    }

    async fn fetch(&self, now: i64) -> Result<CachedToken, TokenError> {
        let claims = AssertionClaims {
            iss: &self.account.client_email,
            scope: &self.scope,
            aud: &self.account.token_uri,
            iat: now,
            exp: now + ASSERTION_TTL,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)?;

        let response = self
            .http
            .post(&self.account.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TokenError::Exchange {
                status: status.as_u16(),
                message,
            });
        }

        let body: TokenResponse = response.json().await?;
        tracing::debug!(expires_in = body.expires_in, "Obtained access token");

        Ok(CachedToken {
            value: body.access_token,
            expires_at: now + body.expires_in,
        })
    }
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSource")
            .field("account", &self.account)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Token acquisition errors.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The assertion could not be signed.
    #[error("failed to sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// The token endpoint was unreachable.
    #[error("token endpoint request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The token endpoint rejected the assertion.
    #[error("token endpoint rejected the assertion: status {status}: {message}")]
    Exchange { status: u16, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account_with_key(private_key: &str) -> ServiceAccount {
        ServiceAccount::from_json(&format!(
            r#"{{
                "project_id": "feedline-test",
                "client_email": "svc@feedline-test.iam.gserviceaccount.com",
                "private_key": {},
                "webApiKey": "AIzaTestKey"
            }}"#,
            serde_json::to_string(private_key).unwrap()
        ))
        .unwrap()
    }

    #[test]
    fn test_invalid_pem_is_rejected() {
        let account = account_with_key("not a pem key");
        let result = TokenSource::new(reqwest::Client::new(), account, &[SCOPE_DATASTORE]);
        assert!(matches!(result, Err(TokenError::Signing(_))));
    }

    #[test]
    fn test_assertion_claims_serialize() {
        let claims = AssertionClaims {
            iss: "svc@example.com",
            scope: "scope-a scope-b",
            aud: "https://oauth2.googleapis.com/token",
            iat: 100,
            exp: 3700,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["iss"], "svc@example.com");
        assert_eq!(json["scope"], "scope-a scope-b");
        assert_eq!(json["exp"], 3700);
    }
}
