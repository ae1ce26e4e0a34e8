//! REST client for the hosted identity provider.
//!
//! Speaks the Identity Toolkit v1 protocol. Admin calls (account creation,
//! lookup, revocation) carry an OAuth2 bearer token from the shared
//! [`TokenSource`]; the custom-token exchange and token verification lookups
//! are keyed by the static web API key instead. Custom tokens are RS256 JWTs
//! signed locally with the service-account key.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use serde_json::{json, Value};

use feedline_core::{ServiceAccount, TokenSource};

use crate::error::{IdentityError, IdentityResult};
use crate::provider::{IdentityProvider, TokenClaims, UserRecord};

const BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Fixed audience the provider requires in custom tokens.
const CUSTOM_TOKEN_AUD: &str =
    "https://identitytoolkit.googleapis.com/google.identity.identitytoolkit.v1.IdentityToolkit";

/// Custom-token lifetime in seconds (the provider caps it at one hour).
const CUSTOM_TOKEN_TTL: i64 = 3600;

#[derive(Debug, Serialize)]
struct CustomTokenClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'a str,
    uid: &'a str,
    iat: i64,
    exp: i64,
}

/// Client for the hosted identity provider.
pub struct GoogleIdentity {
    http: reqwest::Client,
    tokens: Arc<TokenSource>,
    project_id: String,
    client_email: String,
    api_key: String,
    signing_key: EncodingKey,
}

impl GoogleIdentity {
    /// Build a provider client.
    ///
    /// Fails when the credential's private key is not valid RSA PEM.
    pub fn new(
        http: reqwest::Client,
        account: &ServiceAccount,
        tokens: Arc<TokenSource>,
    ) -> Result<Self, IdentityError> {
        let signing_key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())?;
        Ok(Self {
            http,
            tokens,
            project_id: account.project_id.clone(),
            client_email: account.client_email.clone(),
            api_key: account.web_api_key.clone(),
            signing_key,
        })
    }

    fn admin_url(&self, method: &str) -> String {
        format!("{BASE_URL}/projects/{}/{method}", self.project_id)
    }

    fn keyed_url(&self, method: &str) -> String {
        format!("{BASE_URL}/{method}?key={}", self.api_key)
    }

    async fn admin_post(&self, method: &str, body: Value) -> IdentityResult<Value> {
        let bearer = self.tokens.token().await?;
        let response = self
            .http
            .post(self.admin_url(method))
            .bearer_auth(bearer)
            .json(&body)
            .send()
            .await?;
        into_json(response).await
    }

    async fn keyed_post(&self, method: &str, body: Value) -> IdentityResult<Value> {
        let response = self
            .http
            .post(self.keyed_url(method))
            .json(&body)
            .send()
            .await?;
        into_json(response).await
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentity {
    async fn create_user(&self, email: &str, password: &str) -> IdentityResult<UserRecord> {
        let body = json!({"email": email, "password": password});
        let created = self
            .admin_post("accounts", body)
            .await
            .map_err(|e| match e {
                IdentityError::Provider { message, .. }
                    if message.contains("EMAIL_EXISTS") || message.contains("DUPLICATE_EMAIL") =>
                {
                    IdentityError::EmailExists(email.to_string())
                }
                other => other,
            })?;

        let uid = created
            .get("localId")
            .and_then(|v| v.as_str())
            .ok_or_else(|| IdentityError::Decode("account response without localId".to_string()))?;

        tracing::debug!(uid, "Account created");
        Ok(UserRecord {
            uid: uid.to_string(),
            email: email.to_string(),
        })
    }

    async fn user_by_email(&self, email: &str) -> IdentityResult<UserRecord> {
        let body = json!({"email": [email]});
        let found = self.admin_post("accounts:lookup", body).await?;
        first_user(&found).ok_or_else(|| IdentityError::UserNotFound(email.to_string()))
    }

    async fn user_by_uid(&self, uid: &str) -> IdentityResult<UserRecord> {
        let body = json!({"localId": [uid]});
        let found = self.admin_post("accounts:lookup", body).await?;
        first_user(&found).ok_or_else(|| IdentityError::UserNotFound(uid.to_string()))
    }

    async fn mint_custom_token(&self, uid: &str) -> IdentityResult<String> {
        let now = Utc::now().timestamp();
        let claims = CustomTokenClaims {
            iss: &self.client_email,
            sub: &self.client_email,
            aud: CUSTOM_TOKEN_AUD,
            uid,
            iat: now,
            exp: now + CUSTOM_TOKEN_TTL,
        };
        Ok(encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.signing_key,
        )?)
    }

    async fn exchange_custom_token(&self, custom_token: &str) -> IdentityResult<String> {
        let body = json!({"token": custom_token, "returnSecureToken": true});
        let exchanged = self
            .keyed_post("accounts:signInWithCustomToken", body)
            .await?;
        exchanged
            .get("idToken")
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or(IdentityError::MissingSessionToken)
    }

    async fn verify_session_token(&self, token: &str) -> IdentityResult<TokenClaims> {
        // The lookup enforces expiry and revocation on the provider side.
        let body = json!({"idToken": token});
        let found = self
            .keyed_post("accounts:lookup", body)
            .await
            .map_err(|e| match e {
                IdentityError::Provider { message, .. } => IdentityError::InvalidToken(message),
                other => other,
            })?;

        let user = found
            .get("users")
            .and_then(|u| u.as_array())
            .and_then(|u| u.first())
            .ok_or_else(|| IdentityError::InvalidToken("no account for token".to_string()))?;
        let uid = user
            .get("localId")
            .and_then(|v| v.as_str())
            .ok_or_else(|| IdentityError::Decode("lookup response without localId".to_string()))?;

        Ok(TokenClaims {
            uid: uid.to_string(),
            email: user
                .get("email")
                .and_then(|v| v.as_str())
                .map(str::to_string),
        })
    }

    async fn revoke_tokens(&self, uid: &str) -> IdentityResult<()> {
        // Sessions minted before `validSince` stop verifying.
        let body = json!({
            "localId": uid,
            "validSince": Utc::now().timestamp().to_string(),
        });
        self.admin_post("accounts:update", body).await?;
        tracing::debug!(uid, "Sessions revoked");
        Ok(())
    }
}

impl std::fmt::Debug for GoogleIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleIdentity")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .finish_non_exhaustive()
    }
}

async fn into_json(response: reqwest::Response) -> IdentityResult<Value> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let message = match response.json::<Value>().await {
        Ok(body) => body
            .pointer("/error/message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown provider error")
            .to_string(),
        Err(_) => "unknown provider error".to_string(),
    };
    Err(IdentityError::Provider {
        status: status.as_u16(),
        message,
    })
}

/// First account of a lookup response, if any.
fn first_user(response: &Value) -> Option<UserRecord> {
    let user = response.get("users")?.as_array()?.first()?;
    Some(UserRecord {
        uid: user.get("localId")?.as_str()?.to_string(),
        email: user
            .get("email")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
    })
}
