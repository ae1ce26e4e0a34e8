//! In-memory identity provider: the test fake and local-development backend.

use std::collections::HashMap;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{IdentityError, IdentityResult};
use crate::provider::{IdentityProvider, TokenClaims, UserRecord};

/// Session-token lifetime in seconds.
const SESSION_TTL: i64 = 3600;

/// Custom tokens are short-lived by design.
const CUSTOM_TTL: i64 = 300;

#[derive(Debug, Clone)]
struct Account {
    email: String,
    #[allow(dead_code)]
    password_hash: String,
    /// Bumped on revocation; live session tokens carry the generation they
    /// were minted under.
    generation: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct CustomClaims {
    uid: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    email: String,
    generation: u64,
    iat: i64,
    exp: i64,
}

/// In-memory [`IdentityProvider`].
///
/// Passwords are stored argon2-hashed, session tokens are HS256 JWTs signed
/// with a per-instance random secret, and revocation bumps a per-account
/// generation counter so verification stays deterministic under test.
pub struct MemoryIdentity {
    accounts: RwLock<HashMap<String, Account>>,
    secret: Vec<u8>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            secret: rand::random::<[u8; 32]>().to_vec(),
        }
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.secret)
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.secret)
    }
}

impl Default for MemoryIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn create_user(&self, email: &str, password: &str) -> IdentityResult<UserRecord> {
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email == email) {
            return Err(IdentityError::EmailExists(email.to_string()));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| IdentityError::Hashing(e.to_string()))?
            .to_string();

        let uid = Uuid::new_v4().simple().to_string();
        accounts.insert(
            uid.clone(),
            Account {
                email: email.to_string(),
                password_hash,
                generation: 0,
            },
        );

        Ok(UserRecord {
            uid,
            email: email.to_string(),
        })
    }

    async fn user_by_email(&self, email: &str) -> IdentityResult<UserRecord> {
        let accounts = self.accounts.read().await;
        accounts
            .iter()
            .find(|(_, account)| account.email == email)
            .map(|(uid, account)| UserRecord {
                uid: uid.clone(),
                email: account.email.clone(),
            })
            .ok_or_else(|| IdentityError::UserNotFound(email.to_string()))
    }

    async fn user_by_uid(&self, uid: &str) -> IdentityResult<UserRecord> {
        let accounts = self.accounts.read().await;
        accounts
            .get(uid)
            .map(|account| UserRecord {
                uid: uid.to_string(),
                email: account.email.clone(),
            })
            .ok_or_else(|| IdentityError::UserNotFound(uid.to_string()))
    }

    async fn mint_custom_token(&self, uid: &str) -> IdentityResult<String> {
        let accounts = self.accounts.read().await;
        if !accounts.contains_key(uid) {
            return Err(IdentityError::UserNotFound(uid.to_string()));
        }

        let now = Utc::now().timestamp();
        let claims = CustomClaims {
            uid: uid.to_string(),
            iat: now,
            exp: now + CUSTOM_TTL,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key())?)
    }

    async fn exchange_custom_token(&self, custom_token: &str) -> IdentityResult<String> {
        let custom = decode::<CustomClaims>(custom_token, &self.decoding_key(), &Validation::default())
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        let accounts = self.accounts.read().await;
        let account = accounts
            .get(&custom.claims.uid)
            .ok_or_else(|| IdentityError::UserNotFound(custom.claims.uid.clone()))?;

        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: custom.claims.uid,
            email: account.email.clone(),
            generation: account.generation,
            iat: now,
            exp: now + SESSION_TTL,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key())?)
    }

    async fn verify_session_token(&self, token: &str) -> IdentityResult<TokenClaims> {
        let session = decode::<SessionClaims>(token, &self.decoding_key(), &Validation::default())
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        let accounts = self.accounts.read().await;
        let account = accounts
            .get(&session.claims.sub)
            .ok_or_else(|| IdentityError::InvalidToken("no account for token".to_string()))?;

        if session.claims.generation != account.generation {
            return Err(IdentityError::InvalidToken("token has been revoked".to_string()));
        }

        Ok(TokenClaims {
            uid: session.claims.sub,
            email: Some(session.claims.email),
        })
    }

    async fn revoke_tokens(&self, uid: &str) -> IdentityResult<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(uid)
            .ok_or_else(|| IdentityError::UserNotFound(uid.to_string()))?;
        account.generation += 1;
        Ok(())
    }
}

impl std::fmt::Debug for MemoryIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryIdentity").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::PasswordHash;
    use argon2::PasswordVerifier;

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let identity = MemoryIdentity::new();
        let record = identity.create_user("a@b.com", "secret1").await.unwrap();

        let accounts = identity.accounts.read().await;
        let stored = &accounts[&record.uid].password_hash;
        assert!(!stored.contains("secret1"));

        let parsed = PasswordHash::new(stored).unwrap();
        assert!(Argon2::default()
            .verify_password(b"secret1", &parsed)
            .is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let identity = MemoryIdentity::new();
        identity.create_user("a@b.com", "secret1").await.unwrap();

        let result = identity.create_user("a@b.com", "other").await;
        assert!(matches!(result, Err(IdentityError::EmailExists(_))));
    }

    #[tokio::test]
    async fn test_lookup_by_email_and_uid() {
        let identity = MemoryIdentity::new();
        let created = identity.create_user("a@b.com", "secret1").await.unwrap();

        let by_email = identity.user_by_email("a@b.com").await.unwrap();
        assert_eq!(by_email, created);

        let by_uid = identity.user_by_uid(&created.uid).await.unwrap();
        assert_eq!(by_uid, created);

        assert!(matches!(
            identity.user_by_email("missing@b.com").await,
            Err(IdentityError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_token_flow_round_trips() {
        let identity = MemoryIdentity::new();
        let record = identity.create_user("a@b.com", "secret1").await.unwrap();

        let custom = identity.mint_custom_token(&record.uid).await.unwrap();
        let session = identity.exchange_custom_token(&custom).await.unwrap();
        let claims = identity.verify_session_token(&session).await.unwrap();

        assert_eq!(claims.uid, record.uid);
        assert_eq!(claims.email.as_deref(), Some("a@b.com"));
    }

    #[tokio::test]
    async fn test_exchange_rejects_garbage() {
        let identity = MemoryIdentity::new();
        let result = identity.exchange_custom_token("not.a.token").await;
        assert!(matches!(result, Err(IdentityError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_tokens_from_another_instance_fail() {
        let issuer = MemoryIdentity::new();
        let verifier = MemoryIdentity::new();
        let record = issuer.create_user("a@b.com", "secret1").await.unwrap();

        let custom = issuer.mint_custom_token(&record.uid).await.unwrap();
        let session = issuer.exchange_custom_token(&custom).await.unwrap();

        let result = verifier.verify_session_token(&session).await;
        assert!(matches!(result, Err(IdentityError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_revocation_invalidates_old_sessions_only() {
        let identity = MemoryIdentity::new();
        let record = identity.create_user("a@b.com", "secret1").await.unwrap();

        let custom = identity.mint_custom_token(&record.uid).await.unwrap();
        let old_session = identity.exchange_custom_token(&custom).await.unwrap();
        identity.verify_session_token(&old_session).await.unwrap();

        identity.revoke_tokens(&record.uid).await.unwrap();
        assert!(matches!(
            identity.verify_session_token(&old_session).await,
            Err(IdentityError::InvalidToken(_))
        ));

        let custom = identity.mint_custom_token(&record.uid).await.unwrap();
        let new_session = identity.exchange_custom_token(&custom).await.unwrap();
        let claims = identity.verify_session_token(&new_session).await.unwrap();
        assert_eq!(claims.uid, record.uid);
    }
}
