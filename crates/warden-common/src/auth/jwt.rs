//! JWT verification for actor identity and reauthentication proofs
//!
//! Uses the `jsonwebtoken` crate with a shared HS256 secret. Two token
//! types flow through the engine: `access` (the actor's session) and
//! `reauth` (proof of fresh credential verification, consumed once at
//! admission of reauth-gated actions).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_core::{Permissions, Snowflake};

use crate::error::AppError;

/// Token type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Reauth,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (actor ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token type (access or reauth)
    pub token_type: TokenType,
    /// Permission bits as a decimal string (access tokens)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perms: Option<String>,
    /// Unique proof ID (reauth tokens), consumed once at admission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    /// Get the actor ID as a Snowflake
    ///
    /// # Errors
    /// Returns an error if the subject cannot be parsed as a Snowflake
    pub fn actor_id(&self) -> Result<Snowflake, AppError> {
        self.sub
            .parse::<i64>()
            .map(Snowflake::new)
            .map_err(|_| AppError::InvalidToken)
    }

    /// Get the permission set carried by this token
    #[must_use]
    pub fn permissions(&self) -> Permissions {
        self.perms
            .as_deref()
            .and_then(|s| Permissions::parse(s).ok())
            .unwrap_or_default()
    }

    /// Check if the token is expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Check if this is an access token
    #[must_use]
    pub fn is_access_token(&self) -> bool {
        self.token_type == TokenType::Access
    }

    /// Check if this is a reauthentication proof
    #[must_use]
    pub fn is_reauth_proof(&self) -> bool {
        self.token_type == TokenType::Reauth
    }

    /// Check whether the token was issued within the last `window_secs`
    #[must_use]
    pub fn is_fresh(&self, window_secs: i64) -> bool {
        Utc::now().timestamp() - self.iat <= window_secs
    }
}

/// Verifies bearer tokens and reauthentication proofs
#[derive(Clone)]
pub struct IdentityVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    reauth_window_secs: i64,
}

impl IdentityVerifier {
    /// Create a verifier sharing the identity provider's HS256 secret
    #[must_use]
    pub fn new(secret: &str, reauth_window_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            reauth_window_secs,
        }
    }

    /// Decode and validate a JWT token
    ///
    /// # Errors
    /// Returns an error if the token is invalid or expired
    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::default();

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            }
        })?;

        Ok(token_data.claims)
    }

    /// Validate an access token and return the claims
    ///
    /// # Errors
    /// Returns an error if the token is invalid, expired, or not an access token
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.decode_token(token)?;

        if !claims.is_access_token() {
            return Err(AppError::InvalidToken);
        }

        Ok(claims)
    }

    /// Validate a reauthentication proof for the given actor
    ///
    /// The proof must be a reauth-type token for the same actor, issued
    /// within the configured freshness window. Single-use consumption of the
    /// proof's `jti` happens in the cache layer, not here.
    ///
    /// # Errors
    /// Returns `StaleReauthProof` when the proof exists but is too old,
    /// `InvalidToken` for every other mismatch
    pub fn validate_reauth_proof(&self, token: &str, actor_id: Snowflake) -> Result<Claims, AppError> {
        let claims = self.decode_token(token)?;

        if !claims.is_reauth_proof() || claims.actor_id()? != actor_id {
            return Err(AppError::InvalidToken);
        }

        if !claims.is_fresh(self.reauth_window_secs) {
            return Err(AppError::StaleReauthProof);
        }

        Ok(claims)
    }

    /// Mint an access token in the identity provider's format
    ///
    /// Only test fixtures and local tooling call this; production tokens
    /// come from the identity provider itself.
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn issue_access_token(
        &self,
        actor_id: Snowflake,
        permissions: Permissions,
        expiry_secs: i64,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: actor_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expiry_secs)).timestamp(),
            token_type: TokenType::Access,
            perms: Some(permissions.to_string()),
            jti: None,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to encode JWT")))
    }

    /// Mint a reauthentication proof in the identity provider's format
    ///
    /// Only test fixtures and local tooling call this.
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn issue_reauth_proof(&self, actor_id: Snowflake) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: actor_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.reauth_window_secs)).timestamp(),
            token_type: TokenType::Reauth,
            perms: None,
            jti: Some(Uuid::new_v4().to_string()),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to encode JWT")))
    }

    /// The configured reauth freshness window in seconds
    #[must_use]
    pub fn reauth_window_secs(&self) -> i64 {
        self.reauth_window_secs
    }
}

impl std::fmt::Debug for IdentityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityVerifier")
            .field("reauth_window_secs", &self.reauth_window_secs)
            .finish_non_exhaustive()
    }
}
