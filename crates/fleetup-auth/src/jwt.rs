//! JWT (JSON Web Token) handling
//!
//! Two token types are issued by the API: `session` tokens identifying a
//! logged-in user, and `impersonation` tokens naming the organization a
//! super admin is currently acting in. Both are HS256-signed with the
//! server secret and carried in HTTP-only cookies (or, for session
//! tokens, an `Authorization: Bearer` header).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token type claim for user sessions.
pub const TOKEN_TYPE_SESSION: &str = "session";
/// Token type claim for super-admin impersonation state.
pub const TOKEN_TYPE_IMPERSONATION: &str = "impersonation";

/// Claims carried by Fleetup tokens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JwtClaims {
    /// Subject (user UUID)
    pub sub: String,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Token type (`session` or `impersonation`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Custom: account email (session tokens)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Custom: impersonated organization slug (impersonation tokens)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_slug: Option<String>,
    /// Custom: impersonated organization UUID (impersonation tokens)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
}

impl JwtClaims {
    pub fn new(subject: String, issuer: String, audience: String, validity: Duration) -> Self {
        let now = Utc::now();
        let exp = now + validity;

        Self {
            sub: subject,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: issuer,
            aud: audience,
            token_type: None,
            email: None,
            org_slug: None,
            org_id: None,
        }
    }

    pub fn with_token_type(mut self, token_type: &str) -> Self {
        self.token_type = Some(token_type.to_string());
        self
    }

    pub fn with_email(mut self, email: String) -> Self {
        self.email = Some(email);
        self
    }

    /// Name the organization an impersonation token is scoped to.
    ///
    /// Both the slug (matched against the request path by the tenant
    /// gate) and the id (used to attribute writes) are embedded, so the
    /// signed token is the single source of impersonation state.
    pub fn with_impersonated_org(mut self, slug: String, id: String) -> Self {
        self.org_slug = Some(slug);
        self.org_id = Some(id);
        self
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Seconds until this token expires (negative once expired).
    pub fn remaining_secs(&self) -> i64 {
        self.exp - Utc::now().timestamp()
    }

    /// Total validity window the token was issued with, in seconds.
    pub fn lifetime_secs(&self) -> i64 {
        self.exp - self.iat
    }
}

/// JWT errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT encoding error: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,
}

/// JWT validator
///
/// HS256 only: the API signs and verifies its own tokens with a shared
/// server secret. Signature and expiration are validated; issuer and
/// audience are informational.
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.validate_nbf = false;

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn validate(&self, token: &str) -> Result<JwtClaims, JwtError> {
        let token_data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation)?;

        if token_data.claims.is_expired() {
            return Err(JwtError::TokenExpired);
        }

        Ok(token_data.claims)
    }

    /// Encode a token with the shared HS256 secret.
    pub fn encode(secret: &[u8], claims: &JwtClaims) -> Result<String, JwtError> {
        let header = Header::new(Algorithm::HS256);
        let encoding_key = EncodingKey::from_secret(secret);

        Ok(encode(&header, claims, &encoding_key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &[u8] = b"test_secret_key_1234567890";

    #[test]
    fn test_session_token_round_trip() {
        let claims = JwtClaims::new(
            "7c0e1c5e-0000-4000-8000-000000000001".to_string(),
            "fleetup-api".to_string(),
            "fleetup-web".to_string(),
            Duration::hours(24),
        )
        .with_token_type(TOKEN_TYPE_SESSION)
        .with_email("alice@example.com".to_string());

        let token = JwtValidator::encode(TEST_SECRET, &claims).unwrap();
        let decoded = JwtValidator::new(TEST_SECRET).validate(&token).unwrap();

        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.token_type.as_deref(), Some(TOKEN_TYPE_SESSION));
        assert_eq!(decoded.email.as_deref(), Some("alice@example.com"));
        assert_eq!(decoded.org_slug, None);
    }

    #[test]
    fn test_impersonation_token_names_org() {
        let claims = JwtClaims::new(
            "admin-uuid".to_string(),
            "fleetup-api".to_string(),
            "fleetup-web".to_string(),
            Duration::hours(4),
        )
        .with_token_type(TOKEN_TYPE_IMPERSONATION)
        .with_impersonated_org("acme".to_string(), "org-uuid".to_string());

        let token = JwtValidator::encode(TEST_SECRET, &claims).unwrap();
        let decoded = JwtValidator::new(TEST_SECRET).validate(&token).unwrap();

        assert_eq!(decoded.org_slug.as_deref(), Some("acme"));
        assert_eq!(decoded.org_id.as_deref(), Some("org-uuid"));
        assert_eq!(
            decoded.token_type.as_deref(),
            Some(TOKEN_TYPE_IMPERSONATION)
        );
    }

    #[test]
    fn test_expired_token_rejected() {
        let claims = JwtClaims::new(
            "user".to_string(),
            "fleetup-api".to_string(),
            "fleetup-web".to_string(),
            Duration::seconds(-10), // Already expired
        );

        assert!(claims.is_expired());

        let token = JwtValidator::encode(TEST_SECRET, &claims).unwrap();
        assert!(JwtValidator::new(TEST_SECRET).validate(&token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = JwtClaims::new(
            "user".to_string(),
            "fleetup-api".to_string(),
            "fleetup-web".to_string(),
            Duration::hours(1),
        );

        let token = JwtValidator::encode(b"other_secret", &claims).unwrap();
        assert!(JwtValidator::new(TEST_SECRET).validate(&token).is_err());
    }

    #[test]
    fn test_lifetime_accounting() {
        let claims = JwtClaims::new(
            "user".to_string(),
            "fleetup-api".to_string(),
            "fleetup-web".to_string(),
            Duration::hours(24),
        );

        assert_eq!(claims.lifetime_secs(), 24 * 3600);
        assert!(claims.remaining_secs() > 24 * 3600 - 5);
        assert!(claims.remaining_secs() <= 24 * 3600);
    }

    #[test]
    fn test_optional_claims_skipped_when_absent() {
        let claims = JwtClaims::new(
            "user".to_string(),
            "fleetup-api".to_string(),
            "fleetup-web".to_string(),
            Duration::hours(1),
        );

        let json = serde_json::to_string(&claims).unwrap();

        // Older clients must not see empty org claims on session tokens
        assert!(!json.contains("org_slug"));
        assert!(!json.contains("org_id"));
        assert!(!json.contains("email"));
    }
}
