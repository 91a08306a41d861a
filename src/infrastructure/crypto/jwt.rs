//! JWT Token handling

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::{AuthPayload, AuthPayloadIssuer, User};
use crate::shared::{DomainError, DomainResult};

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration time in hours
    pub expiration_hours: i64,
    /// Issuer claim
    pub issuer: String,
}

/// JWT TokenClaims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    pub roles: Vec<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub iss: String,
}

impl TokenClaims {
    pub fn for_user(user: &User, config: &JwtConfig) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(config.expiration_hours);

        Self {
            sub: user.id.clone(),
            email: user.email.clone(),
            roles: user.roles.iter().map(|r| r.as_str().to_string()).collect(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
        }
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Create a JWT token for a user
pub fn create_token(user: &User, config: &JwtConfig) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = TokenClaims::for_user(user, config);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify and decode a JWT token
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

/// Issues bearer tokens signed with the configured HMAC secret.
#[derive(Clone)]
pub struct JwtAuthPayloadIssuer {
    config: JwtConfig,
}

impl JwtAuthPayloadIssuer {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Decode a bearer token, rejecting expired ones.
    pub fn verify(&self, token: &str) -> DomainResult<TokenClaims> {
        let claims = verify_token(token, &self.config)
            .map_err(|e| DomainError::Unauthorized(format!("Invalid token: {}", e)))?;
        if claims.is_expired() {
            return Err(DomainError::Unauthorized("Token has expired".into()));
        }
        Ok(claims)
    }
}

impl AuthPayloadIssuer for JwtAuthPayloadIssuer {
    fn issue(&self, user: &User) -> DomainResult<AuthPayload> {
        let token = create_token(user, &self.config)
            .map_err(|e| DomainError::Crypto(format!("Failed to create token: {}", e)))?;

        Ok(AuthPayload {
            token,
            token_type: "Bearer".into(),
            expires_in: self.config.expiration_hours * 3600,
            user: user.clone(),
        })
    }
}
