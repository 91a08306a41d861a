//! Credential primitives: bcrypt password hashing and JWT issuance.

pub mod jwt;
pub mod password;

pub use jwt::{create_token, verify_token, JwtAuthPayloadIssuer, JwtConfig, TokenClaims};
pub use password::PasswordHasher;

#[cfg(test)]
pub(crate) use password::TEST_BCRYPT_COST;
