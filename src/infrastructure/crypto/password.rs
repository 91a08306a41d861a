//! Password hashing utilities

use bcrypt::{hash, verify};

use crate::shared::InfraError;

/// Lowest work factor bcrypt accepts. Keeps hashing fast in tests.
#[cfg(test)]
pub(crate) const TEST_BCRYPT_COST: u32 = 4;

/// bcrypt hasher with a configurable work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a password using bcrypt
    pub fn hash(&self, password: &str) -> Result<String, InfraError> {
        hash(password, self.cost).map_err(|e| InfraError::Crypto(e.to_string()))
    }

    /// Verify a password against a hash. A malformed hash counts as a mismatch.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        verify(password, hash).unwrap_or(false)
    }
}
