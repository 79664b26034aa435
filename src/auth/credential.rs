use std::fmt;

use super::password::{Hasher, verify};
use crate::error::AppError;

/// Password digest holder composed into user records.
///
/// Only the digest is kept; the plaintext is dropped as soon as it has been
/// hashed.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PasswordCredential {
    digest: Option<String>,
}

impl PasswordCredential {
    pub fn from_digest(digest: impl Into<String>) -> Self {
        Self {
            digest: Some(digest.into()),
        }
    }

    pub fn set_password(&mut self, hasher: &Hasher, plaintext: &str) -> Result<(), AppError> {
        self.digest = Some(hasher.digest(plaintext)?);
        Ok(())
    }

    /// False when no password has been set.
    pub fn verify_password(&self, plaintext: &str) -> bool {
        self.digest
            .as_deref()
            .is_some_and(|digest| verify(plaintext, digest))
    }

    pub fn is_set(&self) -> bool {
        self.digest.is_some()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    pub fn into_digest(self) -> Option<String> {
        self.digest
    }
}

impl fmt::Debug for PasswordCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordCredential")
            .field("is_set", &self.is_set())
            .finish()
    }
}
