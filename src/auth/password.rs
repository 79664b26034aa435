use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::thread_rng;

use crate::{
    config::{HashCost, SecurityConfig},
    error::AppError,
};

/// Argon2id digester with a fixed work factor.
///
/// Verification reads the parameters embedded in each digest, so changing
/// the cost only affects digests produced afterwards.
#[derive(Clone)]
pub struct Hasher {
    argon: Argon2<'static>,
}

impl Hasher {
    pub fn with_costs(memory_kib: u32, iterations: u32) -> Result<Self, AppError> {
        let params = Params::new(memory_kib, iterations, Params::DEFAULT_P_COST, None)
            .map_err(|err| AppError::internal(format!("Invalid hashing parameters: {err}")))?;
        Ok(Self {
            argon: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub fn from_config(cfg: &SecurityConfig) -> Result<Self, AppError> {
        let (memory_kib, iterations) = match cfg.hash_cost {
            HashCost::Minimum => (Params::MIN_M_COST, Params::MIN_T_COST),
            HashCost::Standard => (Params::DEFAULT_M_COST, Params::DEFAULT_T_COST),
        };
        Self::with_costs(
            cfg.memory_kib.unwrap_or(memory_kib),
            cfg.iterations.unwrap_or(iterations),
        )
    }

    /// Cheapest parameters argon2 accepts. Only for tests and throwaway data.
    pub fn min_cost() -> Self {
        let params = Params::new(
            Params::MIN_M_COST,
            Params::MIN_T_COST,
            Params::MIN_P_COST,
            None,
        )
        .unwrap_or_default();
        Self {
            argon: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    pub fn digest(&self, plaintext: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut thread_rng());
        let hash = self
            .argon
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|err| AppError::internal(format!("Hashing failed: {err}")))?
            .to_string();
        Ok(hash)
    }

    /// [`Hasher::digest`] on the blocking pool, for use from async code.
    pub async fn digest_blocking(&self, plaintext: String) -> Result<String, AppError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.digest(&plaintext))
            .await
            .map_err(|err| AppError::internal(format!("Hashing task failed: {err}")))?
    }
}

/// Checks `plaintext` against a stored digest. A digest that cannot be
/// parsed never matches.
pub fn verify(plaintext: &str, digest: &str) -> bool {
    let parsed = match PasswordHash::new(digest) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!(error = %err, "stored digest is malformed");
            return false;
        }
    };

    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

/// [`verify`] on the blocking pool.
pub async fn verify_blocking(plaintext: String, digest: String) -> bool {
    tokio::task::spawn_blocking(move || verify(&plaintext, &digest))
        .await
        .unwrap_or(false)
}
