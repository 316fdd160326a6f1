//! bcrypt hashing and verification.
//!
//! Both operations are CPU bound and run on the blocking pool instead of an
//! executor thread.

use super::AccountError;
use secrecy::{ExposeSecret, SecretString};
use tokio::task;
use tracing::{error, instrument, warn};

pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;
pub const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

/// Costs below this are accepted but logged as weak.
const RECOMMENDED_MIN_COST: u32 = 10;

/// Check that `cost` is a work factor bcrypt accepts.
///
/// # Errors
/// Returns `AccountError::InvalidCost` outside `MIN_BCRYPT_COST..=MAX_BCRYPT_COST`.
pub fn validate_cost(cost: u32) -> Result<u32, AccountError> {
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(AccountError::InvalidCost(cost));
    }

    if cost < RECOMMENDED_MIN_COST {
        warn!("bcrypt cost {cost} is below {RECOMMENDED_MIN_COST}, hashes are cheap to brute force");
    }

    Ok(cost)
}

/// Hash `password` with a fresh salt.
///
/// # Errors
/// Returns `AccountError::Hashing` if bcrypt fails or the blocking task panics.
#[instrument(skip_all)]
pub async fn hash(password: SecretString, cost: u32) -> Result<String, AccountError> {
    task::spawn_blocking(move || bcrypt::hash(password.expose_secret(), cost))
        .await
        .map_err(|e| AccountError::Hashing(e.to_string()))?
        .map_err(|e| AccountError::Hashing(e.to_string()))
}

/// Compare `password` with a stored hash.
///
/// A malformed hash or a failed task counts as a mismatch.
#[instrument(skip_all)]
pub async fn verify(password: SecretString, hash: String) -> bool {
    match task::spawn_blocking(move || bcrypt::verify(password.expose_secret(), &hash)).await {
        Ok(Ok(matches)) => matches,
        Ok(Err(e)) => {
            error!("Error verifying password: {}", e);
            false
        }
        Err(e) => {
            error!("Password verification task failed: {}", e);
            false
        }
    }
}
