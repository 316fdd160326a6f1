use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("invalid input")]
    InvalidInput,
    #[error("email already exists")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("invalid bcrypt cost: {0}")]
    InvalidCost(u32),
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("failed to read account: {0}")]
    Lookup(#[source] StoreError),
    #[error("failed to save account: {0}")]
    Save(#[source] StoreError),
}
