use super::{password, Account, AccountError, Credentials};
use crate::store::{AccountStore, StoreError};
use secrecy::SecretString;
use std::{fmt, sync::Arc};
use tracing::{debug, info, instrument};

/// Verified in place of a real hash when the email is unknown.
const DUMMY_PASSWORD: &str = "portero-timing-equalizer";

/// Registers and authenticates accounts against an injected store.
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    cost: u32,
    dummy_hash: String,
}

impl AccountService {
    /// Build the service and precompute the dummy hash at `cost`.
    ///
    /// # Errors
    /// Returns an error if `cost` is out of range or hashing fails.
    pub async fn new(store: Arc<dyn AccountStore>, cost: u32) -> Result<Self, AccountError> {
        let cost = password::validate_cost(cost)?;
        let dummy_hash = password::hash(SecretString::from(DUMMY_PASSWORD), cost).await?;

        Ok(Self {
            store,
            cost,
            dummy_hash,
        })
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn AccountStore> {
        &self.store
    }

    /// Create an account for `credentials.email`.
    ///
    /// # Errors
    /// - `InvalidInput` if a field is empty
    /// - `EmailTaken` if the email is already registered, including when a
    ///   concurrent signup inserts it first
    /// - `Hashing`, `Lookup` or `Save` on internal failures
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn register(&self, credentials: Credentials) -> Result<(), AccountError> {
        credentials.validate()?;
        let Credentials { email, password } = credentials;

        let existing = self
            .store
            .find_by_email(&email)
            .await
            .map_err(AccountError::Lookup)?;

        if existing.is_some() {
            debug!("Email already registered");
            return Err(AccountError::EmailTaken);
        }

        let password_hash = password::hash(password, self.cost).await?;

        match self.store.insert(Account::new(email, password_hash)).await {
            Ok(()) => {
                info!("Account created");
                Ok(())
            }
            Err(StoreError::Duplicate(_)) => {
                debug!("Email registered concurrently");
                Err(AccountError::EmailTaken)
            }
            Err(e) => Err(AccountError::Save(e)),
        }
    }

    /// Check `credentials` against the stored hash.
    ///
    /// Unknown emails and wrong passwords both yield `InvalidCredentials`, and
    /// both pay for one bcrypt verification.
    ///
    /// # Errors
    /// - `InvalidInput` if a field is empty
    /// - `InvalidCredentials` if the email is unknown or the password is wrong
    /// - `Lookup` if the store cannot be read
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn authenticate(&self, credentials: Credentials) -> Result<(), AccountError> {
        credentials.validate()?;
        let Credentials { email, password } = credentials;

        let account = self
            .store
            .find_by_email(&email)
            .await
            .map_err(AccountError::Lookup)?;

        let (hash, known) = match account {
            Some(account) => (account.password_hash, true),
            None => (self.dummy_hash.clone(), false),
        };

        let matches = password::verify(password, hash).await;

        if known && matches {
            debug!("Login successful");
            Ok(())
        } else {
            debug!("Unauthorized");
            Err(AccountError::InvalidCredentials)
        }
    }
}

impl fmt::Debug for AccountService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountService")
            .field("store", &self.store.kind())
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}
