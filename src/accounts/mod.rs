//! Account records, credential pairs and the service that registers and
//! authenticates them.

mod error;
pub mod password;
mod service;

pub use self::error::AccountError;
pub use self::service::AccountService;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// A stored account. The hash is serialized under `password` to keep the
/// on-disk document format.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String,
}

impl Account {
    #[must_use]
    pub fn new(email: String, password_hash: String) -> Self {
        Self {
            email,
            password_hash,
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("email", &self.email)
            .field("password_hash", &"***")
            .finish()
    }
}

/// Request body shared by `/signup` and `/login`.
#[derive(ToSchema, Deserialize, Debug)]
pub struct Credentials {
    #[schema(example = "a@b.com")]
    pub email: String,
    #[schema(value_type = String, format = Password)]
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Both fields must be non-empty.
    ///
    /// # Errors
    /// Returns `AccountError::InvalidInput` if either field is empty.
    pub fn validate(&self) -> Result<(), AccountError> {
        if self.email.is_empty() || self.password.expose_secret().is_empty() {
            return Err(AccountError::InvalidInput);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_require_both_fields() {
        assert!(Credentials::new("a@b.com", "secret1").validate().is_ok());
        assert!(matches!(
            Credentials::new("", "secret1").validate(),
            Err(AccountError::InvalidInput)
        ));
        assert!(matches!(
            Credentials::new("a@b.com", "").validate(),
            Err(AccountError::InvalidInput)
        ));
    }

    #[test]
    fn credentials_reject_missing_password() {
        let parsed = serde_json::from_str::<Credentials>(r#"{"email": "a@b.com"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn credentials_debug_hides_password() {
        let credentials = Credentials::new("a@b.com", "secret1");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("a@b.com"));
        assert!(!debug.contains("secret1"));
    }

    #[test]
    fn account_serializes_hash_as_password() -> Result<(), serde_json::Error> {
        let account = Account::new("a@b.com".to_string(), "$2b$04$hash".to_string());
        let value = serde_json::to_value(&account)?;
        assert_eq!(value["email"], "a@b.com");
        assert_eq!(value["password"], "$2b$04$hash");
        assert!(!format!("{account:?}").contains("$2b$04$hash"));
        Ok(())
    }
}
