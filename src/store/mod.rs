//! Account persistence.
//!
//! Every backend implements [`AccountStore`] and enforces email uniqueness
//! inside `insert` itself, so callers never rely on a lookup followed by a
//! write to keep duplicates out.

mod file;
mod postgres;
mod sqlite;

pub use self::file::FileStore;
pub use self::postgres::PgStore;
pub use self::sqlite::SqliteStore;

use crate::accounts::Account;
use async_trait::async_trait;
use std::{fmt, path::PathBuf, sync::Arc};
use thiserror::Error;
use tracing::info;

pub const DEFAULT_USERS_FILE: &str = "users.json";

const CREATE_USERS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS users (
        email TEXT PRIMARY KEY,
        password TEXT NOT NULL
    )";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("account already exists: {0}")]
    Duplicate(String),
    #[error("unsupported DSN scheme: {0}")]
    UnsupportedDsn(String),
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid store document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Keyed access to accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up an account by exact email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// Add an account, failing with `StoreError::Duplicate` if the email is
    /// already present. Nothing is written on failure.
    async fn insert(&self, account: Account) -> Result<(), StoreError>;

    /// Check that the backing storage is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short backend name for logs and health output.
    fn kind(&self) -> &'static str;
}

/// Which store to open, derived from `--dsn` and `--users-file`.
#[derive(Clone, PartialEq, Eq)]
pub enum StoreConfig {
    File(PathBuf),
    Sqlite(String),
    Postgres(String),
}

impl StoreConfig {
    /// A DSN wins over the users file.
    ///
    /// # Errors
    /// Returns `StoreError::UnsupportedDsn` if the DSN scheme is not `sqlite:`,
    /// `postgres://` or `postgresql://`.
    pub fn parse(dsn: Option<&str>, users_file: PathBuf) -> Result<Self, StoreError> {
        let Some(dsn) = dsn else {
            return Ok(Self::File(users_file));
        };

        if dsn.starts_with("sqlite:") {
            Ok(Self::Sqlite(dsn.to_string()))
        } else if dsn.starts_with("postgres://") || dsn.starts_with("postgresql://") {
            Ok(Self::Postgres(dsn.to_string()))
        } else {
            let scheme = dsn.split(':').next().unwrap_or_default();
            Err(StoreError::UnsupportedDsn(scheme.to_string()))
        }
    }

    /// Open the configured store, creating the users table or file location as
    /// needed.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the database is unreachable.
    pub async fn open(&self) -> Result<Arc<dyn AccountStore>, StoreError> {
        let store: Arc<dyn AccountStore> = match self {
            Self::File(path) => Arc::new(FileStore::open(path.clone()).await?),
            Self::Sqlite(dsn) => Arc::new(SqliteStore::connect(dsn).await?),
            Self::Postgres(dsn) => Arc::new(PgStore::connect(dsn).await?),
        };

        info!("Opened {} store", store.kind());

        Ok(store)
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Sqlite(dsn) => f.debug_tuple("Sqlite").field(dsn).finish(),
            // may carry credentials
            Self::Postgres(_) => f.debug_tuple("Postgres").field(&"***").finish(),
        }
    }
}

/// True when the database rejected a row for violating a unique constraint.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
