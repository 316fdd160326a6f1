use super::{is_unique_violation, AccountStore, StoreError, CREATE_USERS_TABLE};
use crate::accounts::Account;
use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Connection, Row,
};
use std::str::FromStr;
use tracing::{info_span, Instrument};

/// `users` table in a `SQLite` database, on disk or in memory.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to `dsn` and create the `users` table if absent.
    ///
    /// `sqlite::memory:` keeps a single connection open for the life of the
    /// pool, since the database disappears with its last connection.
    ///
    /// # Errors
    /// Returns an error if the DSN is invalid or the database cannot be opened.
    pub async fn connect(dsn: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(dsn)?.create_if_missing(true);

        let pool = if is_in_memory(dsn) {
            SqlitePoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        sqlx::query(CREATE_USERS_TABLE).execute(&pool).await?;

        Ok(Self { pool })
    }
}

fn is_in_memory(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.contains("mode=memory")
}

#[async_trait]
impl AccountStore for SqliteStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let query = "SELECT email, password FROM users WHERE email = ?";
        let span = info_span!(
            "db.query",
            db.system = "sqlite",
            db.operation = "SELECT",
            db.statement = query
        );

        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        Ok(row.map(|row| Account::new(row.get("email"), row.get("password"))))
    }

    async fn insert(&self, account: Account) -> Result<(), StoreError> {
        let query = "INSERT INTO users (email, password) VALUES (?, ?)";
        let span = info_span!(
            "db.query",
            db.system = "sqlite",
            db.operation = "INSERT",
            db.statement = query
        );

        match sqlx::query(query)
            .bind(&account.email)
            .bind(&account.password_hash)
            .execute(&self.pool)
            .instrument(span)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(StoreError::Duplicate(account.email)),
            Err(e) => Err(e.into()),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        conn.ping().await?;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "sqlite"
    }
}
