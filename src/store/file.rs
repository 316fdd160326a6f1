//! JSON file store.
//!
//! The whole account list is kept in memory behind an `RwLock` and rewritten to
//! disk on every insert. An insert runs on its own task holding the write lock
//! across the duplicate check, the file write and the append, so it finishes
//! even if the caller is dropped. The in-memory list only grows once the new
//! document is on disk.

use super::{AccountStore, StoreError};
use crate::accounts::Account;
use async_trait::async_trait;
use std::{
    collections::HashSet,
    io::ErrorKind,
    iter,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{fs, sync::RwLock};
use tracing::{debug, error, instrument, warn, Instrument, Span};

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    accounts: Arc<RwLock<Vec<Account>>>,
}

impl FileStore {
    /// Load accounts from `path`. A missing or blank file is an empty store.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let accounts = match fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            // `null` is what an empty list was saved as by older writers
            Ok(bytes) => serde_json::from_slice::<Option<Vec<Account>>>(&bytes)?.unwrap_or_default(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} not found, starting empty", path.display());
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        if has_duplicates(&accounts) {
            warn!(
                "{} holds duplicate emails, logins use the first match",
                path.display()
            );
        }

        debug!("Loaded {} accounts from {}", accounts.len(), path.display());

        Ok(Self {
            path,
            accounts: Arc::new(RwLock::new(accounts)),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write `accounts` to a sibling temp file, then rename it over `path`. The
/// temp file is removed if either step fails.
async fn persist<'a>(
    path: &Path,
    accounts: impl Iterator<Item = &'a Account>,
) -> Result<(), StoreError> {
    let accounts: Vec<&Account> = accounts.collect();
    let mut document = serde_json::to_vec_pretty(&accounts)?;
    document.push(b'\n');

    let tmp = tmp_path(path);

    let written = match fs::write(&tmp, &document).await {
        Ok(()) => fs::rename(&tmp, path).await,
        Err(e) => Err(e),
    };

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn has_duplicates(accounts: &[Account]) -> bool {
    let mut seen = HashSet::with_capacity(accounts.len());
    accounts.iter().any(|a| !seen.insert(a.email.as_str()))
}

#[async_trait]
impl AccountStore for FileStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.read().await;

        Ok(accounts.iter().find(|a| a.email == email).cloned())
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    async fn insert(&self, account: Account) -> Result<(), StoreError> {
        let accounts = Arc::clone(&self.accounts);
        let path = self.path.clone();

        let task = tokio::spawn(
            async move {
                let mut accounts = accounts.write_owned().await;

                if accounts.iter().any(|a| a.email == account.email) {
                    return Err(StoreError::Duplicate(account.email));
                }

                if let Err(e) = persist(&path, accounts.iter().chain(iter::once(&account))).await {
                    error!("Error saving users file: {}", e);
                    return Err(e);
                }

                accounts.push(account);

                Ok(())
            }
            .instrument(Span::current()),
        );

        task.await
            .map_err(|e| StoreError::Io(std::io::Error::other(e.to_string())))?
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let metadata = fs::metadata(dir).await?;
        if !metadata.is_dir() {
            return Err(StoreError::Io(std::io::Error::new(
                ErrorKind::NotFound,
                format!("{} is not a directory", dir.display()),
            )));
        }

        Ok(())
    }

    fn kind(&self) -> &'static str {
        "file"
    }
}
