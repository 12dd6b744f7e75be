// ============================
// crates/backend-lib/src/storage.rs
// ============================
//! Account store abstraction with in-memory and flat-file implementations.
//!
//! Accounts live in one of two namespaces. `users` is written by signup;
//! `doctors` holds privileged accounts provisioned by an operator. Within a
//! namespace an identifier is unique, and [`AccountStore::insert`] enforces
//! that atomically.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use quickcare_common::Role;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::{fs as tokio_fs, io::AsyncWriteExt};
use uuid::Uuid;

/// Stable account id assigned on insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A stored account record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Case-folded identifier
    pub identifier: String,
    /// scrypt PHC string
    pub credential_hash: String,
    /// Absent on records written before roles existed
    #[serde(default)]
    pub role: Option<Role>,
    pub created_at: DateTime<Utc>,
}

/// Account collections, searched in [`AccountNamespace::LOOKUP_ORDER`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountNamespace {
    Users,
    Doctors,
}

impl AccountNamespace {
    /// Primary namespace first, privileged accounts second
    pub const LOOKUP_ORDER: [AccountNamespace; 2] =
        [AccountNamespace::Users, AccountNamespace::Doctors];

    pub fn as_str(self) -> &'static str {
        match self {
            AccountNamespace::Users => "users",
            AccountNamespace::Doctors => "doctors",
        }
    }
}

/// Errors reported by an account store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("identifier already registered")]
    Duplicate,

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt account record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Trait for account storage backends
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up an account by its case-folded identifier
    async fn find_by_identifier(
        &self,
        namespace: AccountNamespace,
        identifier: &str,
    ) -> Result<Option<Account>, StoreError>;

    /// Insert a new account, failing with [`StoreError::Duplicate`] if the
    /// identifier is already taken in `namespace`
    async fn insert(
        &self,
        namespace: AccountNamespace,
        account: Account,
    ) -> Result<AccountId, StoreError>;

    /// Delete the account with `id` under `identifier`. Returns whether a
    /// record was removed; a record with a different id is left alone.
    async fn remove(
        &self,
        namespace: AccountNamespace,
        identifier: &str,
        id: AccountId,
    ) -> Result<bool, StoreError>;
}

/// Process-local store, used by tests and the `memory` backend
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountStore {
    accounts: std::sync::Arc<DashMap<(AccountNamespace, String), Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_identifier(
        &self,
        namespace: AccountNamespace,
        identifier: &str,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .get(&(namespace, identifier.to_string()))
            .map(|entry| entry.value().clone()))
    }

    async fn insert(
        &self,
        namespace: AccountNamespace,
        account: Account,
    ) -> Result<AccountId, StoreError> {
        match self.accounts.entry((namespace, account.identifier.clone())) {
            Entry::Occupied(_) => Err(StoreError::Duplicate),
            Entry::Vacant(slot) => {
                let id = account.id;
                slot.insert(account);
                Ok(id)
            },
        }
    }

    async fn remove(
        &self,
        namespace: AccountNamespace,
        identifier: &str,
        id: AccountId,
    ) -> Result<bool, StoreError> {
        Ok(self
            .accounts
            .remove_if(&(namespace, identifier.to_string()), |_, account| account.id == id)
            .is_some())
    }
}

/// Flat-file implementation of the AccountStore trait
///
/// Layout: `<root>/<namespace>/<identifier>.json`. Identifiers reaching this
/// store have been validated, so they are safe file names.
#[derive(Debug, Clone)]
pub struct FlatFileAccountStore {
    root: PathBuf,
}

impl FlatFileAccountStore {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        for namespace in AccountNamespace::LOOKUP_ORDER {
            std::fs::create_dir_all(root.join(namespace.as_str()))?;
        }
        Ok(Self { root })
    }

    fn record_path(&self, namespace: AccountNamespace, identifier: &str) -> PathBuf {
        self.root
            .join(namespace.as_str())
            .join(format!("{identifier}.json"))
    }
}

#[async_trait]
impl AccountStore for FlatFileAccountStore {
    async fn find_by_identifier(
        &self,
        namespace: AccountNamespace,
        identifier: &str,
    ) -> Result<Option<Account>, StoreError> {
        let path = self.record_path(namespace, identifier);

        let content = match tokio_fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let account: Account = serde_json::from_str(&content)?;
        Ok(Some(account))
    }

    /// The record is written to a scratch file and hard-linked into place.
    /// Linking fails if the target exists, so the filesystem arbitrates
    /// concurrent signups and readers never see a partial record.
    async fn insert(
        &self,
        namespace: AccountNamespace,
        account: Account,
    ) -> Result<AccountId, StoreError> {
        let path = self.record_path(namespace, &account.identifier);
        let scratch = self
            .root
            .join(namespace.as_str())
            .join(format!(".tmp-{}", Uuid::new_v4()));
        let json = serde_json::to_string_pretty(&account)?;

        write_record(&scratch, json.as_bytes()).await?;
        let linked = tokio_fs::hard_link(&scratch, &path).await;
        let _ = tokio_fs::remove_file(&scratch).await;

        match linked {
            Ok(()) => Ok(account.id),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(StoreError::Duplicate),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(
        &self,
        namespace: AccountNamespace,
        identifier: &str,
        id: AccountId,
    ) -> Result<bool, StoreError> {
        match self.find_by_identifier(namespace, identifier).await? {
            Some(account) if account.id == id => {},
            _ => return Ok(false),
        }

        match tokio_fs::remove_file(self.record_path(namespace, identifier)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

async fn write_record(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio_fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.write_all(b"\n").await?;
    file.sync_all().await
}
