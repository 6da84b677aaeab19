//! User and NFT records.
//!
//! Users are keyed by lower-cased fid and hold two lists of contract
//! addresses: collections they created and tokens they bought. NFTs are
//! keyed by contract address.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{MintError, MintResult};

/// A user's created and purchased contract addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Lower-cased user identifier.
    pub fid: String,
    /// Contracts the user created.
    #[serde(default)]
    pub mine: Vec<String>,
    /// Contracts the user bought from.
    #[serde(default)]
    pub bought: Vec<String>,
}

impl UserRecord {
    /// An empty record for `fid`.
    #[must_use]
    pub fn empty(fid: &str) -> Self {
        Self {
            fid: normalize_fid(fid),
            ..Self::default()
        }
    }
}

/// A minted collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftRecord {
    /// Contract address.
    pub ca: String,
    /// Metadata URI.
    pub uri: String,
    /// Display name.
    pub name: String,
}

impl NftRecord {
    fn validate(&self) -> MintResult<()> {
        if self.ca.trim().is_empty() {
            return Err(MintError::MissingField("ca"));
        }
        if self.uri.trim().is_empty() {
            return Err(MintError::MissingField("uri"));
        }
        if self.name.trim().is_empty() {
            return Err(MintError::MissingField("name"));
        }
        Ok(())
    }
}

fn normalize_fid(fid: &str) -> String {
    fid.trim().to_lowercase()
}

/// Persistent storage for user and NFT records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch a user. Unknown users read as empty lists.
    async fn user(&self, fid: &str) -> MintResult<UserRecord>;

    /// Replace both lists of a user, creating it if needed.
    async fn upsert_user(&self, record: UserRecord) -> MintResult<UserRecord>;

    /// List NFTs, optionally filtered by contract address.
    async fn nfts(&self, ca: Option<&str>) -> MintResult<Vec<NftRecord>>;

    /// Store a new NFT. Contract addresses are unique.
    async fn create_nft(&self, record: NftRecord) -> MintResult<NftRecord>;
}

/// Append a created collection to the user's `mine` list.
///
/// # Errors
///
/// Propagates store errors.
pub async fn record_created(
    store: &dyn RecordStore,
    fid: &str,
    ca: &str,
) -> MintResult<UserRecord> {
    let mut user = store.user(fid).await?;
    if !user.mine.iter().any(|c| c == ca) {
        user.mine.push(ca.to_string());
    }
    store.upsert_user(user).await
}

/// Append a purchased collection to the user's `bought` list.
///
/// # Errors
///
/// Propagates store errors.
pub async fn record_purchase(
    store: &dyn RecordStore,
    fid: &str,
    ca: &str,
) -> MintResult<UserRecord> {
    let mut user = store.user(fid).await?;
    user.bought.push(ca.to_string());
    store.upsert_user(user).await
}

/// In-process [`RecordStore`].
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    users: RwLock<HashMap<String, UserRecord>>,
    nfts: RwLock<Vec<NftRecord>>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn user(&self, fid: &str) -> MintResult<UserRecord> {
        let fid = normalize_fid(fid);
        if fid.is_empty() {
            return Err(MintError::MissingField("fid"));
        }
        let users = self.users.read().await;
        Ok(users
            .get(&fid)
            .cloned()
            .unwrap_or_else(|| UserRecord::empty(&fid)))
    }

    async fn upsert_user(&self, mut record: UserRecord) -> MintResult<UserRecord> {
        record.fid = normalize_fid(&record.fid);
        if record.fid.is_empty() {
            return Err(MintError::MissingField("fid"));
        }
        tracing::debug!(
            "Upserting user {} ({} created, {} bought)",
            record.fid,
            record.mine.len(),
            record.bought.len()
        );
        self.users
            .write()
            .await
            .insert(record.fid.clone(), record.clone());
        Ok(record)
    }

    async fn nfts(&self, ca: Option<&str>) -> MintResult<Vec<NftRecord>> {
        let nfts = self.nfts.read().await;
        Ok(nfts
            .iter()
            .filter(|n| ca.is_none() || ca == Some(n.ca.as_str()))
            .cloned()
            .collect())
    }

    async fn create_nft(&self, record: NftRecord) -> MintResult<NftRecord> {
        record.validate()?;
        let mut nfts = self.nfts.write().await;
        if nfts.iter().any(|n| n.ca == record.ca) {
            return Err(MintError::Conflict(record.ca));
        }
        tracing::info!("Created NFT record {} ({})", record.ca, record.name);
        nfts.push(record.clone());
        Ok(record)
    }
}
