use crate::error::{ProfileError, Result};
use crate::fingerprint::AccessibilityFingerprint;
use crate::memory::MemoryRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

pub const PROFILE_SCHEMA_VERSION: u32 = 1;

/// Storage backend for fingerprints and their append-only record history.
#[async_trait]
pub trait FingerprintStore: Send + Sync {
    /// Load the stored base fingerprint, `None` for an unknown user.
    async fn load(&self, user_id: &str) -> Result<Option<AccessibilityFingerprint>>;

    /// Persist the base fingerprint.
    async fn save(&self, user_id: &str, fingerprint: &AccessibilityFingerprint) -> Result<()>;

    /// Append one record to the user's history. Records are never rewritten.
    async fn append(&self, record: &MemoryRecord) -> Result<()>;

    /// Full record history for a user, oldest first.
    async fn history(&self, user_id: &str) -> Result<Vec<MemoryRecord>>;
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    fingerprints: RwLock<HashMap<String, AccessibilityFingerprint>>,
    records: RwLock<HashMap<String, Vec<MemoryRecord>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FingerprintStore for MemoryStore {
    async fn load(&self, user_id: &str) -> Result<Option<AccessibilityFingerprint>> {
        Ok(self.fingerprints.read().await.get(user_id).cloned())
    }

    async fn save(&self, user_id: &str, fingerprint: &AccessibilityFingerprint) -> Result<()> {
        self.fingerprints
            .write()
            .await
            .insert(user_id.to_string(), fingerprint.clone());
        Ok(())
    }

    async fn append(&self, record: &MemoryRecord) -> Result<()> {
        self.records
            .write()
            .await
            .entry(record.user_id.clone())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    async fn history(&self, user_id: &str) -> Result<Vec<MemoryRecord>> {
        Ok(self
            .records
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Serialize, Deserialize)]
struct PersistedProfile {
    schema_version: u32,
    fingerprint: AccessibilityFingerprint,
}

#[derive(Serialize, Deserialize)]
struct PersistedHistory {
    schema_version: u32,
    records: Vec<MemoryRecord>,
}

/// File-backed store: one JSON document per user for the fingerprint and one
/// for the record log, written atomically via tmp + rename.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    fn profile_path(&self, user_id: &str) -> PathBuf {
        self.base_dir
            .join(format!("{}.json", safe_component(user_id)))
    }

    fn history_path(&self, user_id: &str) -> PathBuf {
        self.base_dir
            .join(format!("{}.log.json", safe_component(user_id)))
    }

    async fn write_atomic(&self, path: &Path, bytes: Vec<u8>) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    async fn read_history(&self, user_id: &str) -> Result<Vec<MemoryRecord>> {
        let path = self.history_path(user_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let persisted: PersistedHistory = serde_json::from_slice(&bytes)?;
        if persisted.schema_version != PROFILE_SCHEMA_VERSION {
            return Err(ProfileError::UnsupportedSchema {
                found: persisted.schema_version,
                expected: PROFILE_SCHEMA_VERSION,
            });
        }
        Ok(persisted.records)
    }
}

#[async_trait]
impl FingerprintStore for FileStore {
    async fn load(&self, user_id: &str) -> Result<Option<AccessibilityFingerprint>> {
        let path = self.profile_path(user_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let persisted: PersistedProfile = serde_json::from_slice(&bytes)?;
        if persisted.schema_version != PROFILE_SCHEMA_VERSION {
            return Err(ProfileError::UnsupportedSchema {
                found: persisted.schema_version,
                expected: PROFILE_SCHEMA_VERSION,
            });
        }
        Ok(Some(persisted.fingerprint))
    }

    async fn save(&self, user_id: &str, fingerprint: &AccessibilityFingerprint) -> Result<()> {
        let persisted = PersistedProfile {
            schema_version: PROFILE_SCHEMA_VERSION,
            fingerprint: fingerprint.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&persisted)?;
        self.write_atomic(&self.profile_path(user_id), bytes).await
    }

    async fn append(&self, record: &MemoryRecord) -> Result<()> {
        let mut records = self.read_history(&record.user_id).await?;
        records.push(record.clone());
        let persisted = PersistedHistory {
            schema_version: PROFILE_SCHEMA_VERSION,
            records,
        };
        let bytes = serde_json::to_vec_pretty(&persisted)?;
        self.write_atomic(&self.history_path(&record.user_id), bytes)
            .await
    }

    async fn history(&self, user_id: &str) -> Result<Vec<MemoryRecord>> {
        self.read_history(user_id).await
    }
}

fn safe_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.') {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    if out.is_empty() {
        "_".to_string()
    } else {
        out
    }
}
