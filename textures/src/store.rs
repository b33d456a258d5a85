//! Record store adapter over the single `skins` collection.
//!
//! Lookups are exact matches on the lowercased nickname and return the first
//! matching document. Writes are find-then-create-or-update and replace every
//! mutable field.
use crate::types::{RecordId, TextureFields, TextureRecord};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait TexturesStore: Send + Sync {
    async fn find_by_nickname(&self, nickname: &str) -> Result<Option<TextureRecord>, StoreError>;

    /// Creates the record for `nickname` if there is none, then overwrites all
    /// of its mutable fields. Either the whole write lands or nothing does.
    async fn upsert(&self, nickname: &str, fields: TextureFields) -> Result<(), StoreError>;

    fn is_ready(&self) -> bool {
        true
    }
}

/// Documents of one collection in insertion order.
#[derive(Clone, Debug, Default)]
struct Collection {
    records: Vec<TextureRecord>,
    next_id: RecordId,
}

impl Collection {
    fn from_records(records: Vec<TextureRecord>) -> Self {
        let next_id = records.iter().map(|r| r.id).max().map_or(1, |id| id + 1);
        Collection { records, next_id }
    }

    fn find(&self, nickname: &str) -> Option<&TextureRecord> {
        let key = nickname.to_lowercase();
        self.records.iter().find(|r| r.nickname == key)
    }

    fn upsert(&mut self, nickname: &str, fields: TextureFields) {
        let key = nickname.to_lowercase();
        match self.records.iter_mut().find(|r| r.nickname == key) {
            Some(record) => record.fields = fields,
            None => {
                let id = self.next_id.max(1);
                self.next_id = id + 1;
                self.records.push(TextureRecord::new(id, &key, fields));
            }
        }
    }
}

/// Process-local store, lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    collection: RwLock<Collection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<TextureRecord>) -> Self {
        MemoryStore {
            collection: RwLock::new(Collection::from_records(records)),
        }
    }
}

#[async_trait]
impl TexturesStore for MemoryStore {
    async fn find_by_nickname(&self, nickname: &str) -> Result<Option<TextureRecord>, StoreError> {
        Ok(self.collection.read().find(nickname).cloned())
    }

    async fn upsert(&self, nickname: &str, fields: TextureFields) -> Result<(), StoreError> {
        self.collection.write().upsert(nickname, fields);
        Ok(())
    }
}

/// Keeps the collection as a JSON array in `<base_dir>/<collection>.json`.
///
/// The file is read once on open. Each write serializes the whole collection
/// to a temporary file which is then renamed over the previous one, and the
/// in-memory copy is only swapped after the rename succeeded.
pub struct FilesystemStore {
    base_dir: PathBuf,
    path: PathBuf,
    collection: Mutex<Collection>,
}

impl FilesystemStore {
    pub async fn open(base_dir: &Path, collection: &str) -> Result<Self, StoreError> {
        let path = base_dir.join(format!("{collection}.json"));

        let records: Vec<TextureRecord> = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };

        tracing::info!(
            path = %path.display(),
            records = records.len(),
            "opened textures collection"
        );

        Ok(FilesystemStore {
            base_dir: base_dir.to_path_buf(),
            path,
            collection: Mutex::new(Collection::from_records(records)),
        })
    }

    async fn persist(&self, collection: &Collection) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(&collection.records)?;
        let tmp_path = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp_path, &bytes).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        Ok(())
    }
}

#[async_trait]
impl TexturesStore for FilesystemStore {
    async fn find_by_nickname(&self, nickname: &str) -> Result<Option<TextureRecord>, StoreError> {
        Ok(self.collection.lock().await.find(nickname).cloned())
    }

    async fn upsert(&self, nickname: &str, fields: TextureFields) -> Result<(), StoreError> {
        // Held across the write so concurrent upserts of a new nickname
        // cannot both observe it as absent.
        let mut guard = self.collection.lock().await;

        let mut updated = guard.clone();
        updated.upsert(nickname, fields);
        self.persist(&updated).await?;

        *guard = updated;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.base_dir.is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(skin_id: i64, url: &str) -> TextureFields {
        TextureFields {
            user_id: 42,
            skin_id,
            url: url.into(),
            hash: format!("hash-{skin_id}"),
            is_slim: false,
            is_1_8: true,
        }
    }

    #[tokio::test]
    async fn test_memory_upsert_twice() {
        let store = MemoryStore::new();
        assert_eq!(store.find_by_nickname("notch").await.unwrap(), None);

        store.upsert("Notch", fields(1, "http://a/1.png")).await.unwrap();
        store.upsert("NOTCH", fields(2, "http://a/2.png")).await.unwrap();

        let record = store.find_by_nickname("nOtCh").await.unwrap().unwrap();
        assert_eq!(record.nickname, "notch");
        assert_eq!(record.fields, fields(2, "http://a/2.png"));

        assert_eq!(store.collection.read().records.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_first_match_wins() {
        let store = MemoryStore::with_records(vec![
            TextureRecord::new(3, "dup", fields(1, "http://a/first.png")),
            TextureRecord::new(9, "dup", fields(2, "http://a/second.png")),
        ]);

        let record = store.find_by_nickname("DUP").await.unwrap().unwrap();
        assert_eq!(record.id, 3);

        store.upsert("other", TextureFields::default()).await.unwrap();
        let other = store.find_by_nickname("other").await.unwrap().unwrap();
        assert_eq!(other.id, 10);
    }

    #[tokio::test]
    async fn test_filesystem_persists() {
        let dir = tempfile::tempdir().unwrap();

        let store = FilesystemStore::open(dir.path(), "skins").await.unwrap();
        assert!(store.is_ready());
        store.upsert("Notch", fields(1, "http://a/1.png")).await.unwrap();
        store.upsert("jeb_", fields(2, "http://a/2.png")).await.unwrap();
        store.upsert("notch", fields(3, "http://a/3.png")).await.unwrap();
        drop(store);

        assert!(dir.path().join("skins.json").is_file());
        assert!(!dir.path().join("skins.json.tmp").exists());

        let reopened = FilesystemStore::open(dir.path(), "skins").await.unwrap();
        let notch = reopened.find_by_nickname("NOTCH").await.unwrap().unwrap();
        assert_eq!(notch.id, 1);
        assert_eq!(notch.fields, fields(3, "http://a/3.png"));

        let jeb = reopened.find_by_nickname("jeb_").await.unwrap().unwrap();
        assert_eq!(jeb.id, 2);
    }

    #[tokio::test]
    async fn test_filesystem_failed_write_leaves_no_trace() {
        let dir = tempfile::tempdir().unwrap();
        let base_dir = dir.path().join("data");
        std::fs::create_dir(&base_dir).unwrap();

        let store = FilesystemStore::open(&base_dir, "skins").await.unwrap();
        store.upsert("notch", fields(1, "http://a/1.png")).await.unwrap();

        std::fs::remove_dir_all(&base_dir).unwrap();
        assert!(!store.is_ready());

        let result = store.upsert("notch", fields(2, "http://a/2.png")).await;
        assert!(matches!(result, Err(StoreError::Io(_))));
        let result = store.upsert("jeb_", fields(3, "http://a/3.png")).await;
        assert!(result.is_err());

        let notch = store.find_by_nickname("notch").await.unwrap().unwrap();
        assert_eq!(notch.fields, fields(1, "http://a/1.png"));
        assert_eq!(store.find_by_nickname("jeb_").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_filesystem_rejects_corrupt_collection() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("skins.json"), b"{not json").unwrap();

        let result = FilesystemStore::open(dir.path(), "skins").await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }
}
