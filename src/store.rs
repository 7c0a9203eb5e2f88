//! Record and document persistence.
//!
//! The pipeline only depends on the [`RecordStore`] seam: lookup by identity
//! key and atomic upsert. Two implementations ship with the crate — an
//! in-memory store for tests and a JSON-file store for the CLI. Body HTML
//! goes through [`FsDocumentStore`], which owns the `en/`/`zh` directory
//! layout; records carry only the returned references.

use crate::error::{PipelineError, Result};
use crate::models::ArticleRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// Lookup + upsert contract against the record store.
///
/// `upsert` must be atomic per record so two runs reconciling the same
/// identity key cannot interleave a partial write; last writer wins.
pub trait RecordStore {
    fn find_by_key(&self, key: &str) -> impl Future<Output = Result<Option<ArticleRecord>>> + Send;
    fn upsert(&self, record: ArticleRecord) -> impl Future<Output = Result<ArticleRecord>> + Send;
}

/// In-memory record store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, ArticleRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

impl RecordStore for MemoryStore {
    async fn find_by_key(&self, key: &str) -> Result<Option<ArticleRecord>> {
        Ok(self.records.lock().await.get(key).cloned())
    }

    async fn upsert(&self, record: ArticleRecord) -> Result<ArticleRecord> {
        self.records
            .lock()
            .await
            .insert(record.key.clone(), record.clone());
        Ok(record)
    }
}

/// JSON-file record store: one map of key → record, rewritten atomically
/// (write to a temp file, then rename) on every upsert.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<HashMap<String, ArticleRecord>> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, records: &HashMap<String, ArticleRecord>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(records)?).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

impl RecordStore for JsonStore {
    async fn find_by_key(&self, key: &str) -> Result<Option<ArticleRecord>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.get(key).cloned())
    }

    #[instrument(level = "debug", skip_all, fields(key = %record.key))]
    async fn upsert(&self, record: ArticleRecord) -> Result<ArticleRecord> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        records.insert(record.key.clone(), record.clone());
        self.save(&records).await?;
        debug!(total = records.len(), "Record upserted");
        Ok(record)
    }
}

/// Language of a persisted body document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Translated,
}

impl Language {
    fn dir(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Translated => "zh",
        }
    }
}

/// Filesystem-backed body storage. English and translated variants share
/// one filename and differ only by subdirectory.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write one body document and return its store-relative reference.
    #[instrument(level = "info", skip(self, html), fields(filename = %filename))]
    pub async fn write_body(
        &self,
        language: Language,
        filename: &str,
        html: &str,
    ) -> Result<String> {
        let dir = self.root.join(language.dir());
        fs::create_dir_all(&dir).await?;
        let path = dir.join(filename);
        fs::write(&path, html).await.map_err(|e| {
            PipelineError::Store(format!("writing {}: {e}", path.display()))
        })?;
        info!(path = %path.display(), bytes = html.len(), "Wrote body document");
        Ok(format!("{}/{}", language.dir(), filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn record(key: &str, title: &str) -> ArticleRecord {
        let now = Utc::now();
        ArticleRecord {
            key: key.to_string(),
            title: title.to_string(),
            title_translated: None,
            date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            category: "culture".to_string(),
            author: "Jane Doe".to_string(),
            source: "The New Yorker".to_string(),
            url: Some(key.to_string()),
            body_ref: "en/x.html".to_string(),
            body_ref_translated: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_memory_store_upsert_overwrites() {
        let store = MemoryStore::new();
        store.upsert(record("k1", "First")).await.unwrap();
        store.upsert(record("k1", "Second")).await.unwrap();
        assert_eq!(store.len().await, 1);
        let found = store.find_by_key("k1").await.unwrap().unwrap();
        assert_eq!(found.title, "Second");
    }

    #[tokio::test]
    async fn test_json_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("records.json"));
        assert!(store.find_by_key("k1").await.unwrap().is_none());
        store.upsert(record("k1", "First")).await.unwrap();
        store.upsert(record("k2", "Other")).await.unwrap();
        store.upsert(record("k1", "Updated")).await.unwrap();

        // Reopen from disk.
        let store = JsonStore::new(dir.path().join("records.json"));
        let found = store.find_by_key("k1").await.unwrap().unwrap();
        assert_eq!(found.title, "Updated");
        assert!(store.find_by_key("k2").await.unwrap().is_some());
        assert!(store.find_by_key("k3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_document_store_shared_filename() {
        let dir = tempfile::tempdir().unwrap();
        let docs = FsDocumentStore::new(dir.path());
        let en = docs
            .write_body(Language::English, "2025-06-30_newyorker_culture_a_b.html", "<p>en</p>")
            .await
            .unwrap();
        let zh = docs
            .write_body(Language::Translated, "2025-06-30_newyorker_culture_a_b.html", "<p>zh</p>")
            .await
            .unwrap();
        assert_eq!(en, "en/2025-06-30_newyorker_culture_a_b.html");
        assert_eq!(zh, "zh/2025-06-30_newyorker_culture_a_b.html");
        assert!(dir.path().join(&en).exists());
        assert!(dir.path().join(&zh).exists());
    }
}
