use std::sync::{PoisonError, RwLock};

use serde::Serialize;

/// A successful generation, as shown on the history page
///
/// Serialized snake_case, the shape the UI's history page reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRecord {
    pub id: u64,
    pub prompt: String,
    pub model: String,
    pub resolution: Option<String>,
    pub style: Option<String>,
    /// Comma-separated tags
    pub tags: Option<String>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    /// RFC 3339, UTC
    pub created_at: String,
}

impl HistoryRecord {
    /// Whether `tag` is one of the record's comma-separated tags
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags
            .as_deref()
            .is_some_and(|tags| tags.split(',').any(|t| t.trim() == tag))
    }
}

/// Fields supplied when recording a generation
#[derive(Debug, Clone, Default)]
pub struct NewHistoryRecord {
    pub prompt: String,
    pub model: String,
    pub resolution: Option<String>,
    pub style: Option<String>,
    pub tags: Option<String>,
    pub image_url: Option<String>,
}

/// Generation history
pub trait HistoryStore: Send + Sync {
    /// Record a generation, assigning the next id
    fn add(&self, record: NewHistoryRecord) -> HistoryRecord;

    /// Records newest first, optionally limited to one tag
    fn list(&self, tag: Option<&str>) -> Vec<HistoryRecord>;

    /// Remove a record, `false` when the id is unknown
    fn delete(&self, id: u64) -> bool;
}

/// Process-local history, lost on restart
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    /// Oldest first
    records: Vec<HistoryRecord>,
}

impl HistoryStore for InMemoryHistory {
    fn add(&self, record: NewHistoryRecord) -> HistoryRecord {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.next_id += 1;

        let record = HistoryRecord {
            id: inner.next_id,
            prompt: record.prompt,
            model: record.model,
            resolution: record.resolution,
            style: record.style,
            tags: record.tags,
            thumbnail_url: record.image_url.clone(),
            image_url: record.image_url,
            created_at: jiff::Timestamp::now().to_string(),
        };

        inner.records.push(record.clone());
        record
    }

    fn list(&self, tag: Option<&str>) -> Vec<HistoryRecord> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);

        inner
            .records
            .iter()
            .rev()
            .filter(|r| tag.is_none_or(|tag| r.has_tag(tag)))
            .cloned()
            .collect()
    }

    fn delete(&self, id: u64) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let before = inner.records.len();
        inner.records.retain(|r| r.id != id);
        inner.records.len() != before
    }
}
