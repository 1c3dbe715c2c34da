//! In-memory collaborators for pipeline tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, DeleteError, FeedError, Result};
use crate::models::{Cursor, Label, Page, Verdict};
use crate::pipeline::metrics::{MetricsSink, MetricsSnapshot};
use crate::services::{FeedSource, ModerationAction, TextClassifier};
use crate::storage::FlaggedStore;

/// Replays a fixed sequence of fetch outcomes and records requested cursors.
pub struct ScriptedFeed {
    responses: Mutex<VecDeque<std::result::Result<Page, FeedError>>>,
    cursors: Mutex<Vec<Option<Cursor>>>,
}

impl ScriptedFeed {
    pub fn new(responses: Vec<std::result::Result<Page, FeedError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            cursors: Mutex::new(Vec::new()),
        }
    }

    pub fn requested_cursors(&self) -> Vec<Option<String>> {
        self.cursors
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.as_ref().map(|c| c.as_str().to_string()))
            .collect()
    }
}

#[async_trait]
impl FeedSource for ScriptedFeed {
    async fn fetch_page(&self, cursor: Option<&Cursor>) -> std::result::Result<Page, FeedError> {
        self.cursors.lock().unwrap().push(cursor.cloned());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("fetch past end of script")
    }
}

/// Looks verdicts up by exact text; unknown text is a confident negative.
#[derive(Default)]
pub struct TableClassifier {
    verdicts: HashMap<String, Verdict>,
    failing: HashSet<String>,
    seen: Mutex<Vec<String>>,
}

impl TableClassifier {
    pub fn with(mut self, text: &str, label: Label, probability: f64) -> Self {
        self.verdicts
            .insert(text.to_string(), Verdict::new(label, probability));
        self
    }

    pub fn failing_on(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl TextClassifier for TableClassifier {
    fn classify(&self, text: &str) -> Result<Verdict> {
        self.seen.lock().unwrap().push(text.to_string());
        if self.failing.contains(text) {
            return Err(AppError::model("cannot score input"));
        }
        Ok(self
            .verdicts
            .get(text)
            .copied()
            .unwrap_or(Verdict::new(Label::Negative, 0.0)))
    }
}

/// Records deletions; ids in `failing` answer with a 403.
#[derive(Default)]
pub struct RecordingModerator {
    failing: HashSet<u64>,
    deleted: Mutex<Vec<u64>>,
}

impl RecordingModerator {
    pub fn failing_on(ids: &[u64]) -> Self {
        Self {
            failing: ids.iter().copied().collect(),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<u64> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModerationAction for RecordingModerator {
    async fn delete(&self, item_id: u64) -> std::result::Result<(), DeleteError> {
        self.deleted.lock().unwrap().push(item_id);
        if self.failing.contains(&item_id) {
            return Err(DeleteError::Status {
                status: 403,
                body: "Forbidden".to_string(),
            });
        }
        Ok(())
    }
}

/// Keeps every write in memory; a failing store rejects every write.
#[derive(Default)]
pub struct MemoryStore {
    failing: bool,
    writes: Mutex<Vec<Vec<String>>>,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            failing: true,
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn writes(&self) -> Vec<Vec<String>> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl FlaggedStore for MemoryStore {
    async fn write_flagged(&self, entries: &[String]) -> Result<()> {
        self.writes.lock().unwrap().push(entries.to_vec());
        if self.failing {
            return Err(AppError::Io(std::io::Error::other("disk full")));
        }
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

/// Keeps every snapshot in memory.
#[derive(Default)]
pub struct RecordingSink {
    snapshots: Mutex<Vec<MetricsSnapshot>>,
}

impl RecordingSink {
    pub fn snapshots(&self) -> Vec<MetricsSnapshot> {
        self.snapshots.lock().unwrap().clone()
    }
}

impl MetricsSink for RecordingSink {
    fn record(&self, snapshot: &MetricsSnapshot) {
        self.snapshots.lock().unwrap().push(snapshot.clone());
    }
}
