//! Collection of flagged texts for one run.

use crate::error::Result;
use crate::storage::FlaggedStore;

/// Ordered, append-only list of flagged texts.
///
/// Owned by the driver for the whole run. [`ScamAccumulator::flush`] consumes
/// it, so it can be written at most once.
#[derive(Debug, Default)]
pub struct ScamAccumulator {
    entries: Vec<String>,
}

impl ScamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, normalized_text: String) {
        self.entries.push(normalized_text);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write every entry to `store`, replacing its contents.
    ///
    /// Returns the number of entries written.
    pub async fn flush(self, store: &dyn FlaggedStore) -> Result<usize> {
        store.write_flagged(&self.entries).await?;
        Ok(self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::TextFileStore;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_flush_preserves_append_order() {
        let tmp = TempDir::new().unwrap();
        let store = TextFileStore::new(tmp.path().join("scams.txt"));

        let mut accumulator = ScamAccumulator::new();
        accumulator.push("second".to_string());
        accumulator.push("first".to_string());
        accumulator.push("second".to_string());
        assert_eq!(accumulator.len(), 3);

        let written = accumulator.flush(&store).await.unwrap();
        assert_eq!(written, 3);
        assert_eq!(
            std::fs::read_to_string(store.path()).unwrap(),
            "second\nfirst\nsecond\n"
        );
    }

    #[tokio::test]
    async fn test_flush_of_empty_accumulator_writes_empty_file() {
        let tmp = TempDir::new().unwrap();
        let store = TextFileStore::new(tmp.path().join("scams.txt"));

        let accumulator = ScamAccumulator::new();
        assert!(accumulator.is_empty());
        assert_eq!(accumulator.flush(&store).await.unwrap(), 0);
        assert!(store.path().exists());
    }
}
