//! Local filesystem storage implementation.
//!
//! Writes flagged texts to a UTF-8 text file, one entry per line. The file is
//! written to a temporary sibling first and renamed into place, so readers
//! never observe a half-written file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::storage::FlaggedStore;

/// Flagged-text file on the local filesystem.
#[derive(Debug, Clone)]
pub struct TextFileStore {
    path: PathBuf,
}

impl TextFileStore {
    /// Create a store writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Render entries one per line. Embedded line breaks would split an entry
    /// across lines, so they are folded into spaces.
    fn render(entries: &[String]) -> String {
        let mut out = String::new();
        for entry in entries {
            out.extend(entry.chars().map(|c| match c {
                '\r' | '\n' => ' ',
                other => other,
            }));
            out.push('\n');
        }
        out
    }
}

#[async_trait]
impl FlaggedStore for TextFileStore {
    async fn write_flagged(&self, entries: &[String]) -> Result<()> {
        self.write_bytes(Self::render(entries).as_bytes()).await?;
        log::debug!(
            "Wrote {} flagged entries to {}",
            entries.len(),
            self.path.display()
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
