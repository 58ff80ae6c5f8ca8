use crate::types::{HistoryEntry, InsightsError, Result};
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

pub const DEFAULT_HISTORY_FILE: &str = "history.json";

/// Past reports kept in a JSON file, newest first.
pub struct ReportHistory {
    path: PathBuf,
}

impl ReportHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an unreadable history file is moved before it is replaced.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".corrupt");
        PathBuf::from(name)
    }

    /// All saved entries. A missing or unreadable file is an empty history.
    pub async fn load(&self) -> Vec<HistoryEntry> {
        match self.read_entries().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Ignoring unreadable history file {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    async fn read_entries(&self) -> Result<Vec<HistoryEntry>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_str(&contents)?)
    }

    /// Record a new report at the front of the history and rewrite the file.
    /// An unreadable file is moved to [`Self::backup_path`] first.
    pub async fn save(&self, url: &str, name: &str, report: &str) -> Result<HistoryEntry> {
        let mut entries = match self.read_entries().await {
            Ok(entries) => entries,
            Err(e) => {
                let backup = self.backup_path();
                warn!(
                    "History file {} is unreadable ({}), moving it to {}",
                    self.path.display(),
                    e,
                    backup.display()
                );
                tokio::fs::rename(&self.path, &backup).await?;
                Vec::new()
            }
        };

        let entry = HistoryEntry {
            id: Uuid::new_v4().simple().to_string(),
            timestamp: Utc::now().format("%Y-%m-%d %H:%M").to_string(),
            url: url.to_string(),
            name: name.to_string(),
            report: report.to_string(),
        };
        entries.insert(0, entry.clone());

        let json = serde_json::to_string_pretty(&entries)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        info!("Saved report {} for {} ({} in history)", entry.id, name, entries.len());
        Ok(entry)
    }

    pub async fn find(&self, id: &str) -> Result<HistoryEntry> {
        self.load()
            .await
            .into_iter()
            .find(|entry| entry.id == id)
            .ok_or_else(|| InsightsError::HistoryEntryNotFound { id: id.to_string() })
    }
}
