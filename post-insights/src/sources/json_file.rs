use crate::traits::PostSource;
use crate::types::{InsightsError, RawItem, Result};
use crate::utils::json;
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{info, warn};

/// Reads a saved scrape (a JSON array of post objects) from disk.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse a dataset dump. Entries that are not objects are skipped.
    pub fn parse_items(contents: &str) -> Result<Vec<RawItem>> {
        let value: Value = serde_json::from_str(contents)?;

        let Value::Array(values) = value else {
            return Err(InsightsError::General(
                "expected a JSON array of posts".to_string(),
            ));
        };

        let (items, skipped) = json::object_items(values);
        if skipped > 0 {
            warn!("Skipped {} entries that were not objects", skipped);
        }

        Ok(items)
    }
}

#[async_trait]
impl PostSource for JsonFileSource {
    fn source_name(&self) -> String {
        format!("JSON file {}", self.path.display())
    }

    /// The page URL is ignored; the file already holds one page's posts.
    async fn fetch_posts(&self, _page_url: &str, limit: usize) -> Result<Vec<RawItem>> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let mut items = Self::parse_items(&contents)?;
        items.truncate(limit);

        info!("Loaded {} raw posts from {}", items.len(), self.path.display());
        Ok(items)
    }
}
