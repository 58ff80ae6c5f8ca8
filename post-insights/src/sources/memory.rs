use crate::traits::PostSource;
use crate::types::{RawItem, Result};
use async_trait::async_trait;

/// Serves a fixed batch of posts.
pub struct MemorySource {
    items: Vec<RawItem>,
}

impl MemorySource {
    pub fn new(items: Vec<RawItem>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl PostSource for MemorySource {
    fn source_name(&self) -> String {
        "in-memory posts".to_string()
    }

    async fn fetch_posts(&self, _page_url: &str, limit: usize) -> Result<Vec<RawItem>> {
        Ok(self.items.iter().take(limit).cloned().collect())
    }
}
