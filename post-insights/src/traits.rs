use crate::types::{RawItem, Result};
use async_trait::async_trait;

/// Trait for pulling posts from a scraping provider
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Human-readable name for this source
    fn source_name(&self) -> String;

    /// Scrape up to `limit` posts from a page, newest first, exactly as the
    /// provider returns them. One round trip, no retries.
    async fn fetch_posts(&self, page_url: &str, limit: usize) -> Result<Vec<RawItem>>;
}
