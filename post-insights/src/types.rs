use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One post exactly as the scrape provider returned it. Nothing is guaranteed
/// about which keys exist or what types they hold.
pub type RawItem = Map<String, Value>;

/// Post text is cut to this many characters to bound the report payload.
pub const MAX_TEXT_CHARS: usize = 500;

/// Length of the text excerpt carried by ranked posts.
pub const EXCERPT_CHARS: usize = 150;

/// Size of the ranked top-post list.
pub const TOP_POSTS_LIMIT: usize = 10;

/// Stand-in for posts that came without a link.
pub const URL_NOT_AVAILABLE: &str = "No URL";

pub const DEFAULT_MAX_POSTS: usize = 5;
pub const MAX_POSTS_CEILING: usize = 20;

/// Media format of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PostFormat {
    Unset,
    Reel,
    Video,
    Image,
    #[serde(rename = "Text Only")]
    TextOnly,
    #[serde(rename = "Link/Shared")]
    LinkShared,
}

impl PostFormat {
    /// Every label the classifier can assign, in report order.
    pub const CLASSIFIED: [PostFormat; 5] = [
        PostFormat::Reel,
        PostFormat::Video,
        PostFormat::Image,
        PostFormat::TextOnly,
        PostFormat::LinkShared,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PostFormat::Unset => "Unset",
            PostFormat::Reel => "Reel",
            PostFormat::Video => "Video",
            PostFormat::Image => "Image",
            PostFormat::TextOnly => "Text Only",
            PostFormat::LinkShared => "Link/Shared",
        }
    }
}

impl fmt::Display for PostFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A validated post flowing through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub date: NaiveDate,
    pub format: PostFormat,
    pub text: String,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub url: String,
}

impl Record {
    pub fn engagement(&self) -> u64 {
        self.likes
            .saturating_add(self.comments)
            .saturating_add(self.shares)
    }

    /// Posts with neither text nor likes are scraper noise.
    pub fn has_content(&self) -> bool {
        !self.text.is_empty() || self.likes > 0
    }
}

/// Bounds and limits applied by the filter pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub max_count: usize,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            max_count: DEFAULT_MAX_POSTS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngagementAverages {
    pub likes: f64,
    pub comments: f64,
    pub shares: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatStats {
    pub format: PostFormat,
    pub count: usize,
    #[serde(flatten)]
    pub averages: EngagementAverages,
}

/// Engagement statistics over a filtered batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total_posts: usize,
    pub averages: EngagementAverages,
    /// Ordered by descending count, then by `PostFormat::CLASSIFIED` order.
    pub by_format: Vec<FormatStats>,
}

/// A ranked post with its text shortened to an excerpt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopPost {
    pub date: NaiveDate,
    pub format: PostFormat,
    pub excerpt: String,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub engagement: u64,
    pub url: String,
}

/// Structured input for report generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDigest {
    pub stats: StatsSummary,
    pub top_posts: Vec<TopPost>,
    pub posts: Vec<Record>,
}

/// How many items survived each step of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCounts {
    pub raw_items: usize,
    pub missing_date: usize,
    pub invalid_date: usize,
    pub valid: usize,
    pub kept: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// Nothing survived filtering; callers should not ask for a report.
    NoQualifyingPosts { counts: BatchCounts },
    Ready { counts: BatchCounts, digest: PostDigest },
}

/// Everything the report generator receives for one competitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub competitor_name: String,
    pub page_url: String,
    pub digest: PostDigest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: String,
    pub url: String,
    pub name: String,
    pub report: String,
}

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// Upper bound on how long to wait for an actor run to finish.
    pub max_run_wait_seconds: u64,
    /// Items requested beyond `max_posts` so filtering has spare candidates.
    pub extra_fetch: usize,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            user_agent: "Post-Insights/1.0".to_string(),
            timeout_seconds: 90,
            max_run_wait_seconds: 600,
            extra_fetch: 5,
        }
    }
}

/// Why a single raw item was left out of a batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("post has no date")]
    MissingDate,

    #[error("unparseable post date: {0}")]
    InvalidDate(String),
}

#[derive(Debug, thiserror::Error)]
pub enum InsightsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Scrape API error (status {status}): {message}")]
    Scrape { status: u16, message: String },

    #[error("Scrape run ended with status: {0}")]
    ScrapeRunFailed(String),

    #[error("Report generation failed: {0}")]
    Report(String),

    #[error("Missing API keys: {}", .0.join(", "))]
    MissingCredentials(Vec<String>),

    #[error("History entry not found: {id}")]
    HistoryEntryNotFound { id: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, InsightsError>;
