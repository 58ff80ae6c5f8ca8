pub mod types;
pub mod utils;
pub mod parser;
pub mod classifier;
pub mod processing;
pub mod aggregators;
pub mod digest;
pub mod pipeline;
pub mod traits;
pub mod sources;
pub mod fetcher;
pub mod llm_adapter;
pub mod state;
pub mod config;
pub mod aggregator;

pub use types::*;
pub use parser::RecordValidator;
pub use classifier::FormatClassifier;
pub use processing::{filter_records, FilterPipeline, FilterStage};
pub use aggregators::StatsAggregator;
pub use digest::{build_digest, TopRanker};
pub use pipeline::{analyze_posts, normalize_items};
pub use traits::PostSource;
pub use sources::{JsonFileSource, MemorySource};
pub use fetcher::ApifyScraper;
pub use llm_adapter::{GeminiReportGenerator, MockReportGenerator, ReportGenerator};
pub use state::ReportHistory;
pub use config::{AppConfig, ServiceArgs};
pub use aggregator::{Investigation, InvestigationRequest, PostAnalyst};
