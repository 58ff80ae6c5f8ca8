use crate::config::AppConfig;
use crate::fetcher::ApifyScraper;
use crate::llm_adapter::{GeminiReportGenerator, ReportGenerator};
use crate::pipeline::analyze_posts;
use crate::state::ReportHistory;
use crate::traits::PostSource;
use crate::types::{
    AnalysisOutcome, BatchCounts, FilterOptions, HistoryEntry, InsightsError, PostDigest,
    ReportRequest, Result, ScrapeConfig, MAX_POSTS_CEILING,
};
use crate::utils;
use tracing::{error, info, warn};

/// One competitor page to investigate.
#[derive(Debug, Clone)]
pub struct InvestigationRequest {
    pub page_url: String,
    /// Defaults to the last path segment of the page URL
    pub competitor_name: Option<String>,
    pub filters: FilterOptions,
}

#[derive(Debug, Clone)]
pub enum Investigation {
    /// The scrape returned nothing worth reporting on; no report was written.
    NoQualifyingPosts { counts: BatchCounts },
    Completed {
        counts: BatchCounts,
        digest: PostDigest,
        entry: HistoryEntry,
    },
}

/// Runs scrape, analysis, report generation and history in sequence.
pub struct PostAnalyst {
    source: Box<dyn PostSource>,
    generator: Box<dyn ReportGenerator>,
    history: ReportHistory,
    scrape_config: ScrapeConfig,
}

impl PostAnalyst {
    pub fn new(
        source: Box<dyn PostSource>,
        generator: Box<dyn ReportGenerator>,
        history: ReportHistory,
        scrape_config: ScrapeConfig,
    ) -> Self {
        Self {
            source,
            generator,
            history,
            scrape_config,
        }
    }

    /// Apify scraper and Gemini generator built from the configured keys.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let credentials = config.credentials()?;

        let source = ApifyScraper::new(
            credentials.apify_token,
            config.actor_id.clone(),
            config.scrape.clone(),
        )?;
        let generator = GeminiReportGenerator::new(
            credentials.google_api_key,
            config.model.clone(),
            config.temperature,
        )?;

        Ok(Self::new(
            Box::new(source),
            Box::new(generator),
            ReportHistory::new(config.history_file.clone()),
            config.scrape.clone(),
        ))
    }

    pub fn history(&self) -> &ReportHistory {
        &self.history
    }

    pub async fn investigate(&self, request: &InvestigationRequest) -> Result<Investigation> {
        let page_url = request.page_url.trim();
        url::Url::parse(page_url)?;
        if !utils::url::is_valid_page_url(page_url) {
            return Err(InsightsError::General(format!("Not an http(s) page URL: {}", page_url)));
        }

        let max_count = request.filters.max_count;
        if !(1..=MAX_POSTS_CEILING).contains(&max_count) {
            return Err(InsightsError::General(format!(
                "Post count must be between 1 and {}, got {}",
                MAX_POSTS_CEILING, max_count
            )));
        }

        if let (Some(start), Some(end)) = (request.filters.start_date, request.filters.end_date) {
            if start > end {
                return Err(InsightsError::General(format!(
                    "Start date {} is after end date {}",
                    start, end
                )));
            }
        }

        let competitor_name = request
            .competitor_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| utils::url::competitor_name(page_url))
            .unwrap_or_else(|| page_url.to_string());

        let fetch_limit = max_count + self.scrape_config.extra_fetch;
        info!(
            competitor = %competitor_name,
            source = %self.source.source_name(),
            fetch_limit,
            "Searching posts"
        );

        let items = self.source.fetch_posts(page_url, fetch_limit).await.map_err(|e| {
            error!("Scrape failed for {}: {}", page_url, e);
            e
        })?;

        let (counts, digest) = match analyze_posts(&items, &request.filters) {
            AnalysisOutcome::NoQualifyingPosts { counts } => {
                warn!(
                    raw = counts.raw_items,
                    valid = counts.valid,
                    "No posts found. The page might be private, empty, or blocking bots."
                );
                return Ok(Investigation::NoQualifyingPosts { counts });
            }
            AnalysisOutcome::Ready { counts, digest } => (counts, digest),
        };

        info!(
            posts = counts.kept,
            generator = %self.generator.generator_name(),
            "Generating report"
        );

        let report_request = ReportRequest {
            competitor_name: competitor_name.clone(),
            page_url: page_url.to_string(),
            digest,
        };

        let report = self.generator.generate_report(&report_request).await.map_err(|e| {
            error!("Report generation failed for {}: {}", competitor_name, e);
            e
        })?;

        let entry = self.history.save(page_url, &competitor_name, &report).await?;

        Ok(Investigation::Completed {
            counts,
            digest: report_request.digest,
            entry,
        })
    }
}
