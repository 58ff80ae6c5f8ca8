use crate::traits::PostSource;
use crate::types::{InsightsError, RawItem, Result, ScrapeConfig};
use crate::utils::json;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const BASE_URL: &str = "https://api.apify.com/v2";

/// Actor ID for apify/facebook-posts-scraper.
pub const FACEBOOK_POSTS_SCRAPER: &str = "KoJrdxJCTtpon81KY";

/// Seconds the API may hold a run-status request open.
const WAIT_FOR_FINISH_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    data: T,
}

#[derive(Debug, Clone, Deserialize)]
struct RunData {
    id: String,
    status: String,
    #[serde(rename = "defaultDatasetId")]
    default_dataset_id: String,
}

#[derive(Debug, Clone, Serialize)]
struct FacebookScraperInput {
    #[serde(rename = "startUrls")]
    start_urls: Vec<StartUrl>,
    #[serde(rename = "resultsLimit")]
    results_limit: usize,
    view: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct StartUrl {
    url: String,
}

/// Where an actor run stands after a status poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunProgress {
    Succeeded,
    /// Terminal failure with the status Apify reported
    Failed(String),
    Pending,
}

/// Classify an Apify run status. Unknown statuses are still running.
pub fn run_progress(status: &str) -> RunProgress {
    match status {
        "SUCCEEDED" => RunProgress::Succeeded,
        "FAILED" | "ABORTED" | "TIMED-OUT" => RunProgress::Failed(status.to_string()),
        _ => RunProgress::Pending,
    }
}

/// Scrapes Facebook page posts through an Apify actor.
pub struct ApifyScraper {
    client: Client,
    token: String,
    actor_id: String,
    base_url: String,
    config: ScrapeConfig,
}

impl ApifyScraper {
    pub fn new(token: String, actor_id: String, config: ScrapeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            // long-polling holds requests open for up to WAIT_FOR_FINISH_SECS
            .timeout(Duration::from_secs(config.timeout_seconds.max(WAIT_FOR_FINISH_SECS + 10)))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            token,
            actor_id,
            base_url: BASE_URL.to_string(),
            config,
        })
    }

    /// Point the client at another API root, e.g. a local proxy.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn start_run(&self, page_url: &str, limit: usize) -> Result<RunData> {
        let input = FacebookScraperInput {
            start_urls: vec![StartUrl {
                url: page_url.to_string(),
            }],
            results_limit: limit,
            view: "posts",
        };

        let url = format!("{}/acts/{}/runs", self.base_url, self.actor_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&input)
            .send()
            .await?;

        let api_resp: ApiResponse<RunData> = ensure_success(resp).await?.json().await?;
        Ok(api_resp.data)
    }

    /// Long-poll until the run finishes or the configured wait runs out.
    async fn wait_for_run(&self, run_id: &str) -> Result<RunData> {
        let started = Instant::now();
        let max_wait = Duration::from_secs(self.config.max_run_wait_seconds);

        loop {
            let url = format!(
                "{}/actor-runs/{}?waitForFinish={}",
                self.base_url, run_id, WAIT_FOR_FINISH_SECS
            );
            let resp = self.client.get(&url).bearer_auth(&self.token).send().await?;

            let api_resp: ApiResponse<RunData> = ensure_success(resp).await?.json().await?;
            let run = api_resp.data;

            match run_progress(&run.status) {
                RunProgress::Succeeded => return Ok(run),
                RunProgress::Failed(status) => return Err(InsightsError::ScrapeRunFailed(status)),
                RunProgress::Pending if started.elapsed() >= max_wait => {
                    warn!(run_id, status = %run.status, "Gave up waiting for scrape run");
                    return Err(InsightsError::ScrapeRunFailed(format!(
                        "{} after waiting {}s",
                        run.status, self.config.max_run_wait_seconds
                    )));
                }
                RunProgress::Pending => {
                    debug!(run_id, status = %run.status, "Run still in progress");
                }
            }
        }
    }

    async fn get_dataset_items(&self, dataset_id: &str) -> Result<Vec<RawItem>> {
        let url = format!("{}/datasets/{}/items?format=json", self.base_url, dataset_id);
        let resp = self.client.get(&url).bearer_auth(&self.token).send().await?;

        let values: Vec<Value> = ensure_success(resp).await?.json().await?;
        let (items, skipped) = json::object_items(values);
        if skipped > 0 {
            warn!("Skipped {} dataset entries that were not objects", skipped);
        }

        Ok(items)
    }
}

#[async_trait]
impl PostSource for ApifyScraper {
    fn source_name(&self) -> String {
        format!("Apify actor {}", self.actor_id)
    }

    async fn fetch_posts(&self, page_url: &str, limit: usize) -> Result<Vec<RawItem>> {
        info!(page_url, limit, "Starting Facebook page scrape");

        let run = self.start_run(page_url, limit).await?;
        info!(run_id = %run.id, "Apify run started, polling for completion");

        let completed = self.wait_for_run(&run.id).await?;
        info!(
            run_id = %completed.id,
            dataset_id = %completed.default_dataset_id,
            "Run completed, fetching results"
        );

        let items = self.get_dataset_items(&completed.default_dataset_id).await?;
        info!(count = items.len(), "Fetched raw posts");

        Ok(items)
    }
}

async fn ensure_success(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    Err(InsightsError::Scrape {
        status: status.as_u16(),
        message: body,
    })
}
