use crate::types::{InsightsError, PostDigest, ReportRequest, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Trait for services that turn a post digest into a written report
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    /// Get the name of this generator
    fn generator_name(&self) -> String;

    /// Produce a markdown report for the request
    async fn generate_report(&self, request: &ReportRequest) -> Result<String>;
}

/// Strategy-analyst prompt with the digest embedded as JSON.
pub fn build_prompt(request: &ReportRequest) -> Result<String> {
    let digest_json = serde_json::to_string_pretty(&request.digest)?;

    Ok(format!(
        r#"You are a senior social media strategist. Below is structured data about recent Facebook posts from a competitor called "{name}" ({url}).

Your job is to study their content strategy and report back with tactical insights.

Post data (engagement statistics, per-format breakdown, top posts and every analysed post):
{digest}

Write a detailed report in Markdown covering:
1. Performance snapshot: average likes, comments and shares per post, and how each content format performs.
2. Content pillars: which topics they post about most (for example educational, promotional, memes).
3. Top performing post: the post with the highest engagement, quoting its content.
4. Why it worked: explain the engagement numbers of the top post, what it is about and why that angle resonates with the audience right now, including any context competitors could not easily replicate.

Write the report in both English and Vietnamese. Keep the tone professional but tactical."#,
        name = request.competitor_name,
        url = request.page_url,
        digest = digest_json,
    ))
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

/// Report text from a `generateContent` response body: the text parts of the
/// first candidate, joined. Blank text is an error carrying the finish reason.
pub fn report_from_response(body: Value) -> Result<String> {
    let parsed: GenerateContentResponse = serde_json::from_value(body)?;
    let candidate = parsed
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| InsightsError::Report("response contained no candidates".to_string()))?;

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        warn!(finish_reason = ?candidate.finish_reason, "Gemini returned an empty report");
        return Err(InsightsError::Report(format!(
            "empty response (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(text)
}

/// Google Gemini `generateContent` client.
pub struct GeminiReportGenerator {
    client: Client,
    api_key: String,
    model: String,
    temperature: f32,
    base_url: String,
}

impl GeminiReportGenerator {
    pub fn new(api_key: String, model: String, temperature: f32) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(180))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model,
            temperature,
            base_url: GEMINI_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ReportGenerator for GeminiReportGenerator {
    fn generator_name(&self) -> String {
        format!("Gemini ({})", self.model)
    }

    async fn generate_report(&self, request: &ReportRequest) -> Result<String> {
        let prompt = build_prompt(request)?;
        info!(
            posts = request.digest.posts.len(),
            model = %self.model,
            "Sending posts to Gemini for analysis"
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: Some(prompt) }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(InsightsError::Report(format!("HTTP {}: {}", status, message)));
        }

        let payload: Value = resp.json().await?;
        let text = report_from_response(payload)?;

        debug!("Received report of {} bytes", text.len());
        Ok(text)
    }
}

/// Offline generator that renders the digest as a plain markdown report.
pub struct MockReportGenerator {
    name: String,
}

impl MockReportGenerator {
    pub fn new(name: String) -> Self {
        Self { name }
    }
}

impl Default for MockReportGenerator {
    fn default() -> Self {
        Self::new("offline".to_string())
    }
}

#[async_trait]
impl ReportGenerator for MockReportGenerator {
    fn generator_name(&self) -> String {
        format!("Mock Report Generator ({})", self.name)
    }

    async fn generate_report(&self, request: &ReportRequest) -> Result<String> {
        Ok(render_markdown(&request.competitor_name, &request.digest))
    }
}

fn render_markdown(competitor_name: &str, digest: &PostDigest) -> String {
    let stats = &digest.stats;
    let mut report = String::new();

    report.push_str(&format!("# Competitor report: {}\n\n", competitor_name));
    report.push_str("## Performance snapshot\n\n");
    report.push_str(&format!("- Posts analysed: {}\n", stats.total_posts));
    report.push_str(&format!("- Average likes: {:.1}\n", stats.averages.likes));
    report.push_str(&format!("- Average comments: {:.1}\n", stats.averages.comments));
    report.push_str(&format!("- Average shares: {:.1}\n\n", stats.averages.shares));

    report.push_str("## Formats\n\n");
    report.push_str("| Format | Posts | Avg likes | Avg comments | Avg shares |\n");
    report.push_str("|---|---|---|---|---|\n");
    for format_stats in &stats.by_format {
        report.push_str(&format!(
            "| {} | {} | {:.1} | {:.1} | {:.1} |\n",
            format_stats.format,
            format_stats.count,
            format_stats.averages.likes,
            format_stats.averages.comments,
            format_stats.averages.shares
        ));
    }

    report.push_str("\n## Top posts\n\n");
    for (i, post) in digest.top_posts.iter().enumerate() {
        report.push_str(&format!(
            "{}. [{}] {} ({} engagement, {})\n   {}\n",
            i + 1,
            post.date,
            post.format,
            post.engagement,
            post.url,
            post.excerpt
        ));
    }

    report
}
