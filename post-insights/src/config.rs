use crate::fetcher::FACEBOOK_POSTS_SCRAPER;
use crate::llm_adapter::{DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use crate::state::DEFAULT_HISTORY_FILE;
use crate::types::{InsightsError, Result, ScrapeConfig};
use clap::Args;
use std::path::PathBuf;

/// Service settings shared by every command. Secrets come from the
/// environment (or a `.env` file) unless given on the command line.
#[derive(Debug, Clone, Args)]
pub struct ServiceArgs {
    #[arg(long, env = "APIFY_API_TOKEN", hide_env_values = true)]
    pub apify_token: Option<String>,

    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    /// Apify actor that scrapes Facebook page posts
    #[arg(long, env = "APIFY_ACTOR_ID", default_value = FACEBOOK_POSTS_SCRAPER)]
    pub actor_id: String,

    /// Gemini model used to write reports
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    /// File holding previously generated reports
    #[arg(long, env = "HISTORY_FILE", default_value = DEFAULT_HISTORY_FILE)]
    pub history_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub apify_token: Option<String>,
    pub google_api_key: Option<String>,
    pub actor_id: String,
    pub model: String,
    pub temperature: f32,
    pub history_file: PathBuf,
    pub scrape: ScrapeConfig,
}

/// API keys confirmed to be present.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub apify_token: String,
    pub google_api_key: String,
}

impl From<ServiceArgs> for AppConfig {
    fn from(args: ServiceArgs) -> Self {
        Self {
            apify_token: non_blank(args.apify_token),
            google_api_key: non_blank(args.google_api_key),
            actor_id: args.actor_id,
            model: args.model,
            temperature: args.temperature,
            history_file: args.history_file,
            scrape: ScrapeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Both API keys, or an error naming every one that is missing.
    pub fn credentials(&self) -> Result<Credentials> {
        let mut missing = Vec::new();
        if self.apify_token.is_none() {
            missing.push("APIFY_API_TOKEN".to_string());
        }
        if self.google_api_key.is_none() {
            missing.push("GOOGLE_API_KEY".to_string());
        }

        match (&self.apify_token, &self.google_api_key) {
            (Some(apify_token), Some(google_api_key)) => Ok(Credentials {
                apify_token: apify_token.clone(),
                google_api_key: google_api_key.clone(),
            }),
            _ => Err(InsightsError::MissingCredentials(missing)),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
