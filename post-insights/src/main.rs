use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use post_insights::{
    analyze_posts, AnalysisOutcome, AppConfig, FilterOptions, Investigation, InvestigationRequest,
    JsonFileSource, MockReportGenerator, PostAnalyst, ReportGenerator, ReportHistory, ReportRequest,
    ServiceArgs, DEFAULT_MAX_POSTS, MAX_POSTS_CEILING,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "post-insights", version, about = "Competitor post analysis from scraped Facebook pages")]
struct Cli {
    #[command(flatten)]
    service: ServiceArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scrape a page, analyse its posts and write a report
    Analyze {
        /// Competitor's Facebook page URL
        url: String,

        /// Competitor name used in the report (defaults to the URL's last segment)
        #[arg(long)]
        name: Option<String>,

        /// Also write the markdown report to this file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Also write the markdown report to report_<name>.md
        #[arg(long, conflicts_with = "output")]
        export: bool,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Run the analysis on a saved scrape (JSON array of posts) without network access
    AnalyzeFile {
        path: PathBuf,

        #[arg(long, default_value = "offline")]
        name: String,

        /// Print an offline markdown report instead of the JSON digest
        #[arg(long)]
        report: bool,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Browse previously generated reports
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Debug, Subcommand)]
enum HistoryAction {
    /// List saved reports, newest first
    List,
    /// Print one saved report
    Show { id: String },
}

#[derive(Debug, Clone, Args)]
struct FilterArgs {
    /// Number of posts to analyse
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_POSTS as u64,
        value_parser = clap::value_parser!(u64).range(1..=MAX_POSTS_CEILING as u64)
    )]
    max_posts: u64,

    /// Ignore posts before this date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Ignore posts after this date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    end_date: Option<NaiveDate>,
}

impl From<FilterArgs> for FilterOptions {
    fn from(args: FilterArgs) -> Self {
        Self {
            start_date: args.start_date,
            end_date: args.end_date,
            max_count: args.max_posts as usize,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from(cli.service);

    match cli.command {
        Command::Analyze {
            url,
            name,
            output,
            export,
            filters,
        } => run_analyze(&config, url, name, output, export, filters.into()).await,
        Command::AnalyzeFile {
            path,
            name,
            report,
            filters,
        } => run_analyze_file(&path, &name, report, &filters.into()).await,
        Command::History { action } => run_history(&config, action).await,
    }
}

async fn run_analyze(
    config: &AppConfig,
    url: String,
    name: Option<String>,
    output: Option<PathBuf>,
    export: bool,
    filters: FilterOptions,
) -> Result<()> {
    let analyst = PostAnalyst::from_config(config)?;
    let request = InvestigationRequest {
        page_url: url,
        competitor_name: name,
        filters,
    };

    match analyst.investigate(&request).await? {
        Investigation::NoQualifyingPosts { counts } => {
            println!(
                "No posts found ({} scraped, {} with a valid date). The page might be private, empty, or blocking bots.",
                counts.raw_items, counts.valid
            );
        }
        Investigation::Completed { counts, entry, .. } => {
            info!("Analysed {} of {} scraped posts", counts.kept, counts.raw_items);
            let export_path = output.or_else(|| export.then(|| PathBuf::from(format!("report_{}.md", entry.name))));
            if let Some(path) = export_path {
                write_report(&path, &entry.report).await?;
            }
            println!("{}", entry.report);
            println!("\nSaved as {} ({})", entry.id, entry.timestamp);
        }
    }

    Ok(())
}

async fn run_analyze_file(path: &Path, name: &str, report: bool, filters: &FilterOptions) -> Result<()> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let items = JsonFileSource::parse_items(&contents)?;

    match analyze_posts(&items, filters) {
        AnalysisOutcome::NoQualifyingPosts { counts } => {
            println!("No qualifying posts ({} items, {} with a valid date)", counts.raw_items, counts.valid);
        }
        AnalysisOutcome::Ready { digest, .. } if report => {
            let request = ReportRequest {
                competitor_name: name.to_string(),
                page_url: path.display().to_string(),
                digest,
            };
            println!("{}", MockReportGenerator::default().generate_report(&request).await?);
        }
        AnalysisOutcome::Ready { digest, .. } => {
            println!("{}", serde_json::to_string_pretty(&digest)?);
        }
    }

    Ok(())
}

async fn run_history(config: &AppConfig, action: HistoryAction) -> Result<()> {
    let history = ReportHistory::new(config.history_file.clone());

    match action {
        HistoryAction::List => {
            let entries = history.load().await;
            if entries.is_empty() {
                println!("No past investigations in {}.", history.path().display());
            }
            for entry in entries {
                println!("{}  {}  {}  {}", entry.id, entry.timestamp, entry.name, entry.url);
            }
        }
        HistoryAction::Show { id } => {
            let entry = history.find(&id).await?;
            println!("# Report: {} ({})\n", entry.name, entry.timestamp);
            println!("{}", entry.report);
        }
    }

    Ok(())
}

async fn write_report(path: &Path, report: &str) -> Result<()> {
    tokio::fs::write(path, report)
        .await
        .with_context(|| format!("writing report to {}", path.display()))?;
    info!("Report written to {}", path.display());
    Ok(())
}
