//! Command-line front end for profile briefings
//!
//! Runs the background prefetch and the popup session against the SQLite
//! cache and the summarization relay, so both halves can be driven from a
//! terminal.

mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use profile_brief::popup::format_summary;
use profile_brief::{
    is_fresh, BriefingConfig, CacheStore, ChatRole, DocumentSource, HtmlProfileScraper,
    HttpDocumentSource, LogSignal, PageIdentity, Panel, PopupMode, PopupSession, PopupView,
    PrefetchCoordinator, PrefetchOutcome, RelayClient, SqliteStore, StaticDocument,
    SummaryOutcome,
};

use crate::config::Settings;

type PageScraper = HtmlProfileScraper<Arc<dyn DocumentSource>>;
type Session = PopupSession<SqliteStore, RelayClient, PageScraper>;

#[derive(Parser)]
#[command(name = "brief")]
#[command(about = "Prefetch and read profile briefings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape a profile page and cache both summaries
    Prefetch {
        url: String,
        /// Read the page from a saved HTML file instead of fetching it
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Open the popup for a page and print the summary
    Open {
        url: String,
        #[arg(long)]
        html: Option<PathBuf>,
        /// Call the relay directly on a cache miss instead of waiting
        #[arg(long)]
        on_demand: bool,
        /// Also show the web-augmented summary
        #[arg(long)]
        web: bool,
    },

    /// Ask a follow-up question about a profile
    Ask {
        url: String,
        question: String,
        #[arg(long)]
        html: Option<PathBuf>,
        /// Let the answer use live web search
        #[arg(long)]
        web_search: bool,
        #[arg(long)]
        on_demand: bool,
    },

    /// Print the cached bundle for a page
    Show { url: String },

    /// List cached pages, newest first
    List,

    /// Drop one cached page, or all of them
    Clear { url: Option<String> },
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,profile_brief=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;
    tracing::debug!(
        relay = %settings.relay_url,
        database = %settings.database_url,
        "Loaded settings"
    );

    match cli.command {
        Commands::Prefetch { url, html } => cmd_prefetch(&settings, &url, html.as_deref()).await,
        Commands::Open {
            url,
            html,
            on_demand,
            web,
        } => cmd_open(&settings, &url, html.as_deref(), on_demand, web).await,
        Commands::Ask {
            url,
            question,
            html,
            web_search,
            on_demand,
        } => cmd_ask(&settings, &url, &question, html.as_deref(), web_search, on_demand).await,
        Commands::Show { url } => cmd_show(&settings, &url).await,
        Commands::List => cmd_list(&settings).await,
        Commands::Clear { url } => cmd_clear(&settings, url.as_deref()).await,
    }
}

// ============================================================================
// Wiring
// ============================================================================

async fn open_store(settings: &Settings) -> Result<Arc<SqliteStore>> {
    let store = SqliteStore::new(&settings.database_url)
        .await
        .context("Failed to open cache database")?;
    Ok(Arc::new(store))
}

fn relay(settings: &Settings) -> Result<Arc<RelayClient>> {
    let client = RelayClient::new(&settings.relay_url).context("Invalid relay URL")?;
    Ok(Arc::new(client))
}

async fn page_scraper(html: Option<&Path>, config: &BriefingConfig) -> Result<Arc<PageScraper>> {
    let source: Arc<dyn DocumentSource> = match html {
        Some(path) => {
            let html = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Arc::new(StaticDocument::new(html))
        }
        None => Arc::new(HttpDocumentSource::new().context("Failed to build HTTP client")?),
    };

    Ok(Arc::new(HtmlProfileScraper::from_config(source, config)))
}

async fn popup_session(
    settings: &Settings,
    url: &str,
    html: Option<&Path>,
    on_demand: bool,
) -> Result<Session> {
    let mut config = settings.briefing_config();
    if on_demand {
        config = config.with_popup_mode(PopupMode::OnDemand);
    }

    let store = open_store(settings).await?;
    let scraper = page_scraper(html, &config).await?;

    Ok(PopupSession::new(url, store, relay(settings)?, scraper).with_config(config))
}

// ============================================================================
// Commands
// ============================================================================

async fn cmd_prefetch(settings: &Settings, url: &str, html: Option<&Path>) -> Result<()> {
    let config = settings.briefing_config();
    let coordinator = PrefetchCoordinator::new(
        open_store(settings).await?,
        relay(settings)?,
        page_scraper(html, &config).await?,
    )
    .with_config(config)
    .with_signal(Arc::new(LogSignal));

    match coordinator.run(url).await? {
        PrefetchOutcome::Fresh => {
            println!("{} cached bundle is still fresh", "skip".yellow());
        }
        PrefetchOutcome::AlreadyRunning => {
            println!("{} prefetch already running", "skip".yellow());
        }
        PrefetchOutcome::ScrapeFailed { reason } => {
            println!("{} {}", "scrape failed".red(), reason);
        }
        PrefetchOutcome::AllFailed => {
            println!("{} both summaries failed, nothing cached", "error".red());
        }
        PrefetchOutcome::Written(entry) => {
            println!("{} {}", "cached".green(), PageIdentity::from_address(url));
            print_outcome("Direct", &entry.direct);
            print_outcome("Web", &entry.web_augmented);
        }
    }

    Ok(())
}

async fn cmd_open(
    settings: &Settings,
    url: &str,
    html: Option<&Path>,
    on_demand: bool,
    web: bool,
) -> Result<()> {
    let session = popup_session(settings, url, html, on_demand).await?;

    session.open().await;
    print_view(&session.snapshot());

    if web {
        session
            .request_web_summary()
            .await
            .context("Web summary unavailable")?;
        print_view(&session.snapshot());
    }

    session.close();
    Ok(())
}

async fn cmd_ask(
    settings: &Settings,
    url: &str,
    question: &str,
    html: Option<&Path>,
    web_search: bool,
    on_demand: bool,
) -> Result<()> {
    let session = popup_session(settings, url, html, on_demand).await?;

    session.open().await;
    let reply = session.ask(question, web_search).await?;
    println!("{} {}", "assistant:".cyan().bold(), reply.content);

    session.close();
    Ok(())
}

async fn cmd_show(settings: &Settings, url: &str) -> Result<()> {
    let store = open_store(settings).await?;
    let identity = PageIdentity::from_address(url);
    let config = settings.briefing_config();

    let Some(entry) = store.get(&identity).await? else {
        println!("{} nothing cached for {}", "miss".yellow(), identity);
        return Ok(());
    };

    let now = Utc::now();
    let fresh = is_fresh(&entry, now, config.freshness_window);
    let age = now.signed_duration_since(entry.created_at);

    println!(
        "{} {} ({}, {}m old)",
        identity.to_string().bold(),
        entry.created_at.to_rfc3339(),
        if fresh { "fresh".green() } else { "stale".red() },
        age.num_minutes()
    );
    print_outcome("Direct", &entry.direct);
    print_outcome("Web", &entry.web_augmented);

    Ok(())
}

async fn cmd_list(settings: &Settings) -> Result<()> {
    let store = open_store(settings).await?;
    let identities = store.identities().await?;

    if identities.is_empty() {
        println!("No cached pages");
        return Ok(());
    }

    for identity in identities {
        println!("{identity}");
    }
    Ok(())
}

async fn cmd_clear(settings: &Settings, url: Option<&str>) -> Result<()> {
    let store = open_store(settings).await?;

    match url {
        Some(url) => {
            let identity = PageIdentity::from_address(url);
            store.remove(&identity).await?;
            println!("{} {}", "removed".green(), identity);
        }
        None => {
            let removed = store.clear().await?;
            println!("{} {} cached pages", "removed".green(), removed);
        }
    }
    Ok(())
}

// ============================================================================
// Output
// ============================================================================

fn print_outcome(label: &str, outcome: &SummaryOutcome) {
    match outcome {
        SummaryOutcome::Summary { summary } => {
            println!("\n{}\n{}", label.bold(), format_summary(summary));
        }
        SummaryOutcome::Error { error } => {
            println!("\n{} {}", label.bold(), error.red());
        }
    }
}

fn print_view(view: &PopupView) {
    if let Some(notice) = &view.notice {
        println!("{} {}", "notice:".yellow(), notice);
    }

    match &view.panel {
        Panel::Summary { text, source } => {
            println!("{} {:?}", "source:".dimmed(), source);
            println!("{text}");
        }
        Panel::Error { message } => println!("{}", message.red()),
        Panel::TimedOut => println!("{}", view.panel.text().yellow()),
        panel => println!("{}", panel.text()),
    }

    for turn in &view.transcript {
        let who = match turn.role {
            ChatRole::User => "you:".bold(),
            ChatRole::Assistant => "assistant:".cyan().bold(),
        };
        println!("{} {}", who, turn.content);
    }
}
