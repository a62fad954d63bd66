use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use rollcrawl_client::query::DEFAULT_HOST;
use rollcrawl_client::{ReqwestQuery, ScraperResolver, ScraperTranscriber};
use rollcrawl_core::dsv::header_line;
use rollcrawl_core::interval::IntervalConfig;
use rollcrawl_core::{
    CrawlService, FormatOptions, Scheduler, SchedulerConfig, SeenIds, TracingSchedulerReporter,
};
use rollcrawl_store::{DsvFileStore, OutputLayout, read_ids};

#[derive(Parser)]
#[command(name = "rollcrawl", version, about = "Dice-roll log crawler with DSV output")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct FormatArgs {
    /// Quote character of the output (one ASCII character)
    #[arg(short, long, env = "ROLLCRAWL_QUOTE", default_value = "\"", value_parser = parse_format_char)]
    quote: char,

    /// Field delimiter of the output (one ASCII character, `\t` or `tab` for a tab)
    #[arg(short, long, env = "ROLLCRAWL_DELIMITER", default_value = "\\t", value_parser = parse_format_char)]
    delimiter: char,
}

impl FormatArgs {
    fn options(&self) -> Result<FormatOptions> {
        FormatOptions::new(self.quote, self.delimiter).context("Invalid output format")
    }
}

#[derive(Args, Debug)]
struct RemoteArgs {
    /// Host (or base URL) serving idlook.php and dicelook.php
    #[arg(long, env = "ROLLCRAWL_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// HTTP request timeout in seconds
    #[arg(long, env = "ROLLCRAWL_TIMEOUT", default_value_t = 30)]
    timeout: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl new rolls forever, appending them to the output
    Crawl {
        #[command(flatten)]
        remote: RemoteArgs,

        #[command(flatten)]
        format: FormatArgs,

        /// Output file, or directory with --per-character
        /// [default: rolls.<ext>, or rolls/ with --per-character]
        #[arg(short, long, env = "ROLLCRAWL_OUTPUT")]
        output: Option<PathBuf>,

        /// Write one file per character instead of a single file
        #[arg(long, default_value_t = false)]
        per_character: bool,

        /// Base wait between cycles, in seconds
        #[arg(long, env = "ROLLCRAWL_INTERVAL", default_value_t = 60)]
        interval: u64,

        /// Maximum random extra wait between cycles, in seconds
        #[arg(long, env = "ROLLCRAWL_JITTER", default_value_t = 30)]
        jitter: u64,

        /// Lowest roll ID handed out by the site
        #[arg(long, default_value_t = 1)]
        first_id: u64,

        /// Stop after this many cycles
        #[arg(long)]
        max_cycles: Option<u64>,
    },

    /// Crawl a single roll ID and print the character's rolls to stdout
    Fetch {
        /// Roll ID to look up
        id: u64,

        #[command(flatten)]
        remote: RemoteArgs,

        #[command(flatten)]
        format: FormatArgs,

        /// Print the header line first
        #[arg(long, default_value_t = false)]
        header: bool,
    },

    /// Print the lowest ID missing from existing DSV files
    MissingId {
        /// Files to read IDs from
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        format: FormatArgs,

        /// Zero-based column holding the ID
        #[arg(long, default_value_t = 0)]
        column: usize,

        /// The files have no header line
        #[arg(long, default_value_t = false)]
        no_headers: bool,

        /// Lowest valid ID
        #[arg(long, default_value_t = 1)]
        first_id: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("rollcrawl=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl {
            remote,
            format,
            output,
            per_character,
            interval,
            jitter,
            first_id,
            max_cycles,
        } => {
            let format = format.options()?;
            let layout = output_layout(output, per_character, &format);
            let interval = IntervalConfig::new(Duration::from_secs(interval))
                .with_jitter(Duration::from_secs(jitter));
            let mut config = SchedulerConfig::default()
                .with_interval(interval)
                .with_first_id(first_id);
            if let Some(max) = max_cycles {
                config = config.with_max_cycles(max);
            }
            cmd_crawl(&remote, format, layout, config).await?;
        }
        Commands::Fetch {
            id,
            remote,
            format,
            header,
        } => {
            let format = format.options()?;
            cmd_fetch(id, &remote, &format, header).await?;
        }
        Commands::MissingId {
            files,
            format,
            column,
            no_headers,
            first_id,
        } => {
            let format = format.options()?;
            cmd_missing_id(&files, &format, column, !no_headers, first_id)?;
        }
    }

    Ok(())
}

/// Accepts one character, or `\t` / `tab` for a tab.
fn parse_format_char(raw: &str) -> Result<char, String> {
    match raw {
        "\\t" | "tab" => return Ok('\t'),
        _ => {}
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        (None, _) => Err("may not be empty".to_string()),
        _ => Err(format!("expected a single character, got '{raw}'")),
    }
}

fn output_layout(output: Option<PathBuf>, per_character: bool, format: &FormatOptions) -> OutputLayout {
    match (output, per_character) {
        (Some(dir), true) => OutputLayout::PerCharacter(dir),
        (None, true) => OutputLayout::PerCharacter(PathBuf::from("rolls")),
        (Some(file), false) => OutputLayout::SingleFile(file),
        (None, false) => OutputLayout::SingleFile(PathBuf::from(format!("rolls.{}", format.extension()))),
    }
}

fn crawl_service(
    remote: &RemoteArgs,
) -> Result<CrawlService<ReqwestQuery, ScraperResolver, ScraperTranscriber>> {
    let query = ReqwestQuery::with_timeout(&remote.host, Duration::from_secs(remote.timeout))
        .context("Failed to create HTTP client")?;
    Ok(CrawlService::new(
        query,
        ScraperResolver::new()?,
        ScraperTranscriber::new()?,
    ))
}

async fn cmd_crawl(
    remote: &RemoteArgs,
    format: FormatOptions,
    layout: OutputLayout,
    config: SchedulerConfig,
) -> Result<()> {
    let store = DsvFileStore::new(layout, format);
    let mut seen = store
        .load_seen_ids()
        .context("Failed to read IDs from existing output")?;
    tracing::info!(
        seen = seen.len(),
        output = ?store.layout(),
        "Loaded existing output"
    );

    let scheduler = Scheduler::new(crawl_service(remote)?, store, format, config);

    // Stop between cycles on Ctrl-C
    let cancel_token = CancellationToken::new();
    let signal_token = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, stopping after the current cycle");
            signal_token.cancel();
        }
    });

    let summary = scheduler
        .run(&mut seen, cancel_token, &TracingSchedulerReporter)
        .await?;

    tracing::info!(
        cycles = summary.cycles,
        persisted = summary.persisted,
        rows = summary.rows,
        "Crawl finished"
    );
    Ok(())
}

async fn cmd_fetch(id: u64, remote: &RemoteArgs, format: &FormatOptions, header: bool) -> Result<()> {
    let service = crawl_service(remote)?;
    let mut seen = SeenIds::new();
    let output = service.crawl(id, format, &mut seen).await?;

    tracing::info!(character = %output.display_name, rows = output.rows, "Fetched rolls");

    if header {
        print!("{}", header_line(format));
    }
    print!("{}", output.dsv);
    Ok(())
}

fn cmd_missing_id(
    files: &[PathBuf],
    format: &FormatOptions,
    column: usize,
    has_headers: bool,
    first_id: u64,
) -> Result<()> {
    let mut seen = SeenIds::new();
    for file in files {
        let ids = read_ids(file, format, column, has_headers)
            .with_context(|| format!("Failed to read IDs from {}", file.display()))?;
        seen.extend(ids);
    }

    println!("{}", seen.lowest_missing(first_id));
    Ok(())
}
