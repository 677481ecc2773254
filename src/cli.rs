//! CLI parsing and orchestration. Parses args, resolves settings, runs one adapter or
//! collaborator call and prints the result as JSON on stdout. Maps errors to exit codes.

use crate::config::{self, Config};
use crate::scraper::{
    build_adapter, CategoryKind, HttpClient, ScraperError, SourceAdapter, SourceKind,
    SourceSettings, DEFAULT_AUX_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS,
};
use crate::services::{
    HttpImageProxy, ImageProxy, MetadataEnricher, ServiceError, StreamExtractor, TmdbClient,
    YtDlpExtractor,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Scraper(#[from] ScraperError),

    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("{0}")]
    Output(String),
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) => 1,
            CliRunError::Scraper(_) => 2,
            CliRunError::Service(_) | CliRunError::Output(_) => 3,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "reelscrape")]
#[command(about = "Fetch normalized movie metadata from ophim-style APIs or phimmoi-style sites")]
#[command(
    after_help = "Config file keys (source, api_base, image_base, site_base, user_agent, timeout_secs, aux_timeout_secs, grid_limit, tmdb_api_key, accept_invalid_certs, extractor_program, extractor_timeout_secs) are read from ./reelscrape.toml or the user config dir. CLI flags override config."
)]
pub struct Args {
    /// Upstream to read from: ophim (JSON API) or phimmoi (HTML site).
    #[arg(long, global = true, value_parser = parse_source)]
    pub source: Option<SourceKind>,

    /// Debug logging and the full error cause chain.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Request timeout in seconds (overrides config; default 30).
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// HTTP User-Agent (overrides config).
    #[arg(long, global = true)]
    pub user_agent: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List movies in a category (empty or "home" for the latest updates).
    List {
        category: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Return at most this many movies.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Search by keyword.
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Full record for one slug, episodes included.
    Detail { slug: String },
    /// Genre filters offered by the source.
    Genres,
    /// Country filters offered by the source.
    Countries,
    /// Resolve a playable page or playlist URL into a direct stream (needs yt-dlp).
    Extract {
        url: String,
        /// Height cap such as 720p or 1080p.
        #[arg(long)]
        quality: Option<String>,
    },
    /// Look up synopsis, cast and ratings on TMDB.
    Enrich {
        title: String,
        #[arg(long)]
        year: Option<u32>,
    },
    /// Download an image through the proxy and write it to a file.
    Image {
        url: String,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, default_value_t = 0)]
        width: u32,
    },
}

fn parse_source(s: &str) -> Result<SourceKind, String> {
    SourceKind::parse(s).ok_or_else(|| {
        format!(
            "Invalid --source value: '{}'. Use 'ophim' or 'phimmoi'.",
            s
        )
    })
}

/// Defaults, then config file, then CLI flags.
fn resolve_settings(args: &Args, config: &Config) -> SourceSettings {
    let defaults = SourceSettings::default();
    let grid_limit = match &args.command {
        Command::List {
            limit: Some(limit), ..
        } => *limit,
        _ => config.grid_limit.unwrap_or(defaults.grid_limit),
    };
    SourceSettings {
        api_base: config.api_base.clone().unwrap_or(defaults.api_base),
        image_prefix: config.image_base.clone().unwrap_or(defaults.image_prefix),
        site_base: config.site_base.clone().unwrap_or(defaults.site_base),
        user_agent: args.user_agent.clone().or_else(|| config.user_agent.clone()),
        timeout_secs: args
            .timeout
            .or(config.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS),
        grid_limit,
        accept_invalid_certs: config.accept_invalid_certs.unwrap_or(false),
    }
}

fn resolve_source(args: &Args, config: &Config) -> Result<SourceKind, CliRunError> {
    if let Some(kind) = args.source {
        return Ok(kind);
    }
    match config.source.as_deref() {
        None => Ok(SourceKind::Ophim),
        Some(s) => parse_source(s)
            .map_err(|_| CliRunError::InvalidInput(format!("Invalid source in config: '{}'", s))),
    }
}

/// Client for TMDB and image lookups.
fn aux_client(settings: &SourceSettings, config: &Config) -> Result<HttpClient, CliRunError> {
    let mut builder = HttpClient::builder()
        .timeout_secs(config.aux_timeout_secs.unwrap_or(DEFAULT_AUX_TIMEOUT_SECS))
        .accept_invalid_certs(settings.accept_invalid_certs);
    if let Some(ua) = &settings.user_agent {
        builder = builder.user_agent(ua.clone());
    }
    Ok(builder.build()?)
}

fn extractor_for(config: &Config) -> YtDlpExtractor {
    let extractor = match &config.extractor_program {
        Some(program) => YtDlpExtractor::new(program.clone()),
        None => YtDlpExtractor::default(),
    };
    match config.extractor_timeout_secs {
        Some(secs) => extractor.timeout_secs(secs),
        None => extractor,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliRunError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)
        .map_err(|e| CliRunError::Output(format!("Failed to write JSON: {}", e)))?;
    writeln!(out).map_err(|e| CliRunError::Output(format!("Failed to write JSON: {}", e)))
}

/// Ensure output path parent exists.
fn validate_output_path(path: &Path) -> Result<(), CliRunError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(CliRunError::InvalidInput(format!(
                "Cannot write output: {}: parent directory does not exist.",
                path.display()
            )));
        }
    }
    Ok(())
}

fn require_non_blank(value: &str, what: &str) -> Result<(), CliRunError> {
    if value.trim().is_empty() {
        return Err(CliRunError::InvalidInput(format!("{} must not be empty.", what)));
    }
    Ok(())
}

fn run_adapter(adapter: &dyn SourceAdapter, command: &Command) -> Result<(), CliRunError> {
    match command {
        Command::List {
            category,
            page,
            limit,
        } => {
            let mut movies = adapter.fetch_list(category.as_deref().unwrap_or(""), *page)?;
            if let Some(limit) = limit {
                movies.truncate(*limit);
            }
            info!(source = adapter.name(), count = movies.len(), "listed");
            print_json(&movies)
        }
        Command::Search { query, page } => {
            require_non_blank(query, "Search query")?;
            let movies = adapter.search(query, *page)?;
            info!(source = adapter.name(), count = movies.len(), "searched");
            print_json(&movies)
        }
        Command::Detail { slug } => {
            require_non_blank(slug, "Slug")?;
            let movie = adapter.fetch_detail(slug.trim())?;
            info!(
                source = adapter.name(),
                slug = %movie.slug,
                episodes = movie.episodes.len(),
                "fetched detail"
            );
            print_json(&movie)
        }
        Command::Genres => print_json(&adapter.fetch_categories(CategoryKind::Genre)?),
        Command::Countries => print_json(&adapter.fetch_categories(CategoryKind::Country)?),
        _ => Err(CliRunError::InvalidInput(
            "Not an adapter command.".to_string(),
        )),
    }
}

/// Entry point for the CLI. Returns Ok(()) on success; Err with exit code and message on failure.
pub fn run(args: &Args) -> Result<(), CliRunError> {
    let config = config::load_config()
        .map_err(CliRunError::InvalidInput)?
        .unwrap_or_default();
    let settings = resolve_settings(args, &config);

    match &args.command {
        Command::Extract { url, quality } => {
            require_non_blank(url, "URL")?;
            let info = extractor_for(&config).extract(url, quality.as_deref())?;
            print_json(&info)
        }
        Command::Enrich { title, year } => {
            require_non_blank(title, "Title")?;
            let client = TmdbClient::new(aux_client(&settings, &config)?, config.tmdb_api_key());
            print_json(&client.enrich(title.trim(), *year)?)
        }
        Command::Image { url, output, width } => {
            validate_output_path(output)?;
            let proxy = HttpImageProxy::new(aux_client(&settings, &config)?);
            let image = proxy.fetch(url, *width)?;
            std::fs::write(output, &image.bytes).map_err(|e| {
                CliRunError::Output(format!("Cannot write {}: {}", output.display(), e))
            })?;
            info!(path = %output.display(), content_type = %image.content_type, "wrote image");
            Ok(())
        }
        command => {
            let kind = resolve_source(args, &config)?;
            let adapter = build_adapter(kind, &settings).map_err(|e| match e {
                ScraperError::InvalidUrl { input, reason } => CliRunError::InvalidInput(format!(
                    "Invalid base URL in config: {}: {}",
                    input, reason
                )),
                other => CliRunError::Scraper(other),
            })?;
            run_adapter(adapter.as_ref(), command).map_err(|e| {
                if let CliRunError::Scraper(inner) = &e {
                    if inner.is_transport() {
                        warn!(
                            source = adapter.name(),
                            timeout_secs = settings.timeout_secs,
                            "upstream unreachable; check the base URL, network or --timeout"
                        );
                    }
                }
                e
            })
        }
    }
}
