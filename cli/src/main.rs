//! Isochrone CLI - binary entry point.
//!
//! ```text
//! Cli::parse() -> load config -> build request -> GoogleMapsClient -> compute_isochrone -> stdout
//! ```
//!
//! Search parameters resolve as command line flag, then config file, then
//! built-in default. Logs go to stderr so stdout stays machine-readable.

mod output;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use isochrone_config::{IsochroneConfig, resolve_api_key};
use isochrone_core::{
    DEFAULT_NUMBER_OF_ANGLES, DEFAULT_TOLERANCE_MINUTES, IsochroneRequest, compute_isochrone,
};
use isochrone_providers::distance_matrix::MAX_DESTINATIONS_PER_REQUEST;
use isochrone_providers::retry::RetryConfig;
use isochrone_providers::{GoogleMapsClient, GoogleMapsConfig};
use isochrone_types::{ApiKey, Avoid, TravelMode};

use output::{OutputFormat, Report};

#[derive(Debug, Parser)]
#[command(name = "isochrone", version)]
#[command(about = "Compute the area reachable from an origin within a travel time")]
struct Cli {
    /// Origin address, or a "lat,lng" pair
    #[arg(allow_hyphen_values = true)]
    origin: String,

    /// Travel time budget in minutes
    #[arg(short, long)]
    duration: String,

    /// Number of equally spaced bearings to search
    #[arg(short, long)]
    angles: Option<usize>,

    /// Acceptable deviation from the budget, in minutes
    #[arg(short, long)]
    tolerance: Option<f64>,

    /// driving, walking, bicycling or transit
    #[arg(long, value_parser = TravelMode::parse)]
    mode: Option<TravelMode>,

    /// Comma-separated features to avoid (tolls, highways, ferries, indoor), or "none"
    #[arg(long)]
    avoid: Option<String>,

    /// Use live traffic for a departure right now
    #[arg(long)]
    departure_now: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Config file (default: ~/.isochrone/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log search progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn load_config(explicit: Option<&Path>) -> Result<Option<IsochroneConfig>> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("config file {} does not exist", path.display());
            }
            Ok(IsochroneConfig::load_from(path)?)
        }
        None => Ok(IsochroneConfig::load()?),
    }
}

fn parse_avoid(raw: &str) -> Result<Vec<Avoid>> {
    if raw.trim().eq_ignore_ascii_case("none") {
        return Ok(Vec::new());
    }
    Ok(Avoid::parse_list(raw)?)
}

fn build_request(cli: &Cli, config: Option<&IsochroneConfig>) -> Result<IsochroneRequest> {
    let search = config.and_then(|c| c.search.as_ref());
    let angles = cli
        .angles
        .or_else(|| search.and_then(|s| s.number_of_angles))
        .unwrap_or(DEFAULT_NUMBER_OF_ANGLES);
    if angles > MAX_DESTINATIONS_PER_REQUEST {
        bail!(
            "invalid number of angles {angles}: at most {MAX_DESTINATIONS_PER_REQUEST} fit in one Distance Matrix call"
        );
    }
    let tolerance = cli
        .tolerance
        .or_else(|| search.and_then(|s| s.tolerance))
        .unwrap_or(DEFAULT_TOLERANCE_MINUTES);

    let mut options = config
        .map(IsochroneConfig::travel_options)
        .unwrap_or_default();
    if let Some(mode) = cli.mode {
        options.mode = mode;
    }
    if let Some(avoid) = &cli.avoid {
        options.avoid = parse_avoid(avoid).context("invalid --avoid")?;
    }
    if cli.departure_now {
        options.departure_now = true;
    }

    let request = IsochroneRequest::parse(&cli.origin, &cli.duration, angles, tolerance)?;
    Ok(request.with_options(options))
}

fn client_config(api_key: ApiKey, config: Option<&IsochroneConfig>) -> GoogleMapsConfig {
    let mut client = GoogleMapsConfig::new(api_key);
    let Some(config) = config else {
        return client;
    };

    if let Some(base_url) = config.base_url() {
        client = client.with_base_url(base_url);
    }
    if let Some(google) = &config.google {
        if let Some(secs) = google.timeout_secs {
            client = client.with_timeout(Duration::from_secs(secs));
        }
        if let Some(ms) = google.min_call_interval_ms {
            client = client.with_min_call_interval(Duration::from_millis(ms));
        }
        if let Some(max_retries) = google.max_retries {
            client = client.with_retry(RetryConfig::default().with_max_retries(max_retries));
        }
    }
    client
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let request = build_request(&cli, config.as_ref())?;

    let api_key = resolve_api_key(config.as_ref()).ok_or_else(|| {
        anyhow!(
            "no Google Maps API key: set {} or [api] key in the config file",
            ApiKey::ENV_VAR
        )
    })?;
    let client = GoogleMapsClient::new(client_config(api_key, config.as_ref()))
        .context("failed to create Google Maps client")?;

    tracing::debug!(
        origin = %request.origin,
        duration_minutes = request.params.duration_minutes(),
        angles = request.params.number_of_angles(),
        mode = %request.options.mode,
        "Starting isochrone search"
    );
    let isochrone = compute_isochrone(&client, &client, &request)
        .await
        .context("isochrone search failed")?;

    let report = Report::new(&isochrone, request.params.duration_minutes());
    println!("{}", report.render(cli.format)?);
    Ok(())
}
