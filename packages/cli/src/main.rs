#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for `GeoSpy`.
//!
//! Geolocates an image through the configured vision provider, or replays a
//! saved inference result, and prints the ranked predictions, comparison
//! table, confidence distribution, and map summary. Can also start the API
//! server.
//!
//! Uses `indicatif-log-bridge` (via [`geospy_cli_utils::init_logger`]) so
//! log lines and the analysis spinner never fight for the terminal.

mod interactive;
mod render;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use geospy_ai::LocateRequest;
use geospy_ai::failure::UpstreamFailure;
use geospy_ai::image::ImageSource;
use geospy_ai::providers::LocationProvider;
use geospy_cli_utils::{MultiProgress, Spinner};
use geospy_location_models::RawAnalysis;
use geospy_pipeline::config::PipelineConfig;
use geospy_pipeline::export::{write_csv, write_geojson};
use geospy_pipeline::{AnalysisOutcome, analyze};

#[derive(Parser)]
#[command(name = "geospy", about = "Image geolocation and location result viewer")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output options shared by commands that produce a report.
#[derive(clap::Args, Default)]
struct OutputArgs {
    /// Number of ranking cards to show (overrides the config)
    #[arg(long)]
    limit: Option<usize>,
    /// Write the comparison table as CSV
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,
    /// Write the map as a `GeoJSON` feature collection
    #[arg(long, value_name = "PATH")]
    geojson: Option<PathBuf>,
    /// Pipeline config TOML (defaults to `GEOSPY_PIPELINE_CONFIG`, then
    /// the built-in config)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a saved inference result
    Present {
        /// JSON file with `interpretation`/`locations` or `error`/`details`
        result: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Geolocate an image file or URL
    Locate {
        /// Local path or `http(s)` URL
        image: String,
        /// Additional context for the model (time, weather, landmarks)
        #[arg(long)]
        context: Option<String>,
        /// Your guess at the location
        #[arg(long)]
        hint: Option<String>,
        /// Save the raw result as JSON
        #[arg(long, value_name = "PATH")]
        save: Option<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Start the API server
    Serve,
    /// Guided mode with prompts
    Interactive,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = geospy_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Present { result, output } => {
            let config = load_config(&output)?;
            let raw = read_result(&result)?;
            show(&raw, None, &config, &output)?;
        }
        Commands::Locate {
            image,
            context,
            hint,
            save,
            output,
        } => {
            let config = load_config(&output)?;
            let provider = geospy_ai::providers::create_provider_from_env()?;
            let source = ImageSource::parse(&image);
            let (raw, failure) =
                locate(&multi, provider.as_ref(), &source, context, hint).await?;
            if let Some(path) = save {
                save_result(&raw, &path)?;
            }
            show(&raw, failure.as_ref(), &config, &output)?;
        }
        Commands::Serve => serve().await?,
        Commands::Interactive => interactive::run(&multi).await?,
    }

    Ok(())
}

/// Loads the pipeline config, applying the `--limit` override.
fn load_config(output: &OutputArgs) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    let mut config = match &output.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::from_env()?,
    };
    if let Some(limit) = output.limit {
        config.ranking_limit = limit;
    }
    Ok(config)
}

fn read_result(path: &Path) -> Result<RawAnalysis, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    Ok(serde_json::from_str(&text)?)
}

fn save_result(raw: &RawAnalysis, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, raw)?;
    log::info!("Saved result to {}", path.display());
    Ok(())
}

/// Loads the image and asks the provider where it was taken.
///
/// Image loading problems are returned as errors; provider failures are
/// folded into the result.
async fn locate(
    multi: &MultiProgress,
    provider: &dyn LocationProvider,
    source: &ImageSource,
    context: Option<String>,
    hint: Option<String>,
) -> Result<(RawAnalysis, Option<UpstreamFailure>), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let image = source.load(&client).await?;
    let request = LocateRequest::new(image, context, hint);

    let spinner = Spinner::start(
        multi,
        &format!("Analyzing {} with {}", source.describe(), provider.name()),
    );
    let (raw, failure) = geospy_ai::locate_classified(provider, &request).await;
    spinner.finish(if failure.is_some() {
        "Analysis failed"
    } else {
        "Analysis complete"
    });

    Ok((raw, failure))
}

/// Prints the report and writes any requested exports.
fn show(
    raw: &RawAnalysis,
    failure: Option<&UpstreamFailure>,
    config: &PipelineConfig,
    output: &OutputArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = analyze(raw, config);
    println!();
    print!("{}", render::outcome(&outcome, failure));

    let AnalysisOutcome::Located(report) = &outcome else {
        if output.csv.is_some() || output.geojson.is_some() {
            log::warn!("Nothing to export: the analysis has no locations");
        }
        return Ok(());
    };

    if let Some(path) = &output.csv {
        write_csv(&report.table, BufWriter::new(File::create(path)?))?;
        log::info!("Wrote comparison table to {}", path.display());
    }

    if let Some(path) = &output.geojson {
        match &report.map {
            Some(map) => {
                write_geojson(map, BufWriter::new(File::create(path)?))?;
                log::info!("Wrote map to {}", path.display());
            }
            None => log::warn!("Nothing to export: no location has valid coordinates"),
        }
    }

    Ok(())
}

/// Runs the server on its own actix system.
async fn serve() -> Result<(), Box<dyn std::error::Error>> {
    // actix-web drives its own runtime; keep it off the tokio workers.
    tokio::task::spawn_blocking(|| {
        actix_web::rt::System::new().block_on(geospy_server::run_server())
    })
    .await??;
    Ok(())
}
