use anyhow::Context;
use clap::{Parser, Subcommand};
use pricetag_core::GeoPoint;
use pricetag_ocr::{ExifTool, Extractor, ExtractorConfig, ZbarImg};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

/// Read the price and barcode off a price tag photo
#[derive(Parser)]
#[command(name = "pricetag")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract price and barcode from one photo
    Scan {
        photo: PathBuf,

        /// Copy the photo into this content-addressed store before extraction
        #[arg(long)]
        store: Option<PathBuf>,

        /// Capture latitude, written into the stored copy
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Capture longitude, written into the stored copy
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// Watch an intake folder and scan every new photo
    Watch {
        dir: PathBuf,

        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config,
}

#[cfg(feature = "tesseract")]
fn recognizer(config: &ExtractorConfig) -> pricetag_ocr::LeptessRecognizer {
    pricetag_ocr::LeptessRecognizer::new(config.recognition.tessdata_dir.clone())
}

#[cfg(not(feature = "tesseract"))]
fn recognizer(config: &ExtractorConfig) -> pricetag_ocr::TesseractCli {
    pricetag_ocr::TesseractCli::new(config.recognition.tesseract_bin.clone())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // stdout carries the JSON reports.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => ExtractorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ExtractorConfig::default(),
    };

    let injector = ExifTool::new(config.geotag.exiftool_bin.clone());
    let extractor = Extractor::new(
        recognizer(&config),
        ZbarImg::new(config.barcode.zbarimg_bin.clone()),
        config,
    );

    match cli.command {
        Commands::Scan { photo, store, lat, lon } => {
            let point = match (lat, lon) {
                (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)?),
                _ => None,
            };
            let report =
                commands::scan(&extractor, &injector, &photo, store.as_deref(), point).await?;
            println!("{}", serde_json::to_string(&report)?);
        }
        Commands::Watch { dir, store } => {
            commands::watch(&extractor, &injector, &dir, store.as_deref()).await?;
        }
        Commands::Config => {
            print!("{}", extractor.config().to_toml_string()?);
        }
    }
    Ok(())
}
