//! menu-ocr - Menu and price-list extraction
//!
//! Turns photographs of printed menus into structured entries
//! (category, item, price, description) from OCR word boxes.

mod analysis;
mod app;
mod batch;
mod config;
mod server;
mod storage;
mod vision;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::MenuExtractor;
use crate::config::AppConfig;
use crate::server::ServerState;
use crate::storage::Database;
use crate::vision::{OcrEngine, TesseractCli};

/// menu-ocr - extract menu entries from menu photographs
#[derive(Parser, Debug)]
#[command(name = "menu-ocr")]
#[command(about = "Extract categories, items, prices and descriptions from menu photos")]
struct Args {
    /// Configuration file (defaults to config.toml in the config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract entries from a single image and print them as JSON
    Extract {
        /// Image file
        image: PathBuf,

        /// Store the entries for this vendor
        #[arg(long)]
        vendor_id: Option<i64>,
    },
    /// Process every image in a folder and store the entries
    Batch {
        /// Folder containing menu images
        folder: PathBuf,

        /// Vendor the entries belong to
        #[arg(long)]
        vendor_id: i64,

        /// Print the entries without storing them
        #[arg(long)]
        no_persist: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the entries stored for a vendor
    Show {
        /// Vendor whose entries to list
        vendor_id: i64,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Run the upload service
    Serve {
        /// Listen address (overrides the configuration)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Write the default configuration file
    InitConfig,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Command::InitConfig = args.command {
        return init_config(args.config.as_deref());
    }

    let config = load_or_create_config(args.config.as_deref())?;

    if let Command::Show { vendor_id, json } = args.command {
        return run_show(&config, vendor_id, json);
    }

    let extractor = MenuExtractor::new(&config, ocr_engine(&config));

    match args.command {
        Command::Extract { image, vendor_id } => run_extract(&config, &extractor, &image, vendor_id),
        Command::Batch {
            folder,
            vendor_id,
            no_persist,
            json,
        } => run_batch(&config, &extractor, &folder, vendor_id, !no_persist, json),
        Command::Serve { bind } => run_server(config, extractor, bind),
        Command::Show { .. } | Command::InitConfig => Ok(()),
    }
}

/// Load configuration from an explicit path, the config directory, or defaults
fn load_or_create_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        let config = config::load_config(path)?;
        info!("Loaded configuration from {:?}", path);
        return Ok(config);
    }

    if let Ok(config_dir) = storage::get_config_dir() {
        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            let config = config::load_config(&config_path)?;
            info!("Loaded configuration from {:?}", config_path);
            return Ok(config);
        }
    }
    info!("Using default configuration");
    Ok(AppConfig::default())
}

fn init_config(explicit: Option<&Path>) -> Result<()> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => storage::get_config_dir()?.join("config.toml"),
    };
    config::save_config(&AppConfig::default(), &path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

/// Linked Tesseract when built with the `tesseract` feature, else the CLI
#[cfg(feature = "tesseract")]
fn ocr_engine(config: &AppConfig) -> Box<dyn OcrEngine> {
    match vision::LibTesseract::from_settings(&config.ocr) {
        Ok(engine) => Box::new(engine),
        Err(e) => {
            warn!("{e}; falling back to the tesseract command line tool");
            Box::new(TesseractCli::from_settings(&config.ocr))
        }
    }
}

#[cfg(not(feature = "tesseract"))]
fn ocr_engine(config: &AppConfig) -> Box<dyn OcrEngine> {
    Box::new(TesseractCli::from_settings(&config.ocr))
}

/// Store entries, reporting failure as a flag so extracted data is never lost
fn persist(config: &AppConfig, entries: &[analysis::MenuEntry], vendor_id: i64) -> bool {
    let stored = storage::resolve_database_path(config.storage.database_path.as_ref())
        .and_then(|path| Ok(Database::open(&path)?))
        .and_then(|mut db| Ok(db.insert_entries(entries, vendor_id)?));

    match stored {
        Ok(count) => {
            info!("Inserted {} entries for vendor {}", count, vendor_id);
            true
        }
        Err(e) => {
            error!("Failed to store entries: {:#}", e);
            false
        }
    }
}

fn run_extract(config: &AppConfig, extractor: &MenuExtractor, image: &Path, vendor_id: Option<i64>) -> Result<()> {
    let name = image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| image.display().to_string());

    let entries = extractor
        .process_image(image, &name)
        .with_context(|| format!("Failed to process {}", image.display()))?;

    if entries.is_empty() {
        println!("No menu items found");
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&entries)?);

    if let Some(vendor_id) = vendor_id {
        persist(config, &entries, vendor_id);
    }
    Ok(())
}

fn run_batch(
    config: &AppConfig,
    extractor: &MenuExtractor,
    folder: &Path,
    vendor_id: i64,
    store: bool,
    json: bool,
) -> Result<()> {
    let report = batch::process_folder(extractor, folder, &config.batch.extensions)?;

    if report.entries.is_empty() {
        println!("No menu data extracted from images.");
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report.entries)?);
    } else {
        println!("\nParsed Menu Data:\n");
        print!("{}", batch::render_table(&report.entries));
    }

    for (path, message) in &report.failures {
        eprintln!("Skipped {}: {}", path.display(), message);
    }

    if store && persist(config, &report.entries, vendor_id) {
        println!("\nExtracted menu data inserted into the database.");
    }
    Ok(())
}

fn run_show(config: &AppConfig, vendor_id: i64, json: bool) -> Result<()> {
    let path = storage::resolve_database_path(config.storage.database_path.as_ref())?;
    let entries = Database::open(&path)?.entries_for_vendor(vendor_id)?;

    if entries.is_empty() {
        warn!("No stored entries for vendor {}", vendor_id);
        println!("No menu data stored for vendor {vendor_id}.");
    } else if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print!("{}", batch::render_table(&entries));
    }
    Ok(())
}

fn run_server(config: AppConfig, extractor: MenuExtractor, bind: Option<String>) -> Result<()> {
    let bind_address = bind.unwrap_or_else(|| config.server.bind_address.clone());
    let database_path = storage::resolve_database_path(config.storage.database_path.as_ref())?;
    let state = Arc::new(ServerState {
        extractor,
        database_path,
    });

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server::serve(state, &bind_address, config.server.max_upload_bytes))
}
