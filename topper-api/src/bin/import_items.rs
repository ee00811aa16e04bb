//! topper-import - merge a legacy item dump into the item store
//!
//! Reads a JSON array of flat legacy records, converts each into the
//! multilingual item shape and appends the ones whose id is not already in
//! the store. Invalid records are skipped with a warning.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use topper_common::config::{resolve_data_dir, TomlConfig};
use topper_common::legacy::{merge_new_items, LegacyItem};
use topper_common::store::{ContentStore, JsonFileStore};

#[derive(Parser, Debug)]
#[command(name = "topper-import")]
#[command(about = "Import legacy items into the Topper item store")]
#[command(version)]
struct Args {
    /// Legacy JSON file (array of { id, title, source, url, ... })
    input: PathBuf,

    /// Directory holding items.json (overrides TOPPER_DATA_DIR)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, env = "TOPPER_CONFIG")]
    config: Option<PathBuf>,

    /// Report what would be imported without writing
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    topper_api::logging::init_tracing(&config.logging.level);
    info!("topper-import v{}", env!("CARGO_PKG_VERSION"));

    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let legacy: Vec<LegacyItem> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a legacy item array", args.input.display()))?;
    info!(records = legacy.len(), "Legacy records read");

    let mut converted = Vec::with_capacity(legacy.len());
    for record in legacy {
        let id = record.id.clone();
        match record.into_item() {
            Ok(item) => converted.push(item),
            Err(e) => warn!(id = %id, error = %e, "Skipping legacy record"),
        }
    }

    let data_dir = resolve_data_dir(args.data_dir.as_deref(), &config);
    let store = JsonFileStore::new(&data_dir);
    let mut items = store
        .read_items()
        .with_context(|| format!("Failed to read items from {}", data_dir.display()))?;
    let before = items.len();

    let added = merge_new_items(&mut items, converted);
    info!(existing = before, added, "Merged legacy items");

    if args.dry_run {
        info!("Dry run, nothing written");
        return Ok(());
    }

    if added > 0 {
        store
            .write_items(&items)
            .with_context(|| format!("Failed to write {}", store.items_path().display()))?;
        info!("Wrote {}", store.items_path().display());
    }

    Ok(())
}
