//! CSV-to-warehouse load command handler.

use std::path::Path;

use clap::ValueEnum;
use shopsync_core::{AppConfig, Table};
use shopsync_warehouse::{Destination, WriteMode};

/// `--mode` values for `load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LoadMode {
    /// Drop and recreate the table
    Overwrite,
    /// Create the table if missing, then insert
    Append,
    /// Like append, replacing existing rows with the same `id`
    Merge,
}

impl From<LoadMode> for WriteMode {
    fn from(mode: LoadMode) -> Self {
        match mode {
            LoadMode::Overwrite => Self::OverwriteReplace,
            LoadMode::Append => Self::Append,
            LoadMode::Merge => Self::Merge,
        }
    }
}

/// Loads `csv` into `table` using `mode`.
///
/// # Errors
///
/// Returns an error if the destination is malformed, the file cannot be read,
/// or the warehouse rejects the load. The load runs in one transaction.
pub(crate) async fn run_load(
    config: &AppConfig,
    csv: &Path,
    table: &str,
    mode: LoadMode,
) -> anyhow::Result<()> {
    let dest = Destination::parse(table)?;
    let data = Table::from_csv_path(csv)?;
    if data.columns.is_empty() {
        anyhow::bail!("{} has no header row", csv.display());
    }

    let pool = shopsync_warehouse::connect_from_app_config(config).await?;
    let mode = WriteMode::from(mode);
    let rows = shopsync_warehouse::load_table(&pool, &data, &dest, mode).await?;

    tracing::info!(path = %csv.display(), table = %dest, %mode, rows, "load complete");
    println!("loaded {rows} rows into {dest} ({mode})");
    Ok(())
}
