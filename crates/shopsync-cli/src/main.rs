mod extract;
mod load;
mod simulate;
mod sync;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::extract::Entity;
use crate::load::LoadMode;
use crate::simulate::SimulateCommands;
use crate::sync::SyncCommands;

#[derive(Debug, Parser)]
#[command(name = "shopsync")]
#[command(about = "Extract Shopify store data to CSV and a Postgres warehouse")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Full extract of one entity to a timestamped CSV
    Extract {
        #[arg(value_enum)]
        entity: Entity,

        /// Output directory (defaults to SHOPSYNC_OUTPUT_DIR)
        #[arg(long)]
        out_dir: Option<std::path::PathBuf>,
    },
    /// Incremental syncs driven by a warehouse watermark
    Sync {
        #[command(subcommand)]
        command: SyncCommands,
    },
    /// Load a CSV file into a warehouse table
    Load {
        /// CSV file with a header row
        #[arg(long)]
        csv: std::path::PathBuf,

        /// Destination as schema.table
        #[arg(long)]
        table: String,

        #[arg(long, value_enum, default_value_t = LoadMode::Overwrite)]
        mode: LoadMode,
    },
    /// Create synthetic customers or orders in a development store
    Simulate {
        #[command(subcommand)]
        command: SimulateCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = shopsync_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Extract { entity, out_dir } => {
            let out_dir = out_dir.unwrap_or_else(|| config.output_dir.clone());
            extract::run_extract(&config, entity, &out_dir).await?;
        }
        Commands::Sync { command } => sync::run(&config, command).await?,
        Commands::Load { csv, table, mode } => {
            load::run_load(&config, &csv, &table, mode).await?;
        }
        Commands::Simulate { command } => simulate::run(&config, command).await?,
    }

    Ok(())
}

/// Builds the Admin API client. Fails when no store is configured.
pub(crate) fn build_client(
    config: &shopsync_core::AppConfig,
) -> anyhow::Result<shopsync_shopify::ShopifyClient> {
    let store = config.require_store()?;
    shopsync_shopify::ShopifyClient::new(store)
        .map_err(|e| anyhow::anyhow!("failed to build Shopify client: {e}"))
}
