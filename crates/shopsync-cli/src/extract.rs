//! Full-extract command handler.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use shopsync_core::{export_csv, timestamped_file_name, AppConfig, Record, Table};
use shopsync_shopify::{Resource, ShopifyClient};

/// Entities that can be extracted in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Entity {
    Products,
    Orders,
    Customers,
    /// One row per product variant, via the GraphQL API
    Variants,
}

impl Entity {
    /// Name used in output file names.
    pub(crate) fn file_key(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Orders => "orders",
            Self::Customers => "customers",
            Self::Variants => "variants",
        }
    }
}

/// Fetches every record of `entity`.
pub(crate) async fn fetch_entity(
    client: &ShopifyClient,
    config: &AppConfig,
    entity: Entity,
) -> anyhow::Result<Vec<Record>> {
    let resource = match entity {
        Entity::Products => Resource::Products,
        Entity::Orders => Resource::Orders,
        Entity::Customers => Resource::Customers,
        Entity::Variants => {
            return Ok(client.fetch_product_variants(config.graphql_page_size).await?);
        }
    };
    let records = client.fetch_resource(resource, config.page_size).await?;
    Ok(records)
}

/// Writes records to `<out_dir>/<timestamp> shopify_<entity>.csv` and returns
/// the path.
pub(crate) fn write_records(
    records: &[Record],
    out_dir: &Path,
    entity: &str,
) -> anyhow::Result<PathBuf> {
    let name = timestamped_file_name(chrono::Local::now().naive_local(), entity);
    let path = out_dir.join(name);
    export_csv(&Table::from_records(records), &path)?;
    Ok(path)
}

/// Full extract of one entity to CSV.
///
/// # Errors
///
/// Returns an error if any page fails to fetch or the file cannot be written.
/// Nothing is written when the fetch fails.
pub(crate) async fn run_extract(
    config: &AppConfig,
    entity: Entity,
    out_dir: &Path,
) -> anyhow::Result<()> {
    let client = crate::build_client(config)?;
    let records = fetch_entity(&client, config, entity).await?;
    let path = write_records(&records, out_dir, entity.file_key())?;

    tracing::info!(entity = entity.file_key(), records = records.len(), path = %path.display(), "extract complete");
    println!("{} {} records -> {}", records.len(), entity.file_key(), path.display());
    Ok(())
}
