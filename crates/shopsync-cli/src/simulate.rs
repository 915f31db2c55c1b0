//! Synthetic data command handlers.

use std::time::Duration;

use clap::{Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shopsync_core::AppConfig;
use shopsync_shopify::{Pacer, Resource};
use shopsync_sim::{BatchReport, ErrorPolicy, Generator, OrderPools, ZipTable};

/// `--on-error` values for batch commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OnError {
    /// Stop at the first failed creation
    #[default]
    Abort,
    /// Log the failure and continue
    Skip,
}

impl From<OnError> for ErrorPolicy {
    fn from(value: OnError) -> Self {
        match value {
            OnError::Abort => Self::Abort,
            OnError::Skip => Self::Skip,
        }
    }
}

/// Sub-commands available under `simulate`.
#[derive(Debug, Subcommand)]
pub enum SimulateCommands {
    /// Create customers with generated identities
    Customers {
        #[arg(long)]
        count: u32,

        #[arg(long, value_enum, default_value_t = OnError::Abort)]
        on_error: OnError,
    },
    /// Create paid orders for existing customers and variants
    Orders {
        #[arg(long)]
        count: u32,

        /// Backdate each order to a random time in the last two years
        #[arg(long)]
        random_date: bool,

        #[arg(long, value_enum, default_value_t = OnError::Abort)]
        on_error: OnError,

        /// Seconds between order creations (defaults to SHOPSYNC_ORDER_DELAY_SECS)
        #[arg(long)]
        delay_secs: Option<u64>,
    },
}

pub(crate) async fn run(config: &AppConfig, command: SimulateCommands) -> anyhow::Result<()> {
    let client = crate::build_client(config)?;

    let report = match command {
        SimulateCommands::Customers { count, on_error } => {
            let zips = match &config.zips_path {
                Some(path) => ZipTable::from_csv_path(path)?,
                None => ZipTable::builtin(),
            };
            let mut generator = Generator::new(
                &client,
                StdRng::from_os_rng(),
                on_error.into(),
                Pacer::unthrottled(),
            );
            generator.create_customers(count, &zips).await
        }
        SimulateCommands::Orders {
            count,
            random_date,
            on_error,
            delay_secs,
        } => {
            let customers = client
                .fetch_resource(Resource::Customers, config.page_size)
                .await?;
            let variants = client
                .fetch_product_variants(config.graphql_page_size)
                .await?;
            let pools = OrderPools::from_records(&customers, &variants);

            let delay = Duration::from_secs(delay_secs.unwrap_or(config.order_delay_secs));
            let mut generator = Generator::new(
                &client,
                StdRng::from_os_rng(),
                on_error.into(),
                Pacer::new(delay),
            );
            generator.create_orders(count, &pools, random_date).await?
        }
    };

    finish(&report)
}

fn finish(report: &BatchReport) -> anyhow::Result<()> {
    println!(
        "created {}/{} ({} failed)",
        report.created, report.requested, report.failed
    );
    if report.aborted {
        anyhow::bail!(
            "batch aborted after {} of {} attempts",
            report.attempted,
            report.requested
        );
    }
    Ok(())
}
