//! Batch drivers that create many customers or orders in sequence.

use chrono::Utc;
use rand::Rng;
use shopsync_shopify::{Pacer, ShopifyClient, ShopifyError};

use crate::error::SimError;
use crate::identity::{FakeIdentity, ZipTable};
use crate::pools::OrderPools;

/// What a batch does after one item fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Stop at the first failure.
    #[default]
    Abort,
    /// Log the failure and move on to the next item.
    Skip,
}

impl std::fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Abort => "abort",
            Self::Skip => "skip",
        })
    }
}

/// Outcome of one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub requested: u32,
    pub attempted: u32,
    pub created: u32,
    pub failed: u32,
    pub aborted: bool,
}

impl BatchReport {
    fn new(requested: u32) -> Self {
        Self {
            requested,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.aborted && self.created == self.requested
    }
}

/// Why a single creation did not produce an entity.
enum Failure {
    Rejected,
    Transport(ShopifyError),
}

pub struct Generator<'a, R> {
    client: &'a ShopifyClient,
    rng: R,
    policy: ErrorPolicy,
    pacer: Pacer,
}

impl<'a, R: Rng> Generator<'a, R> {
    #[must_use]
    pub fn new(client: &'a ShopifyClient, rng: R, policy: ErrorPolicy, pacer: Pacer) -> Self {
        Self {
            client,
            rng,
            policy,
            pacer,
        }
    }

    /// Creates `count` customers with generated identities.
    pub async fn create_customers(&mut self, count: u32, zips: &ZipTable) -> BatchReport {
        let mut report = BatchReport::new(count);
        for index in 0..count {
            let identity = FakeIdentity::generate(&mut self.rng, zips);
            self.pacer.ready().await;
            report.attempted += 1;

            let outcome = match self.client.create_customer(&identity.to_customer_input()).await {
                Ok(Some(_)) => Ok(()),
                Ok(None) => Err(Failure::Rejected),
                Err(e) => Err(Failure::Transport(e)),
            };
            if !self.record(&mut report, outcome, "customer", index) {
                break;
            }
        }
        log_report("customers", &report);
        report
    }

    /// Creates `count` orders drawn from `pools`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::EmptyPool`] before any request if a pool is empty.
    pub async fn create_orders(
        &mut self,
        count: u32,
        pools: &OrderPools,
        random_date: bool,
    ) -> Result<BatchReport, SimError> {
        pools.ensure_ready()?;
        let mut report = BatchReport::new(count);
        for index in 0..count {
            let input = pools.plan_order(&mut self.rng, random_date, Utc::now())?;
            self.pacer.ready().await;
            report.attempted += 1;

            let outcome = match self.client.create_order(&input).await {
                Ok(Some(_)) => Ok(()),
                Ok(None) => Err(Failure::Rejected),
                Err(e) => Err(Failure::Transport(e)),
            };
            if !self.record(&mut report, outcome, "order", index) {
                break;
            }
        }
        log_report("orders", &report);
        Ok(report)
    }

    /// Tallies one outcome. Returns `false` when the batch must stop.
    fn record(
        &self,
        report: &mut BatchReport,
        outcome: Result<(), Failure>,
        entity: &str,
        index: u32,
    ) -> bool {
        let failure = match outcome {
            Ok(()) => {
                report.created += 1;
                return true;
            }
            Err(failure) => failure,
        };
        report.failed += 1;

        match (&failure, self.policy) {
            (Failure::Rejected, ErrorPolicy::Skip) => {
                tracing::warn!(entity, index, "creation rejected, skipping");
            }
            (Failure::Transport(e), ErrorPolicy::Skip) => {
                tracing::warn!(entity, index, kind = ?e.kind(), error = %e, "creation failed, skipping");
            }
            (Failure::Rejected, ErrorPolicy::Abort) => {
                tracing::error!(entity, index, "creation rejected, aborting batch");
            }
            (Failure::Transport(e), ErrorPolicy::Abort) => {
                tracing::error!(entity, index, kind = ?e.kind(), error = %e, "creation failed, aborting batch");
            }
        }

        if self.policy == ErrorPolicy::Abort {
            report.aborted = true;
            return false;
        }
        true
    }
}

fn log_report(entity: &str, report: &BatchReport) {
    tracing::info!(
        entity,
        requested = report.requested,
        attempted = report.attempted,
        created = report.created,
        failed = report.failed,
        aborted = report.aborted,
        "batch finished"
    );
}
