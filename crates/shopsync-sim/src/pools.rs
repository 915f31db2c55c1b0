//! Existing customers and variants that synthetic orders draw from.

use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde_json::Value;
use shopsync_core::Record;
use shopsync_shopify::{LineItemInput, MailingAddress, OrderInput};

use crate::error::SimError;
use crate::random::{random_number_exp, random_processed_at};

/// A customer id paired with its default address.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRef {
    pub id: String,
    pub address: MailingAddress,
}

impl CustomerRef {
    /// Reads `id` and the flattened `default_address.*` fields of a customer
    /// record. Returns `None` when any of them is missing or null.
    #[must_use]
    pub fn from_record(record: &Record) -> Option<Self> {
        let id = text(record, "id")?;
        let address = MailingAddress {
            first_name: text(record, "default_address.first_name")?,
            last_name: text(record, "default_address.last_name")?,
            address1: text(record, "default_address.address1")?,
            city: text(record, "default_address.city")?,
            province: text(record, "default_address.province")?,
            country: text(record, "default_address.country")?,
            zip: text(record, "default_address.zip")?,
        };
        Some(Self { id, address })
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderPools {
    pub customers: Vec<CustomerRef>,
    pub variant_ids: Vec<String>,
}

impl OrderPools {
    /// Builds pools from a customers extract and a variants extract.
    /// Customers without a usable default address are skipped.
    #[must_use]
    pub fn from_records(customers: &[Record], variants: &[Record]) -> Self {
        let customers: Vec<CustomerRef> = customers.iter().filter_map(CustomerRef::from_record).collect();
        let variant_ids: Vec<String> = variants.iter().filter_map(|v| text(v, "variant_id")).collect();
        tracing::debug!(
            customers = customers.len(),
            variants = variant_ids.len(),
            "order pools built"
        );
        Self {
            customers,
            variant_ids,
        }
    }

    /// Fails fast when either pool is empty.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::EmptyPool`] naming the empty pool.
    pub fn ensure_ready(&self) -> Result<(), SimError> {
        if self.customers.is_empty() {
            return Err(SimError::EmptyPool("customers"));
        }
        if self.variant_ids.is_empty() {
            return Err(SimError::EmptyPool("product variants"));
        }
        Ok(())
    }

    /// Draws one paid order: a random customer shipped to their default
    /// address, 1 to 5 lines and 1 to 3 units per line, both biased low.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::EmptyPool`] if either pool is empty.
    pub fn plan_order<R: Rng>(
        &self,
        rng: &mut R,
        random_date: bool,
        now: DateTime<Utc>,
    ) -> Result<OrderInput, SimError> {
        let customer = self
            .customers
            .choose(rng)
            .ok_or(SimError::EmptyPool("customers"))?;

        let line_count = random_number_exp(rng, 1, 5, 3);
        let mut line_items = Vec::with_capacity(line_count as usize);
        for _ in 0..line_count {
            let variant_id = self
                .variant_ids
                .choose(rng)
                .ok_or(SimError::EmptyPool("product variants"))?;
            line_items.push(LineItemInput {
                variant_id: variant_id.clone(),
                quantity: random_number_exp(rng, 1, 3, 3),
            });
        }

        let processed_at = random_date.then(|| random_processed_at(rng, now));
        Ok(OrderInput::paid(
            &customer.id,
            line_items,
            customer.address.clone(),
            processed_at,
        ))
    }
}

/// String form of a scalar field; numbers are rendered without quotes.
fn text(record: &Record, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;
    use shopsync_core::flatten;

    fn customer(id: u64, with_address: bool) -> Record {
        let mut value = json!({"id": id, "email": "a@example.com"});
        if with_address {
            value["default_address"] = json!({
                "first_name": "Ada", "last_name": "Lovelace", "address1": "1 Main St",
                "city": "Boston", "province": "MA", "country": "US", "zip": "02134"
            });
        }
        flatten(&value)
    }

    fn variant(id: &str) -> Record {
        flatten(&json!({"product_id": "gid://shopify/Product/1", "variant_id": id}))
    }

    #[test]
    fn from_records_skips_customers_without_address() {
        let pools = OrderPools::from_records(
            &[customer(1, true), customer(2, false)],
            &[variant("gid://shopify/ProductVariant/11")],
        );
        assert_eq!(pools.customers.len(), 1);
        assert_eq!(pools.customers[0].id, "1");
        assert_eq!(pools.customers[0].address.zip, "02134");
        assert_eq!(pools.variant_ids, vec!["gid://shopify/ProductVariant/11"]);
    }

    #[test]
    fn ensure_ready_names_empty_pool() {
        let pools = OrderPools::from_records(&[customer(1, true)], &[]);
        assert!(matches!(
            pools.ensure_ready(),
            Err(SimError::EmptyPool("product variants"))
        ));
        assert!(matches!(
            OrderPools::default().ensure_ready(),
            Err(SimError::EmptyPool("customers"))
        ));
    }

    #[test]
    fn plan_order_uses_pools_and_bounds() {
        let pools = OrderPools::from_records(
            &[customer(7, true)],
            &[
                variant("gid://shopify/ProductVariant/11"),
                variant("gid://shopify/ProductVariant/12"),
            ],
        );
        let mut rng = StdRng::seed_from_u64(3);
        let now = Utc::now();
        for _ in 0..50 {
            let order = pools.plan_order(&mut rng, false, now).unwrap();
            assert_eq!(order.customer_id, "gid://shopify/Customer/7");
            assert_eq!(order.financial_status, "PAID");
            assert_eq!(order.shipping_address, order.billing_address);
            assert!((1..=5).contains(&order.line_items.len()));
            assert!(order.line_items.iter().all(|l| (1..=3).contains(&l.quantity)));
            assert!(order.processed_at.is_none());
        }
    }

    #[test]
    fn plan_order_random_date_sets_processed_at() {
        let pools = OrderPools::from_records(&[customer(7, true)], &[variant("v1")]);
        let mut rng = StdRng::seed_from_u64(4);
        let order = pools.plan_order(&mut rng, true, Utc::now()).unwrap();
        assert!(order.processed_at.unwrap().ends_with('Z'));
    }
}
