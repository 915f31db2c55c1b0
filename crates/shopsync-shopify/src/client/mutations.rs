//! Customer and order creation.
//!
//! Rejections (GraphQL `errors` or mutation `userErrors`) are logged and
//! reported as `Ok(None)` so callers looping over many creations can move on.
//! Transport failures still propagate.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::ShopifyError;
use crate::queries;
use crate::types::{CreatedCustomer, CreatedOrder, CustomerInput, OrderInput, UserError};

use super::ShopifyClient;

impl ShopifyClient {
    /// Creates one customer via `customerCreate`.
    ///
    /// # Errors
    ///
    /// Returns transport errors and malformed payloads. Rejected input yields
    /// `Ok(None)`.
    pub async fn create_customer(
        &self,
        input: &CustomerInput,
    ) -> Result<Option<CreatedCustomer>, ShopifyError> {
        let variables = json!({ "input": input });
        let created: Option<CreatedCustomer> = self
            .run_mutation(queries::CUSTOMER_CREATE, &variables, "customerCreate", "customer")
            .await?;
        if let Some(customer) = &created {
            tracing::info!(
                id = %customer.id,
                email = customer.email.as_deref().unwrap_or_default(),
                "customer created"
            );
        }
        Ok(created)
    }

    /// Creates one order via `orderCreate`.
    ///
    /// # Errors
    ///
    /// Returns transport errors and malformed payloads. Rejected input yields
    /// `Ok(None)`.
    pub async fn create_order(&self, input: &OrderInput) -> Result<Option<CreatedOrder>, ShopifyError> {
        let variables = json!({ "order": input });
        let created: Option<CreatedOrder> = self
            .run_mutation(queries::ORDER_CREATE, &variables, "orderCreate", "order")
            .await?;
        if let Some(order) = &created {
            tracing::info!(id = %order.id, name = %order.name, "order created");
        }
        Ok(created)
    }

    async fn run_mutation<T>(
        &self,
        document: &str,
        variables: &Value,
        operation: &str,
        entity: &str,
    ) -> Result<Option<T>, ShopifyError>
    where
        T: DeserializeOwned,
    {
        let data = match self.post_graphql(document, variables).await {
            Ok(data) => data,
            Err(ShopifyError::Graphql { messages }) => {
                for message in &messages {
                    tracing::warn!(operation, %message, "graphql error");
                }
                return Ok(None);
            }
            Err(other) => return Err(other),
        };

        match parse_payload::<T>(&data, operation, entity) {
            Err(ShopifyError::UserErrors { errors, .. }) => {
                for e in &errors {
                    tracing::warn!(operation, error = %e, "mutation rejected");
                }
                Ok(None)
            }
            other => other,
        }
    }
}

/// Reads `data.<operation>` into `(entity, userErrors)`.
///
/// Non-empty `userErrors` become [`ShopifyError::UserErrors`]; a null entity
/// with no errors is `Ok(None)`.
fn parse_payload<T>(data: &Value, operation: &str, entity: &str) -> Result<Option<T>, ShopifyError>
where
    T: DeserializeOwned,
{
    let payload = data
        .get(operation)
        .ok_or_else(|| ShopifyError::missing("graphql data", operation))?;

    let user_errors: Vec<UserError> = match payload.get("userErrors") {
        Some(v) if !v.is_null() => {
            serde_json::from_value(v.clone()).map_err(|e| ShopifyError::Deserialize {
                context: format!("{operation}.userErrors"),
                source: e,
            })?
        }
        _ => Vec::new(),
    };
    if !user_errors.is_empty() {
        return Err(ShopifyError::UserErrors {
            operation: operation.to_owned(),
            errors: user_errors,
        });
    }

    match payload.get(entity) {
        Some(v) if !v.is_null() => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| ShopifyError::Deserialize {
                context: format!("{operation}.{entity}"),
                source: e,
            }),
        _ => Ok(None),
    }
}
