//! Shopify Admin API request/response types.
//!
//! REST listings are consumed as raw JSON and flattened into records, so only
//! the GraphQL envelope, pagination info, and mutation payloads are typed here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// REST resources that can be listed in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Products,
    Orders,
    Customers,
}

impl Resource {
    /// Envelope key in the listing response, e.g. `"orders"`.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Resource::Products => "products",
            Resource::Orders => "orders",
            Resource::Customers => "customers",
        }
    }

    /// Path relative to the versioned Admin API root.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Resource::Products => "products.json",
            Resource::Orders => "orders.json",
            Resource::Customers => "customers.json",
        }
    }

    /// Query parameters for the first page of a full listing.
    ///
    /// Orders default to open-only on the API side, so `status=any` is added.
    #[must_use]
    pub fn listing_params(self, page_size: u32) -> Vec<(String, String)> {
        let mut params = vec![("limit".to_owned(), page_size.to_string())];
        if self == Resource::Orders {
            params.push(("status".to_owned(), "any".to_owned()));
        }
        params
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// `{data, errors}` envelope returned by the GraphQL endpoint.
#[derive(Debug, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Vec<GraphqlErrorEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlErrorEntry {
    pub message: String,
}

/// Relay-style `pageInfo` block.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// An entry from a mutation's `userErrors` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserError {
    /// Path to the offending input field, e.g. `["email"]`.
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

impl std::fmt::Display for UserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(path) if !path.is_empty() => write!(f, "{} || {}", path.join("."), self.message),
            _ => f.write_str(&self.message),
        }
    }
}

/// Address used for both shipping and billing on generated orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailingAddress {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub city: String,
    pub province: String,
    pub country: String,
    pub zip: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerAddressInput {
    pub address1: String,
    pub city: String,
    pub province: String,
    pub country: String,
    pub zip: String,
}

/// Variables for `customerCreate(input: CustomerInput!)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub addresses: Vec<CustomerAddressInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    /// Variant GID, e.g. `gid://shopify/ProductVariant/51245325123866`.
    pub variant_id: String,
    pub quantity: u32,
}

/// Variables for `orderCreate(order: OrderCreateOrderInput!)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInput {
    pub customer_id: String,
    pub line_items: Vec<LineItemInput>,
    pub shipping_address: MailingAddress,
    pub billing_address: MailingAddress,
    pub financial_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<String>,
}

impl OrderInput {
    /// Builds a paid order shipped and billed to the same address.
    ///
    /// Numeric customer IDs are expanded to their GID form.
    #[must_use]
    pub fn paid(
        customer_id: &str,
        line_items: Vec<LineItemInput>,
        address: MailingAddress,
        processed_at: Option<String>,
    ) -> Self {
        Self {
            customer_id: customer_gid(customer_id),
            line_items,
            shipping_address: address.clone(),
            billing_address: address,
            financial_status: "PAID".to_owned(),
            processed_at,
        }
    }
}

/// Returns `gid://shopify/Customer/<id>` unless `id` is already a GID.
#[must_use]
pub fn customer_gid(id: &str) -> String {
    if id.starts_with("gid://") {
        id.to_owned()
    } else {
        format!("gid://shopify/Customer/{id}")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedCustomer {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub amount: String,
    pub currency_code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyBag {
    pub shop_money: Money,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub processed_at: Option<String>,
    #[serde(default)]
    pub total_price_set: Option<MoneyBag>,
}
