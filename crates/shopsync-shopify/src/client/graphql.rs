//! Cursor pagination over GraphQL connections.

use serde_json::{Map, Value};
use shopsync_core::Record;

use crate::error::ShopifyError;
use crate::pagination::next_graphql_cursor;
use crate::queries;
use crate::types::PageInfo;

use super::ShopifyClient;

impl ShopifyClient {
    /// Walks a GraphQL connection page by page.
    ///
    /// `query` must declare `$first: Int!` and `$cursor: String` and select
    /// `<connection> { edges { node { ... } } pageInfo { hasNextPage endCursor } }`
    /// at the top level. Each request sends `variables_template` merged with
    /// `first = page_size` and the current cursor (null on the first page).
    ///
    /// `map_node` turns one edge node into zero or more records; a product
    /// node typically yields one record per nested variant.
    ///
    /// # Errors
    ///
    /// - Transport and GraphQL errors from [`Self::post_graphql`].
    /// - [`ShopifyError::MissingField`] if `edges` or `pageInfo` are absent, or
    ///   a page reports more data without an `endCursor`.
    /// - [`ShopifyError::PaginationLimit`] past the page ceiling.
    /// - Any error returned by `map_node`.
    pub async fn walk_connection<F>(
        &self,
        query: &str,
        variables_template: &Value,
        page_size: u32,
        connection: &str,
        mut map_node: F,
    ) -> Result<Vec<Record>, ShopifyError>
    where
        F: FnMut(&Value) -> Result<Vec<Record>, ShopifyError>,
    {
        let mut records: Vec<Record> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > self.max_pages {
                return Err(ShopifyError::PaginationLimit {
                    url: format!("graphql:{connection}"),
                    max_pages: self.max_pages,
                });
            }

            let variables = page_variables(variables_template, page_size, cursor.as_deref());
            let data = self.post_graphql(query, &variables).await?;

            let conn = data
                .get(connection)
                .ok_or_else(|| ShopifyError::missing("graphql data", connection))?;
            let edges = conn
                .get("edges")
                .and_then(Value::as_array)
                .ok_or_else(|| ShopifyError::missing(connection, "edges"))?;

            let before = records.len();
            for edge in edges {
                let node = edge
                    .get("node")
                    .ok_or_else(|| ShopifyError::missing(connection, "edges.node"))?;
                records.extend(map_node(node)?);
            }
            tracing::debug!(
                page = page_count,
                connection,
                edges = edges.len(),
                records = records.len() - before,
                "fetched graphql page"
            );

            let page_info: PageInfo = conn
                .get("pageInfo")
                .cloned()
                .ok_or_else(|| ShopifyError::missing(connection, "pageInfo"))
                .and_then(|v| {
                    serde_json::from_value(v).map_err(|e| ShopifyError::Deserialize {
                        context: format!("{connection}.pageInfo"),
                        source: e,
                    })
                })?;

            match next_graphql_cursor(&page_info, connection)? {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        tracing::info!(connection, pages = page_count, records = records.len(), "connection complete");
        Ok(records)
    }

    /// All product variants, one record per variant.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::walk_connection`].
    pub async fn fetch_product_variants(&self, page_size: u32) -> Result<Vec<Record>, ShopifyError> {
        self.walk_connection(
            queries::PRODUCT_VARIANTS,
            &Value::Object(Map::new()),
            page_size,
            "products",
            variant_records,
        )
        .await
    }
}

fn page_variables(template: &Value, page_size: u32, cursor: Option<&str>) -> Value {
    let mut vars = template.as_object().cloned().unwrap_or_default();
    vars.insert("first".to_owned(), Value::from(page_size));
    vars.insert(
        "cursor".to_owned(),
        cursor.map_or(Value::Null, |c| Value::String(c.to_owned())),
    );
    Value::Object(vars)
}

/// Maps a product node to one record per variant.
///
/// Columns: `product_id, product_title, product_handle, variant_id,
/// variant_title, sku, price, inventory_quantity, barcode`.
///
/// # Errors
///
/// Returns [`ShopifyError::MissingField`] if the node has no `id` or no
/// `variants.edges` list.
///
/// Products with more variants than the nested page holds are logged at
/// `warn`; only the first page of their variants is returned.
pub fn variant_records(product: &Value) -> Result<Vec<Record>, ShopifyError> {
    let product_id = product
        .get("id")
        .cloned()
        .ok_or_else(|| ShopifyError::missing("product node", "id"))?;
    let edges = product
        .pointer("/variants/edges")
        .and_then(Value::as_array)
        .ok_or_else(|| ShopifyError::missing("product node", "variants.edges"))?;

    if variants_truncated(product) {
        tracing::warn!(
            product_id = %product_id,
            returned = edges.len(),
            "product has more variants than one nested page; extra variants skipped"
        );
    }

    let field = |v: &Value, key: &str| v.get(key).cloned().unwrap_or(Value::Null);

    let mut out = Vec::with_capacity(edges.len());
    for edge in edges {
        let variant = edge
            .get("node")
            .ok_or_else(|| ShopifyError::missing("variants", "edges.node"))?;
        let mut record = Record::new();
        record.insert("product_id".to_owned(), product_id.clone());
        record.insert("product_title".to_owned(), field(product, "title"));
        record.insert("product_handle".to_owned(), field(product, "handle"));
        record.insert("variant_id".to_owned(), field(variant, "id"));
        record.insert("variant_title".to_owned(), field(variant, "title"));
        record.insert("sku".to_owned(), field(variant, "sku"));
        record.insert("price".to_owned(), field(variant, "price"));
        record.insert("inventory_quantity".to_owned(), field(variant, "inventoryQuantity"));
        record.insert("barcode".to_owned(), field(variant, "barcode"));
        out.push(record);
    }
    Ok(out)
}

/// True when the product's nested `variants` connection reports another page.
pub(crate) fn variants_truncated(product: &Value) -> bool {
    product
        .pointer("/variants/pageInfo/hasNextPage")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_variables_merge_template_size_and_cursor() {
        let template = json!({"query": "status:active"});
        let vars = page_variables(&template, 50, Some("c1"));
        assert_eq!(vars, json!({"query": "status:active", "first": 50, "cursor": "c1"}));
    }

    #[test]
    fn page_variables_first_page_has_null_cursor() {
        let vars = page_variables(&Value::Null, 10, None);
        assert_eq!(vars, json!({"first": 10, "cursor": null}));
    }

    #[test]
    fn variant_records_emits_one_row_per_variant() {
        let product = json!({
            "id": "gid://shopify/Product/1",
            "title": "Snowboard",
            "handle": "snowboard",
            "variants": {"edges": [
                {"node": {"id": "gid://shopify/ProductVariant/11", "title": "S", "sku": "SB-S",
                          "price": "10.00", "inventoryQuantity": 3, "barcode": null}},
                {"node": {"id": "gid://shopify/ProductVariant/12", "title": "M", "sku": "SB-M",
                          "price": "12.00", "inventoryQuantity": 0, "barcode": "123"}}
            ]}
        });
        let rows = variant_records(&product).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["product_handle"], json!("snowboard"));
        assert_eq!(rows[0]["variant_id"], json!("gid://shopify/ProductVariant/11"));
        assert_eq!(rows[1]["inventory_quantity"], json!(0));
        assert_eq!(rows[1]["barcode"], json!("123"));
        let keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "product_id",
                "product_title",
                "product_handle",
                "variant_id",
                "variant_title",
                "sku",
                "price",
                "inventory_quantity",
                "barcode"
            ]
        );
    }

    #[test]
    fn variant_records_empty_for_product_without_variants() {
        let product = json!({"id": "p", "title": "t", "handle": "h", "variants": {"edges": []}});
        assert!(variant_records(&product).unwrap().is_empty());
    }

    #[test]
    fn truncated_variant_page_is_detected_and_still_mapped() {
        let product = json!({
            "id": "gid://shopify/Product/9", "title": "Big", "handle": "big",
            "variants": {
                "pageInfo": {"hasNextPage": true},
                "edges": [{"node": {"id": "gid://shopify/ProductVariant/1", "title": "A"}}]
            }
        });
        assert!(variants_truncated(&product));
        assert_eq!(variant_records(&product).unwrap().len(), 1);
    }

    #[test]
    fn complete_variant_page_is_not_truncated() {
        let product = json!({"id": "p", "variants": {"pageInfo": {"hasNextPage": false}, "edges": []}});
        assert!(!variants_truncated(&product));
        let legacy = json!({"id": "p", "variants": {"edges": []}});
        assert!(!variants_truncated(&legacy));
    }

    #[test]
    fn product_query_selects_nested_variant_page_info() {
        let query = crate::queries::PRODUCT_VARIANTS;
        let variants = &query[query.find("variants(").unwrap()..];
        let before_edges = &variants[..variants.find("edges").unwrap()];
        assert!(before_edges.contains("hasNextPage"));
    }

    #[test]
    fn variant_records_requires_variants_connection() {
        let product = json!({"id": "p", "title": "t"});
        assert!(matches!(
            variant_records(&product),
            Err(ShopifyError::MissingField { .. })
        ));
    }
}
