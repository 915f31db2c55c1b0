//! HTTP client for the Shopify Admin REST and GraphQL APIs.

mod graphql;
mod mutations;
mod rest;
mod sync;

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde_json::{json, Value};
use shopsync_core::StoreConfig;

use crate::error::ShopifyError;
use crate::types::GraphqlResponse;

pub use graphql::variant_records;
pub use sync::{orders_since_params, sync_start};

/// Default ceiling on pages per listing. Guards against a source that never
/// reports its last page.
pub const MAX_PAGES: usize = 1_000;

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Client for one Shopify store's Admin API.
///
/// Built once from a [`StoreConfig`] and passed by reference into every
/// listing, sync, and mutation call. All calls are sequential: each page is
/// awaited before the next request is issued, and any failure ends the call
/// without returning partial results.
pub struct ShopifyClient {
    client: Client,
    api_root: String,
    host: String,
    access_token: String,
    max_pages: usize,
}

impl ShopifyClient {
    /// Creates a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::InvalidStoreUrl`] if the store origin is not a valid URL.
    /// - [`ShopifyError::Http`] if the underlying `reqwest::Client` cannot be built.
    pub fn new(store: &StoreConfig) -> Result<Self, ShopifyError> {
        let api_root = store.admin_api_root();
        let parsed = Url::parse(&api_root).map_err(|e| ShopifyError::InvalidStoreUrl {
            url: api_root.clone(),
            reason: e.to_string(),
        })?;
        let host = parsed.host_str().unwrap_or_default().to_owned();

        let client = Client::builder()
            .timeout(Duration::from_secs(store.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("shopsync/0.1 (store-extract)")
            .build()?;

        Ok(Self {
            client,
            api_root,
            host,
            access_token: store.access_token.clone(),
            max_pages: MAX_PAGES,
        })
    }

    /// Overrides the page ceiling applied to every listing.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Absolute URL of an Admin API path, e.g. `orders.json`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_root, path.trim_start_matches('/'))
    }

    /// Issues one GET and returns the parsed body plus the raw `Link` header.
    ///
    /// `params` is appended to `url` when given; follow-up pages pass `None`
    /// because their URL already carries the full query.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::RateLimited`] on HTTP 429.
    /// - [`ShopifyError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`ShopifyError::Http`] on network or TLS failure.
    /// - [`ShopifyError::Deserialize`] if the body is not JSON.
    pub async fn get_page(
        &self,
        url: &str,
        params: Option<&[(String, String)]>,
    ) -> Result<(Value, Option<String>), ShopifyError> {
        let mut request = self
            .client
            .get(url)
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(params) = params {
            request = request.query(params);
        }

        let response = request.send().await?;
        let response = self.check_status(url, response).await?;

        // Extract the Link header before consuming the response body.
        let link_header = response
            .headers()
            .get(reqwest::header::LINK)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = response.text().await?;
        let parsed = serde_json::from_str::<Value>(&body).map_err(|e| {
            ShopifyError::Deserialize {
                context: format!("GET {url}"),
                source: e,
            }
        })?;

        Ok((parsed, link_header))
    }

    /// POSTs a GraphQL document and returns its `data` object.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::UnexpectedStatus`] / [`ShopifyError::RateLimited`] /
    ///   [`ShopifyError::Http`] for transport failures.
    /// - [`ShopifyError::Graphql`] when the response carries a non-empty `errors` array.
    /// - [`ShopifyError::MissingField`] when `data` is absent.
    /// - [`ShopifyError::Deserialize`] if the body is not a GraphQL envelope.
    pub async fn post_graphql(&self, query: &str, variables: &Value) -> Result<Value, ShopifyError> {
        let url = self.endpoint("graphql.json");
        let response = self
            .client
            .post(&url)
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;
        let response = self.check_status(&url, response).await?;

        let body = response.text().await?;
        let envelope = serde_json::from_str::<GraphqlResponse>(&body).map_err(|e| {
            ShopifyError::Deserialize {
                context: format!("POST {url}"),
                source: e,
            }
        })?;

        if let Some(errors) = envelope.errors.filter(|errs| !errs.is_empty()) {
            return Err(ShopifyError::Graphql {
                messages: errors.into_iter().map(|e| e.message).collect(),
            });
        }

        envelope
            .data
            .filter(|d| !d.is_null())
            .ok_or_else(|| ShopifyError::missing("graphql response", "data"))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    async fn check_status(
        &self,
        url: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ShopifyError> {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<f64>().ok())
                .map_or(2, |secs| secs.ceil() as u64);
            return Err(ShopifyError::RateLimited {
                host: self.host.clone(),
                retry_after_secs,
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShopifyError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
                body,
            });
        }

        Ok(response)
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
