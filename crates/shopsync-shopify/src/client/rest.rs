//! `Link`-header pagination over REST listings.

use serde_json::Value;
use shopsync_core::{flatten, Record};

use crate::error::ShopifyError;
use crate::pagination::extract_next_url;
use crate::types::Resource;

use super::ShopifyClient;

impl ShopifyClient {
    /// Fetches every page of a REST listing and flattens each element.
    ///
    /// The first request goes to `initial_url` with `initial_params`. Each
    /// following request targets the `rel="next"` URL from the previous
    /// response's `Link` header, with no extra params. The loop stops when a
    /// response has no `next` link.
    ///
    /// Records keep page order and within-page order, so a listing sorted by
    /// `updated_at` stays sorted after concatenation.
    ///
    /// **All-or-nothing**: any page failure discards earlier pages and returns
    /// the error.
    ///
    /// # Errors
    ///
    /// - Any transport error from [`Self::get_page`].
    /// - [`ShopifyError::MissingField`] if a page has no `entity_key` array.
    /// - [`ShopifyError::PaginationLimit`] past the page ceiling.
    pub async fn fetch_all(
        &self,
        initial_url: &str,
        entity_key: &str,
        initial_params: &[(String, String)],
    ) -> Result<Vec<Record>, ShopifyError> {
        let mut records: Vec<Record> = Vec::new();
        let mut url = initial_url.to_owned();
        let mut params = Some(initial_params);
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > self.max_pages {
                return Err(ShopifyError::PaginationLimit {
                    url: initial_url.to_owned(),
                    max_pages: self.max_pages,
                });
            }

            let (body, link_header) = self.get_page(&url, params.take()).await?;
            let items = body
                .get(entity_key)
                .and_then(Value::as_array)
                .ok_or_else(|| ShopifyError::missing(&format!("GET {url}"), entity_key))?;

            tracing::debug!(page = page_count, entity_key, count = items.len(), "fetched page");
            records.extend(items.iter().map(flatten));

            match extract_next_url(link_header.as_deref()) {
                Some(next) => url = next,
                None => break,
            }
        }

        tracing::info!(entity_key, pages = page_count, records = records.len(), "listing complete");
        Ok(records)
    }

    /// Full extract of one REST resource, `page_size` records per page.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_all`].
    pub async fn fetch_resource(
        &self,
        resource: Resource,
        page_size: u32,
    ) -> Result<Vec<Record>, ShopifyError> {
        let url = self.endpoint(resource.path());
        self.fetch_all(&url, resource.key(), &resource.listing_params(page_size))
            .await
    }
}
