//! Cursor extraction for Shopify's two pagination styles.
//!
//! REST listings carry adjacent page URLs in the `Link` response header. The
//! `next` URL already encodes the cursor (`page_info`) and every filter from
//! the first request, so it is followed verbatim.
//!
//! ## Header format
//!
//! Single next link:
//! ```text
//! <https://shop.myshopify.com/admin/api/2025-10/orders.json?limit=250&page_info=CURSOR>; rel="next"
//! ```
//!
//! Combined previous and next:
//! ```text
//! <https://.../orders.json?limit=250&page_info=PREV>; rel="previous",
//! <https://.../orders.json?limit=250&page_info=NEXT>; rel="next"
//! ```
//!
//! GraphQL connections instead report `pageInfo { hasNextPage endCursor }`.

use crate::error::ShopifyError;
use crate::types::PageInfo;

/// Parses a `Link` header value and returns the `rel="next"` URL.
///
/// Returns `None` if the header is absent, has no `next` segment, or the
/// segment has no `<...>` URL.
#[must_use]
pub fn extract_next_url(link_header: Option<&str>) -> Option<String> {
    let header = link_header?;

    for segment in header.split(',') {
        let segment = segment.trim();

        if !segment.contains(r#"rel="next""#) {
            continue;
        }

        return extract_angle_bracket_url(segment)
            .filter(|url| !url.is_empty())
            .map(str::to_owned);
    }

    None
}

/// Extracts the URL between `<` and `>` in a link directive segment.
fn extract_angle_bracket_url(segment: &str) -> Option<&str> {
    let start = segment.find('<')? + 1;
    let end = segment.find('>')?;
    if start >= end {
        return None;
    }
    Some(&segment[start..end])
}

/// Decides the cursor for the next GraphQL page.
///
/// `Ok(None)` means the connection is exhausted. A page that claims more data
/// but carries no `endCursor` would repeat the first page forever, so it is
/// rejected.
///
/// # Errors
///
/// Returns [`ShopifyError::MissingField`] when `hasNextPage` is true and
/// `endCursor` is null.
pub fn next_graphql_cursor(
    page_info: &PageInfo,
    connection: &str,
) -> Result<Option<String>, ShopifyError> {
    if !page_info.has_next_page {
        return Ok(None);
    }
    match &page_info.end_cursor {
        Some(cursor) => Ok(Some(cursor.clone())),
        None => Err(ShopifyError::missing(
            connection,
            "pageInfo.endCursor",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_none_when_header_is_none() {
        assert!(extract_next_url(None).is_none());
    }

    #[test]
    fn returns_none_when_header_is_empty() {
        assert!(extract_next_url(Some("")).is_none());
    }

    #[test]
    fn extracts_url_from_single_next_link() {
        let header = r#"<https://x/orders.json?page_info=abc>; rel="next""#;
        assert_eq!(
            extract_next_url(Some(header)).as_deref(),
            Some("https://x/orders.json?page_info=abc")
        );
    }

    #[test]
    fn extracts_next_from_combined_prev_next_link() {
        let header = concat!(
            r#"<https://acme.myshopify.com/admin/api/2025-10/orders.json?limit=250&page_info=PREV>; rel="previous", "#,
            r#"<https://acme.myshopify.com/admin/api/2025-10/orders.json?limit=250&page_info=NEXT>; rel="next""#
        );
        assert_eq!(
            extract_next_url(Some(header)).as_deref(),
            Some("https://acme.myshopify.com/admin/api/2025-10/orders.json?limit=250&page_info=NEXT")
        );
    }

    #[test]
    fn returns_none_when_only_previous_link_present() {
        let header = r#"<https://x/orders.json?limit=250&page_info=PREV>; rel="previous""#;
        assert!(extract_next_url(Some(header)).is_none());
    }

    #[test]
    fn handles_extra_whitespace_between_segments() {
        let header = concat!(
            r#"<https://example.com/products.json?page_info=ABC>; rel="previous",   "#,
            r#"<https://example.com/products.json?page_info=XYZ>; rel="next""#
        );
        assert_eq!(
            extract_next_url(Some(header)).as_deref(),
            Some("https://example.com/products.json?page_info=XYZ")
        );
    }

    #[test]
    fn returns_none_when_next_segment_has_no_brackets() {
        assert!(extract_next_url(Some(r#"https://x/orders.json; rel="next""#)).is_none());
    }

    #[test]
    fn extract_angle_bracket_url_happy_path() {
        let segment = r#"<https://example.com/foo?bar=baz>; rel="next""#;
        assert_eq!(
            extract_angle_bracket_url(segment),
            Some("https://example.com/foo?bar=baz")
        );
    }

    #[test]
    fn graphql_cursor_none_when_no_next_page() {
        let info = PageInfo {
            has_next_page: false,
            end_cursor: Some("c9".to_owned()),
        };
        assert!(next_graphql_cursor(&info, "products").unwrap().is_none());
    }

    #[test]
    fn graphql_cursor_follows_end_cursor() {
        let info = PageInfo {
            has_next_page: true,
            end_cursor: Some("c1".to_owned()),
        };
        assert_eq!(
            next_graphql_cursor(&info, "products").unwrap().as_deref(),
            Some("c1")
        );
    }

    #[test]
    fn graphql_cursor_rejects_next_page_without_cursor() {
        let info = PageInfo {
            has_next_page: true,
            end_cursor: None,
        };
        assert!(matches!(
            next_graphql_cursor(&info, "products"),
            Err(ShopifyError::MissingField { .. })
        ));
    }
}
