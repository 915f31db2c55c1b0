//! GraphQL documents sent to the Admin API.

/// Products with their variants, one page of products per request.
///
/// Variables: `first` (page size), `cursor` (null for the first page).
/// Variants are read in one nested page of up to 250.
pub const PRODUCT_VARIANTS: &str = r"
query getProducts($first: Int!, $cursor: String) {
  products(first: $first, after: $cursor) {
    edges {
      cursor
      node {
        id
        title
        handle
        variants(first: 250) {
          pageInfo {
            hasNextPage
          }
          edges {
            node {
              id
              title
              sku
              price
              inventoryQuantity
              barcode
            }
          }
        }
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}
";

pub const CUSTOMER_CREATE: &str = r"
mutation createCustomer($input: CustomerInput!) {
  customerCreate(input: $input) {
    customer {
      id
      firstName
      lastName
      email
      phone
      createdAt
      addresses {
        id
        address1
        city
        province
        country
        zip
      }
    }
    userErrors {
      field
      message
    }
  }
}
";

pub const ORDER_CREATE: &str = r"
mutation CreateOrder($order: OrderCreateOrderInput!) {
  orderCreate(order: $order) {
    order {
      id
      name
      email
      createdAt
      processedAt
      totalPriceSet {
        shopMoney {
          amount
          currencyCode
        }
      }
    }
    userErrors {
      field
      message
    }
  }
}
";
