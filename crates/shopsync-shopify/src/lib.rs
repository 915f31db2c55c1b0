pub mod client;
pub mod error;
pub mod pagination;
pub mod queries;
pub mod rate_limit;
pub mod types;

pub use client::{ShopifyClient, MAX_PAGES};
pub use error::{ErrorKind, ShopifyError};
pub use rate_limit::Pacer;
pub use types::{
    CreatedCustomer, CreatedOrder, CustomerAddressInput, CustomerInput, LineItemInput,
    MailingAddress, OrderInput, Resource, UserError,
};
