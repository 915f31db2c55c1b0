//! Synthetic customers and orders for development stores.

pub mod batch;
pub mod error;
pub mod identity;
pub mod pools;
pub mod random;

pub use batch::{BatchReport, ErrorPolicy, Generator};
pub use error::SimError;
pub use identity::{FakeIdentity, ZipRow, ZipTable};
pub use pools::{CustomerRef, OrderPools};
pub use random::{random_number_exp, random_processed_at};
