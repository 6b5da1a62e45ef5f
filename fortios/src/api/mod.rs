pub mod client;
pub mod cmdb;
pub mod common;
pub mod error;
pub mod system;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use client::{Client, RetryConfig};
pub use cmdb::CmdbApi;
pub use common::{ApiErrorDetails, ApiQueryParams, AttributeMap, FortiResponse};
pub use error::ApiError;
pub use system::SystemStatus;
