//! Data-fetch/mutate pipeline
//!
//! All backend traffic flows through here: `transport` is the HTTP seam,
//! `request` normalizes errors, `cache` owns the process-wide keyed read
//! cache with request coalescing.

pub mod cache;
pub mod error;
pub mod request;
pub mod transport;

pub use cache::{CacheService, QueryOptions, Unauthorized};
pub use error::ApiError;
pub use request::{ApiClient, RequestDescriptor};
pub use transport::{HttpTransport, Transport};
