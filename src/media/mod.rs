//! Media resolution: waiting for lazily rendered resources and retrieving
//! their bytes.

pub mod fetch;
pub mod resolver;

pub use fetch::{decode_data_reference, FetchError, FetchResult, Fetcher, HttpFetcher};
pub use resolver::{classify, is_finalized, ResourceResolver};
