//! Upstream API client: typed responses, fetching, and the response cache.

pub mod cache;
pub mod fetch;
pub mod responses;

pub use cache::{CacheKey, ResponseCache};
pub use fetch::{FetchConfig, FetchError, NetWorthOptions, TxFilter, WalletApi};
