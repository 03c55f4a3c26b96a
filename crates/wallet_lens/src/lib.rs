//! wallet_lens — wallet explorer over hosted chain-data APIs.
//!
//! Queries balances, transfers, NFTs and profit/loss for a wallet address and
//! reshapes the per-chain response variants into uniform table rows. A bounded
//! TTL/LRU cache in front of the upstream avoids redundant calls when the same
//! query is repeated inside a short window. Read-only; no signing, no indexing.

pub mod chain;
pub mod client;
pub mod config;
pub mod normalize;
pub mod table;

pub use chain::{Chain, ChainFamily};
pub use client::cache::{CacheKey, ResponseCache};
pub use client::fetch::{FetchConfig, FetchError, NetWorthOptions, TxFilter, WalletApi};
pub use config::{Config, ConfigError};
pub use table::{table_from, Cell, Column, ColumnKind, Table, Tabular};
