//! Per-endpoint reshaping of decoded upstream responses into table rows:
//! unit conversion, field defaulting, filtering, metadata flattening.

pub mod balance;
pub mod dates;
pub mod nfts;
pub mod tokens;
pub mod transactions;
pub mod units;
pub mod worth;

pub use balance::NativeBalance;
pub use dates::{normalize_date, DateError};
pub use nfts::{NftRow, NftTransferRow};
pub use tokens::{TokenBalanceRow, TokenTransferRow};
pub use transactions::TransactionRow;
pub use units::format_grouped;
pub use worth::{NetWorthRow, PnlRow, PnlTokenGroup};
