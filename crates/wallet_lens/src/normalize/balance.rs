//! Native balance normalization for the three chain families.

use crate::chain::Chain;
use crate::client::responses::{BlockchairDashboard, EvmNativeBalance, SolNativeBalance};
use crate::normalize::units::{format_grouped, parse_amount};

/// A native balance converted out of smallest units.
#[derive(Clone, Debug, PartialEq)]
pub struct NativeBalance {
    pub amount: f64,
    pub symbol: &'static str,
}

impl NativeBalance {
    pub fn formatted(&self) -> String {
        format!("{} {}", format_grouped(self.amount, 4), self.symbol)
    }
}

pub fn from_evm(chain: Chain, response: &EvmNativeBalance) -> NativeBalance {
    let wei = parse_amount(&response.balance, "native balance");
    NativeBalance {
        amount: wei / chain.native_divisor(),
        symbol: chain.native_symbol(),
    }
}

pub fn from_solana(response: &SolNativeBalance) -> NativeBalance {
    let lamports = parse_amount(&response.lamports, "native balance");
    NativeBalance {
        amount: lamports / Chain::Solana.native_divisor(),
        symbol: Chain::Solana.native_symbol(),
    }
}

/// Blockchair keys the payload by the queried address; an absent key means the
/// address has never been seen, which is "no data" rather than an error.
pub fn from_blockchair(address: &str, response: &BlockchairDashboard) -> Option<NativeBalance> {
    let account = response.data.get(address)?;
    Some(NativeBalance {
        amount: account.address.balance as f64 / Chain::Bitcoin.native_divisor(),
        symbol: Chain::Bitcoin.native_symbol(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evm_wei_conversion() {
        let balance = from_evm(
            Chain::Ethereum,
            &EvmNativeBalance {
                balance: "1500000000000000000".to_string(),
            },
        );
        assert_eq!(balance.amount, 1.5);
        assert_eq!(balance.formatted(), "1.5000 ETH");
    }

    #[test]
    fn solana_lamports_conversion() {
        let balance = from_solana(&SolNativeBalance {
            lamports: "2500000000".to_string(),
        });
        assert_eq!(balance.amount, 2.5);
        assert_eq!(balance.symbol, "SOL");
    }

    #[test]
    fn blockchair_satoshi_conversion() {
        let body = r#"{"data":{"bc1q":{"address":{"balance":150000000}}}}"#;
        let dashboard: BlockchairDashboard = serde_json::from_str(body).unwrap();
        let balance = from_blockchair("bc1q", &dashboard).unwrap();
        assert_eq!(balance.amount, 1.5);
        assert_eq!(balance.symbol, "BTC");
    }

    #[test]
    fn blockchair_unknown_address_is_no_data() {
        let dashboard: BlockchairDashboard = serde_json::from_str(r#"{"data":{}}"#).unwrap();
        assert!(from_blockchair("bc1q", &dashboard).is_none());
    }

    #[test]
    fn unparsable_balance_formats_as_zero() {
        let balance = from_evm(
            Chain::Polygon,
            &EvmNativeBalance {
                balance: "garbled".to_string(),
            },
        );
        assert_eq!(balance.formatted(), "0.0000 MATIC");
    }
}
