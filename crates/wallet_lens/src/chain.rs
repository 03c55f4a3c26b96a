//! Chain identifiers: hex EVM chain IDs plus literal Solana/Bitcoin tokens.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("unknown chain: {0}")]
    Unknown(String),
}

/// Which upstream gateway and response shape a chain routes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainFamily {
    Evm,
    Solana,
    Bitcoin,
}

/// A supported network, selected by hex chain ID or literal token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Chain {
    Ethereum,
    Goerli,
    Polygon,
    Bsc,
    Avalanche,
    Solana,
    Bitcoin,
}

impl Chain {
    pub const ALL: [Chain; 7] = [
        Chain::Ethereum,
        Chain::Goerli,
        Chain::Polygon,
        Chain::Bsc,
        Chain::Avalanche,
        Chain::Solana,
        Chain::Bitcoin,
    ];

    /// Identifier sent to the upstream API.
    pub fn id(self) -> &'static str {
        match self {
            Chain::Ethereum => "0x1",
            Chain::Goerli => "0x5",
            Chain::Polygon => "0x89",
            Chain::Bsc => "0x38",
            Chain::Avalanche => "0xa86a",
            Chain::Solana => "solana",
            Chain::Bitcoin => "bitcoin",
        }
    }

    /// Human-readable network name for prompts and table titles.
    pub fn name(self) -> &'static str {
        match self {
            Chain::Ethereum => "Ethereum Mainnet",
            Chain::Goerli => "Goerli Testnet",
            Chain::Polygon => "Polygon Mainnet",
            Chain::Bsc => "Binance Smart Chain",
            Chain::Avalanche => "Avalanche C-Chain",
            Chain::Solana => "Solana Mainnet",
            Chain::Bitcoin => "Bitcoin",
        }
    }

    pub fn family(self) -> ChainFamily {
        match self {
            Chain::Solana => ChainFamily::Solana,
            Chain::Bitcoin => ChainFamily::Bitcoin,
            _ => ChainFamily::Evm,
        }
    }

    pub fn native_symbol(self) -> &'static str {
        match self {
            Chain::Ethereum | Chain::Goerli => "ETH",
            Chain::Polygon => "MATIC",
            Chain::Bsc => "BNB",
            Chain::Avalanche => "AVAX",
            Chain::Solana => "SOL",
            Chain::Bitcoin => "BTC",
        }
    }

    /// Smallest units per one native token (wei, lamports or satoshi).
    pub fn native_divisor(self) -> f64 {
        match self.family() {
            ChainFamily::Evm => 1e18,
            ChainFamily::Solana => 1e9,
            ChainFamily::Bitcoin => 1e8,
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Chain {
    type Err = ChainError;

    /// Accepts the upstream identifier or a human alias, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0x1" | "ethereum" | "eth" => Ok(Chain::Ethereum),
            "0x5" | "goerli" => Ok(Chain::Goerli),
            "0x89" | "polygon" | "matic" => Ok(Chain::Polygon),
            "0x38" | "bsc" | "binance" => Ok(Chain::Bsc),
            "0xa86a" | "avalanche" | "avax" => Ok(Chain::Avalanche),
            "solana" | "sol" => Ok(Chain::Solana),
            "bitcoin" | "btc" => Ok(Chain::Bitcoin),
            other => Err(ChainError::Unknown(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_ids() {
        assert_eq!("0x1".parse::<Chain>().unwrap(), Chain::Ethereum);
        assert_eq!("0x89".parse::<Chain>().unwrap(), Chain::Polygon);
        assert_eq!("0xa86a".parse::<Chain>().unwrap(), Chain::Avalanche);
    }

    #[test]
    fn parse_aliases() {
        assert_eq!("Ethereum".parse::<Chain>().unwrap(), Chain::Ethereum);
        assert_eq!("SOL".parse::<Chain>().unwrap(), Chain::Solana);
        assert_eq!("btc".parse::<Chain>().unwrap(), Chain::Bitcoin);
    }

    #[test]
    fn parse_unknown() {
        assert!("0xdead".parse::<Chain>().is_err());
    }

    #[test]
    fn families_and_divisors() {
        assert_eq!(Chain::Bsc.family(), ChainFamily::Evm);
        assert_eq!(Chain::Ethereum.native_divisor(), 1e18);
        assert_eq!(Chain::Solana.native_divisor(), 1e9);
        assert_eq!(Chain::Bitcoin.native_divisor(), 1e8);
    }

    #[test]
    fn display_is_upstream_id() {
        assert_eq!(Chain::Avalanche.to_string(), "0xa86a");
        assert_eq!(Chain::Solana.to_string(), "solana");
    }
}
