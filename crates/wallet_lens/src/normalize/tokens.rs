//! Fungible-token balances and transfers, EVM and SPL variants.

use crate::client::responses::{EvmTokenBalance, SplTokenBalance, TokenTransfer};
use crate::normalize::units::{parse_amount, scale_by_decimals, WEI_PER_NATIVE};
use crate::table::{Cell, Column, Tabular};
use tracing::warn;

/// One row of the token-balance listing. Rows whose converted balance is not
/// strictly positive are filtered out by the constructors.
#[derive(Clone, Debug)]
pub struct TokenBalanceRow {
    pub logo: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub address: String,
    pub balance: f64,
    pub decimals: Option<u32>,
    pub total_supply: Option<f64>,
    pub verified_contract: Option<bool>,
    pub possible_spam: Option<bool>,
    pub security_score: Option<f64>,
}

pub fn from_evm(tokens: &[EvmTokenBalance]) -> Vec<TokenBalanceRow> {
    tokens
        .iter()
        .filter_map(|token| {
            let raw = parse_amount(&token.balance, &token.token_address);
            let balance = scale_by_decimals(raw, token.decimals, &token.token_address);
            if balance <= 0.0 {
                return None;
            }
            Some(TokenBalanceRow {
                logo: token.thumbnail.clone(),
                name: token.name.clone(),
                symbol: token.symbol.clone(),
                address: token.token_address.clone(),
                balance,
                decimals: token.decimals,
                total_supply: parse_supply(token.total_supply_formatted.as_deref()),
                verified_contract: token.verified_contract,
                possible_spam: token.possible_spam,
                security_score: token.security_score,
            })
        })
        .collect()
}

pub fn from_spl(tokens: &[SplTokenBalance]) -> Vec<TokenBalanceRow> {
    tokens
        .iter()
        .filter_map(|token| {
            let raw = token
                .amount
                .as_deref()
                .map_or(0.0, |a| parse_amount(a, &token.mint));
            let balance = scale_by_decimals(raw, token.decimals, &token.mint);
            if balance <= 0.0 {
                return None;
            }
            Some(TokenBalanceRow {
                logo: token.thumbnail.clone(),
                name: token.name.clone(),
                symbol: token.symbol.clone(),
                address: token.mint.clone(),
                balance,
                decimals: token.decimals,
                total_supply: parse_supply(token.total_supply.as_deref()),
                // Not present in the SPL response shape.
                verified_contract: None,
                possible_spam: token.possible_spam,
                security_score: None,
            })
        })
        .collect()
}

fn parse_supply(raw: Option<&str>) -> Option<f64> {
    let raw = raw?;
    match raw.trim().parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(value = raw, "could not parse supply value");
            None
        }
    }
}

impl Tabular for TokenBalanceRow {
    fn columns() -> Vec<Column> {
        vec![
            Column::image("Logo"),
            Column::text("Name"),
            Column::text("Symbol"),
            Column::text("Address"),
            Column::numeric("Balance", 4),
            Column::numeric("Decimals", 0),
            Column::numeric("Total Supply", 0),
            Column::text("Contract Verified"),
            Column::text("Possible Spam"),
            Column::numeric("Security Score", 0),
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::opt_text(self.logo.as_deref()),
            Cell::opt_text(self.name.as_deref()),
            Cell::opt_text(self.symbol.as_deref()),
            Cell::Text(self.address.clone()),
            Cell::Number(self.balance),
            Cell::opt_number(self.decimals.map(f64::from)),
            Cell::opt_number(self.total_supply),
            Cell::Flag(self.verified_contract),
            Cell::Flag(self.possible_spam),
            Cell::opt_number(self.security_score),
        ]
    }
}

/// One row of the fungible-token transfer history (EVM only).
#[derive(Clone, Debug)]
pub struct TokenTransferRow {
    pub transaction_hash: Option<String>,
    pub token_name: Option<String>,
    pub token_symbol: Option<String>,
    pub address: Option<String>,
    pub possible_spam: Option<bool>,
    pub to_address: Option<String>,
    pub from_address: Option<String>,
    pub value: f64,
    pub value_decimal: Option<String>,
    pub block_timestamp: Option<String>,
}

pub fn transfers_from_evm(transfers: &[TokenTransfer]) -> Vec<TokenTransferRow> {
    transfers
        .iter()
        .map(|transfer| TokenTransferRow {
            transaction_hash: transfer.transaction_hash.clone(),
            token_name: transfer.token_name.clone(),
            token_symbol: transfer.token_symbol.clone(),
            address: transfer.address.clone(),
            possible_spam: transfer.possible_spam,
            to_address: transfer.to_address.clone(),
            from_address: transfer.from_address.clone(),
            value: transfer
                .value
                .as_deref()
                .map_or(0.0, |v| parse_amount(v, "token transfer"))
                / WEI_PER_NATIVE,
            value_decimal: transfer.value_decimal.clone(),
            block_timestamp: transfer.block_timestamp.clone(),
        })
        .collect()
}

impl Tabular for TokenTransferRow {
    fn columns() -> Vec<Column> {
        vec![
            Column::text("Tx Hash"),
            Column::text("Token"),
            Column::text("Symbol"),
            Column::text("Token Address"),
            Column::text("Possible Spam"),
            Column::text("From"),
            Column::text("To"),
            Column::numeric("Value", 4),
            Column::text("Value (decimals)"),
            Column::text("Timestamp"),
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::opt_text(self.transaction_hash.as_deref()),
            Cell::opt_text(self.token_name.as_deref()),
            Cell::opt_text(self.token_symbol.as_deref()),
            Cell::opt_text(self.address.as_deref()),
            Cell::Flag(self.possible_spam),
            Cell::opt_text(self.from_address.as_deref()),
            Cell::opt_text(self.to_address.as_deref()),
            Cell::Number(self.value),
            Cell::opt_text(self.value_decimal.as_deref()),
            Cell::opt_text(self.block_timestamp.as_deref()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn evm_token(balance: &str, decimals: serde_json::Value) -> EvmTokenBalance {
        serde_json::from_value(json!({
            "token_address": "0xtoken",
            "name": "Token",
            "symbol": "TKN",
            "balance": balance,
            "decimals": decimals,
        }))
        .unwrap()
    }

    #[test]
    fn converts_by_decimals() {
        let rows = from_evm(&[evm_token("1500000000000000000", json!(18))]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].balance, 1.5);
    }

    #[test]
    fn zero_decimals_keep_raw_balance() {
        let rows = from_evm(&[evm_token("42", json!(0))]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].balance, 42.0);
    }

    #[test]
    fn invalid_decimals_fall_back_to_raw_balance() {
        let rows = from_evm(&[evm_token("42", json!("many"))]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].balance, 42.0);
        assert_eq!(rows[0].decimals, None);
    }

    #[test]
    fn zero_balance_is_filtered_out() {
        let rows = from_evm(&[evm_token("0", json!(18)), evm_token("10", json!(0))]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].balance, 10.0);
    }

    #[test]
    fn spl_variant_has_no_verification_columns() {
        let token: SplTokenBalance = serde_json::from_value(json!({
            "mint": "So1Mint",
            "amount": "3000000",
            "decimals": "6",
        }))
        .unwrap();
        let rows = from_spl(&[token]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].balance, 3.0);
        assert_eq!(rows[0].verified_contract, None);
        assert_eq!(rows[0].security_score, None);
    }

    #[test]
    fn row_cells_match_columns() {
        let rows = from_evm(&[evm_token("1", json!(0))]);
        assert_eq!(rows[0].cells().len(), TokenBalanceRow::columns().len());
    }

    #[test]
    fn transfer_value_converts_to_native() {
        let transfer: TokenTransfer = serde_json::from_value(json!({
            "transaction_hash": "0xh",
            "value": "500000000000000000",
        }))
        .unwrap();
        let rows = transfers_from_evm(&[transfer]);
        assert_eq!(rows[0].value, 0.5);
    }
}
