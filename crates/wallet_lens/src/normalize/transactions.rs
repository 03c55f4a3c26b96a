//! Wallet transaction history rows (EVM only).

use crate::client::responses::EvmTransaction;
use crate::normalize::units::{parse_amount, WEI_PER_GWEI, WEI_PER_NATIVE};
use crate::table::{Cell, Column, Tabular};

#[derive(Clone, Debug)]
pub struct TransactionRow {
    pub hash: String,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    /// Transferred value in the chain's native token.
    pub value: f64,
    pub gas: Option<String>,
    /// Gas price in gwei.
    pub gas_price: f64,
    pub block_timestamp: Option<String>,
}

pub fn from_evm(transactions: &[EvmTransaction]) -> Vec<TransactionRow> {
    transactions
        .iter()
        .map(|tx| TransactionRow {
            hash: tx.hash.clone(),
            from_address: tx.from_address.clone(),
            to_address: tx.to_address.clone(),
            value: tx
                .value
                .as_deref()
                .map_or(0.0, |v| parse_amount(v, "tx value"))
                / WEI_PER_NATIVE,
            gas: tx.gas.clone(),
            gas_price: tx
                .gas_price
                .as_deref()
                .map_or(0.0, |v| parse_amount(v, "gas price"))
                / WEI_PER_GWEI,
            block_timestamp: tx.block_timestamp.clone(),
        })
        .collect()
}

impl Tabular for TransactionRow {
    fn columns() -> Vec<Column> {
        vec![
            Column::text("Hash"),
            Column::text("From"),
            Column::text("To"),
            Column::numeric("Value", 4),
            Column::text("Gas"),
            Column::numeric("Gas Price (gwei)", 4),
            Column::text("Timestamp"),
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.hash.clone()),
            Cell::opt_text(self.from_address.as_deref()),
            Cell::opt_text(self.to_address.as_deref()),
            Cell::Number(self.value),
            Cell::opt_text(self.gas.as_deref()),
            Cell::Number(self.gas_price),
            Cell::opt_text(self.block_timestamp.as_deref()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn converts_value_and_gas_price() {
        let tx: EvmTransaction = serde_json::from_value(json!({
            "hash": "0xh",
            "from_address": "0xa",
            "to_address": "0xb",
            "value": "1500000000000000000",
            "gas": "21000",
            "gas_price": "30000000000",
            "block_timestamp": "2024-01-01T00:00:00.000Z",
        }))
        .unwrap();
        let rows = from_evm(&[tx]);
        assert_eq!(rows[0].value, 1.5);
        assert_eq!(rows[0].gas_price, 30.0);
    }

    #[test]
    fn missing_value_defaults_to_zero() {
        let tx: EvmTransaction = serde_json::from_value(json!({ "hash": "0xh" })).unwrap();
        let rows = from_evm(&[tx]);
        assert_eq!(rows[0].value, 0.0);
        assert_eq!(rows[0].gas_price, 0.0);
        assert_eq!(rows[0].cells()[1], Cell::Missing);
    }
}
