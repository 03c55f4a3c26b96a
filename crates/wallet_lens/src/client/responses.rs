//! Upstream response shapes, decoded once at the boundary.
//!
//! EVM-gateway and Solana-gateway variants are distinct types; internal code
//! never re-inspects loosely-typed maps. Numeric fields arrive inconsistently
//! as JSON numbers or strings depending on the endpoint, hence the `flexible`
//! deserializers.

use serde::Deserialize;
use std::collections::HashMap;

pub(crate) mod flexible {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use tracing::warn;

    pub fn opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(raw.as_ref().and_then(coerce_u32))
    }

    pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(raw.as_ref().and_then(coerce_f64))
    }

    fn coerce_u32(value: &Value) -> Option<u32> {
        match value {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            other => {
                warn!(value = %other, "expected integer field, substituting none");
                None
            }
        }
    }

    fn coerce_f64(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            other => {
                warn!(value = %other, "expected numeric field, substituting none");
                None
            }
        }
    }
}

/// Generic page wrapper: several EVM endpoints nest rows under `result`.
#[derive(Clone, Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub result: Vec<T>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EvmNativeBalance {
    pub balance: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SolNativeBalance {
    pub lamports: String,
}

/// Blockchair nests the queried address as a dynamic map key.
#[derive(Clone, Debug, Deserialize)]
pub struct BlockchairDashboard {
    #[serde(default)]
    pub data: HashMap<String, BlockchairAccount>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlockchairAccount {
    pub address: BlockchairAddress,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlockchairAddress {
    #[serde(default)]
    pub balance: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EvmTokenBalance {
    pub token_address: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub balance: String,
    #[serde(default, deserialize_with = "flexible::opt_u32")]
    pub decimals: Option<u32>,
    pub thumbnail: Option<String>,
    pub total_supply_formatted: Option<String>,
    #[serde(default, deserialize_with = "flexible::opt_f64")]
    pub percentage_relative_to_total_supply: Option<f64>,
    pub possible_spam: Option<bool>,
    pub verified_contract: Option<bool>,
    #[serde(default, deserialize_with = "flexible::opt_f64")]
    pub security_score: Option<f64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SplTokenBalance {
    pub mint: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default, deserialize_with = "flexible::opt_u32")]
    pub decimals: Option<u32>,
    pub thumbnail: Option<String>,
    pub total_supply: Option<String>,
    pub possible_spam: Option<bool>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EvmTransaction {
    pub hash: String,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub value: Option<String>,
    pub gas: Option<String>,
    pub gas_price: Option<String>,
    pub block_timestamp: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NftTransfer {
    pub block_number: Option<String>,
    pub transaction_hash: Option<String>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub token_address: Option<String>,
    pub token_id: Option<String>,
    pub amount: Option<String>,
    pub possible_spam: Option<bool>,
    pub verified_contract: Option<bool>,
    pub block_timestamp: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NftOwned {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub token_address: Option<String>,
    pub token_id: Option<String>,
    pub amount: Option<String>,
    pub contract_type: Option<String>,
    pub token_uri: Option<String>,
    /// Serialized JSON string when present; flattened during normalization.
    pub metadata: Option<String>,
    pub possible_spam: Option<bool>,
    pub verified_collection: Option<bool>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TokenTransfer {
    pub transaction_hash: Option<String>,
    pub token_name: Option<String>,
    pub token_symbol: Option<String>,
    pub address: Option<String>,
    pub possible_spam: Option<bool>,
    pub to_address: Option<String>,
    pub from_address: Option<String>,
    pub value: Option<String>,
    #[serde(alias = "value_with_decimals")]
    pub value_decimal: Option<String>,
    pub block_timestamp: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NetWorthResponse {
    #[serde(default)]
    pub chains: Vec<NetWorthChain>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NetWorthChain {
    pub chain: Option<String>,
    #[serde(default, deserialize_with = "flexible::opt_f64")]
    pub native_balance_usd: Option<f64>,
    #[serde(default, deserialize_with = "flexible::opt_f64")]
    pub token_balance_usd: Option<f64>,
    #[serde(default, deserialize_with = "flexible::opt_f64")]
    pub networth_usd: Option<f64>,
    #[serde(default, deserialize_with = "flexible::opt_f64")]
    pub percentage: Option<f64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PnlSummary {
    #[serde(default, deserialize_with = "flexible::opt_f64")]
    pub total_count_of_trades: Option<f64>,
    #[serde(default, deserialize_with = "flexible::opt_f64")]
    pub total_trade_volume: Option<f64>,
    #[serde(default, deserialize_with = "flexible::opt_f64")]
    pub total_realized_profit_usd: Option<f64>,
    #[serde(default, deserialize_with = "flexible::opt_f64")]
    pub total_realized_profit_percentage: Option<f64>,
    #[serde(default, deserialize_with = "flexible::opt_f64")]
    pub total_sold_volume_usd: Option<f64>,
    #[serde(default, deserialize_with = "flexible::opt_f64")]
    pub total_bought_volume_usd: Option<f64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PnlTokenBreakdown {
    pub token_address: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "flexible::opt_f64")]
    pub avg_buy_price_usd: Option<f64>,
    #[serde(default, deserialize_with = "flexible::opt_f64")]
    pub avg_sell_price_usd: Option<f64>,
    #[serde(default, deserialize_with = "flexible::opt_f64")]
    pub total_usd_invested: Option<f64>,
    #[serde(default, deserialize_with = "flexible::opt_f64")]
    pub total_sold_usd: Option<f64>,
    #[serde(default, deserialize_with = "flexible::opt_f64")]
    pub realized_profit_usd: Option<f64>,
    #[serde(default, deserialize_with = "flexible::opt_f64")]
    pub realized_profit_percentage: Option<f64>,
    #[serde(default, deserialize_with = "flexible::opt_f64")]
    pub count_of_trades: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimals_accept_number_or_string() {
        let as_number: EvmTokenBalance = serde_json::from_value(serde_json::json!({
            "token_address": "0xt", "balance": "10", "decimals": 18
        }))
        .unwrap();
        let as_string: EvmTokenBalance = serde_json::from_value(serde_json::json!({
            "token_address": "0xt", "balance": "10", "decimals": "18"
        }))
        .unwrap();
        assert_eq!(as_number.decimals, Some(18));
        assert_eq!(as_string.decimals, Some(18));
    }

    #[test]
    fn invalid_decimals_become_none() {
        let garbled: EvmTokenBalance = serde_json::from_value(serde_json::json!({
            "token_address": "0xt", "balance": "10", "decimals": "many"
        }))
        .unwrap();
        assert_eq!(garbled.decimals, None);
    }

    #[test]
    fn page_tolerates_missing_result() {
        let page: Page<EvmTransaction> = serde_json::from_str("{}").unwrap();
        assert!(page.result.is_empty());
    }

    #[test]
    fn blockchair_dynamic_address_key() {
        let body = r#"{"data":{"bc1q":{"address":{"balance":150000000}}}}"#;
        let dashboard: BlockchairDashboard = serde_json::from_str(body).unwrap();
        assert_eq!(dashboard.data["bc1q"].address.balance, 150_000_000);
    }

    #[test]
    fn token_transfer_value_decimal_alias() {
        let transfer: TokenTransfer = serde_json::from_value(serde_json::json!({
            "transaction_hash": "0xh", "value_with_decimals": "1.25"
        }))
        .unwrap();
        assert_eq!(transfer.value_decimal.as_deref(), Some("1.25"));
    }
}
