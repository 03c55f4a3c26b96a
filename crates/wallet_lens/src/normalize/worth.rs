//! Net worth and profit/loss rows.

use crate::client::responses::{NetWorthChain, NetWorthResponse, PnlSummary, PnlTokenBreakdown};
use crate::normalize::units::format_grouped;
use crate::table::{Cell, Column, Tabular};

#[derive(Clone, Debug)]
pub struct NetWorthRow {
    pub category: String,
    pub chain: Option<String>,
    pub symbol: Option<String>,
    pub balance_usd: f64,
    pub percentage: Option<f64>,
}

/// Per-chain native and token rows plus a computed total row.
pub fn from_response(response: &NetWorthResponse) -> Vec<NetWorthRow> {
    let mut rows = Vec::new();
    let mut total = 0.0;
    for chain in &response.chains {
        total += chain.networth_usd.unwrap_or(0.0);
        rows.push(native_row(chain));
        let token_usd = chain.token_balance_usd.unwrap_or(0.0);
        if token_usd > 0.0 {
            rows.push(NetWorthRow {
                category: "Token Balance".to_string(),
                chain: chain.chain.clone(),
                symbol: None,
                balance_usd: token_usd,
                percentage: None,
            });
        }
    }
    rows.push(NetWorthRow {
        category: "Total Net Worth".to_string(),
        chain: None,
        symbol: None,
        balance_usd: total,
        percentage: None,
    });
    rows
}

fn native_row(chain: &NetWorthChain) -> NetWorthRow {
    NetWorthRow {
        category: "Native Balance".to_string(),
        chain: chain.chain.clone(),
        symbol: Some("Native".to_string()),
        balance_usd: chain.native_balance_usd.unwrap_or(0.0),
        percentage: chain.percentage,
    }
}

impl Tabular for NetWorthRow {
    fn columns() -> Vec<Column> {
        vec![
            Column::text("Category"),
            Column::text("Chain"),
            Column::text("Symbol"),
            Column::numeric("Balance (USD)", 2),
            Column::numeric("Percentage of Net Worth", 2),
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.category.clone()),
            Cell::opt_text(self.chain.as_deref()),
            Cell::opt_text(self.symbol.as_deref()),
            Cell::Number(self.balance_usd),
            Cell::opt_number(self.percentage),
        ]
    }
}

/// A metric/value pair of the profitability views. Values are preformatted so
/// the rendering layer treats every metric uniformly.
#[derive(Clone, Debug, PartialEq)]
pub struct PnlRow {
    pub metric: String,
    pub value: String,
}

impl PnlRow {
    fn usd(metric: &str, value: Option<f64>) -> Self {
        PnlRow {
            metric: metric.to_string(),
            value: value.map_or_else(|| "N/A".to_string(), |v| format_grouped(v, 2)),
        }
    }

    fn percent(metric: &str, value: Option<f64>) -> Self {
        PnlRow {
            metric: metric.to_string(),
            value: value.map_or_else(|| "N/A".to_string(), |v| format!("{}%", format_grouped(v, 2))),
        }
    }

    fn text(metric: &str, value: Option<&str>) -> Self {
        PnlRow {
            metric: metric.to_string(),
            value: value.unwrap_or("N/A").to_string(),
        }
    }
}

pub fn summary_rows(summary: &PnlSummary) -> Vec<PnlRow> {
    vec![
        PnlRow::usd("total_count_of_trades", summary.total_count_of_trades),
        PnlRow::usd("total_trade_volume", summary.total_trade_volume),
        PnlRow::usd("total_realized_profit_usd", summary.total_realized_profit_usd),
        PnlRow::percent(
            "Total Realized Profit (%)",
            summary.total_realized_profit_percentage,
        ),
        PnlRow::usd("total_sold_volume_usd", summary.total_sold_volume_usd),
        PnlRow::usd("total_bought_volume_usd", summary.total_bought_volume_usd),
    ]
}

/// Breakdown group for one token. The first row is always `token_address`;
/// downstream labeling relies on that ordering, which mirrors the upstream
/// contract rather than anything enforced here.
#[derive(Clone, Debug)]
pub struct PnlTokenGroup {
    pub label: String,
    pub rows: Vec<PnlRow>,
}

pub fn breakdown_groups(tokens: &[PnlTokenBreakdown]) -> Vec<PnlTokenGroup> {
    tokens
        .iter()
        .map(|token| {
            let rows = vec![
                PnlRow::text("token_address", token.token_address.as_deref()),
                PnlRow::text("name", token.name.as_deref()),
                PnlRow::text("symbol", token.symbol.as_deref()),
                PnlRow::usd("avg_buy_price_usd", token.avg_buy_price_usd),
                PnlRow::usd("avg_sell_price_usd", token.avg_sell_price_usd),
                PnlRow::usd("total_usd_invested", token.total_usd_invested),
                PnlRow::usd("total_sold_usd", token.total_sold_usd),
                PnlRow::usd("realized_profit_usd", token.realized_profit_usd),
                PnlRow::percent("realized_profit_percentage", token.realized_profit_percentage),
                PnlRow::usd("count_of_trades", token.count_of_trades),
            ];
            let label = match rows.first() {
                Some(first) if first.metric == "token_address" && first.value != "N/A" => {
                    first.value.clone()
                }
                _ => "unknown".to_string(),
            };
            PnlTokenGroup { label, rows }
        })
        .collect()
}

impl Tabular for PnlRow {
    fn columns() -> Vec<Column> {
        vec![Column::text("Metric"), Column::text("Value")]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![Cell::Text(self.metric.clone()), Cell::Text(self.value.clone())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn net_worth_rows_include_total() {
        let response: NetWorthResponse = serde_json::from_value(json!({
            "chains": [
                {
                    "chain": "eth",
                    "native_balance_usd": "100.5",
                    "token_balance_usd": "50.25",
                    "networth_usd": "150.75",
                    "percentage": 100,
                },
            ]
        }))
        .unwrap();
        let rows = from_response(&response);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].category, "Native Balance");
        assert_eq!(rows[1].category, "Token Balance");
        assert_eq!(rows[2].category, "Total Net Worth");
        assert_eq!(rows[2].balance_usd, 150.75);
    }

    #[test]
    fn zero_token_balance_row_is_omitted() {
        let response: NetWorthResponse = serde_json::from_value(json!({
            "chains": [{ "chain": "eth", "native_balance_usd": "1", "token_balance_usd": "0", "networth_usd": "1" }]
        }))
        .unwrap();
        let rows = from_response(&response);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn summary_formats_with_separators() {
        let summary: PnlSummary = serde_json::from_value(json!({
            "total_count_of_trades": 12,
            "total_trade_volume": "1234567.891",
            "total_realized_profit_percentage": null,
        }))
        .unwrap();
        let rows = summary_rows(&summary);
        assert_eq!(rows[0].value, "12.00");
        assert_eq!(rows[1].value, "1,234,567.89");
        assert_eq!(rows[3].value, "N/A");
    }

    #[test]
    fn breakdown_first_row_is_token_address() {
        let token: PnlTokenBreakdown = serde_json::from_value(json!({
            "token_address": "0xtoken",
            "realized_profit_percentage": "12.5",
        }))
        .unwrap();
        let groups = breakdown_groups(&[token]);
        assert_eq!(groups[0].label, "0xtoken");
        assert_eq!(groups[0].rows[0].metric, "token_address");
        assert_eq!(groups[0].rows[8].value, "12.50%");
    }

    #[test]
    fn breakdown_without_address_labels_unknown() {
        let token: PnlTokenBreakdown = serde_json::from_value(json!({})).unwrap();
        let groups = breakdown_groups(&[token]);
        assert_eq!(groups[0].label, "unknown");
    }
}
