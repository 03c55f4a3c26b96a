//! NFT holdings and transfer rows, including metadata flattening.

use crate::client::responses::{NftOwned, NftTransfer};
use crate::table::{Cell, Column, Tabular};

#[derive(Clone, Debug)]
pub struct NftRow {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub token_address: Option<String>,
    pub token_id: Option<String>,
    pub amount: Option<String>,
    pub contract_type: Option<String>,
    pub token_uri: Option<String>,
    /// Flattened `key: value` listing, the raw string when unparsable, or
    /// `None` when the upstream carried no metadata at all.
    pub metadata: Option<String>,
    pub possible_spam: Option<bool>,
    pub verified_collection: Option<bool>,
}

pub fn from_owned(nfts: &[NftOwned]) -> Vec<NftRow> {
    nfts.iter()
        .map(|nft| NftRow {
            name: nft.name.clone(),
            symbol: nft.symbol.clone(),
            token_address: nft.token_address.clone(),
            token_id: nft.token_id.clone(),
            amount: nft.amount.clone(),
            contract_type: nft.contract_type.clone(),
            token_uri: nft.token_uri.clone(),
            metadata: nft.metadata.as_deref().map(format_metadata),
            possible_spam: nft.possible_spam,
            verified_collection: nft.verified_collection,
        })
        .collect()
}

/// Flatten a serialized JSON object to `"key: value, key: value"`. Anything
/// that does not parse as an object passes through unchanged.
pub fn format_metadata(raw: &str) -> String {
    match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(raw) {
        Ok(fields) => fields
            .iter()
            .map(|(key, value)| match value {
                serde_json::Value::String(s) => format!("{key}: {s}"),
                other => format!("{key}: {other}"),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Err(_) => raw.to_string(),
    }
}

impl Tabular for NftRow {
    fn columns() -> Vec<Column> {
        vec![
            Column::text("Name"),
            Column::text("Symbol"),
            Column::text("Token Address"),
            Column::text("Token ID"),
            Column::text("Amount"),
            Column::text("Contract Type"),
            Column::text("Token URI"),
            Column::text("Metadata"),
            Column::text("Possible Spam"),
            Column::text("Verified Collection"),
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::opt_text(self.name.as_deref()),
            Cell::opt_text(self.symbol.as_deref()),
            Cell::opt_text(self.token_address.as_deref()),
            Cell::opt_text(self.token_id.as_deref()),
            Cell::opt_text(self.amount.as_deref()),
            Cell::opt_text(self.contract_type.as_deref()),
            Cell::opt_text(self.token_uri.as_deref()),
            Cell::opt_text(self.metadata.as_deref()),
            Cell::Flag(self.possible_spam),
            Cell::Flag(self.verified_collection),
        ]
    }
}

#[derive(Clone, Debug)]
pub struct NftTransferRow {
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

pub fn transfers(transfers: &[NftTransfer]) -> Vec<NftTransferRow> {
    transfers
        .iter()
        .map(|transfer| NftTransferRow {
            block_number: transfer.block_number.clone(),
            transaction_hash: transfer.transaction_hash.clone(),
            from_address: transfer.from_address.clone(),
            to_address: transfer.to_address.clone(),
            token_address: transfer.token_address.clone(),
            token_id: transfer.token_id.clone(),
            amount: transfer.amount.clone(),
            possible_spam: transfer.possible_spam,
            verified_contract: transfer.verified_contract,
            block_timestamp: transfer.block_timestamp.clone(),
        })
        .collect()
}

impl Tabular for NftTransferRow {
    fn columns() -> Vec<Column> {
        vec![
            Column::text("Block"),
            Column::text("Tx Hash"),
            Column::text("From"),
            Column::text("To"),
            Column::text("Token Address"),
            Column::text("Token ID"),
            Column::text("Amount"),
            Column::text("Possible Spam"),
            Column::text("Contract Verified"),
            Column::text("Timestamp"),
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::opt_text(self.block_number.as_deref()),
            Cell::opt_text(self.transaction_hash.as_deref()),
            Cell::opt_text(self.from_address.as_deref()),
            Cell::opt_text(self.to_address.as_deref()),
            Cell::opt_text(self.token_address.as_deref()),
            Cell::opt_text(self.token_id.as_deref()),
            Cell::opt_text(self.amount.as_deref()),
            Cell::Flag(self.possible_spam),
            Cell::Flag(self.verified_contract),
            Cell::opt_text(self.block_timestamp.as_deref()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metadata_object_flattens() {
        assert_eq!(format_metadata(r#"{"trait":"gold"}"#), "trait: gold");
    }

    #[test]
    fn metadata_multiple_fields() {
        let flat = format_metadata(r#"{"a":"1","b":2}"#);
        assert_eq!(flat, "a: 1, b: 2");
    }

    #[test]
    fn metadata_invalid_passes_through() {
        assert_eq!(format_metadata("not-json"), "not-json");
    }

    #[test]
    fn metadata_non_object_json_passes_through() {
        assert_eq!(format_metadata("[1,2]"), "[1,2]");
        assert_eq!(format_metadata("5"), "5");
    }

    #[test]
    fn absent_metadata_renders_as_missing() {
        let nft: NftOwned = serde_json::from_value(json!({ "name": "n" })).unwrap();
        let rows = from_owned(&[nft]);
        assert_eq!(rows[0].metadata, None);
        // The metadata column is present even when the field is absent.
        assert_eq!(rows[0].cells()[7], Cell::Missing);
    }

    #[test]
    fn transfer_flags_survive() {
        let transfer: NftTransfer = serde_json::from_value(json!({
            "transaction_hash": "0xh",
            "possible_spam": true,
        }))
        .unwrap();
        let rows = transfers(&[transfer]);
        assert_eq!(rows[0].possible_spam, Some(true));
        assert_eq!(rows[0].verified_contract, None);
    }
}
