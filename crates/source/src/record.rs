//! Raw `getTransaction` record as returned by a Solana node.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One fetched transaction, kept as loosely-typed JSON sections.
///
/// Only the envelope is typed. Message and metadata stay as [`Value`] so a
/// single malformed entry can be skipped instead of failing the whole record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransactionRecord {
    /// Signature the record was requested with (not part of the RPC payload).
    #[serde(default)]
    pub signature: String,
    pub slot: u64,
    #[serde(default)]
    pub block_time: Option<i64>,
    pub transaction: Value,
    pub meta: Value,
}

impl RawTransactionRecord {
    /// The `transaction.message` section, if present.
    pub fn message(&self) -> Option<&Value> {
        self.transaction.get("message")
    }

    /// Top-level instructions of the message.
    pub fn instructions(&self) -> &[Value] {
        self.message().map(|m| array_at(m, "instructions")).unwrap_or(&[])
    }

    /// Ordered account keys of the message.
    pub fn account_keys(&self) -> &[Value] {
        self.message().map(|m| array_at(m, "accountKeys")).unwrap_or(&[])
    }

    pub fn pre_token_balances(&self) -> &[Value] {
        array_at(&self.meta, "preTokenBalances")
    }

    pub fn post_token_balances(&self) -> &[Value] {
        array_at(&self.meta, "postTokenBalances")
    }

    /// Inner instruction groups, each carrying its own `instructions` list.
    pub fn inner_instructions(&self) -> &[Value] {
        array_at(&self.meta, "innerInstructions")
    }

    /// Program log lines. Non-string entries are dropped.
    pub fn log_messages(&self) -> Vec<String> {
        array_at(&self.meta, "logMessages")
            .iter()
            .filter_map(|line| line.as_str().map(str::to_string))
            .collect()
    }

    /// Transaction fee in lamports.
    pub fn fee(&self) -> Option<u64> {
        self.meta.get("fee").and_then(Value::as_u64)
    }

    /// First signature embedded in the transaction itself.
    pub fn embedded_signature(&self) -> Option<&str> {
        self.transaction
            .get("signatures")
            .and_then(Value::as_array)
            .and_then(|sigs| sigs.first())
            .and_then(Value::as_str)
    }
}

/// Array under `key`, or an empty slice when missing or not an array.
fn array_at<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(transaction: Value, meta: Value) -> RawTransactionRecord {
        RawTransactionRecord {
            signature: String::new(),
            slot: 1,
            block_time: None,
            transaction,
            meta,
        }
    }

    #[test]
    fn test_accessors_read_sections() {
        let rec = record(
            json!({
                "signatures": ["sig-1"],
                "message": {
                    "accountKeys": [{"pubkey": "wallet"}],
                    "instructions": [{"programId": "p1"}, {"programId": "p2"}]
                }
            }),
            json!({
                "fee": 5000,
                "logMessages": ["Program log: hi", 7],
                "innerInstructions": [{"index": 0, "instructions": []}]
            }),
        );

        assert_eq!(rec.instructions().len(), 2);
        assert_eq!(rec.account_keys().len(), 1);
        assert_eq!(rec.inner_instructions().len(), 1);
        assert_eq!(rec.log_messages(), vec!["Program log: hi".to_string()]);
        assert_eq!(rec.fee(), Some(5000));
        assert_eq!(rec.embedded_signature(), Some("sig-1"));
    }

    #[test]
    fn test_missing_or_mistyped_lists_read_as_empty() {
        let rec = record(json!({}), json!({"preTokenBalances": "oops", "logMessages": null}));

        assert!(rec.message().is_none());
        assert!(rec.instructions().is_empty());
        assert!(rec.pre_token_balances().is_empty());
        assert!(rec.post_token_balances().is_empty());
        assert!(rec.log_messages().is_empty());
        assert_eq!(rec.fee(), None);
    }

    #[test]
    fn test_deserializes_rpc_result() {
        let rec: RawTransactionRecord = serde_json::from_value(json!({
            "slot": 250_000_000u64,
            "blockTime": 1_700_000_000,
            "transaction": {"message": {}},
            "meta": {"err": null}
        }))
        .unwrap();

        assert_eq!(rec.slot, 250_000_000);
        assert_eq!(rec.block_time, Some(1_700_000_000));
        assert!(rec.signature.is_empty());
    }
}
