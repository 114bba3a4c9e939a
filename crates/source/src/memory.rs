//! In-memory transaction source backed by recorded `getTransaction` results.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::{RawTransactionRecord, SourceResult, TransactionSource};

/// Transaction source serving records from memory.
///
/// Used to replay saved RPC responses offline and as a test double.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: HashMap<String, RawTransactionRecord>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record, keyed by its signature.
    pub fn insert(&mut self, record: RawTransactionRecord) {
        self.records.insert(record.signature.clone(), record);
    }

    /// Load records from a JSON file.
    ///
    /// The file holds either one `getTransaction` result or an array of them.
    /// A record's key is its `signature` field, falling back to
    /// `transaction.signatures[0]`. Records with neither are skipped.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let value: Value = serde_json::from_str(&raw)?;
        let entries = match value {
            Value::Array(items) => items,
            other => vec![other],
        };

        let mut source = Self::new();
        for entry in entries {
            let mut record: RawTransactionRecord = serde_json::from_value(entry)?;
            if record.signature.is_empty() {
                match record.embedded_signature() {
                    Some(sig) => record.signature = sig.to_string(),
                    None => {
                        warn!("Skipping recorded transaction without a signature");
                        continue;
                    }
                }
            }
            source.insert(record);
        }

        info!("Loaded {} recorded transactions from {:?}", source.len(), path.as_ref());
        Ok(source)
    }

    /// Signatures of all held records, sorted.
    pub fn signatures(&self) -> Vec<String> {
        let mut sigs: Vec<String> = self.records.keys().cloned().collect();
        sigs.sort();
        sigs
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl TransactionSource for MemorySource {
    async fn get_transaction(&self, signature: &str) -> SourceResult<Option<RawTransactionRecord>> {
        Ok(self.records.get(signature).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[tokio::test]
    async fn test_missing_signature_is_not_found() {
        let source = MemorySource::new();
        let result = source.get_transaction("nope").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_load_array_with_embedded_signatures() {
        let payload = json!([
            {
                "slot": 10,
                "transaction": {"signatures": ["sig-a"], "message": {}},
                "meta": {}
            },
            {
                "signature": "sig-b",
                "slot": 11,
                "transaction": {"message": {}},
                "meta": {}
            },
            {
                "slot": 12,
                "transaction": {"message": {}},
                "meta": {}
            }
        ]);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", payload).unwrap();

        let source = MemorySource::from_json_file(file.path()).unwrap();
        assert_eq!(source.signatures(), vec!["sig-a".to_string(), "sig-b".to_string()]);

        let record = source.get_transaction("sig-a").await.unwrap().unwrap();
        assert_eq!(record.slot, 10);
    }

    #[test]
    fn test_load_single_record() {
        let payload = json!({
            "signature": "only",
            "slot": 3,
            "transaction": {"message": {}},
            "meta": {}
        });
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", payload).unwrap();

        let source = MemorySource::from_json_file(file.path()).unwrap();
        assert_eq!(source.len(), 1);
    }
}
