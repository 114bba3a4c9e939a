//! Transaction data source interface for MEV Lens.
//!
//! The analysis pipeline only sees transactions through the
//! [`TransactionSource`] trait, so the JSON-RPC client, recorded fixtures
//! and test doubles can be swapped in without touching the core.

use async_trait::async_trait;

pub mod memory;
pub mod record;

pub use memory::MemorySource;
pub use record::RawTransactionRecord;

/// Minimum length of a base58 transaction signature accepted for analysis.
pub const MIN_SIGNATURE_LEN: usize = 80;

/// Check whether a signature looks like a real transaction signature.
pub fn is_valid_signature(signature: &str) -> bool {
    !signature.is_empty() && signature.len() >= MIN_SIGNATURE_LEN
}

/// Error type for transaction source operations.
///
/// "Transaction not found" is not an error: sources report it as `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("Request failed after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: usize, last_error: String },
}

impl SourceError {
    /// Whether another attempt at the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SourceError::Transport(_))
    }
}

/// Result type for transaction source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Trait for transaction data sources.
///
/// Implementations own their transport concerns (timeouts, retries). By the
/// time an error reaches the caller, retries have already been spent.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Fetch the raw record for a transaction signature.
    ///
    /// # Returns
    /// `Ok(None)` when the source has no record for the signature.
    async fn get_transaction(&self, signature: &str) -> SourceResult<Option<RawTransactionRecord>>;
}
