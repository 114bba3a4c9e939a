//! Transaction analysis orchestration.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use mev_lens_heuristics::{
    calculate_profit, classify, detect_platforms, extract_balances, extract_trade_path,
    post_only_mints, AnalysisConfig, MevPattern, TransactionSummary,
};
use mev_lens_source::{is_valid_signature, RawTransactionRecord, SourceError, TransactionSource};
use mev_lens_telemetry::{audit, Metrics};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

/// Wallet reported when the message carries no account keys.
pub const UNKNOWN_WALLET: &str = "Unknown";

/// Why an analysis produced no summary.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Invalid transaction signature: {0:?}")]
    InvalidSignature(String),
    #[error("Fetch failed: {0}")]
    Fetch(#[from] SourceError),
    #[error("Malformed transaction record: {0}")]
    MalformedRecord(String),
}

impl AnalysisError {
    /// Failure category used in logs and metrics.
    pub fn category(&self) -> &'static str {
        match self {
            AnalysisError::InvalidSignature(_) => "invalid_signature",
            AnalysisError::Fetch(SourceError::Transport(_))
            | AnalysisError::Fetch(SourceError::RetriesExhausted { .. }) => "transient_fetch",
            AnalysisError::Fetch(SourceError::Rpc { .. }) => "rpc_rejected",
            AnalysisError::Fetch(SourceError::Malformed(_)) | AnalysisError::MalformedRecord(_) => {
                "malformed_record"
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct AuditRecord<'a> {
    signature: &'a str,
    wallet: &'a str,
    slot: u64,
    is_extractive: bool,
    pattern: MevPattern,
    confidence: f64,
    profit_usd: Decimal,
    platforms: &'a [String],
    trade_path: &'a [String],
    skipped_balance_records: usize,
}

/// Analyzer turning transaction signatures into [`TransactionSummary`] values.
pub struct TransactionAnalyzer {
    source: Arc<dyn TransactionSource>,
    config: AnalysisConfig,
    metrics: Metrics,
    sample_output_path: Option<PathBuf>,
}

impl TransactionAnalyzer {
    /// Create a new analyzer.
    ///
    /// # Arguments
    /// * `source` - Where transaction records are fetched from
    /// * `config` - Reference data and classifier thresholds
    /// * `metrics` - Metrics collector
    pub fn new(source: Arc<dyn TransactionSource>, config: AnalysisConfig, metrics: Metrics) -> Self {
        Self {
            source,
            config,
            metrics,
            sample_output_path: None,
        }
    }

    /// Append an audit line per analyzed transaction to `path`.
    pub fn with_sample_output(mut self, path: Option<PathBuf>) -> Self {
        self.sample_output_path = path;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze one transaction, best effort.
    ///
    /// Not-found records and every failure yield `None`; failures are logged
    /// with the signature and their category.
    pub async fn analyze(&self, signature: &str) -> Option<TransactionSummary> {
        match self.try_analyze(signature).await {
            Ok(Some(summary)) => {
                self.record_success(&summary);
                Some(summary)
            }
            Ok(None) => {
                warn!(signature, "No transaction data found");
                self.metrics.inc_not_found();
                None
            }
            Err(e) => {
                error!(
                    signature,
                    category = e.category(),
                    error = %e,
                    "Failed to analyze transaction"
                );
                self.metrics.inc_analysis_failures(e.category());
                None
            }
        }
    }

    /// Analyze one transaction, surfacing failures as typed errors.
    ///
    /// # Returns
    /// `Ok(None)` when the source has no record for the signature.
    pub async fn try_analyze(
        &self,
        signature: &str,
    ) -> Result<Option<TransactionSummary>, AnalysisError> {
        if !is_valid_signature(signature) {
            return Err(AnalysisError::InvalidSignature(signature.to_string()));
        }

        let record = match self.source.get_transaction(signature).await? {
            Some(record) => record,
            None => return Ok(None),
        };

        self.summarize(signature, &record).map(Some)
    }

    /// Run the analysis pipeline over an already fetched record.
    pub fn summarize(
        &self,
        signature: &str,
        record: &RawTransactionRecord,
    ) -> Result<TransactionSummary, AnalysisError> {
        if !record.meta.is_object() {
            return Err(AnalysisError::MalformedRecord("meta is not an object".to_string()));
        }
        if record.message().is_some_and(|message| !message.is_object()) {
            return Err(AnalysisError::MalformedRecord(
                "transaction.message is not an object".to_string(),
            ));
        }

        let reference = &self.config.reference;

        let pre = extract_balances(record.pre_token_balances(), reference);
        let post = extract_balances(record.post_token_balances(), reference);
        let skipped = pre.skipped + post.skipped;
        if skipped > 0 {
            debug!(signature, skipped, "Dropped malformed balance records");
        }

        let profit = calculate_profit(&pre.balances, &post.balances, reference).ok_or_else(|| {
            AnalysisError::MalformedRecord("token balance profit exceeds the decimal range".to_string())
        })?;
        let trade_path = extract_trade_path(&pre.balances, &post.balances);
        let new_mints = post_only_mints(&pre.balances, &post.balances);
        if !new_mints.is_empty() {
            debug!(signature, mints = ?new_mints, "Post-only mints excluded from profit");
        }

        let platforms = detect_platforms(record.instructions(), record.inner_instructions(), reference);
        let logs = record.log_messages();
        let classification = classify(&platforms, profit, &logs, &trade_path, &self.config.classifier);

        let timestamp = match record.block_time {
            Some(block_time) => DateTime::from_timestamp(block_time, 0).ok_or_else(|| {
                AnalysisError::MalformedRecord(format!("blockTime out of range: {}", block_time))
            })?,
            None => Utc::now(),
        };

        Ok(TransactionSummary {
            signature: signature.to_string(),
            wallet: wallet_of(record),
            timestamp,
            block_time: record.block_time,
            slot: record.slot,
            trade_path,
            platforms,
            profit_usd: profit,
            is_extractive: classification.is_extractive,
            pattern: classification.pattern,
            confidence: classification.confidence,
            fee_lamports: record.fee(),
            skipped_balance_records: skipped,
            pre_balances: pre.balances,
            post_balances: post.balances,
            raw_logs: logs,
        })
    }

    /// Analyze many signatures with at most `concurrency` in flight.
    ///
    /// Failed or missing transactions are left out; results come back in
    /// completion order.
    pub async fn analyze_batch(
        &self,
        signatures: &[String],
        concurrency: usize,
    ) -> Vec<TransactionSummary> {
        let results = stream::iter(signatures.iter().map(|signature| self.analyze(signature)))
            .buffer_unordered(concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        let summaries: Vec<TransactionSummary> = results.into_iter().flatten().collect();
        info!(
            "Analyzed {} of {} transactions",
            summaries.len(),
            signatures.len()
        );
        summaries
    }

    fn record_success(&self, summary: &TransactionSummary) {
        self.metrics.inc_transactions_analyzed();
        self.metrics
            .inc_skipped_balance_records(summary.skipped_balance_records as u64);
        if summary.is_extractive {
            self.metrics.inc_extractive(summary.pattern.as_str());
        }

        info!(
            signature = %summary.signature,
            pattern = summary.pattern.as_str(),
            confidence = summary.confidence,
            profit_usd = %summary.profit_usd,
            "Analyzed transaction"
        );

        if let Some(ref path) = self.sample_output_path {
            let record = AuditRecord {
                signature: &summary.signature,
                wallet: &summary.wallet,
                slot: summary.slot,
                is_extractive: summary.is_extractive,
                pattern: summary.pattern,
                confidence: summary.confidence,
                profit_usd: summary.profit_usd,
                platforms: &summary.platforms,
                trade_path: &summary.trade_path,
                skipped_balance_records: summary.skipped_balance_records,
            };
            if let Err(e) = audit::append_audit_record(path, &record) {
                warn!("Failed to write audit sample: {}", e);
            }
        }
    }
}

/// First account key of the message, in either `jsonParsed` or `json` encoding.
fn wallet_of(record: &RawTransactionRecord) -> String {
    record
        .account_keys()
        .first()
        .and_then(|key| match key {
            Value::String(pubkey) => Some(pubkey.as_str()),
            other => other.get("pubkey").and_then(Value::as_str),
        })
        .unwrap_or(UNKNOWN_WALLET)
        .to_string()
}
