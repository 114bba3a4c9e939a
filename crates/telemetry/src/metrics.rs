//! Prometheus metrics for MEV Lens transaction analysis.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Metrics collector for the analysis pipeline.
///
/// Each instance owns its registry, so several collectors can coexist in one
/// process (one per analyzer, one per test).
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    transactions_analyzed: IntCounter,
    extractive_transactions: IntCounterVec,
    transactions_not_found: IntCounter,
    analysis_failures: IntCounterVec,
    skipped_balance_records: IntCounter,
    rpc_errors: IntCounter,
    rpc_latency: HistogramVec,
}

impl Metrics {
    /// Create a new metrics instance.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let transactions_analyzed = IntCounter::new(
            "mev_lens_transactions_analyzed_total",
            "Total number of transactions analyzed successfully",
        )?;

        let extractive_transactions = IntCounterVec::new(
            Opts::new(
                "mev_lens_extractive_transactions_total",
                "Total number of transactions classified as extractive",
            ),
            &["pattern"],
        )?;

        let transactions_not_found = IntCounter::new(
            "mev_lens_transactions_not_found_total",
            "Total number of signatures the source had no record for",
        )?;

        let analysis_failures = IntCounterVec::new(
            Opts::new(
                "mev_lens_analysis_failures_total",
                "Total number of analyses that produced no result",
            ),
            &["category"],
        )?;

        let skipped_balance_records = IntCounter::new(
            "mev_lens_skipped_balance_records_total",
            "Total number of malformed token balance records skipped",
        )?;

        let rpc_errors = IntCounter::new("mev_lens_rpc_errors_total", "Total number of RPC errors")?;

        let rpc_latency = HistogramVec::new(
            HistogramOpts::new("mev_lens_rpc_latency_seconds", "RPC call latency in seconds"),
            &["operation"],
        )?;

        registry.register(Box::new(transactions_analyzed.clone()))?;
        registry.register(Box::new(extractive_transactions.clone()))?;
        registry.register(Box::new(transactions_not_found.clone()))?;
        registry.register(Box::new(analysis_failures.clone()))?;
        registry.register(Box::new(skipped_balance_records.clone()))?;
        registry.register(Box::new(rpc_errors.clone()))?;
        registry.register(Box::new(rpc_latency.clone()))?;

        Ok(Self {
            registry,
            transactions_analyzed,
            extractive_transactions,
            transactions_not_found,
            analysis_failures,
            skipped_balance_records,
            rpc_errors,
            rpc_latency,
        })
    }

    /// Increment the analyzed transactions counter.
    pub fn inc_transactions_analyzed(&self) {
        self.transactions_analyzed.inc();
    }

    /// Count an extractive transaction under its pattern code.
    pub fn inc_extractive(&self, pattern: &str) {
        self.extractive_transactions.with_label_values(&[pattern]).inc();
    }

    pub fn inc_not_found(&self) {
        self.transactions_not_found.inc();
    }

    /// Count an analysis that was downgraded to "no result".
    pub fn inc_analysis_failures(&self, category: &str) {
        self.analysis_failures.with_label_values(&[category]).inc();
    }

    pub fn inc_skipped_balance_records(&self, count: u64) {
        self.skipped_balance_records.inc_by(count);
    }

    /// Increment the RPC errors counter.
    pub fn inc_rpc_errors(&self) {
        self.rpc_errors.inc();
    }

    /// Record RPC latency.
    pub fn observe_rpc_latency(&self, operation: &str, duration_secs: f64) {
        self.rpc_latency.with_label_values(&[operation]).observe(duration_secs);
    }

    pub fn transactions_analyzed(&self) -> u64 {
        self.transactions_analyzed.get()
    }

    pub fn transactions_not_found(&self) -> u64 {
        self.transactions_not_found.get()
    }

    pub fn analysis_failures(&self, category: &str) -> u64 {
        self.analysis_failures.with_label_values(&[category]).get()
    }

    /// Get Prometheus metrics as a string.
    pub fn gather(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instances_are_independent() {
        let first = Metrics::new().unwrap();
        let second = Metrics::new().unwrap();

        first.inc_transactions_analyzed();
        first.inc_analysis_failures("transient_fetch");

        assert_eq!(first.transactions_analyzed(), 1);
        assert_eq!(second.transactions_analyzed(), 0);
        assert_eq!(first.analysis_failures("transient_fetch"), 1);
        assert_eq!(first.analysis_failures("malformed_record"), 0);

        second.inc_not_found();
        assert_eq!(second.transactions_not_found(), 1);
        assert_eq!(first.transactions_not_found(), 0);
    }

    #[test]
    fn test_gather_renders_text_format() {
        let metrics = Metrics::new().unwrap();
        metrics.inc_extractive("backrun");
        metrics.observe_rpc_latency("get_transaction", 0.25);

        let body = metrics.gather().unwrap();
        assert!(body.contains("mev_lens_extractive_transactions_total{pattern=\"backrun\"} 1"));
        assert!(body.contains("mev_lens_rpc_latency_seconds_count{operation=\"get_transaction\"} 1"));
    }
}
