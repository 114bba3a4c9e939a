//! Plain-text and CSV reports over analysis results.

use std::path::Path;

use mev_lens_heuristics::TransactionSummary;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

const PATH_SEPARATOR: &str = " -> ";

/// Render one summary as a text panel.
pub fn render_summary(summary: &TransactionSummary) -> String {
    let status = if summary.is_extractive {
        "[MEV DETECTED]"
    } else {
        "[No MEV]"
    };
    let timestamp_note = if summary.block_time.is_none() {
        " (analysis time)"
    } else {
        ""
    };

    format!(
        "{status}\n\
         Transaction: {}...\n\
         Wallet: {}...\n\
         Timestamp: {}{timestamp_note}\n\
         Trade Path: {}\n\
         Platforms: {}\n\
         Profit (USDC): {:.4}\n\
         Pattern: {}\n\
         Confidence: {:.2}%",
        truncate(&summary.signature, 20),
        truncate(&summary.wallet, 20),
        summary.timestamp.format("%Y-%m-%d %H:%M:%S"),
        join_or_none(&summary.trade_path, PATH_SEPARATOR),
        join_or_none(&summary.platforms, ", "),
        summary.profit_usd.round_dp(4),
        summary.pattern,
        summary.confidence * 100.0,
    )
}

/// Aggregate figures over a set of summaries.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStatistics {
    pub total: usize,
    pub extractive: usize,
    /// Profit summed over every summary, extractive or not. `None` when the
    /// sum leaves the `Decimal` range.
    pub total_profit: Option<Decimal>,
}

impl BatchStatistics {
    pub fn from_summaries(summaries: &[TransactionSummary]) -> Self {
        Self {
            total: summaries.len(),
            extractive: summaries.iter().filter(|s| s.is_extractive).count(),
            total_profit: summaries
                .iter()
                .try_fold(Decimal::ZERO, |total, s| total.checked_add(s.profit_usd)),
        }
    }

    /// Fraction of summaries flagged extractive.
    pub fn extractive_share(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.extractive as f64 / self.total as f64
        }
    }

    /// Total profit divided by the number of extractive transactions.
    pub fn average_profit_per_extractive(&self) -> Option<Decimal> {
        if self.extractive == 0 {
            return None;
        }
        self.total_profit?.checked_div(Decimal::from(self.extractive))
    }
}

/// Render the statistics table. Empty batches render nothing.
pub fn render_statistics(stats: &BatchStatistics) -> Option<String> {
    if stats.total == 0 {
        return None;
    }

    let average = match stats.average_profit_per_extractive() {
        Some(avg) => format!("{:.4}", avg.round_dp(4)),
        None => "N/A".to_string(),
    };

    let total_profit = match stats.total_profit {
        Some(total) => format!("{:.4}", total.round_dp(4)),
        None => "out of range".to_string(),
    };

    let rows = [
        ("Total Transactions", stats.total.to_string()),
        (
            "MEV Transactions",
            format!("{} ({:.1}%)", stats.extractive, stats.extractive_share() * 100.0),
        ),
        ("Total Profit (USDC)", total_profit),
        ("Avg Profit per MEV", average),
    ];

    let mut out = String::from("Analysis Statistics\n");
    for (metric, value) in rows {
        out.push_str(&format!("{:<22}{}\n", metric, value));
    }
    Some(out.trim_end().to_string())
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    signature: &'a str,
    wallet: &'a str,
    timestamp: String,
    slot: u64,
    trade_path: String,
    platforms: String,
    profit_usd: Decimal,
    is_extractive: bool,
    pattern: &'static str,
    confidence: f64,
    fee_lamports: Option<u64>,
}

/// Write one CSV row per summary.
pub fn write_csv<P: AsRef<Path>>(path: P, summaries: &[TransactionSummary]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for summary in summaries {
        writer.serialize(CsvRow {
            signature: &summary.signature,
            wallet: &summary.wallet,
            timestamp: summary.timestamp.to_rfc3339(),
            slot: summary.slot,
            trade_path: summary.trade_path.join(PATH_SEPARATOR),
            platforms: summary.platforms.join(";"),
            profit_usd: summary.profit_usd,
            is_extractive: summary.is_extractive,
            pattern: summary.pattern.as_str(),
            confidence: summary.confidence,
            fee_lamports: summary.fee_lamports,
        })?;
    }
    writer.flush()?;
    info!("Wrote {} summaries to {:?}", summaries.len(), path.as_ref());
    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn join_or_none(items: &[String], separator: &str) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(separator)
    }
}
