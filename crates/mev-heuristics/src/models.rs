//! Domain models produced by transaction analysis.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::reference::ReferenceData;

/// One token balance snapshot (pre or post transaction).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenBalance {
    pub mint: String,
    /// Raw integer amount in base units.
    pub amount: Decimal,
    /// Amount scaled by `10^decimals`.
    pub ui_amount: Decimal,
    pub decimals: u8,
    /// Resolved symbol, never empty.
    pub symbol: String,
}

impl TokenBalance {
    /// Build a balance, resolving its symbol against the reference data.
    pub fn new(
        mint: impl Into<String>,
        amount: Decimal,
        ui_amount: Decimal,
        decimals: u8,
        reference: &ReferenceData,
    ) -> Self {
        let mint = mint.into();
        let symbol = reference.display_symbol(&mint);
        Self {
            mint,
            amount,
            ui_amount,
            decimals,
            symbol,
        }
    }
}

/// Extraction pattern labels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MevPattern {
    MultiPlatformArbitrage,
    Backrun,
    HighProfitAnomaly,
    SandwichAttack,
    /// Reserved; no rule produces it yet.
    Liquidation,
    Unknown,
    NoExtraction,
}

impl MevPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            MevPattern::MultiPlatformArbitrage => "multi_platform_arbitrage",
            MevPattern::Backrun => "backrun",
            MevPattern::HighProfitAnomaly => "high_profit_anomaly",
            MevPattern::SandwichAttack => "sandwich_attack",
            MevPattern::Liquidation => "liquidation",
            MevPattern::Unknown => "unknown",
            MevPattern::NoExtraction => "no_extraction",
        }
    }

    /// Human-readable description used in reports.
    pub fn description(&self) -> &'static str {
        match self {
            MevPattern::MultiPlatformArbitrage => "Multi-platform arbitrage",
            MevPattern::Backrun => "Backrun detected",
            MevPattern::HighProfitAnomaly => "High PnL indicates MEV",
            MevPattern::SandwichAttack => "Sandwich attack",
            MevPattern::Liquidation => "Liquidation MEV",
            MevPattern::Unknown => "Unknown pattern",
            MevPattern::NoExtraction => "No MEV detected",
        }
    }
}

impl fmt::Display for MevPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Output of the pattern classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub is_extractive: bool,
    pub pattern: MevPattern,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

/// Final analysis result for one transaction.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionSummary {
    pub signature: String,
    /// First account key of the message, or `"Unknown"`.
    pub wallet: String,
    /// Block time when known, otherwise the time of analysis.
    pub timestamp: DateTime<Utc>,
    /// Raw block time; `None` means `timestamp` is the analysis time.
    pub block_time: Option<i64>,
    pub slot: u64,
    pub trade_path: Vec<String>,
    pub platforms: Vec<String>,
    pub profit_usd: Decimal,
    pub is_extractive: bool,
    pub pattern: MevPattern,
    pub confidence: f64,
    pub fee_lamports: Option<u64>,
    /// Balance records dropped as malformed (pre and post combined).
    pub skipped_balance_records: usize,
    pub pre_balances: Vec<TokenBalance>,
    pub post_balances: Vec<TokenBalance>,
    pub raw_logs: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_token_balance_resolves_symbol() {
        let reference = ReferenceData::default();
        let known = TokenBalance::new(
            "So11111111111111111111111111111111111111112",
            dec!(1000000000),
            dec!(1),
            9,
            &reference,
        );
        assert_eq!(known.symbol, "SOL");

        let unknown = TokenBalance::new("Mint1111222233334444", dec!(5), dec!(0.5), 1, &reference);
        assert_eq!(unknown.symbol, "Mint...4444");
    }

    #[test]
    fn test_pattern_labels() {
        assert_eq!(MevPattern::Backrun.as_str(), "backrun");
        assert_eq!(MevPattern::NoExtraction.to_string(), "No MEV detected");
        assert_eq!(
            serde_json::to_string(&MevPattern::SandwichAttack).unwrap(),
            "\"sandwich_attack\""
        );
    }
}
