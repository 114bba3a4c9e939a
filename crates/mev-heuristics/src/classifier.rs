//! Extraction pattern heuristics.
//!
//! Rules are evaluated in order and the first match wins, from the most
//! specific signature (multi-venue arbitrage) to the least specific (any
//! unexplained profit).

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Classification, MevPattern};

const MULTI_PLATFORM_CONFIDENCE: f64 = 0.85;
const BACKRUN_CONFIDENCE: f64 = 0.75;
const HIGH_PROFIT_CONFIDENCE: f64 = 0.70;
const SANDWICH_CONFIDENCE: f64 = 0.60;
const LOW_SIGNAL_CONFIDENCE: f64 = 0.40;
const NO_EXTRACTION_CONFIDENCE: f64 = 0.95;

/// Log marker left by backrun bots, matched case-insensitively.
const BACKRUN_LOG_MARKER: &str = "backrun";

/// Thresholds of the classification rules. Profit floors are exclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub multi_platform_profit_floor: Decimal,
    pub high_profit_floor: Decimal,
    /// Minimum number of distinct trade path entries for a sandwich.
    pub sandwich_min_path_len: usize,
    pub sandwich_profit_floor: Decimal,
    pub low_signal_profit_floor: Decimal,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            multi_platform_profit_floor: Decimal::new(1, 2),
            high_profit_floor: Decimal::ONE,
            sandwich_min_path_len: 3,
            sandwich_profit_floor: Decimal::new(5, 2),
            low_signal_profit_floor: Decimal::new(1, 1),
        }
    }
}

/// Classify a transaction from its venues, profit, logs and trade path.
///
/// # Arguments
/// * `platforms` - Venue names touched by the transaction
/// * `profit` - Net USD-equivalent profit
/// * `logs` - Program log lines
/// * `trade_path` - Symbols whose balance changed materially
/// * `config` - Rule thresholds
pub fn classify(
    platforms: &[String],
    profit: Decimal,
    logs: &[String],
    trade_path: &[String],
    config: &ClassifierConfig,
) -> Classification {
    let (is_extractive, pattern, confidence) = if distinct(platforms) > 1
        && profit > config.multi_platform_profit_floor
    {
        (true, MevPattern::MultiPlatformArbitrage, MULTI_PLATFORM_CONFIDENCE)
    } else if has_backrun_marker(logs) {
        (true, MevPattern::Backrun, BACKRUN_CONFIDENCE)
    } else if profit > config.high_profit_floor {
        (true, MevPattern::HighProfitAnomaly, HIGH_PROFIT_CONFIDENCE)
    } else if distinct(trade_path) >= config.sandwich_min_path_len
        && profit > config.sandwich_profit_floor
    {
        (true, MevPattern::SandwichAttack, SANDWICH_CONFIDENCE)
    } else if profit > config.low_signal_profit_floor {
        (true, MevPattern::Unknown, LOW_SIGNAL_CONFIDENCE)
    } else {
        (false, MevPattern::NoExtraction, NO_EXTRACTION_CONFIDENCE)
    };

    Classification {
        is_extractive,
        pattern,
        confidence,
    }
}

fn distinct(items: &[String]) -> usize {
    items.iter().collect::<HashSet<_>>().len()
}

fn has_backrun_marker(logs: &[String]) -> bool {
    logs.iter()
        .any(|line| line.to_lowercase().contains(BACKRUN_LOG_MARKER))
}
