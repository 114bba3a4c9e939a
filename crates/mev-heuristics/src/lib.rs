//! MEV heuristic detection for Solana transaction analysis.
//!
//! Pure building blocks of the pipeline: balance extraction, profit and
//! trade path computation, venue detection and pattern classification.

pub mod balances;
pub mod classifier;
pub mod config;
pub mod deltas;
pub mod models;
pub mod reference;
pub mod venues;

pub use balances::{extract_balances, parse_balance_record, BalanceExtraction, BalanceRecordError};
pub use classifier::{classify, ClassifierConfig};
pub use config::AnalysisConfig;
pub use deltas::{calculate_profit, extract_trade_path, post_only_mints};
pub use models::{Classification, MevPattern, TokenBalance, TransactionSummary};
pub use reference::ReferenceData;
pub use venues::detect_platforms;
