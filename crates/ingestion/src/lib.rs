//! Transaction fetching and analysis orchestration for MEV Lens.

pub mod analyzer;
pub mod retry;
pub mod rpc_client;

pub use analyzer::{AnalysisError, TransactionAnalyzer};
pub use retry::RetryPolicy;
pub use rpc_client::{RpcConfig, SignatureInfo, SolanaRpcClient};
