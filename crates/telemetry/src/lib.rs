//! Observability for MEV Lens: logging, metrics and audit samples.

pub mod audit;
pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::Metrics;
