//! Audit trail of analysis results as JSON Lines.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

/// Append one payload to the audit file as a single JSON line.
///
/// # Arguments
/// * `path` - Path to the audit file, created if missing
/// * `payload` - Serializable payload to write
pub fn append_audit_record<P: AsRef<Path>, T: Serialize>(path: P, payload: &T) -> anyhow::Result<()> {
    let line = serde_json::to_string(payload)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path.as_ref())?;
    writeln!(file, "{}", line)?;
    debug!("Appended audit record to {:?}", path.as_ref());
    Ok(())
}
