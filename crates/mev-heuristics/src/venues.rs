//! Venue detection from top-level and inner instructions.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::reference::ReferenceData;

/// Names of the known venues invoked by a transaction.
///
/// Scans the `programId` of every top-level instruction and of every entry
/// in each inner instruction group. Unknown or missing program ids are
/// ignored. The result is deduplicated and sorted.
pub fn detect_platforms(
    instructions: &[Value],
    inner_instruction_groups: &[Value],
    reference: &ReferenceData,
) -> Vec<String> {
    let inner = inner_instruction_groups.iter().flat_map(|group| {
        group
            .get("instructions")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    });

    instructions
        .iter()
        .chain(inner)
        .filter_map(|ix| ix.get("programId").and_then(Value::as_str))
        .filter_map(|program_id| reference.venue_name(program_id))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const JUPITER: &str = "JUP4Fb2cqiRUcaTHdrPC8h2gNsA2ETXiPDD33WcGuJB";
    const RAYDIUM: &str = "4ckmDgGzLYLyEcdh5uM4a5hQKx1e5gn9wQw5G6XcE9E5";
    const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

    #[test]
    fn test_detects_top_level_and_inner_venues() {
        let reference = ReferenceData::default();
        let instructions = vec![json!({"programId": JUPITER}), json!({"programId": TOKEN_PROGRAM})];
        let inner = vec![json!({
            "index": 0,
            "instructions": [{"programId": RAYDIUM}, {"programId": JUPITER}]
        })];

        assert_eq!(
            detect_platforms(&instructions, &inner, &reference),
            vec!["Jupiter".to_string(), "Raydium".to_string()]
        );
    }

    #[test]
    fn test_unknown_and_malformed_entries_are_ignored() {
        let reference = ReferenceData::default();
        let instructions = vec![
            json!({"programId": TOKEN_PROGRAM}),
            json!({"programIdIndex": 4}),
            json!("garbage"),
            json!({"programId": 42}),
        ];
        let inner = vec![json!({"index": 1}), json!({"instructions": "nope"})];

        assert!(detect_platforms(&instructions, &inner, &reference).is_empty());
    }
}
