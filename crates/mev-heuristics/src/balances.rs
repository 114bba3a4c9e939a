//! Token balance extraction from raw `preTokenBalances` / `postTokenBalances`.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use crate::models::TokenBalance;
use crate::reference::ReferenceData;

/// Why a single balance record was dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BalanceRecordError {
    #[error("balance record is not an object")]
    NotAnObject,
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("invalid `{field}`: {value}")]
    InvalidValue { field: &'static str, value: String },
}

/// Balances parsed from one list, plus how many records were dropped.
#[derive(Debug, Clone, Default)]
pub struct BalanceExtraction {
    pub balances: Vec<TokenBalance>,
    pub skipped: usize,
}

/// Parse one raw balance record.
///
/// Expects `mint` and a `uiTokenAmount` object with `amount`, `uiAmount`
/// (may be `null`, read as zero) and `decimals`.
pub fn parse_balance_record(
    record: &Value,
    reference: &ReferenceData,
) -> Result<TokenBalance, BalanceRecordError> {
    let fields = record.as_object().ok_or(BalanceRecordError::NotAnObject)?;

    let mint = fields
        .get("mint")
        .and_then(Value::as_str)
        .filter(|mint| !mint.is_empty())
        .ok_or(BalanceRecordError::MissingField("mint"))?;

    let token_amount = fields
        .get("uiTokenAmount")
        .filter(|v| v.is_object())
        .ok_or(BalanceRecordError::MissingField("uiTokenAmount"))?;

    let amount = match token_amount.get("amount") {
        Some(value) if !value.is_null() => decimal_from(value, "amount")?,
        _ => return Err(BalanceRecordError::MissingField("amount")),
    };

    let ui_amount = match token_amount.get("uiAmount") {
        Some(Value::Null) => Decimal::ZERO,
        Some(value) => decimal_from(value, "uiAmount")?,
        None => return Err(BalanceRecordError::MissingField("uiAmount")),
    };

    let decimals = match token_amount.get("decimals") {
        Some(value) => value
            .as_u64()
            .and_then(|d| u8::try_from(d).ok())
            .ok_or_else(|| BalanceRecordError::InvalidValue {
                field: "decimals",
                value: value.to_string(),
            })?,
        None => return Err(BalanceRecordError::MissingField("decimals")),
    };

    Ok(TokenBalance::new(mint, amount, ui_amount, decimals, reference))
}

/// Parse a list of raw balance records, dropping the malformed ones.
///
/// Relative order of the parsed records is preserved.
pub fn extract_balances(records: &[Value], reference: &ReferenceData) -> BalanceExtraction {
    let mut extraction = BalanceExtraction::default();

    for (index, record) in records.iter().enumerate() {
        match parse_balance_record(record, reference) {
            Ok(balance) => extraction.balances.push(balance),
            Err(e) => {
                debug!(index, reason = %e, "Skipping malformed balance record");
                extraction.skipped += 1;
            }
        }
    }

    extraction
}

/// Read a decimal from a JSON string or number.
fn decimal_from(value: &Value, field: &'static str) -> Result<Decimal, BalanceRecordError> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => {
            return Err(BalanceRecordError::InvalidValue {
                field,
                value: other.to_string(),
            })
        }
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| BalanceRecordError::InvalidValue { field, value: text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

    fn raw(mint: &str, amount: &str, ui_amount: Value, decimals: u64) -> Value {
        json!({
            "accountIndex": 1,
            "mint": mint,
            "uiTokenAmount": {
                "amount": amount,
                "uiAmount": ui_amount,
                "decimals": decimals,
                "uiAmountString": "ignored"
            }
        })
    }

    #[test]
    fn test_parse_complete_record() {
        let reference = ReferenceData::default();
        let balance = parse_balance_record(&raw(USDC, "1500000", json!(1.5), 6), &reference).unwrap();

        assert_eq!(balance.mint, USDC);
        assert_eq!(balance.amount, dec!(1500000));
        assert_eq!(balance.ui_amount, dec!(1.5));
        assert_eq!(balance.decimals, 6);
        assert_eq!(balance.symbol, "USDC");
    }

    #[test]
    fn test_null_ui_amount_is_zero() {
        let reference = ReferenceData::default();
        let balance = parse_balance_record(&raw(USDC, "0", Value::Null, 6), &reference).unwrap();
        assert_eq!(balance.ui_amount, Decimal::ZERO);
    }

    #[test]
    fn test_tiny_ui_amount_in_exponent_form() {
        let reference = ReferenceData::default();
        let balance = parse_balance_record(&raw(USDC, "1", json!(1e-7), 7), &reference).unwrap();
        assert_eq!(balance.ui_amount, dec!(0.0000001));
    }

    #[test]
    fn test_missing_amount_is_reported() {
        let reference = ReferenceData::default();
        let record = json!({"mint": USDC, "uiTokenAmount": {"uiAmount": 1.0, "decimals": 6}});
        assert_eq!(
            parse_balance_record(&record, &reference),
            Err(BalanceRecordError::MissingField("amount"))
        );
    }

    #[test]
    fn test_invalid_fields_are_reported() {
        let reference = ReferenceData::default();
        assert_eq!(
            parse_balance_record(&json!("not a record"), &reference),
            Err(BalanceRecordError::NotAnObject)
        );
        assert_eq!(
            parse_balance_record(&raw("", "1", json!(1), 0), &reference),
            Err(BalanceRecordError::MissingField("mint"))
        );
        assert!(matches!(
            parse_balance_record(&raw(USDC, "lots", json!(1), 6), &reference),
            Err(BalanceRecordError::InvalidValue { field: "amount", .. })
        ));
        assert!(matches!(
            parse_balance_record(&raw(USDC, "1", json!(1), 300), &reference),
            Err(BalanceRecordError::InvalidValue { field: "decimals", .. })
        ));
    }

    #[test]
    fn test_malformed_record_does_not_abort_extraction() {
        let reference = ReferenceData::default();
        let records = vec![
            raw(USDC, "1000000", json!(1.0), 6),
            json!({"mint": "broken", "uiTokenAmount": {"uiAmount": 2.0, "decimals": 6}}),
            raw("So11111111111111111111111111111111111111112", "2000000000", json!(2.0), 9),
        ];

        let extraction = extract_balances(&records, &reference);

        assert_eq!(extraction.skipped, 1);
        let symbols: Vec<&str> = extraction.balances.iter().map(|b| b.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["USDC", "SOL"]);
    }
}
