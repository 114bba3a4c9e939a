//! Static reference data: token symbols, fixed prices and known venues.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";
const MSOL_MINT: &str = "mSoLzCrK6KrAEFq3Q7t8k8k8k8k8k8k8k8k8k8k8k8k8";
const USDT_MINT: &str = "Es9vMFrzaCER9sQF2Q8k4p8p8nH3c7Yw2Zrjz5kF3bG9";

const JUPITER_PROGRAM: &str = "JUP4Fb2cqiRUcaTHdrPC8h2gNsA2ETXiPDD33WcGuJB";
const METEORA_PROGRAM: &str = "METEoRA9dFZz5e6h8vLwYp6kQw6r1t4QKq5k3h8vLwYp";
const RAYDIUM_PROGRAM: &str = "4ckmDgGzLYLyEcdh5uM4a5hQKx1e5gn9wQw5G6XcE9E5";

/// Immutable lookup tables shared by the analysis components.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceData {
    /// Mint -> display symbol.
    pub token_symbols: HashMap<String, String>,
    /// Mint -> fixed USD-equivalent price.
    pub token_prices: HashMap<String, Decimal>,
    /// Program id -> venue name.
    pub venues: HashMap<String, String>,
}

impl Default for ReferenceData {
    fn default() -> Self {
        let token_symbols = [
            (USDC_MINT, "USDC"),
            (WSOL_MINT, "SOL"),
            (MSOL_MINT, "mSOL"),
            (USDT_MINT, "USDT"),
            ("native", "SOL"),
        ];
        let token_prices = [
            (USDC_MINT, Decimal::ONE),
            (WSOL_MINT, Decimal::from(150)),
            (MSOL_MINT, Decimal::from(150)),
            (USDT_MINT, Decimal::ONE),
        ];
        let venues = [
            (JUPITER_PROGRAM, "Jupiter"),
            (METEORA_PROGRAM, "Meteora"),
            (RAYDIUM_PROGRAM, "Raydium"),
        ];

        Self {
            token_symbols: token_symbols
                .iter()
                .map(|(mint, symbol)| (mint.to_string(), symbol.to_string()))
                .collect(),
            token_prices: token_prices
                .iter()
                .map(|(mint, price)| (mint.to_string(), *price))
                .collect(),
            venues: venues
                .iter()
                .map(|(program, name)| (program.to_string(), name.to_string()))
                .collect(),
        }
    }
}

impl ReferenceData {
    /// Known symbol for a mint.
    pub fn symbol_for(&self, mint: &str) -> Option<&str> {
        self.token_symbols.get(mint).map(String::as_str)
    }

    /// Symbol to show for a mint: the known symbol, else an abbreviated mint.
    pub fn display_symbol(&self, mint: &str) -> String {
        match self.symbol_for(mint) {
            Some(symbol) => symbol.to_string(),
            None => abbreviate(mint),
        }
    }

    /// Fixed price of a mint, zero when unknown.
    pub fn price_of(&self, mint: &str) -> Decimal {
        self.token_prices.get(mint).copied().unwrap_or(Decimal::ZERO)
    }

    /// Venue name for a program id.
    pub fn venue_name(&self, program_id: &str) -> Option<&str> {
        self.venues.get(program_id).map(String::as_str)
    }
}

/// First 4 and last 4 characters joined by `...`.
fn abbreviate(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    let head: String = chars.iter().take(4).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_known_mint_uses_mapped_symbol() {
        let reference = ReferenceData::default();
        assert_eq!(reference.display_symbol(USDC_MINT), "USDC");
        assert_eq!(reference.display_symbol("native"), "SOL");
    }

    #[test]
    fn test_unknown_mint_is_abbreviated() {
        let reference = ReferenceData::default();
        assert_eq!(
            reference.display_symbol("DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263"),
            "DezX...B263"
        );
        assert_eq!(reference.display_symbol("abc"), "abc...abc");
    }

    #[test]
    fn test_prices_default_to_zero() {
        let reference = ReferenceData::default();
        assert_eq!(reference.price_of(WSOL_MINT), dec!(150));
        assert_eq!(reference.price_of("unknown"), Decimal::ZERO);
    }

    #[test]
    fn test_venue_lookup() {
        let reference = ReferenceData::default();
        assert_eq!(reference.venue_name(JUPITER_PROGRAM), Some("Jupiter"));
        assert_eq!(reference.venue_name("11111111111111111111111111111111"), None);
    }

    #[test]
    fn test_partial_json_keeps_other_tables() {
        let reference: ReferenceData =
            serde_json::from_str(r#"{"venues": {"prog": "TestDex"}}"#).unwrap();
        assert_eq!(reference.venue_name("prog"), Some("TestDex"));
        assert_eq!(reference.venue_name(JUPITER_PROGRAM), None);
        assert_eq!(reference.symbol_for(USDC_MINT), Some("USDC"));
    }
}
