//! Balance deltas: USD-equivalent profit and the trade path.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;

use crate::models::TokenBalance;
use crate::reference::ReferenceData;

/// Smallest absolute UI-amount change treated as a real trade (exclusive).
pub const MATERIALITY_THRESHOLD: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// Post-transaction UI amounts by mint. Last entry wins on duplicate mints.
fn post_amounts(post: &[TokenBalance]) -> HashMap<&str, Decimal> {
    post.iter().map(|b| (b.mint.as_str(), b.ui_amount)).collect()
}

/// Change of one pre-balance, reading a missing post entry as zero.
///
/// `None` when the difference leaves the `Decimal` range.
fn delta(balance: &TokenBalance, post: &HashMap<&str, Decimal>) -> Option<Decimal> {
    post.get(balance.mint.as_str())
        .copied()
        .unwrap_or(Decimal::ZERO)
        .checked_sub(balance.ui_amount)
}

/// Net USD-equivalent profit across the mints held before the transaction.
///
/// Mints that only appear in `post` are not counted; see [`post_only_mints`].
/// Returns `None` if any step overflows the `Decimal` range.
pub fn calculate_profit(
    pre: &[TokenBalance],
    post: &[TokenBalance],
    reference: &ReferenceData,
) -> Option<Decimal> {
    let post = post_amounts(post);
    pre.iter().try_fold(Decimal::ZERO, |total, balance| {
        let value = delta(balance, &post)?.checked_mul(reference.price_of(&balance.mint))?;
        total.checked_add(value)
    })
}

/// Distinct symbols whose balance moved by more than [`MATERIALITY_THRESHOLD`].
///
/// Symbols keep the order in which they first appear in `pre`.
pub fn extract_trade_path(pre: &[TokenBalance], post: &[TokenBalance]) -> Vec<String> {
    let post = post_amounts(post);
    let mut seen = HashSet::new();
    let mut path = Vec::new();

    for balance in pre {
        // A change too large to represent has certainly moved.
        let moved = delta(balance, &post).map_or(true, |d| d.abs() > MATERIALITY_THRESHOLD);
        if moved && seen.insert(balance.symbol.as_str()) {
            path.push(balance.symbol.clone());
        }
    }

    path
}

/// Mints present after the transaction but not before it.
pub fn post_only_mints<'a>(pre: &[TokenBalance], post: &'a [TokenBalance]) -> Vec<&'a str> {
    let pre_mints: HashSet<&str> = pre.iter().map(|b| b.mint.as_str()).collect();
    let mut seen = HashSet::new();

    post.iter()
        .map(|b| b.mint.as_str())
        .filter(|mint| !pre_mints.contains(mint) && seen.insert(*mint))
        .collect()
}
