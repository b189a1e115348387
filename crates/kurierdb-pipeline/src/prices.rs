//! Aggregation of raw price tokens into one amount per category.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use kurierdb_core::{PriceCategory, Stamp};

use crate::coerce::parse_decimal;

/// The amount is the trailing decimal of the cell. Tokens like
/// `(90,00) 36,00` carry a struck-through list price first; only the last
/// number counts.
static TRAILING_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+,\d{2})\s*$").expect("amount pattern must compile"));

/// Sums the raw tokens of each category. Unparseable tokens are logged and
/// skipped; a category whose tokens all fail stays absent rather than zero.
pub(crate) fn aggregate(
    stamp: &Stamp,
    prices: &BTreeMap<PriceCategory, Vec<String>>,
) -> BTreeMap<PriceCategory, Decimal> {
    let mut amounts = BTreeMap::new();
    for (&category, tokens) in prices {
        let mut total: Option<Decimal> = None;
        for token in tokens {
            let Some(amount) = TRAILING_AMOUNT
                .captures(token)
                .and_then(|caps| parse_decimal(&caps[1]))
            else {
                tracing::warn!(%stamp, %category, token, "price token has no trailing amount");
                continue;
            };
            total = Some(total.unwrap_or_default() + amount);
        }
        if let Some(total) = total {
            amounts.insert(category, total);
        }
    }
    amounts
}
