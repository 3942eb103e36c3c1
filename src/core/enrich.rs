//! Delta enrichment against the previous snapshot

use crate::core::quote::{EnrichedRateQuote, RateQuote};
use std::collections::HashMap;

fn side_change(current: f64, previous: Option<f64>) -> (f64, f64) {
    match previous {
        Some(prev) => {
            let change = current - prev;
            let percent = if prev != 0.0 {
                change / prev * 100.0
            } else {
                0.0
            };
            (change, percent)
        }
        None => (0.0, 0.0),
    }
}

/// Computes per-side deltas for every current quote by looking up the previous
/// quote with the same instrument code. A pure, order-independent map: quotes
/// missing from `previous` get all-zero deltas and `previous` is never touched.
pub fn enrich(current: &[RateQuote], previous: &[RateQuote]) -> Vec<EnrichedRateQuote> {
    let by_code: HashMap<&str, &RateQuote> =
        previous.iter().map(|q| (q.code.as_str(), q)).collect();

    current
        .iter()
        .map(|quote| {
            let prev = by_code.get(quote.code.as_str());
            let (buy_change, buy_change_percent) =
                side_change(quote.buy_rate, prev.map(|p| p.buy_rate));
            let (sell_change, sell_change_percent) =
                side_change(quote.sell_rate, prev.map(|p| p.sell_rate));

            EnrichedRateQuote {
                quote: quote.clone(),
                buy_change,
                sell_change,
                buy_change_percent,
                sell_change_percent,
            }
        })
        .collect()
}
