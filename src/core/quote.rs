//! Quote abstractions and core types

use crate::core::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A tracked market instrument: a currency (USD) or a precious metal (XAU).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Instrument {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub metal: bool,
}

impl Instrument {
    pub fn new(code: &str, name: &str, metal: bool) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            metal,
        }
    }
}

/// One instrument's current two-sided price in the home currency.
///
/// `sell_rate >= buy_rate` is the usual shape but is not enforced; unreliable
/// upstream data can deliver inverted spreads and callers must tolerate them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateQuote {
    pub code: String,
    pub name: String,
    pub buy_rate: f64,
    pub sell_rate: f64,
}

/// A [`RateQuote`] with per-side deltas against the previous snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRateQuote {
    pub quote: RateQuote,
    pub buy_change: f64,
    pub sell_change: f64,
    pub buy_change_percent: f64,
    pub sell_change_percent: f64,
}

/// One upstream tier in the provider fallback chain.
///
/// A tier reports its own failures through [`ProviderError`]; the chain in
/// `rates::RateService` decides what falling through means. Returning an empty
/// vector counts as an unusable tier, not an error.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_quotes(&self, instruments: &[Instrument])
    -> Result<Vec<RateQuote>, ProviderError>;
}
