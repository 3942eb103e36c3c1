use crate::core::error::ProviderError;
use crate::core::quote::{Instrument, QuoteProvider, RateQuote};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Half-spread applied to each side of the synthetic quote. The upstream API
/// publishes a single mid-rate, so buy/sell are derived at 0.3% per side.
const HALF_SPREAD: f64 = 0.003;

#[derive(Debug, Deserialize)]
struct SpotResponse {
    rates: HashMap<String, f64>,
}

/// Secondary tier: a public spot-rate API quoting "home currency per foreign
/// unit" mid-rates. Rates are inverted to foreign-unit value in the home
/// currency and widened into a two-sided quote. Carries no metals data;
/// precious metals are skipped and left to the primary tier.
pub struct SpotRateProvider {
    base_url: String,
    home_currency: String,
}

impl SpotRateProvider {
    pub fn new(base_url: &str, home_currency: &str) -> Self {
        SpotRateProvider {
            base_url: base_url.to_string(),
            home_currency: home_currency.to_string(),
        }
    }
}

#[async_trait]
impl QuoteProvider for SpotRateProvider {
    fn name(&self) -> &'static str {
        "spot"
    }

    #[instrument(name = "SpotFetch", skip(self, instruments))]
    async fn fetch_quotes(
        &self,
        instruments: &[Instrument],
    ) -> Result<Vec<RateQuote>, ProviderError> {
        let url = format!("{}/v4/latest/{}", self.base_url, self.home_currency);
        debug!("Requesting spot rates from {}", url);

        let client = reqwest::Client::builder().user_agent("fina/1.0").build()?;
        let response = client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status()));
        }

        let data = response
            .json::<SpotResponse>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let mut quotes = Vec::new();
        for instrument in instruments {
            if instrument.metal {
                warn!(code = %instrument.code, "Spot tier has no metals data, skipping");
                continue;
            }

            let Some(home_per_foreign) = data
                .rates
                .get(&instrument.code)
                .copied()
                .filter(|r| r.is_finite() && *r > 0.0)
            else {
                warn!(code = %instrument.code, "No usable spot rate, skipping");
                continue;
            };

            // The API quotes home->foreign; invert for the foreign unit's
            // value in home currency.
            let mid = 1.0 / home_per_foreign;
            let spread = mid * HALF_SPREAD;
            quotes.push(RateQuote {
                code: instrument.code.clone(),
                name: instrument.name.clone(),
                buy_rate: mid - spread,
                sell_rate: mid + spread,
            });
        }

        Ok(quotes)
    }
}
