use crate::core::error::ProviderError;
use crate::core::quote::{Instrument, QuoteProvider, RateQuote};
use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

fn buy_series(code: &str) -> String {
    format!("TP.DK.{code}.A")
}

fn sell_series(code: &str) -> String {
    format!("TP.DK.{code}.S")
}

/// Series values arrive as JSON strings on some days and numbers on others.
fn parse_rate(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        other => other.as_f64()?,
    };
    (parsed.is_finite() && parsed > 0.0).then_some(parsed)
}

/// EVDS responses come in two shapes: a flat `items` array of per-date records
/// keyed by series id, and a ragged `series` object mapping each series id to
/// its own list of dated values. The array shape is tried first.
#[derive(Debug, Deserialize)]
struct EvdsResponse {
    #[serde(alias = "Items", alias = "data", alias = "Data")]
    items: Option<Vec<Value>>,
    series: Option<serde_json::Map<String, Value>>,
}

impl EvdsResponse {
    fn rate_for(&self, series_key: &str) -> Option<f64> {
        if let Some(items) = &self.items
            && let Some(latest) = items.last()
            && let Some(rate) = latest.get(series_key).and_then(parse_rate)
        {
            return Some(rate);
        }

        self.series
            .as_ref()
            .and_then(|series| series.get(series_key))
            .and_then(|entries| entries.as_array())
            .and_then(|entries| entries.last())
            .and_then(|entry| entry.get("value"))
            .and_then(parse_rate)
    }
}

/// Primary tier: central-bank indicative rates, two-sided by construction.
pub struct EvdsProvider {
    base_url: String,
    api_key: String,
}

impl EvdsProvider {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        EvdsProvider {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn fetch_one(&self, instrument: &Instrument) -> Result<RateQuote, ProviderError> {
        let today = Utc::now().format("%Y-%m-%d");
        let url = format!(
            "{}/service/evds/series={},{}&startDate={}&endDate={}&type=json&key={}",
            self.base_url,
            buy_series(&instrument.code),
            sell_series(&instrument.code),
            today,
            today,
            self.api_key,
        );
        debug!("Requesting series data from {}", url);

        let client = reqwest::Client::builder().user_agent("fina/1.0").build()?;
        let response = client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status()));
        }

        let data = response
            .json::<EvdsResponse>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let buy = data.rate_for(&buy_series(&instrument.code));
        let sell = data.rate_for(&sell_series(&instrument.code));
        match (buy, sell) {
            (Some(buy_rate), Some(sell_rate)) => Ok(RateQuote {
                code: instrument.code.clone(),
                name: instrument.name.clone(),
                buy_rate,
                sell_rate,
            }),
            _ => Err(ProviderError::NoData),
        }
    }
}

#[async_trait]
impl QuoteProvider for EvdsProvider {
    fn name(&self) -> &'static str {
        "evds"
    }

    /// Fetches every instrument concurrently. A failing instrument does not
    /// cancel its siblings; it is logged and dropped from the result.
    #[instrument(name = "EvdsFetch", skip(self, instruments))]
    async fn fetch_quotes(
        &self,
        instruments: &[Instrument],
    ) -> Result<Vec<RateQuote>, ProviderError> {
        let fetches = instruments.iter().map(|instrument| async move {
            (instrument, self.fetch_one(instrument).await)
        });

        let mut quotes = Vec::new();
        for (instrument, result) in join_all(fetches).await {
            match result {
                Ok(quote) => {
                    debug!(code = %quote.code, buy = quote.buy_rate, sell = quote.sell_rate, "Resolved quote");
                    quotes.push(quote);
                }
                Err(e) => {
                    warn!(code = %instrument.code, error = %e, "Dropping instrument from EVDS result");
                }
            }
        }

        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_series_mock(server: &MockServer, code: &str, body: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path_regex(format!(r"TP\.DK\.{code}\.")))
            .respond_with(ResponseTemplate::new(status).set_body_string(body.to_string()))
            .mount(server)
            .await;
    }

    fn usd() -> Instrument {
        Instrument::new("USD", "US Dollar", false)
    }

    #[tokio::test]
    async fn test_items_shape_is_parsed() {
        let server = MockServer::start().await;
        let body = r#"{
            "items": [
                {"Tarih": "28-08-2026", "TP.DK.USD.A": "41.02", "TP.DK.USD.S": "41.10"},
                {"Tarih": "29-08-2026", "TP.DK.USD.A": "41.19", "TP.DK.USD.S": "41.27"}
            ]
        }"#;
        mount_series_mock(&server, "USD", body, 200).await;

        let provider = EvdsProvider::new(&server.uri(), "testkey");
        let quotes = provider.fetch_quotes(&[usd()]).await.unwrap();

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].code, "USD");
        assert_eq!(quotes[0].buy_rate, 41.19);
        assert_eq!(quotes[0].sell_rate, 41.27);
    }

    #[tokio::test]
    async fn test_series_keyed_shape_is_parsed() {
        let server = MockServer::start().await;
        let body = r#"{
            "series": {
                "TP.DK.USD.A": [{"date": "28-08-2026", "value": "41.02"}, {"date": "29-08-2026", "value": 41.19}],
                "TP.DK.USD.S": [{"date": "29-08-2026", "value": "41.27"}]
            }
        }"#;
        mount_series_mock(&server, "USD", body, 200).await;

        let provider = EvdsProvider::new(&server.uri(), "testkey");
        let quotes = provider.fetch_quotes(&[usd()]).await.unwrap();

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].buy_rate, 41.19);
        assert_eq!(quotes[0].sell_rate, 41.27);
    }

    #[tokio::test]
    async fn test_numeric_item_values_are_accepted() {
        let server = MockServer::start().await;
        let body = r#"{"items": [{"TP.DK.USD.A": 41.19, "TP.DK.USD.S": 41.27}]}"#;
        mount_series_mock(&server, "USD", body, 200).await;

        let provider = EvdsProvider::new(&server.uri(), "testkey");
        let quotes = provider.fetch_quotes(&[usd()]).await.unwrap();
        assert_eq!(quotes[0].buy_rate, 41.19);
    }

    #[tokio::test]
    async fn test_instrument_with_one_missing_side_is_dropped() {
        let server = MockServer::start().await;
        let body = r#"{"items": [{"TP.DK.USD.A": "41.19"}]}"#;
        mount_series_mock(&server, "USD", body, 200).await;

        let provider = EvdsProvider::new(&server.uri(), "testkey");
        let quotes = provider.fetch_quotes(&[usd()]).await.unwrap();
        assert!(quotes.is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_rate_is_rejected() {
        let server = MockServer::start().await;
        let body = r#"{"items": [{"TP.DK.USD.A": "0", "TP.DK.USD.S": "41.27"}]}"#;
        mount_series_mock(&server, "USD", body, 200).await;

        let provider = EvdsProvider::new(&server.uri(), "testkey");
        let quotes = provider.fetch_quotes(&[usd()]).await.unwrap();
        assert!(quotes.is_empty());
    }

    #[tokio::test]
    async fn test_sibling_failure_is_isolated() {
        let server = MockServer::start().await;
        mount_series_mock(&server, "USD", "server error", 500).await;
        mount_series_mock(
            &server,
            "EUR",
            r#"{"items": [{"TP.DK.EUR.A": "47.85", "TP.DK.EUR.S": "47.95"}]}"#,
            200,
        )
        .await;

        let provider = EvdsProvider::new(&server.uri(), "testkey");
        let instruments = [usd(), Instrument::new("EUR", "Euro", false)];
        let quotes = provider.fetch_quotes(&instruments).await.unwrap();

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].code, "EUR");
    }

    #[tokio::test]
    async fn test_malformed_payload_yields_empty_result() {
        let server = MockServer::start().await;
        mount_series_mock(&server, "USD", "not json at all", 200).await;

        let provider = EvdsProvider::new(&server.uri(), "testkey");
        let quotes = provider.fetch_quotes(&[usd()]).await.unwrap();
        assert!(quotes.is_empty());
    }
}
