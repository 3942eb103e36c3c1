//! Rate normalization pipeline: throttle gate, provider fallback chain,
//! delta enrichment and snapshot rotation.

use crate::core::config::AppConfig;
use crate::core::enrich::enrich;
use crate::core::error::FetchError;
use crate::core::quote::{EnrichedRateQuote, Instrument, QuoteProvider};
use crate::core::snapshot::{RateSnapshot, SnapshotStore};
use crate::core::throttle::FetchThrottle;
use crate::providers::{EvdsProvider, SpotRateProvider};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Owns the ordered provider tiers, the throttle state and the two-slot
/// snapshot store. All refresh triggers go through [`refresh`], which is the
/// only writer of the throttle timestamp and the snapshot slots.
///
/// [`refresh`]: RateService::refresh
pub struct RateService {
    instruments: Vec<Instrument>,
    providers: Vec<Box<dyn QuoteProvider>>,
    throttle: FetchThrottle,
    snapshots: SnapshotStore,
}

impl RateService {
    pub fn new(
        instruments: Vec<Instrument>,
        providers: Vec<Box<dyn QuoteProvider>>,
        min_interval: Duration,
    ) -> Self {
        Self {
            instruments,
            providers,
            throttle: FetchThrottle::new(min_interval),
            snapshots: SnapshotStore::new(),
        }
    }

    /// Builds the tier list in priority order from configuration. The EVDS
    /// tier needs an API key; without one only the spot tier remains.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut providers: Vec<Box<dyn QuoteProvider>> = Vec::new();

        if let Some(evds) = &config.providers.evds {
            match config.evds_api_key() {
                Some(key) => {
                    providers.push(Box::new(EvdsProvider::new(&evds.base_url, &key)));
                }
                None => {
                    info!("No EVDS API key configured, skipping primary rate tier");
                }
            }
        }
        if let Some(spot) = &config.providers.spot {
            providers.push(Box::new(SpotRateProvider::new(
                &spot.base_url,
                &config.home_currency,
            )));
        }

        Self::new(
            config.instruments.clone(),
            providers,
            Duration::from_millis(config.fetch.min_interval_ms),
        )
    }

    /// Performs a throttled fetch cycle: first non-empty tier wins, the fresh
    /// quotes are diffed against the previous snapshot, and the snapshot slots
    /// rotate. On total failure nothing is rotated and the last snapshot stays
    /// presentable.
    pub async fn refresh(&mut self) -> Result<Vec<EnrichedRateQuote>, FetchError> {
        let now = Instant::now();
        self.throttle.check(now)?;
        self.throttle.mark(now);

        let quotes = self.fetch_raw().await?;
        let enriched = enrich(&quotes, self.snapshots.diff_base());
        self.snapshots.apply(RateSnapshot::new(quotes));
        Ok(enriched)
    }

    /// Walks the tiers in priority order. A tier failure or an empty result
    /// falls through to the next tier; partial results are acceptable.
    async fn fetch_raw(&self) -> Result<Vec<crate::core::quote::RateQuote>, FetchError> {
        for provider in &self.providers {
            match provider.fetch_quotes(&self.instruments).await {
                Ok(quotes) if !quotes.is_empty() => {
                    debug!(
                        provider = provider.name(),
                        count = quotes.len(),
                        "Tier resolved quotes"
                    );
                    return Ok(quotes);
                }
                Ok(_) => {
                    warn!(provider = provider.name(), "Tier yielded zero usable quotes");
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "Tier failed");
                }
            }
        }

        Err(FetchError::AllProvidersExhausted {
            tiers: self.providers.len(),
        })
    }

    pub fn current_snapshot(&self) -> Option<&RateSnapshot> {
        self.snapshots.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ProviderError;
    use crate::core::quote::RateQuote;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    enum Behavior {
        Quotes(Vec<(f64, f64)>),
        Empty,
        Fail,
    }

    struct ScriptedProvider {
        behavior: Behavior,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedProvider {
        fn new(behavior: Behavior) -> (Box<dyn QuoteProvider>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Box::new(ScriptedProvider {
                    behavior,
                    calls: Arc::clone(&calls),
                }),
                calls,
            )
        }
    }

    #[async_trait]
    impl QuoteProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn fetch_quotes(
            &self,
            instruments: &[Instrument],
        ) -> Result<Vec<RateQuote>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                Behavior::Quotes(rates) => Ok(instruments
                    .iter()
                    .zip(rates.iter())
                    .map(|(i, (buy, sell))| RateQuote {
                        code: i.code.clone(),
                        name: i.name.clone(),
                        buy_rate: *buy,
                        sell_rate: *sell,
                    })
                    .collect()),
                Behavior::Empty => Ok(vec![]),
                Behavior::Fail => Err(ProviderError::NoData),
            }
        }
    }

    fn usd() -> Vec<Instrument> {
        vec![Instrument::new("USD", "US Dollar", false)]
    }

    #[tokio::test]
    async fn test_first_tier_success_short_circuits() {
        let (primary, _) = ScriptedProvider::new(Behavior::Quotes(vec![(34.0, 34.1)]));
        let (secondary, secondary_calls) = ScriptedProvider::new(Behavior::Quotes(vec![(9.9, 9.9)]));

        let mut service = RateService::new(usd(), vec![primary, secondary], Duration::ZERO);
        let quotes = service.refresh().await.unwrap();

        assert_eq!(quotes[0].quote.buy_rate, 34.0);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_primary_falls_through_to_secondary() {
        let (primary, _) = ScriptedProvider::new(Behavior::Empty);
        let (secondary, _) = ScriptedProvider::new(Behavior::Quotes(vec![(34.5, 34.7)]));

        let mut service = RateService::new(usd(), vec![primary, secondary], Duration::ZERO);
        let quotes = service.refresh().await.unwrap();

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].quote.sell_rate, 34.7);
    }

    #[tokio::test]
    async fn test_failing_primary_falls_through_to_secondary() {
        let (primary, _) = ScriptedProvider::new(Behavior::Fail);
        let (secondary, _) = ScriptedProvider::new(Behavior::Quotes(vec![(34.5, 34.7)]));

        let mut service = RateService::new(usd(), vec![primary, secondary], Duration::ZERO);
        assert!(service.refresh().await.is_ok());
    }

    #[tokio::test]
    async fn test_all_tiers_exhausted() {
        let (primary, _) = ScriptedProvider::new(Behavior::Fail);
        let (secondary, _) = ScriptedProvider::new(Behavior::Empty);

        let mut service = RateService::new(usd(), vec![primary, secondary], Duration::ZERO);
        match service.refresh().await {
            Err(FetchError::AllProvidersExhausted { tiers }) => assert_eq!(tiers, 2),
            other => panic!("expected exhaustion, got {:?}", other.map(|q| q.len())),
        }
        assert!(service.current_snapshot().is_none());
    }

    #[tokio::test]
    async fn test_total_failure_keeps_previous_snapshot() {
        let (good, _) = ScriptedProvider::new(Behavior::Quotes(vec![(34.0, 34.1)]));
        let mut service = RateService::new(usd(), vec![good], Duration::ZERO);
        service.refresh().await.unwrap();

        let (bad, _) = ScriptedProvider::new(Behavior::Fail);
        service.providers = vec![bad];
        assert!(service.refresh().await.is_err());
        assert_eq!(service.current_snapshot().unwrap().quotes[0].buy_rate, 34.0);
    }

    #[tokio::test]
    async fn test_second_refresh_carries_deltas() {
        let (first, _) = ScriptedProvider::new(Behavior::Quotes(vec![(34.00, 34.10)]));
        let mut service = RateService::new(usd(), vec![first], Duration::ZERO);

        let initial = service.refresh().await.unwrap();
        assert_eq!(initial[0].buy_change, 0.0);

        let (second, _) = ScriptedProvider::new(Behavior::Quotes(vec![(34.17, 34.20)]));
        service.providers = vec![second];
        let enriched = service.refresh().await.unwrap();

        assert!((enriched[0].buy_change - 0.17).abs() < 1e-9);
        assert!((enriched[0].buy_change_percent - 0.5).abs() < 1e-3);
        assert!((enriched[0].sell_change - 0.10).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_refresh_is_throttled() {
        let (provider, calls) = ScriptedProvider::new(Behavior::Quotes(vec![(34.0, 34.1)]));
        let mut service = RateService::new(usd(), vec![provider], Duration::from_secs(15));

        service.refresh().await.unwrap();
        match service.refresh().await {
            Err(FetchError::Throttled { wait_secs }) => assert!(wait_secs >= 1 && wait_secs <= 15),
            other => panic!("expected throttled, got {:?}", other.map(|q| q.len())),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1, "throttled call must not fetch");
    }

    #[tokio::test]
    async fn test_from_config_without_key_has_spot_tier_only() {
        let config = AppConfig::default();
        // Default config carries no EVDS key, so only the spot tier remains.
        let service = RateService::from_config(&config);
        assert_eq!(service.providers.len(), 1);
        assert_eq!(service.providers[0].name(), "spot");
    }
}
