use thiserror::Error;

/// Failure of a single provider tier. Swallowed by the fallback chain and
/// logged; never crosses the component boundary on its own.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("unusable payload: {0}")]
    Parse(String),

    #[error("no usable quotes in response")]
    NoData,
}

/// Errors the rate pipeline surfaces to its caller.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Fetch attempted before the minimum interval elapsed. Recoverable by
    /// waiting; the message carries the remaining whole seconds.
    #[error("rates were refreshed moments ago, please wait {wait_secs}s before trying again")]
    Throttled { wait_secs: u64 },

    /// Every tier failed or yielded zero usable instruments. The previous
    /// snapshot stays untouched.
    #[error("could not load rates from any provider ({tiers} tried)")]
    AllProvidersExhausted { tiers: usize },
}

impl FetchError {
    pub fn is_throttled(&self) -> bool {
        matches!(self, FetchError::Throttled { .. })
    }
}
