//! Core business logic: accumulation engine and rate normalization

pub mod accumulate;
pub mod config;
pub mod enrich;
pub mod error;
pub mod log;
pub mod quote;
pub mod snapshot;
pub mod throttle;

// Re-export main types for cleaner imports
pub use accumulate::{AccumulationInput, AccumulationResult, accumulate};
pub use enrich::enrich;
pub use error::{FetchError, ProviderError};
pub use quote::{EnrichedRateQuote, Instrument, QuoteProvider, RateQuote};
pub use snapshot::{RateSnapshot, SnapshotStore};
pub use throttle::FetchThrottle;
