//! Retry utilities: backoff builders.
//!
//! Uses `backon` for exponential backoff with jitter. Provides standard
//! backoff configurations for balance compare-and-swap retries and database
//! connection retries.

use std::time::Duration;

use backon::ExponentialBuilder;

/// Backoff for the withdrawal balance swap when a concurrent write wins.
///
/// - Min delay: 1ms
/// - Max delay: 100ms
/// - Max attempts: 8
/// - Jitter enabled
pub fn balance_swap_backoff() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(1))
        .with_max_delay(Duration::from_millis(100))
        .with_max_times(8)
        .with_jitter()
}

/// Backoff for database connection retries at startup.
///
/// - Min delay: 100ms
/// - Max delay: 5s
/// - Max attempts: 30
/// - Jitter enabled
pub fn connection_backoff() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(100))
        .with_max_delay(Duration::from_secs(5))
        .with_max_times(30)
        .with_jitter()
}
