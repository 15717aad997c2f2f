//! Configuration for the sync engine.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for one synchronization stream.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Catalog context to pull from.
    pub context: String,
    /// Consumer name within the context.
    pub consumer: String,
    /// Base URL of the catalog service.
    pub base_url: String,
    /// Maximum width of one changes window.
    pub page_size: u64,
    /// Whether the changes endpoint should include empty offsets.
    pub with_empties: bool,
    /// Maximum number of documents per bootstrap bulk batch.
    pub bulk_batch_size: usize,
    /// Maximum number of bulk batches applied concurrently.
    pub max_concurrent_batches: usize,
    /// In-run attempts for a change record before the page fails.
    pub record_retry_budget: u32,
    /// Request timeout for catalog calls.
    pub timeout: Duration,
    /// Directory for snapshot staging. A temporary directory is used
    /// when unset.
    pub working_dir: Option<PathBuf>,
    /// Retry configuration.
    pub retry: RetryConfig,
}

impl SyncConfig {
    /// Creates a new sync configuration.
    pub fn new(
        context: impl Into<String>,
        consumer: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            context: context.into(),
            consumer: consumer.into(),
            base_url: base_url.into(),
            page_size: 1000,
            with_empties: false,
            bulk_batch_size: 1000,
            max_concurrent_batches: 5,
            record_retry_budget: 3,
            timeout: Duration::from_secs(5),
            working_dir: None,
            retry: RetryConfig::default(),
        }
    }

    /// Sets the changes window width.
    pub fn with_page_size(mut self, size: u64) -> Self {
        self.page_size = size;
        self
    }

    /// Sets whether empty offsets are requested from the changes endpoint.
    pub fn with_empties(mut self, with_empties: bool) -> Self {
        self.with_empties = with_empties;
        self
    }

    /// Sets the bootstrap bulk batch size.
    pub fn with_bulk_batch_size(mut self, size: usize) -> Self {
        self.bulk_batch_size = size;
        self
    }

    /// Sets the number of bulk batches applied concurrently.
    pub fn with_max_concurrent_batches(mut self, batches: usize) -> Self {
        self.max_concurrent_batches = batches;
        self
    }

    /// Sets the per-record retry budget.
    pub fn with_record_retry_budget(mut self, budget: u32) -> Self {
        self.record_retry_budget = budget;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the snapshot staging directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Sets the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new("", "", "")
    }
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts.
    pub max_attempts: u32,
    /// Initial delay between retries.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Whether to add jitter to delays.
    pub add_jitter: bool,
}

impl RetryConfig {
    /// Creates a new retry configuration.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            add_jitter: true,
        }
    }

    /// Creates a configuration with no retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            add_jitter: false,
        }
    }

    /// Sets the initial delay.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the backoff multiplier.
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Calculates the delay for a given attempt (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let base_delay = self.initial_delay.as_secs_f64()
            * self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);

        let delay_secs = base_delay.min(self.max_delay.as_secs_f64());

        if self.add_jitter {
            // Add up to 25% jitter
            let jitter = delay_secs * 0.25 * rand_jitter();
            Duration::from_secs_f64(delay_secs + jitter)
        } else {
            Duration::from_secs_f64(delay_secs)
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Simple deterministic "jitter" for tests (no external RNG dependency).
fn rand_jitter() -> f64 {
    // Use a simple hash of current time for pseudo-random jitter
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    (nanos % 1000) as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_config_builder() {
        let config = SyncConfig::new("cti_1", "content", "https://cti.example.com")
            .with_page_size(200)
            .with_bulk_batch_size(500)
            .with_max_concurrent_batches(2)
            .with_timeout(Duration::from_secs(10));

        assert_eq!(config.context, "cti_1");
        assert_eq!(config.consumer, "content");
        assert_eq!(config.base_url, "https://cti.example.com");
        assert_eq!(config.page_size, 200);
        assert_eq!(config.bulk_batch_size, 500);
        assert_eq!(config.max_concurrent_batches, 2);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(!config.with_empties);
    }

    #[test]
    fn sync_config_defaults() {
        let config = SyncConfig::new("ctx", "c", "http://localhost");
        assert_eq!(config.page_size, 1000);
        assert_eq!(config.bulk_batch_size, 1000);
        assert_eq!(config.max_concurrent_batches, 5);
        assert_eq!(config.record_retry_budget, 3);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.working_dir.is_none());
    }

    #[test]
    fn retry_config_no_retry() {
        let config = RetryConfig::no_retry();
        assert_eq!(config.max_attempts, 1);
    }

    #[test]
    fn retry_delay_calculation() {
        let config = RetryConfig::new(5)
            .with_initial_delay(Duration::from_millis(100))
            .with_backoff_multiplier(2.0);

        // First attempt has no delay
        assert_eq!(config.delay_for_attempt(0), Duration::ZERO);

        // Subsequent attempts have exponential backoff
        // Note: jitter makes exact values unpredictable, but we can check bounds
        let delay1 = config.delay_for_attempt(1);
        assert!(delay1 >= Duration::from_millis(100));
        assert!(delay1 <= Duration::from_millis(150)); // with jitter

        let delay2 = config.delay_for_attempt(2);
        assert!(delay2 >= Duration::from_millis(200));
    }

    #[test]
    fn retry_delay_respects_max() {
        let config = RetryConfig::new(10)
            .with_initial_delay(Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(5))
            .with_backoff_multiplier(10.0);

        // Even with high multiplier, should not exceed max
        let delay = config.delay_for_attempt(5);
        assert!(delay <= Duration::from_millis(6250)); // 5s + 25% jitter
    }
}
