//! Randomised pacing of active probes.
//!
//! Every site that sends traffic to a target nameserver awaits
//! [`Pacer::wait`] first. When pacing is enabled the calling task sleeps for
//! a single uniform draw from `[min_delay, max_delay]`; there is no backoff
//! and no second-order jitter.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::trace;

use crate::error::{ReconError, ReconResult};

/// Pacing settings for a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Whether probes are delayed at all.
    #[serde(default)]
    pub enabled: bool,

    /// Lower delay bound in milliseconds.
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Upper delay bound in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl PacingConfig {
    /// Pacing switched off.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Pacing switched on with the given bounds.
    #[must_use]
    pub fn between(min: Duration, max: Duration) -> Self {
        Self {
            enabled: true,
            min_delay_ms: u64::try_from(min.as_millis()).unwrap_or(u64::MAX),
            max_delay_ms: u64::try_from(max.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Reject inverted bounds.
    pub fn validate(&self) -> ReconResult<()> {
        if self.min_delay_ms > self.max_delay_ms {
            return Err(ReconError::Config(format!(
                "pacing min delay ({}ms) exceeds max delay ({}ms)",
                self.min_delay_ms, self.max_delay_ms
            )));
        }
        Ok(())
    }

    /// Delay bounds as `(min, max)`, ordered.
    #[must_use]
    pub fn bounds(&self) -> (Duration, Duration) {
        let low = self.min_delay_ms.min(self.max_delay_ms);
        let high = self.min_delay_ms.max(self.max_delay_ms);
        (Duration::from_millis(low), Duration::from_millis(high))
    }
}

const fn default_min_delay_ms() -> u64 {
    500
}

const fn default_max_delay_ms() -> u64 {
    2000
}

/// Applies a [`PacingConfig`] before each probe.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pacer {
    config: PacingConfig,
}

impl Pacer {
    /// Create a pacer from its configuration.
    #[must_use]
    pub const fn new(config: PacingConfig) -> Self {
        Self { config }
    }

    /// A pacer that never sleeps.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(PacingConfig::disabled())
    }

    /// Whether this pacer delays probes.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Draw the next delay, or `None` when pacing is off.
    #[must_use]
    pub fn next_delay(&self) -> Option<Duration> {
        if !self.config.enabled {
            return None;
        }
        let (min, max) = self.config.bounds();
        if min == max {
            return Some(min);
        }
        let min_ms = u64::try_from(min.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
        Some(Duration::from_millis(
            rand::thread_rng().gen_range(min_ms..=max_ms),
        ))
    }

    /// Sleep for one randomised interval if pacing is enabled.
    pub async fn wait(&self) {
        if let Some(delay) = self.next_delay() {
            trace!(delay_ms = delay.as_millis(), "pacing probe");
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_pacer_has_no_delay() {
        assert_eq!(Pacer::disabled().next_delay(), None);
        assert!(!Pacer::default().is_enabled());
    }

    #[test]
    fn delays_stay_within_bounds() {
        let pacer = Pacer::new(PacingConfig::between(
            Duration::from_millis(10),
            Duration::from_millis(20),
        ));
        for _ in 0..200 {
            let delay = pacer.next_delay().unwrap();
            assert!(delay >= Duration::from_millis(10));
            assert!(delay <= Duration::from_millis(20));
        }
    }

    #[test]
    fn equal_bounds_give_fixed_delay() {
        let pacer = Pacer::new(PacingConfig::between(
            Duration::from_millis(7),
            Duration::from_millis(7),
        ));
        assert_eq!(pacer.next_delay(), Some(Duration::from_millis(7)));
    }

    #[test]
    fn inverted_bounds_are_rejected_but_ordered() {
        let config = PacingConfig {
            enabled: true,
            min_delay_ms: 300,
            max_delay_ms: 100,
        };
        assert!(config.validate().is_err());
        assert_eq!(
            config.bounds(),
            (Duration::from_millis(100), Duration::from_millis(300))
        );
    }

    #[test]
    fn disabled_wait_returns_immediately() {
        tokio_test::block_on(async {
            let start = std::time::Instant::now();
            Pacer::disabled().wait().await;
            assert!(start.elapsed() < Duration::from_millis(50));
        });
    }
}
