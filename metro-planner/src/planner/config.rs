//! Search configuration for the planner.

use chrono::Duration;

/// Environment variable overriding the default transfer time in the binary.
pub const DEFAULT_TRANSFER_ENV: &str = "METRO_DEFAULT_TRANSFER_SECS";

/// Longest accepted default transfer: one day.
pub const MAX_TRANSFER_SECS: i64 = 86_400;

/// Error from an invalid search configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Default transfer outside `1..=MAX_TRANSFER_SECS`
    #[error("default transfer must be between 1 and {MAX_TRANSFER_SECS} seconds, got {0}")]
    TransferOutOfRange(i64),

    /// A search that may not pop a single item
    #[error("exploration limit must be at least 1")]
    NoExploration,
}

/// Configuration parameters for itinerary and spanning searches.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    default_transfer_secs: i64,
    max_explored: usize,
}

impl SearchConfig {
    /// Create a new configuration.
    ///
    /// `default_transfer_secs` is the transfer time between two stops of a
    /// station when the feed lists none; it must lie in
    /// `1..=`[`MAX_TRANSFER_SECS`]. `max_explored` bounds the frontier items
    /// an itinerary search pops before giving up with the best result found
    /// so far.
    pub fn new(default_transfer_secs: i64, max_explored: usize) -> Result<Self, ConfigError> {
        if !(1..=MAX_TRANSFER_SECS).contains(&default_transfer_secs) {
            return Err(ConfigError::TransferOutOfRange(default_transfer_secs));
        }
        if max_explored == 0 {
            return Err(ConfigError::NoExploration);
        }

        Ok(Self {
            default_transfer_secs,
            max_explored,
        })
    }

    /// Default configuration with another default transfer time.
    pub fn with_default_transfer_secs(secs: i64) -> Result<Self, ConfigError> {
        Self::new(secs, Self::default().max_explored)
    }

    pub fn default_transfer_secs(&self) -> i64 {
        self.default_transfer_secs
    }

    pub fn max_explored(&self) -> usize {
        self.max_explored
    }

    /// Returns the default transfer time as a Duration.
    pub fn default_transfer(&self) -> Duration {
        Duration::seconds(self.default_transfer_secs)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_transfer_secs: 120, // 2 minutes
            max_explored: 200_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SearchConfig::default();

        assert_eq!(config.default_transfer_secs(), 120);
        assert_eq!(config.max_explored(), 200_000);
        assert_eq!(config.default_transfer(), Duration::minutes(2));
    }

    #[test]
    fn custom_config() {
        let config = SearchConfig::new(45, 10).unwrap();

        assert_eq!(config.default_transfer(), Duration::seconds(45));
        assert_eq!(config.max_explored(), 10);
    }

    #[test]
    fn transfer_bounds_are_inclusive() {
        assert!(SearchConfig::new(1, 1).is_ok());
        assert_eq!(
            SearchConfig::new(MAX_TRANSFER_SECS, 1)
                .unwrap()
                .default_transfer(),
            Duration::days(1)
        );
    }

    #[test]
    fn rejects_out_of_range_transfer() {
        for secs in [0, -5, MAX_TRANSFER_SECS + 1, 99_999_999_999_999_999, i64::MIN] {
            assert_eq!(
                SearchConfig::new(secs, 10).unwrap_err(),
                ConfigError::TransferOutOfRange(secs)
            );
        }
        assert!(SearchConfig::with_default_transfer_secs(-1).is_err());
    }

    #[test]
    fn rejects_zero_exploration() {
        assert_eq!(
            SearchConfig::new(120, 0).unwrap_err(),
            ConfigError::NoExploration
        );
    }

    #[test]
    fn with_default_transfer_keeps_limit() {
        let config = SearchConfig::with_default_transfer_secs(90).unwrap();
        assert_eq!(config.default_transfer_secs(), 90);
        assert_eq!(config.max_explored(), 200_000);
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ConfigError::TransferOutOfRange(0).to_string(),
            "default transfer must be between 1 and 86400 seconds, got 0"
        );
    }
}
