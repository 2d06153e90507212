//! Scheduler configuration from environment variables.
//!
//! Every variable is optional; unset means the default. A set but
//! unparsable variable is an error rather than a silent fallback.
//!
//! | variable                      | default |
//! |-------------------------------|---------|
//! | `TRAWLER_CYCLE_INTERVAL_SECS` | 600     |
//! | `TRAWLER_POLL_QUANTUM_MS`     | 1000    |
//! | `TRAWLER_RUN_AT_START`        | true    |

use std::str::FromStr;
use std::time::Duration;

use crate::domain::TrawlerError;

/// Time between search cycles.
pub const DEFAULT_CYCLE_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Sleep between scheduler checks. Bounds abort latency.
pub const DEFAULT_POLL_QUANTUM: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub cycle_interval: Duration,
    pub poll_quantum: Duration,
    /// Fire the first cycle on the first check instead of after one interval.
    pub run_at_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            cycle_interval: DEFAULT_CYCLE_INTERVAL,
            poll_quantum: DEFAULT_POLL_QUANTUM,
            run_at_start: true,
        }
    }
}

impl SchedulerConfig {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, TrawlerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source (env, a map in tests, ...).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, TrawlerError> {
        let defaults = Self::default();
        let config = Self {
            cycle_interval: parse_var(&lookup, "TRAWLER_CYCLE_INTERVAL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.cycle_interval),
            poll_quantum: parse_var(&lookup, "TRAWLER_POLL_QUANTUM_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_quantum),
            run_at_start: parse_var(&lookup, "TRAWLER_RUN_AT_START")?
                .unwrap_or(defaults.run_at_start),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TrawlerError> {
        if self.poll_quantum.is_zero() {
            return Err(TrawlerError::Config(
                "poll quantum must be greater than zero".to_string(),
            ));
        }
        if self.poll_quantum > self.cycle_interval {
            return Err(TrawlerError::Config(format!(
                "poll quantum ({:?}) must not exceed cycle interval ({:?})",
                self.poll_quantum, self.cycle_interval
            )));
        }
        Ok(())
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>, TrawlerError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| TrawlerError::Config(format!("{name}={raw:?}: {e}"))),
    }
}
