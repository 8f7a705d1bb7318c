use std::env;

use crate::error::DispatchError;

/// Tuning knobs for a dispatch round. Every field here corresponds to an
/// entry in the external configuration surface; all have defaults that make
/// a correctly-behaving engine out of the box.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub interval_seconds: u64,
    pub min_cluster_size: usize,
    pub dbscan_eps: f64,
    pub dbscan_min_samples: usize,
    pub proximity_threshold_m: f64,
    pub max_detour_km: f64,
    pub time_window_minutes: i64,
    pub retry_cooldown_minutes: i64,
    pub default_price_per_seat: f64,
    pub dynamic_pricing: bool,
    pub round_deadline_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_seconds: 20,
            min_cluster_size: 3,
            dbscan_eps: 0.1,
            dbscan_min_samples: 3,
            proximity_threshold_m: 1000.0,
            max_detour_km: 5.0,
            time_window_minutes: 15,
            retry_cooldown_minutes: 60,
            default_price_per_seat: 25.0,
            dynamic_pricing: false,
            round_deadline_seconds: 60,
        }
    }
}

impl Config {
    /// Reads overrides from the environment, falling back to defaults for
    /// anything unset or unparsable. Mirrors the permissive, `Option`-returning
    /// style used for connection settings elsewhere in this workspace: a
    /// missing variable is not an error here, only `validate` decides that.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            interval_seconds: env_parse("DISPATCH_INTERVAL_SECONDS")
                .unwrap_or(defaults.interval_seconds),
            min_cluster_size: env_parse("DISPATCH_MIN_CLUSTER_SIZE")
                .unwrap_or(defaults.min_cluster_size),
            dbscan_eps: env_parse("DISPATCH_DBSCAN_EPS").unwrap_or(defaults.dbscan_eps),
            dbscan_min_samples: env_parse("DISPATCH_DBSCAN_MIN_SAMPLES")
                .unwrap_or(defaults.dbscan_min_samples),
            proximity_threshold_m: env_parse("DISPATCH_PROXIMITY_THRESHOLD_M")
                .unwrap_or(defaults.proximity_threshold_m),
            max_detour_km: env_parse("DISPATCH_MAX_DETOUR_KM")
                .unwrap_or(defaults.max_detour_km),
            time_window_minutes: env_parse("DISPATCH_TIME_WINDOW_MINUTES")
                .unwrap_or(defaults.time_window_minutes),
            retry_cooldown_minutes: env_parse("DISPATCH_RETRY_COOLDOWN_MINUTES")
                .unwrap_or(defaults.retry_cooldown_minutes),
            default_price_per_seat: env_parse("DISPATCH_DEFAULT_PRICE_PER_SEAT")
                .unwrap_or(defaults.default_price_per_seat),
            dynamic_pricing: env_parse("DISPATCH_DYNAMIC_PRICING")
                .unwrap_or(defaults.dynamic_pricing),
            round_deadline_seconds: env_parse("DISPATCH_ROUND_DEADLINE_SECONDS")
                .unwrap_or(defaults.round_deadline_seconds),
        }
    }

    /// Fatal validation, run once at startup before the scheduler loop starts.
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.interval_seconds == 0 {
            return Err(DispatchError::ConfigInvalid(
                "interval_seconds must be positive".into(),
            ));
        }
        if self.round_deadline_seconds == 0 {
            return Err(DispatchError::ConfigInvalid(
                "round_deadline_seconds must be positive".into(),
            ));
        }
        if self.dbscan_min_samples == 0 {
            return Err(DispatchError::ConfigInvalid(
                "dbscan_min_samples must be positive".into(),
            ));
        }
        if self.default_price_per_seat < 0.0 {
            return Err(DispatchError::ConfigInvalid(
                "default_price_per_seat must not be negative".into(),
            ));
        }
        Ok(())
    }

    /// The round's overall deadline, per the concurrency model:
    /// `max(interval * 3, 60s)`.
    pub fn round_deadline(&self) -> std::time::Duration {
        std::time::Duration::from_secs(
            (self.interval_seconds * 3).max(self.round_deadline_seconds),
        )
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn zero_interval_is_invalid() {
        let mut config = Config::default();
        config.interval_seconds = 0;
        assert!(config.validate().is_err());
    }
}
