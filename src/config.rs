//! Qualification configuration
//!
//! Thresholds used by the validators and the qualifier, loaded from the
//! environment with documented defaults.

use std::time::Duration;

use crate::error::{LeadError, LeadResult};

/// Default minimum budget (USD) for a lead to qualify
pub const DEFAULT_MIN_BUDGET: f64 = 1000.0;

/// Shortest string accepted as an email address
pub const MIN_EMAIL_LENGTH: usize = 5;

/// Phone numbers must carry between 7 and 15 digits (E.164 upper bound)
pub const MIN_PHONE_DIGITS: usize = 7;
pub const MAX_PHONE_DIGITS: usize = 15;

/// Default timeout for every remote call
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Qualification and runtime knobs
#[derive(Debug, Clone, PartialEq)]
pub struct LeadConfig {
    /// Budgets strictly below this value are rejected
    pub min_budget: f64,
    /// Applied to classifier and spreadsheet requests
    pub http_timeout: Duration,
}

impl Default for LeadConfig {
    fn default() -> Self {
        Self {
            min_budget: DEFAULT_MIN_BUDGET,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl LeadConfig {
    /// Load from LEAD_MIN_BUDGET / LEAD_HTTP_TIMEOUT_SECS, falling back to defaults
    pub fn from_env() -> LeadResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (environment, test maps)
    pub fn from_lookup<F>(lookup: F) -> LeadResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("LEAD_MIN_BUDGET") {
            config.min_budget = parse_min_budget(&raw)?;
        }

        if let Some(raw) = lookup("LEAD_HTTP_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                LeadError::config(format!("LEAD_HTTP_TIMEOUT_SECS must be an integer, got '{}'", raw))
            })?;
            config.http_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_min_budget(mut self, min_budget: f64) -> LeadResult<Self> {
        self.min_budget = validate_min_budget(min_budget)?;
        Ok(self)
    }
}

fn parse_min_budget(raw: &str) -> LeadResult<f64> {
    let value: f64 = raw.trim().parse().map_err(|_| {
        LeadError::config(format!("LEAD_MIN_BUDGET must be a number, got '{}'", raw))
    })?;
    validate_min_budget(value)
}

fn validate_min_budget(value: f64) -> LeadResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(LeadError::config(format!(
            "minimum budget must be a non-negative finite number, got {}",
            value
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = LeadConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.min_budget, 1000.0);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = LeadConfig::from_lookup(lookup_from(&[
            ("LEAD_MIN_BUDGET", " 2500.5 "),
            ("LEAD_HTTP_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.min_budget, 2500.5);
        assert_eq!(config.http_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(LeadConfig::from_lookup(lookup_from(&[("LEAD_MIN_BUDGET", "lots")])).is_err());
        assert!(LeadConfig::from_lookup(lookup_from(&[("LEAD_MIN_BUDGET", "-1")])).is_err());
        assert!(LeadConfig::from_lookup(lookup_from(&[("LEAD_HTTP_TIMEOUT_SECS", "1.5")])).is_err());
        assert!(LeadConfig::default().with_min_budget(f64::NAN).is_err());
    }
}
