use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use shared::shared_wheel_game::{
    WheelError, HIGHLIGHT_INTERVAL_MS, MIN_FULL_TURNS, SPIN_DURATION_MS, WHEEL_SEGMENTS,
};
use shared::validation::{validate_full_turns, validate_segment_count};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub segment_count: usize,
    pub spin_duration: Duration,
    pub min_full_turns: u32,
    pub highlight_interval: Duration,
    pub candidates_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            segment_count: WHEEL_SEGMENTS,
            spin_duration: Duration::from_millis(SPIN_DURATION_MS),
            min_full_turns: MIN_FULL_TURNS,
            highlight_interval: Duration::from_millis(HIGHLIGHT_INTERVAL_MS),
            candidates_path: None,
        }
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T> {
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| Error::Config {
            key: key.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

impl EngineConfig {
    /// Reads `.env` if present, then the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::from_path(".env").ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            segment_count: parse_or(&lookup, "SPIN_SEGMENT_COUNT", defaults.segment_count)?,
            spin_duration: Duration::from_millis(parse_or(
                &lookup,
                "SPIN_DURATION_MS",
                SPIN_DURATION_MS,
            )?),
            min_full_turns: parse_or(&lookup, "SPIN_MIN_FULL_TURNS", defaults.min_full_turns)?,
            highlight_interval: Duration::from_millis(parse_or(
                &lookup,
                "SPIN_HIGHLIGHT_INTERVAL_MS",
                HIGHLIGHT_INTERVAL_MS,
            )?),
            candidates_path: lookup("SPIN_CANDIDATES_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_segment_count(self.segment_count).map_err(|_| {
            WheelError::InvalidConfiguration { field: "segment_count", value: self.segment_count }
        })?;
        validate_full_turns(self.min_full_turns).map_err(|_| {
            WheelError::InvalidConfiguration {
                field: "min_full_turns",
                value: self.min_full_turns as usize,
            }
        })?;
        if self.highlight_interval.is_zero() {
            return Err(Error::Config {
                key: "SPIN_HIGHLIGHT_INTERVAL_MS".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
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
        let config = EngineConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.segment_count, 8);
        assert_eq!(config.spin_duration, Duration::from_secs(3));
        assert_eq!(config.highlight_interval, Duration::from_millis(500));
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("SPIN_SEGMENT_COUNT", "12"),
            ("SPIN_DURATION_MS", "250"),
            ("SPIN_MIN_FULL_TURNS", " 3 "),
            ("SPIN_CANDIDATES_PATH", "data/cocktails.json"),
        ]))
        .unwrap();
        assert_eq!(config.segment_count, 12);
        assert_eq!(config.spin_duration, Duration::from_millis(250));
        assert_eq!(config.min_full_turns, 3);
        assert_eq!(config.candidates_path, Some(PathBuf::from("data/cocktails.json")));
    }

    #[test]
    fn test_malformed_value() {
        let err = EngineConfig::from_lookup(lookup_from(&[("SPIN_SEGMENT_COUNT", "eight")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config { ref key, .. } if key == "SPIN_SEGMENT_COUNT"));
    }

    #[test]
    fn test_zero_segments_rejected() {
        let err = EngineConfig::from_lookup(lookup_from(&[("SPIN_SEGMENT_COUNT", "0")]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_negative_segments_rejected() {
        let err = EngineConfig::from_lookup(lookup_from(&[("SPIN_SEGMENT_COUNT", "-4")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
