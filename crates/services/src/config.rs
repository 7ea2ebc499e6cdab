use practice_core::model::Roster;
use practice_core::progress::DEFAULT_TARGET_POINTS;

use crate::error::ConfigError;

pub const DB_URL_VAR: &str = "PRACTICE_DB_URL";
pub const NAMES_VAR: &str = "PRACTICE_NAMES";
pub const TARGET_POINTS_VAR: &str = "PRACTICE_TARGET_POINTS";

pub const DEFAULT_DB_URL: &str = "sqlite:results.sqlite3?mode=rwc";

/// Runtime configuration shared by the services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeConfig {
    pub db_url: String,
    pub roster: Roster,
    pub target_points: u32,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            db_url: DEFAULT_DB_URL.to_owned(),
            roster: Roster::default(),
            target_points: DEFAULT_TARGET_POINTS,
        }
    }
}

impl PracticeConfig {
    /// Build a config from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `PRACTICE_TARGET_POINTS` is not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup; missing keys use defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the target points value is not a positive integer.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let db_url = lookup(DB_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.db_url);
        let roster = lookup(NAMES_VAR)
            .map(|csv| Roster::parse(&csv))
            .unwrap_or(defaults.roster);
        let target_points = match lookup(TARGET_POINTS_VAR) {
            Some(raw) => parse_target_points(&raw)?,
            None => defaults.target_points,
        };

        Ok(Self {
            db_url,
            roster,
            target_points,
        })
    }

    #[must_use]
    pub fn with_roster(mut self, roster: Roster) -> Self {
        self.roster = roster;
        self
    }

    #[must_use]
    pub fn with_target_points(mut self, target_points: u32) -> Self {
        self.target_points = target_points;
        self
    }
}

/// # Errors
///
/// Returns `ConfigError::InvalidTargetPoints` unless `raw` is an integer >= 1.
pub fn parse_target_points(raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(points) if points > 0 => Ok(points),
        _ => Err(ConfigError::InvalidTargetPoints {
            var: TARGET_POINTS_VAR,
            raw: raw.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_variables_use_defaults() {
        let config = PracticeConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, PracticeConfig::default());
        assert_eq!(config.target_points, 30);
        assert!(config.roster.is_empty());
    }

    #[test]
    fn reads_all_variables() {
        let config = PracticeConfig::from_lookup(lookup_from(&[
            (DB_URL_VAR, "sqlite::memory:"),
            (NAMES_VAR, "alice,bob"),
            (TARGET_POINTS_VAR, " 12 "),
        ]))
        .unwrap();
        assert_eq!(config.db_url, "sqlite::memory:");
        assert!(config.roster.is_valid("bob"));
        assert_eq!(config.target_points, 12);
    }

    #[test]
    fn rejects_bad_target_points() {
        for raw in ["0", "-3", "lots"] {
            let err =
                PracticeConfig::from_lookup(lookup_from(&[(TARGET_POINTS_VAR, raw)])).unwrap_err();
            assert_eq!(
                err,
                ConfigError::InvalidTargetPoints {
                    var: TARGET_POINTS_VAR,
                    raw: raw.to_owned(),
                }
            );
        }
    }
}
