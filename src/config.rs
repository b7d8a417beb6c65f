//! `boxoffice.toml` handling.
//!
//! Every field has a default, so an empty file (or none at all) is valid.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregatorOptions, SortDirection, WeekStart};
use crate::models::Metric;
use crate::revenue::RevenueRounding;

pub const DEFAULT_CONFIG_FILE: &str = "boxoffice.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timeline: TimelineConfig,

    #[serde(default)]
    pub revenue: RevenueConfig,

    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
}

/// How movies are stacked inside a week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    #[serde(default = "default_sort_key")]
    pub sort_key: Metric,

    #[serde(default)]
    pub direction: SortDirection,

    #[serde(default)]
    pub week_start: WeekStart,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            sort_key: default_sort_key(),
            direction: SortDirection::default(),
            week_start: WeekStart::default(),
        }
    }
}

fn default_sort_key() -> Metric {
    Metric::Rating
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueConfig {
    #[serde(default)]
    pub rounding: RevenueRounding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    /// Entries per top-N list.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
        }
    }
}

fn default_limit() -> usize {
    10
}

/// Command-line values that override the file. `None` leaves the file value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub sort_key: Option<Metric>,
    pub descending: bool,
    pub limit: Option<usize>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Returns `Ok(None)` if `boxoffice.toml` is absent from the working directory.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Command-line values take precedence over the file.
    pub fn merge_with_args(&mut self, overrides: &Overrides) {
        if let Some(sort_key) = overrides.sort_key {
            self.timeline.sort_key = sort_key;
        }
        if overrides.descending {
            self.timeline.direction = SortDirection::Descending;
        }
        if let Some(limit) = overrides.limit {
            self.leaderboard.limit = limit;
        }
    }

    pub fn aggregator_options(&self) -> AggregatorOptions {
        AggregatorOptions {
            stack_key: self.timeline.sort_key,
            direction: self.timeline.direction,
            week_start: self.timeline.week_start,
            top_limit: self.leaderboard.limit,
        }
    }

    pub fn default_toml() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.timeline.sort_key, Metric::Rating);
        assert_eq!(config.timeline.direction, SortDirection::Ascending);
        assert_eq!(config.timeline.week_start, WeekStart::Sunday);
        assert_eq!(config.revenue.rounding, RevenueRounding::Nearest);
        assert_eq!(config.leaderboard.limit, 10);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[timeline]
sort_key = "revenue"
direction = "descending"
week_start = "monday"

[revenue]
rounding = "exact"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.timeline.sort_key, Metric::Revenue);
        assert_eq!(config.timeline.direction, SortDirection::Descending);
        assert_eq!(config.timeline.week_start, WeekStart::Monday);
        assert_eq!(config.revenue.rounding, RevenueRounding::Exact);
        assert_eq!(config.leaderboard.limit, 10);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        config.merge_with_args(&Overrides {
            sort_key: Some(Metric::Revenue),
            descending: true,
            limit: Some(3),
        });

        let options = config.aggregator_options();
        assert_eq!(options.stack_key, Metric::Revenue);
        assert_eq!(options.direction, SortDirection::Descending);
        assert_eq!(options.top_limit, 3);
    }

    #[test]
    fn test_default_toml_round_trips() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[timeline]"));
        assert!(toml_str.contains("[leaderboard]"));
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "[leaderboard]\nlimit = 5\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.leaderboard.limit, 5);
    }
}
