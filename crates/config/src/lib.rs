//! Fiery Configuration Management
//!
//! Runtime limits and timing constants for the trigger runtime, loaded from a
//! `key = value` options file.

use fiery_core::{FieryError, Result, HOURS_PER_DAY, PASSES_PER_SEC, SECS_PER_MUD_HOUR};
use std::fs;
use std::path::Path;

/// Default location of the options file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/scriptoptions.txt";

/// Script runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptConfig {
    /// Trigger-within-trigger nesting ceiling (from "max_script_depth" option)
    pub max_script_depth: u32,
    /// Consecutive loop iterations before a one-pulse self-wait (from "loop_burst" option)
    pub loop_burst: u32,
    /// Loop iterations per invocation before the trigger is stopped (from "loop_ceiling" option)
    pub loop_ceiling: u32,
    /// Scheduler pulses per real second (from "passes_per_sec" option)
    pub passes_per_sec: u64,
    /// Real seconds per game hour (from "secs_per_mud_hour" option)
    pub secs_per_mud_hour: u64,
    /// Pulses a mobile trigger pauses while its owner is casting (from "casting_pause" option)
    pub casting_pause: u64,
    /// Seconds between random-trigger sweeps (from "random_interval" option)
    pub random_interval: u64,
    /// Script error entries kept in memory (from "log_capacity" option)
    pub log_capacity: usize,
    /// Keep the historical `>=` behaviour on non-numeric operands (from "legacy_string_ge" option)
    pub legacy_string_ge: bool,
    /// Fixed seed for script randomness (from "rng_seed" option)
    pub rng_seed: Option<u64>,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            max_script_depth: 10,
            loop_burst: 30,
            loop_ceiling: 100,
            passes_per_sec: PASSES_PER_SEC,
            secs_per_mud_hour: SECS_PER_MUD_HOUR,
            casting_pause: 10,
            random_interval: 13,
            log_capacity: 256,
            legacy_string_ge: true,
            rng_seed: None,
        }
    }
}

impl ScriptConfig {
    /// Load configuration from an options file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| FieryError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(Self::parse(&content))
    }

    /// Load configuration from [`DEFAULT_CONFIG_PATH`]
    pub fn load_default() -> Result<Self> {
        Self::load_from_file(DEFAULT_CONFIG_PATH)
    }

    /// Parse options file content. Unknown keys are ignored and bad values keep their defaults.
    pub fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(eq_pos) = line.find('=') {
                let key = line[..eq_pos].trim();
                let value = line[eq_pos + 1..].trim();

                config.parse_option(key, value);
            }
        }

        config
    }

    fn parse_option(&mut self, key: &str, value: &str) {
        let defaults = Self::default();
        match key {
            "max_script_depth" => {
                self.max_script_depth = value.parse().unwrap_or(defaults.max_script_depth);
            }
            "loop_burst" => {
                self.loop_burst = value
                    .parse()
                    .ok()
                    .filter(|burst| *burst > 0)
                    .unwrap_or(defaults.loop_burst);
            }
            "loop_ceiling" => {
                self.loop_ceiling = value.parse().unwrap_or(defaults.loop_ceiling);
            }
            "passes_per_sec" => {
                self.passes_per_sec = value
                    .parse()
                    .ok()
                    .filter(|passes| *passes > 0)
                    .unwrap_or(defaults.passes_per_sec);
            }
            "secs_per_mud_hour" => {
                self.secs_per_mud_hour = value
                    .parse()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .unwrap_or(defaults.secs_per_mud_hour);
            }
            "casting_pause" => {
                self.casting_pause = value.parse().unwrap_or(defaults.casting_pause);
            }
            "random_interval" => {
                self.random_interval = value
                    .parse()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .unwrap_or(defaults.random_interval);
            }
            "log_capacity" => {
                self.log_capacity = value.parse().unwrap_or(defaults.log_capacity);
            }
            "legacy_string_ge" => {
                self.legacy_string_ge = parse_bool(value).unwrap_or(defaults.legacy_string_ge);
            }
            "rng_seed" => {
                self.rng_seed = value.parse().ok();
            }
            _ => {
                tracing::debug!("Ignoring unknown script option: {}", key);
            }
        }
    }

    /// Scheduler pulses in one game hour
    pub fn pulses_per_mud_hour(&self) -> u64 {
        self.secs_per_mud_hour * self.passes_per_sec
    }

    /// Scheduler pulses in one game day
    pub fn pulses_per_mud_day(&self) -> u64 {
        HOURS_PER_DAY as u64 * self.pulses_per_mud_hour()
    }

    /// Pulses between random-trigger sweeps
    pub fn random_pulses(&self) -> u64 {
        self.random_interval * self.passes_per_sec
    }

    /// Log the effective configuration
    pub fn display(&self) {
        tracing::info!("Script configuration:");
        tracing::info!("  Max script depth: {}", self.max_script_depth);
        tracing::info!("  Loop burst / ceiling: {} / {}", self.loop_burst, self.loop_ceiling);
        tracing::info!(
            "  Pulses: {}/sec, {}/mud hour",
            self.passes_per_sec,
            self.pulses_per_mud_hour()
        );
        tracing::info!("  Casting pause: {} pulses", self.casting_pause);
        tracing::info!("  Random triggers every {}s", self.random_interval);
        tracing::info!("  Script log capacity: {}", self.log_capacity);
        tracing::info!("  Legacy string >=: {}", self.legacy_string_ge);
        match self.rng_seed {
            Some(seed) => tracing::info!("  RNG seed: {}", seed),
            None => tracing::info!("  RNG seed: entropy"),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ScriptConfig::default();
        assert_eq!(config.max_script_depth, 10);
        assert_eq!(config.loop_burst, 30);
        assert_eq!(config.loop_ceiling, 100);
        assert_eq!(config.pulses_per_mud_hour(), 750);
        assert_eq!(config.pulses_per_mud_day(), 18000);
        assert!(config.legacy_string_ge);
    }

    #[test]
    fn test_parse_simple_config() {
        let config_text = r#"
# tighter limits for testing
max_script_depth = 4
loop_ceiling = 50
legacy_string_ge = off
rng_seed = 99
"#;
        let config = ScriptConfig::parse(config_text);
        assert_eq!(config.max_script_depth, 4);
        assert_eq!(config.loop_ceiling, 50);
        assert!(!config.legacy_string_ge);
        assert_eq!(config.rng_seed, Some(99));
        assert_eq!(config.loop_burst, 30);
    }

    #[test]
    fn test_bad_values_keep_defaults() {
        let config = ScriptConfig::parse("loop_burst = 0\npasses_per_sec = fast\nnonsense = 1\n");
        assert_eq!(config, ScriptConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "secs_per_mud_hour = 60").unwrap();
        let config = ScriptConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.pulses_per_mud_hour(), 600);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ScriptConfig::load_from_file(dir.path().join("missing.txt"));
        assert!(matches!(result, Err(FieryError::Config(_))));
    }
}
