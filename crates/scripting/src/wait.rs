//! `wait` durations
//!
//! `wait 5` is five pulses, `wait 2t` two game hours, `wait 3s` three real
//! seconds. `wait until 14:30` (or `until 1430`) sleeps until that game time,
//! rolling over to the next day if it has already passed.

use crate::resolve::atoi;
use fiery_config::ScriptConfig;

/// Pulses to sleep for a `wait` argument
///
/// # Arguments
/// * `arg` - Text after `wait`, already substituted
/// * `pulse` - Current scheduler pulse
/// * `hour` - Current game hour
/// * `config` - Timing constants
///
/// # Returns
/// The delay, never less than one pulse
pub fn wait_delay(arg: &str, pulse: u64, hour: i32, config: &ScriptConfig) -> u64 {
    let arg = arg.trim();
    let delay = match until_argument(arg) {
        Some(target) => until_delay(target, pulse, hour, config),
        None => relative_delay(arg, config),
    };
    delay.max(1)
}

fn until_argument(arg: &str) -> Option<&str> {
    let (word, rest) = arg.split_once(char::is_whitespace)?;
    word.eq_ignore_ascii_case("until").then(|| rest.trim())
}

/// Minutes after midnight for `HH:MM` or `HHMM`
fn until_minutes(target: &str) -> i64 {
    match target.split_once(':') {
        Some((hours, minutes)) => atoi(hours) as i64 * 60 + atoi(minutes) as i64,
        None => {
            let packed = atoi(target) as i64;
            packed % 100 + (packed / 100) * 60
        }
    }
}

fn until_delay(target: &str, pulse: u64, hour: i32, config: &ScriptConfig) -> u64 {
    let per_hour = config.pulses_per_mud_hour() as i64;
    let per_day = config.pulses_per_mud_day() as i64;
    if per_hour == 0 {
        return 1;
    }

    let wanted = until_minutes(target) * per_hour / 60;
    let current = (pulse as i64 % per_hour) + hour as i64 * per_hour;

    let delay = if current >= wanted {
        per_day - current + wanted
    } else {
        wanted - current
    };
    delay.max(1) as u64
}

fn relative_delay(arg: &str, config: &ScriptConfig) -> u64 {
    let count = atoi(arg).max(0) as u64;
    let digits = arg
        .trim_start_matches(|c: char| c == '+' || c == '-')
        .trim_start_matches(|c: char| c.is_ascii_digit());
    match digits.trim_start().chars().next() {
        Some('t') => count.saturating_mul(config.pulses_per_mud_hour()),
        Some('s') => count.saturating_mul(config.passes_per_sec),
        _ => count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ScriptConfig {
        ScriptConfig::default()
    }

    #[test]
    fn test_relative_units() {
        let config = config();
        assert_eq!(wait_delay("5", 0, 0, &config), 5);
        assert_eq!(wait_delay("3s", 0, 0, &config), 3 * config.passes_per_sec);
        assert_eq!(wait_delay("2 t", 0, 0, &config), 2 * config.pulses_per_mud_hour());
        assert_eq!(wait_delay("0", 0, 0, &config), 1);
        assert_eq!(wait_delay("soon", 0, 0, &config), 1);
    }

    #[test]
    fn test_until_later_today() {
        let config = config();
        let per_hour = config.pulses_per_mud_hour();
        // 10:00 now, waiting for 14:30
        let delay = wait_delay("until 14:30", 0, 10, &config);
        assert_eq!(delay, 4 * per_hour + per_hour / 2);
        assert_eq!(wait_delay("until 1430", 0, 10, &config), delay);
    }

    #[test]
    fn test_until_rolls_over() {
        let config = config();
        let per_hour = config.pulses_per_mud_hour();
        // 20:00 now, 06:00 is tomorrow
        let delay = wait_delay("until 6:00", 0, 20, &config);
        assert_eq!(delay, 10 * per_hour);
    }
}
