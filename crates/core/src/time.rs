//! Game calendar and pulse constants

use serde::{Deserialize, Serialize};

/// Game hours in one game day
pub const HOURS_PER_DAY: i32 = 24;
pub const DAYS_PER_WEEK: i32 = 7;
pub const WEEKS_PER_MONTH: i32 = 5;
pub const DAYS_PER_MONTH: i32 = DAYS_PER_WEEK * WEEKS_PER_MONTH;
pub const MONTHS_PER_YEAR: i32 = 16;

/// Scheduler pulses per real second
pub const PASSES_PER_SEC: u64 = 10;

/// Real seconds per game hour
pub const SECS_PER_MUD_HOUR: u64 = 75;

/// Current game date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameTime {
    pub hours: i32,
    pub day: i32,
    pub month: i32,
    pub year: i32,
}

impl GameTime {
    pub fn new(hours: i32, day: i32, month: i32, year: i32) -> Self {
        Self {
            hours,
            day,
            month,
            year,
        }
    }

    /// Game hours elapsed since the start of year zero
    pub fn stamp(&self) -> i64 {
        let year = self.year as i64 * MONTHS_PER_YEAR as i64;
        let month = (year + self.month as i64) * DAYS_PER_MONTH as i64;
        let day = (month + self.day as i64) * HOURS_PER_DAY as i64;
        day + self.hours as i64
    }

    /// Move the clock forward one game hour, rolling over day, month and year
    pub fn advance_hour(&mut self) {
        self.hours += 1;
        if self.hours >= HOURS_PER_DAY {
            self.hours = 0;
            self.day += 1;
        }
        if self.day >= DAYS_PER_MONTH {
            self.day = 0;
            self.month += 1;
        }
        if self.month >= MONTHS_PER_YEAR {
            self.month = 0;
            self.year += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_rolls_over() {
        let mut time = GameTime::new(23, DAYS_PER_MONTH - 1, MONTHS_PER_YEAR - 1, 10);
        time.advance_hour();
        assert_eq!(time, GameTime::new(0, 0, 0, 11));
    }

    #[test]
    fn test_stamp_counts_hours() {
        let start = GameTime::new(5, 3, 2, 1);
        let mut later = start;
        for _ in 0..30 {
            later.advance_hour();
        }
        assert_eq!(later.stamp() - start.stamp(), 30);
    }
}
