//! Local calendar clock for the daily menu gate

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

/// Source of "today" in the assistant's local timezone
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock projected into a fixed IANA timezone
#[derive(Debug, Clone, Copy)]
pub struct ZonedClock {
    tz: Tz,
}

impl ZonedClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }
}

impl Default for ZonedClock {
    fn default() -> Self {
        Self::new(chrono_tz::America::Sao_Paulo)
    }
}

impl Clock for ZonedClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }
}

/// Clock pinned to a settable date
#[derive(Debug)]
pub struct FixedClock {
    today: parking_lot::Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: parking_lot::Mutex::new(today),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        *self.today.lock() = today;
    }

    /// Move forward by whole days
    pub fn advance_days(&self, days: u64) {
        let mut today = self.today.lock();
        if let Some(next) = today.checked_add_days(chrono::Days::new(days)) {
            *today = next;
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_local_date_differs_from_utc_near_midnight() {
        // 01:30 UTC is still the previous evening in São Paulo (UTC-3)
        let instant = Utc.with_ymd_and_hms(2024, 3, 11, 1, 30, 0).unwrap();
        let local = instant.with_timezone(&chrono_tz::America::Sao_Paulo);
        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 2, 28).unwrap());
        clock.advance_days(2);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_zoned_clock_is_close_to_utc() {
        let clock = ZonedClock::default();
        let utc_today = Utc::now().date_naive();
        let diff = (clock.today() - utc_today).num_days().abs();
        assert!(diff <= 1);
    }
}
