//! Controllable calendar for token expiry tests.

use chrono::{Days, NaiveDate};
use std::sync::Mutex;

use crate::subtitles::Clock;

/// A [`Clock`] that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    today: Mutex<NaiveDate>,
}

impl ManualClock {
    /// Panics on an invalid date.
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        let date = NaiveDate::from_ymd_opt(year, month, day).expect("valid date");
        Self {
            today: Mutex::new(date),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        *self.today.lock().unwrap() = date;
    }

    pub fn advance_days(&self, days: u64) {
        let mut today = self.today.lock().unwrap();
        *today = *today + Days::new(days);
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock().unwrap()
    }
}
