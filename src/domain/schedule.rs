//! Daily task scheduling math.

use chrono::{Days, NaiveDateTime, NaiveTime};

use crate::domain::AppError;

/// A task that runs once every day at a fixed local time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyTask {
    pub name: String,
    pub time_of_day: NaiveTime,
    next_run: NaiveDateTime,
}

impl DailyTask {
    pub fn new(name: &str, time_of_day: NaiveTime, now: NaiveDateTime) -> Self {
        let mut task = DailyTask { name: name.to_string(), time_of_day, next_run: now };
        task.schedule_next(now);
        task
    }

    /// Next run is today at `time_of_day`, or tomorrow when that moment has
    /// already passed (the exact boundary rolls over).
    fn schedule_next(&mut self, now: NaiveDateTime) {
        let candidate = now.date().and_time(self.time_of_day);
        self.next_run = if candidate <= now { candidate + Days::new(1) } else { candidate };
    }

    pub fn next_run(&self) -> NaiveDateTime {
        self.next_run
    }

    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        now >= self.next_run
    }

    /// Reschedule for the following day after an execution attempt.
    pub fn mark_executed(&mut self, now: NaiveDateTime) {
        self.schedule_next(now);
    }
}

/// Parse a `HH:MM` or `HH:MM:SS` time of day.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| AppError::config_error(format!("Invalid time of day '{raw}': expected HH:MM")))
}
