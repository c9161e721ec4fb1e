//! Daily schedule and timezone handling

use chrono::{DateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use festival_notifier_domain::Clock;
use std::str::FromStr;
use time::{OffsetDateTime, UtcOffset};

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
    #[error("Invalid cron expression '{expr}': {reason}")]
    InvalidCron { expr: String, reason: String },
}

/// Parse an IANA timezone name such as `Asia/Kolkata`
pub fn parse_timezone(name: &str) -> Result<Tz, ScheduleError> {
    name.parse::<Tz>()
        .map_err(|_| ScheduleError::InvalidTimezone(name.to_string()))
}

/// Clock reporting the current instant in a fixed IANA timezone
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

    /// Express `instant` in this clock's timezone, DST included
    pub fn localize(&self, instant: OffsetDateTime) -> OffsetDateTime {
        let offset_secs = self
            .tz
            .timestamp_opt(instant.unix_timestamp(), 0)
            .single()
            .map(|local| local.offset().fix().local_minus_utc())
            .unwrap_or(0);
        let offset = UtcOffset::from_whole_seconds(offset_secs).unwrap_or(UtcOffset::UTC);
        instant.to_offset(offset)
    }
}

impl Clock for ZonedClock {
    fn now(&self) -> OffsetDateTime {
        self.localize(OffsetDateTime::now_utc())
    }
}

/// Cron-driven daily trigger evaluated in a timezone
#[derive(Debug, Clone)]
pub struct DailySchedule {
    expr: String,
    schedule: Schedule,
    tz: Tz,
}

impl DailySchedule {
    /// Parse `expr` (six fields with seconds first; five-field expressions
    /// get a leading `0` seconds field)
    pub fn new(expr: &str, tz: Tz) -> Result<Self, ScheduleError> {
        let trimmed = expr.trim();
        let full_expr = if trimmed.split_whitespace().count() == 5 {
            format!("0 {}", trimmed)
        } else {
            trimmed.to_string()
        };

        let schedule = Schedule::from_str(&full_expr).map_err(|e| ScheduleError::InvalidCron {
            expr: expr.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            expr: full_expr,
            schedule,
            tz,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expr
    }

    /// First fire instant strictly after `now`
    pub fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Tz>> {
        self.schedule.after(&now.with_timezone(&self.tz)).next()
    }

    /// How long to sleep from `now` until the next fire instant
    pub fn until_next(&self, now: DateTime<Utc>) -> Option<(DateTime<Tz>, std::time::Duration)> {
        let next = self.next_after(now)?;
        let wait = (next.with_timezone(&Utc) - now)
            .to_std()
            .unwrap_or_default();
        Some((next, wait))
    }
}
