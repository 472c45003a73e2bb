use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MINUTES_PER_HOUR: u32 = 60;
pub const MINUTES_PER_DAY: u32 = 24 * MINUTES_PER_HOUR;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("invalid time '{0}' (expected HH:MM or HH:MM:SS)")]
    Format(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimeRangeError {
    #[error("end time {end} must be after start time {start}")]
    EndNotAfterStart { start: TimeOfDay, end: TimeOfDay },
    #[error("hour {0} is outside 0..=24")]
    HourOutOfRange(u32),
}

/// Minutes since midnight. `24:00` is representable so a window may close at midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const END_OF_DAY: TimeOfDay = TimeOfDay(MINUTES_PER_DAY);

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if minute >= MINUTES_PER_HOUR {
            return None;
        }
        Self::from_minutes(hour.checked_mul(MINUTES_PER_HOUR)?.checked_add(minute)?)
    }

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes <= MINUTES_PER_DAY).then_some(Self(minutes))
    }

    /// Clamps into `00:00..=24:00`.
    pub fn saturating_from_minutes(minutes: i64) -> Self {
        Self(minutes.clamp(0, MINUTES_PER_DAY as i64) as u32)
    }

    pub fn parse(input: &str) -> Result<Self, TimeParseError> {
        let trimmed = input.trim();
        if trimmed == "24:00" || trimmed == "24:00:00" {
            return Ok(Self::END_OF_DAY);
        }
        NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
            .map(Self::from)
            .map_err(|_| TimeParseError::Format(input.to_string()))
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn hour(self) -> u32 {
        self.0 / MINUTES_PER_HOUR
    }

    pub fn minute(self) -> u32 {
        self.0 % MINUTES_PER_HOUR
    }

    pub fn checked_add_minutes(self, delta: i64) -> Option<Self> {
        let total = self.0 as i64 + delta;
        if total < 0 {
            return None;
        }
        Self::from_minutes(total as u32)
    }

    pub fn saturating_add_minutes(self, delta: i64) -> Self {
        Self::saturating_from_minutes(self.0 as i64 + delta)
    }

    /// Rounds the minute part down to a multiple of `step`.
    pub fn floor_to(self, step: u32) -> Self {
        if step == 0 {
            return self;
        }
        Self(self.0 - self.0 % step)
    }

    /// Rounds the minute part up to a multiple of `step`, never past `24:00`.
    pub fn ceil_to(self, step: u32) -> Self {
        if step == 0 || self.0 % step == 0 {
            return self;
        }
        Self((self.0 - self.0 % step + step).min(MINUTES_PER_DAY))
    }

    pub fn to_naive_time(self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0)
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(value: NaiveTime) -> Self {
        Self(value.hour() * MINUTES_PER_HOUR + value.minute())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Half-open span `[start, end)` of a single shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeRange {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeRange {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self, TimeRangeError> {
        if end <= start {
            return Err(TimeRangeError::EndNotAfterStart { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn duration_minutes(&self) -> u32 {
        self.end.minutes().saturating_sub(self.start.minutes())
    }

    /// Strict intersection: back-to-back ranges do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        !(self.end <= other.start || self.start >= other.end)
    }

    pub fn contains(&self, other: &TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

/// Vertical axis of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl Default for TimeWindow {
    /// The backend's default axis, 08:00 to 18:00.
    fn default() -> Self {
        Self {
            start: TimeOfDay(8 * MINUTES_PER_HOUR),
            end: TimeOfDay(18 * MINUTES_PER_HOUR),
        }
    }
}

impl TimeWindow {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self, TimeRangeError> {
        TimeRange::new(start, end)?;
        Ok(Self { start, end })
    }

    pub fn from_hours(start_hour: u32, end_hour: u32) -> Result<Self, TimeRangeError> {
        let start = TimeOfDay::from_hm(start_hour, 0)
            .ok_or(TimeRangeError::HourOutOfRange(start_hour))?;
        let end =
            TimeOfDay::from_hm(end_hour, 0).ok_or(TimeRangeError::HourOutOfRange(end_hour))?;
        Self::new(start, end)
    }

    /// Widens `hours` to whole hours: the opening hour is floored and a closing
    /// time with a non-zero minute rounds up to the next hour.
    pub fn covering(hours: &OperatingHours) -> Self {
        let start = hours.open.floor_to(MINUTES_PER_HOUR);
        let end = hours.close.ceil_to(MINUTES_PER_HOUR);
        Self { start, end }
    }

    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    pub fn start_hour(&self) -> u32 {
        self.start.hour()
    }

    /// Closing hour of the axis, rounded up.
    pub fn end_hour(&self) -> u32 {
        self.end.ceil_to(MINUTES_PER_HOUR).hour()
    }

    pub fn span_minutes(&self) -> u32 {
        self.end.minutes().saturating_sub(self.start.minutes())
    }

    pub fn as_range(&self) -> TimeRange {
        TimeRange {
            start: self.start,
            end: self.end,
        }
    }
}

/// The school's exact opening and closing times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    pub open: TimeOfDay,
    pub close: TimeOfDay,
}

impl OperatingHours {
    pub fn new(open: TimeOfDay, close: TimeOfDay) -> Result<Self, TimeRangeError> {
        TimeRange::new(open, close)?;
        Ok(Self { open, close })
    }

    pub fn contains(&self, range: &TimeRange) -> bool {
        self.open <= range.start && range.end <= self.close
    }
}
