//! Turning a click on the grid into a starting time, and the time-picker
//! defaults that follow from it.

use crate::config::GridConfig;
use crate::time::{MINUTES_PER_HOUR, OperatingHours, TimeOfDay, TimeWindow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSlot {
    pub hour: u32,
    pub minute: u32,
}

impl CandidateSlot {
    pub fn time(&self) -> TimeOfDay {
        let minutes = i64::from(self.hour) * i64::from(MINUTES_PER_HOUR) + i64::from(self.minute);
        TimeOfDay::saturating_from_minutes(minutes)
    }
}

/// Vertical click ratio inside a grid body of `height` pixels, clamped to `[0, 1]`.
pub fn click_ratio(offset_y: f64, height: f64) -> f64 {
    if !offset_y.is_finite() || !height.is_finite() || height <= 0.0 {
        return 0.0;
    }
    (offset_y / height).clamp(0.0, 1.0)
}

/// Resolves a click at `ratio` of the axis into a candidate start.
///
/// The hour is floored and kept within the axis (never the closing hour itself),
/// the minute snaps to the nearest `granularity` step. When `closing` is known
/// and the hour reaches it, the candidate moves one hour earlier so a default
/// one-hour shift still fits.
pub fn resolve_click(
    ratio: f64,
    window: &TimeWindow,
    closing: Option<TimeOfDay>,
    granularity: u32,
) -> CandidateSlot {
    let ratio = if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let start_hour = window.start_hour();
    let end_hour = window.end_hour().max(start_hour + 1);
    let total_hours = (end_hour - start_hour) as f64;

    let click_hour = start_hour as f64 + ratio * total_hours;
    let floored = click_hour.floor();
    let raw_minute = ((click_hour - floored) * MINUTES_PER_HOUR as f64).floor();

    let mut hour = (floored as u32).clamp(start_hour, end_hour - 1);

    let step = granularity.clamp(1, MINUTES_PER_HOUR);
    let last_minute = (MINUTES_PER_HOUR - step) as f64;
    let minute = ((raw_minute / step as f64).round() * step as f64).clamp(0.0, last_minute) as u32;

    if let Some(closing) = closing {
        let closing_hour = closing.hour();
        if closing_hour > start_hour && hour >= closing_hour {
            hour = closing_hour - 1;
        }
    }

    CandidateSlot { hour, minute }
}

/// Same as [`resolve_click`] with the closing time and granularity taken from
/// the school's hours and `config`.
pub fn resolve_grid_click(
    ratio: f64,
    window: &TimeWindow,
    hours: Option<&OperatingHours>,
    config: &GridConfig,
) -> CandidateSlot {
    resolve_click(
        ratio,
        window,
        hours.map(|h| h.close),
        config.slot_granularity_minutes,
    )
}

/// Start and end a new-shift form opens with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftTimes {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl DraftTimes {
    pub fn from_slot(
        slot: CandidateSlot,
        hours: Option<&OperatingHours>,
        config: &GridConfig,
    ) -> Self {
        let step = config.slot_granularity_minutes;
        let mut start = slot.time().floor_to(step);

        if let Some(hours) = hours {
            if start < hours.open {
                start = hours.open.ceil_to(step);
            }
        }

        let mut end = start.saturating_add_minutes(config.default_shift_minutes as i64);

        if let Some(hours) = hours {
            if end > hours.close {
                end = hours.close.floor_to(step);
                if start >= end {
                    let hour_earlier = TimeOfDay::saturating_from_minutes(
                        (start.hour().saturating_sub(1) * MINUTES_PER_HOUR) as i64,
                    );
                    start = hour_earlier.max(hours.open.ceil_to(step));
                }
            }
        }

        Self { start, end }
    }

    pub fn duration_minutes(&self) -> u32 {
        self.end.minutes().saturating_sub(self.start.minutes())
    }
}

/// Choices offered by the hour and minute pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimePickerOptions {
    hours: Option<OperatingHours>,
    step: u32,
}

impl TimePickerOptions {
    pub fn new(hours: Option<OperatingHours>, step: u32) -> Self {
        Self {
            hours,
            step: step.clamp(1, MINUTES_PER_HOUR),
        }
    }

    pub fn hours(&self) -> Vec<u32> {
        match self.hours {
            Some(hours) => (hours.open.hour()..=hours.close.hour()).collect(),
            None => (0..=23).collect(),
        }
    }

    pub fn minutes(&self, hour: u32) -> Vec<u32> {
        let step = self.step;
        let mut first = 0;
        let mut last = MINUTES_PER_HOUR - step;

        if let Some(hours) = self.hours {
            if hour == hours.open.hour() {
                first = hours.open.minute().div_ceil(step) * step;
            }
            if hour == hours.close.hour() {
                last = hours.close.minute() / step * step;
            }
        }

        if first > last {
            return Vec::new();
        }
        (first..=last).step_by(step as usize).collect()
    }
}
