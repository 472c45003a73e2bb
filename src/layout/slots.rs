use super::position::axis_percent;
use crate::time::{TimeOfDay, TimeWindow};
use serde::Serialize;

/// One label on the time axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSlot {
    pub hour: u32,
    pub minute: u32,
    pub display_time: String,
    /// Percent from the top of the axis.
    pub position: f64,
}

/// Hour and half-hour labels from the window's first hour through its last.
pub fn time_slots(window: &TimeWindow) -> Vec<TimeSlot> {
    let start_hour = window.start_hour();
    let end_hour = window.end_hour();
    let mut slots = Vec::with_capacity((end_hour.saturating_sub(start_hour) * 2 + 1) as usize);

    for hour in start_hour..=end_hour {
        push_slot(&mut slots, window, hour, 0);
        if hour < end_hour {
            push_slot(&mut slots, window, hour, 30);
        }
    }
    slots
}

fn push_slot(slots: &mut Vec<TimeSlot>, window: &TimeWindow, hour: u32, minute: u32) {
    let Some(time) = TimeOfDay::from_hm(hour, minute) else {
        return;
    };
    slots.push(TimeSlot {
        hour,
        minute,
        display_time: time.to_string(),
        position: axis_percent(window, time),
    });
}
