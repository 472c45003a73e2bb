use crate::time::{TimeOfDay, TimeWindow};
use serde::Serialize;

/// Vertical placement of a block, in percent of the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VerticalSpan {
    pub top: f64,
    pub height: f64,
}

impl VerticalSpan {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Maps `[start, end]` onto `window`.
///
/// `height` is raised to `min_height` and capped at 100, then `top` is kept
/// within `[0, 100 - height]`. Inverted or empty ranges therefore still come
/// out as a minimum-height block instead of an error.
pub fn vertical_span(
    window: &TimeWindow,
    start: TimeOfDay,
    end: TimeOfDay,
    min_height: f64,
) -> VerticalSpan {
    let min_height = if min_height.is_finite() {
        min_height.clamp(0.0, 100.0)
    } else {
        0.0
    };
    let span = window.span_minutes() as f64;
    if span <= 0.0 {
        return VerticalSpan {
            top: 0.0,
            height: min_height,
        };
    }

    let offset = start.minutes() as f64 - window.start().minutes() as f64;
    let duration = end.minutes() as f64 - start.minutes() as f64;

    let raw_top = offset / span * 100.0;
    let raw_height = duration / span * 100.0;

    let height = raw_height.max(min_height).min(100.0);
    let top = raw_top.clamp(0.0, 100.0 - height);
    VerticalSpan { top, height }
}

/// Inverse of [`vertical_span`] for a single point: percent of the axis at `time`.
pub fn axis_percent(window: &TimeWindow, time: TimeOfDay) -> f64 {
    let span = window.span_minutes() as f64;
    if span <= 0.0 {
        return 0.0;
    }
    (time.minutes() as f64 - window.start().minutes() as f64) / span * 100.0
}
