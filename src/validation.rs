use crate::model::{DayId, FixedShift, GridPayload, PlaceId, ShiftId, ShiftRequest, TeacherId};
use crate::time::{OperatingHours, TimeOfDay, TimeRange};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShiftValidationError {
    #[error("end time {end} must be after start time {start}")]
    EndNotAfterStart { start: TimeOfDay, end: TimeOfDay },
    #[error("shift {start} - {end} is outside operating hours {open} - {close}")]
    OutsideOperatingHours {
        start: TimeOfDay,
        end: TimeOfDay,
        open: TimeOfDay,
        close: TimeOfDay,
    },
    #[error("unknown day {0}")]
    UnknownDay(DayId),
    #[error("unknown place {0}")]
    UnknownPlace(PlaceId),
    #[error("duplicate shift id {0}")]
    DuplicateShiftId(ShiftId),
    #[error("teacher {0} is listed more than once")]
    DuplicateTeacher(TeacherId),
}

pub type ValidationResult<T> = Result<T, ShiftValidationError>;

/// Checks `end > start` and, when `hours` is known, that the range fits inside it.
pub fn validate_time_range(
    start: TimeOfDay,
    end: TimeOfDay,
    hours: Option<&OperatingHours>,
) -> ValidationResult<TimeRange> {
    let range = TimeRange::new(start, end)
        .map_err(|_| ShiftValidationError::EndNotAfterStart { start, end })?;
    if let Some(hours) = hours {
        if !hours.contains(&range) {
            return Err(ShiftValidationError::OutsideOperatingHours {
                start,
                end,
                open: hours.open,
                close: hours.close,
            });
        }
    }
    Ok(range)
}

fn validate_teacher_ids(teacher_ids: &[TeacherId]) -> ValidationResult<()> {
    let mut seen = HashSet::with_capacity(teacher_ids.len());
    for id in teacher_ids {
        if !seen.insert(*id) {
            return Err(ShiftValidationError::DuplicateTeacher(*id));
        }
    }
    Ok(())
}

pub fn validate_request(
    request: &ShiftRequest,
    hours: Option<&OperatingHours>,
) -> ValidationResult<TimeRange> {
    let range = validate_time_range(request.start_time, request.end_time, hours)?;
    validate_teacher_ids(&request.teacher_ids)?;
    Ok(range)
}

pub fn validate_shift(shift: &FixedShift) -> ValidationResult<TimeRange> {
    let range = validate_time_range(shift.start_time, shift.end_time, None)?;
    validate_teacher_ids(&shift.teacher)?;
    Ok(range)
}

/// Structural checks on a payload: unique shift ids, ordered times, and day and
/// place references that resolve when the payload lists days or places.
pub fn validate_payload(payload: &GridPayload) -> ValidationResult<()> {
    let day_ids: HashSet<DayId> = payload.days.iter().map(|d| d.id).collect();
    let place_ids: HashSet<PlaceId> = payload.places.iter().map(|p| p.id).collect();
    let mut shift_ids = HashSet::with_capacity(payload.shifts.len());

    for shift in &payload.shifts {
        if !shift_ids.insert(shift.id) {
            return Err(ShiftValidationError::DuplicateShiftId(shift.id));
        }
        validate_shift(shift)?;
        if !day_ids.is_empty() && !day_ids.contains(&shift.day) {
            return Err(ShiftValidationError::UnknownDay(shift.day));
        }
        if !place_ids.is_empty() && !place_ids.contains(&shift.place) {
            return Err(ShiftValidationError::UnknownPlace(shift.place));
        }
    }
    Ok(())
}
