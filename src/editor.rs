//! Create/edit form for a single shift.
//!
//! The editor validates the candidate range on every change, asks the backend
//! which teachers are free for it, and submits the result. Availability
//! queries are numbered; an answer to anything but the newest query is
//! dropped so a slow response cannot overwrite a fresher list.

use crate::backend::{AvailabilityQuery, BackendError, ShiftBackend};
use crate::model::{
    AvailableTeacher, CurrentShift, DayId, FixedShift, PlaceId, SchoolId, ShiftId, ShiftRequest,
    TeacherId,
};
use crate::slot::DraftTimes;
use crate::time::{OperatingHours, TimeOfDay, TimeRange};
use crate::toast::Notifier;
use crate::validation::{ShiftValidationError, validate_time_range};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Validation(#[from] ShiftValidationError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("the editor has already been submitted")]
    Closed,
    #[error("only an existing shift can be deleted")]
    NotEditing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create {
        school_id: SchoolId,
    },
    Edit {
        school_id: SchoolId,
        shift_id: ShiftId,
        assigned: Vec<(TeacherId, String)>,
    },
}

impl EditorMode {
    pub fn school_id(&self) -> SchoolId {
        match self {
            EditorMode::Create { school_id } | EditorMode::Edit { school_id, .. } => *school_id,
        }
    }

    pub fn shift_id(&self) -> Option<ShiftId> {
        match self {
            EditorMode::Create { .. } => None,
            EditorMode::Edit { shift_id, .. } => Some(*shift_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    Idle,
    Validating,
    Valid(TimeRange),
    Invalid(String),
    Submitting,
    Success,
    Failure(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TeacherStatus {
    Available,
    Busy { current_shifts: Vec<CurrentShift> },
    NotQualified,
    AssignedButUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeacherOption {
    pub teacher: AvailableTeacher,
    pub selected: bool,
    pub status: TeacherStatus,
}

/// An availability query the caller must run and hand back through
/// [`ShiftEditor::finish_teacher_query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    pub generation: u64,
    pub query: AvailabilityQuery,
}

#[derive(Debug)]
pub struct ShiftEditor {
    mode: EditorMode,
    day_id: DayId,
    place_id: PlaceId,
    start: TimeOfDay,
    end: TimeOfDay,
    description: String,
    selected: Vec<TeacherId>,
    hours: Option<OperatingHours>,
    state: EditorState,
    teachers: Vec<AvailableTeacher>,
    generation: u64,
    notifier: Notifier,
}

impl ShiftEditor {
    pub fn create(
        school_id: SchoolId,
        day_id: DayId,
        place_id: PlaceId,
        draft: DraftTimes,
        hours: Option<OperatingHours>,
        notifier: Notifier,
    ) -> Self {
        Self {
            mode: EditorMode::Create { school_id },
            day_id,
            place_id,
            start: draft.start,
            end: draft.end,
            description: String::new(),
            selected: Vec::new(),
            hours,
            state: EditorState::Idle,
            teachers: Vec::new(),
            generation: 0,
            notifier,
        }
    }

    pub fn edit(
        school_id: SchoolId,
        shift: &FixedShift,
        hours: Option<OperatingHours>,
        notifier: Notifier,
    ) -> Self {
        let assigned = shift
            .teacher
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let name = shift.teacher_names.get(i).cloned().unwrap_or_else(|| id.to_string());
                (*id, name)
            })
            .collect();
        Self {
            mode: EditorMode::Edit {
                school_id,
                shift_id: shift.id,
                assigned,
            },
            day_id: shift.day,
            place_id: shift.place,
            start: shift.start_time,
            end: shift.end_time,
            description: shift.description_text().to_string(),
            selected: shift.teacher.clone(),
            hours,
            state: EditorState::Idle,
            teachers: Vec::new(),
            generation: 0,
            notifier,
        }
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    pub fn day_id(&self) -> DayId {
        self.day_id
    }

    pub fn place_id(&self) -> PlaceId {
        self.place_id
    }

    pub fn selected_teachers(&self) -> &[TeacherId] {
        &self.selected
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn teachers(&self) -> &[AvailableTeacher] {
        &self.teachers
    }

    pub fn is_open(&self) -> bool {
        self.state != EditorState::Success
    }

    pub fn set_start(&mut self, start: TimeOfDay) -> &EditorState {
        self.start = start;
        self.target_changed()
    }

    pub fn set_end(&mut self, end: TimeOfDay) -> &EditorState {
        self.end = end;
        self.target_changed()
    }

    pub fn set_range(&mut self, start: TimeOfDay, end: TimeOfDay) -> &EditorState {
        self.start = start;
        self.end = end;
        self.target_changed()
    }

    pub fn set_day(&mut self, day_id: DayId) -> &EditorState {
        self.day_id = day_id;
        self.target_changed()
    }

    pub fn set_place(&mut self, place_id: PlaceId) -> &EditorState {
        self.place_id = place_id;
        self.target_changed()
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Adds the teacher to the selection, or removes it if already selected.
    /// Returns whether the teacher is selected afterwards.
    pub fn toggle_teacher(&mut self, teacher_id: TeacherId) -> bool {
        if let Some(index) = self.selected.iter().position(|id| *id == teacher_id) {
            self.selected.remove(index);
            false
        } else {
            self.selected.push(teacher_id);
            true
        }
    }

    /// Range, day or place changed: any availability answer still in flight
    /// describes a different slot.
    fn target_changed(&mut self) -> &EditorState {
        self.generation += 1;
        self.validate()
    }

    pub fn validate(&mut self) -> &EditorState {
        if self.state == EditorState::Success {
            return &self.state;
        }
        self.state = EditorState::Validating;
        self.state = match validate_time_range(self.start, self.end, self.hours.as_ref()) {
            Ok(range) => EditorState::Valid(range),
            Err(err) => EditorState::Invalid(err.to_string()),
        };
        &self.state
    }

    /// Issues a new availability query for the current range, superseding any
    /// query still in flight. `None` while the range is invalid.
    pub fn begin_teacher_query(&mut self) -> Option<PendingQuery> {
        let EditorState::Valid(range) = self.state else {
            return None;
        };
        self.generation += 1;
        Some(PendingQuery {
            generation: self.generation,
            query: AvailabilityQuery {
                school_id: self.mode.school_id(),
                day_id: self.day_id,
                start_time: range.start,
                end_time: range.end,
                place_id: Some(self.place_id),
                exclude_shift: self.mode.shift_id(),
            },
        })
    }

    /// Applies a query result. Returns `false` if the result was stale or
    /// failed; a failure keeps the previous list and raises an error toast.
    pub fn finish_teacher_query(
        &mut self,
        pending: PendingQuery,
        result: Result<Vec<AvailableTeacher>, BackendError>,
    ) -> bool {
        if pending.generation != self.generation {
            tracing::debug!(
                stale = pending.generation,
                latest = self.generation,
                "discarding stale availability response"
            );
            return false;
        }
        match result {
            Ok(teachers) => {
                self.teachers = teachers;
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "availability query failed");
                self.notifier.error(format!("Failed to load teachers: {err}"));
                false
            }
        }
    }

    pub async fn refresh_teachers<B: ShiftBackend>(&mut self, backend: &B) -> bool {
        let Some(pending) = self.begin_teacher_query() else {
            return false;
        };
        let result = backend.available_teachers(&pending.query).await;
        self.finish_teacher_query(pending, result)
    }

    /// Teacher list as shown in the form: backend results annotated, plus any
    /// teacher assigned to the shift under edit that the backend left out.
    /// Assigned teachers are never reported as busy; they keep their
    /// `current_shifts` but show as `AssignedButUnavailable`.
    pub fn teacher_options(&self) -> Vec<TeacherOption> {
        let assigned: &[(TeacherId, String)] = match &self.mode {
            EditorMode::Edit { assigned, .. } => assigned,
            EditorMode::Create { .. } => &[],
        };
        let is_assigned = |id: TeacherId| assigned.iter().any(|(assigned_id, _)| *assigned_id == id);

        let mut options: Vec<TeacherOption> = self
            .teachers
            .iter()
            .map(|teacher| {
                let status = if !teacher.is_available && is_assigned(teacher.id) {
                    TeacherStatus::AssignedButUnavailable
                } else if !teacher.can_teach_at_place {
                    TeacherStatus::NotQualified
                } else if teacher.is_available {
                    TeacherStatus::Available
                } else {
                    TeacherStatus::Busy {
                        current_shifts: teacher.current_shifts.clone(),
                    }
                };
                TeacherOption {
                    teacher: teacher.clone(),
                    selected: self.selected.contains(&teacher.id),
                    status,
                }
            })
            .collect();

        for (id, name) in assigned {
            if self.teachers.iter().any(|teacher| teacher.id == *id) {
                continue;
            }
            options.push(TeacherOption {
                teacher: AvailableTeacher::assigned_placeholder(*id, name.clone()),
                selected: self.selected.contains(id),
                status: TeacherStatus::AssignedButUnavailable,
            });
        }
        options
    }

    /// The request that would be sent, or the validation error blocking it.
    pub fn request(&self) -> Result<ShiftRequest, EditorError> {
        let range = validate_time_range(self.start, self.end, self.hours.as_ref())?;
        let description = self.description.trim();
        Ok(ShiftRequest {
            day: self.day_id,
            start_time: range.start,
            end_time: range.end,
            place: self.place_id,
            teacher_ids: self.selected.clone(),
            description: (!description.is_empty()).then(|| description.to_string()),
        })
    }

    pub async fn submit<B: ShiftBackend>(&mut self, backend: &B) -> Result<FixedShift, EditorError> {
        if self.state == EditorState::Success {
            return Err(EditorError::Closed);
        }
        let request = match self.request() {
            Ok(request) => request,
            Err(err) => {
                self.validate();
                return Err(err);
            }
        };

        let in_flight = InFlight::begin(&mut self.state);
        let result = match &self.mode {
            EditorMode::Create { school_id } => backend.create_shift(*school_id, &request).await,
            EditorMode::Edit { shift_id, .. } => backend.update_shift(*shift_id, &request).await,
        };

        match result {
            Ok(shift) => {
                let verb = if self.mode.shift_id().is_some() { "updated" } else { "created" };
                tracing::info!(shift = shift.id, "shift {verb}");
                self.notifier.success(format!("Shift {verb}"));
                in_flight.settle(EditorState::Success);
                Ok(shift)
            }
            Err(err) => {
                tracing::warn!(error = %err, "shift submission failed");
                self.notifier.error(format!("Failed to save shift: {err}"));
                in_flight.settle(EditorState::Failure(err.to_string()));
                Err(err.into())
            }
        }
    }

    pub async fn delete<B: ShiftBackend>(&mut self, backend: &B) -> Result<(), EditorError> {
        let Some(shift_id) = self.mode.shift_id() else {
            return Err(EditorError::NotEditing);
        };
        if self.state == EditorState::Success {
            return Err(EditorError::Closed);
        }

        let in_flight = InFlight::begin(&mut self.state);
        match backend.delete_shift(shift_id).await {
            Ok(()) => {
                self.notifier.success("Shift deleted");
                in_flight.settle(EditorState::Success);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, shift = shift_id, "shift deletion failed");
                self.notifier.error(format!("Failed to delete shift: {err}"));
                in_flight.settle(EditorState::Failure(err.to_string()));
                Err(err.into())
            }
        }
    }
}

/// Holds the editor in `Submitting` for the duration of a backend call. If the
/// call's future is dropped before it settles, the editor lands in `Failure`.
struct InFlight<'a> {
    state: &'a mut EditorState,
}

impl<'a> InFlight<'a> {
    fn begin(state: &'a mut EditorState) -> Self {
        *state = EditorState::Submitting;
        Self { state }
    }

    fn settle(self, next: EditorState) {
        *self.state = next;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if *self.state == EditorState::Submitting {
            tracing::warn!("shift request cancelled before completion");
            *self.state = EditorState::Failure("cancelled".to_string());
        }
    }
}
