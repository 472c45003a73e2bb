use super::{AvailabilityQuery, BackendError, BackendResult, ConflictReport, ShiftBackend};
use crate::model::{
    AvailableTeacher, CurrentShift, FixedShift, GridPayload, SchoolId, ShiftId, ShiftRequest,
    Teacher,
};
use crate::time::TimeRange;
use crate::validation::validate_request;
use parking_lot::RwLock;
use std::future::{Future, ready};

#[derive(Debug)]
struct MemoryState {
    payload: GridPayload,
    teachers: Vec<Teacher>,
    next_shift_id: ShiftId,
    unavailable: Option<String>,
}

/// Backend that keeps one school's grid and roster in memory.
///
/// Used by the CLI and by tests; nothing is written anywhere.
#[derive(Debug)]
pub struct InMemoryBackend {
    state: RwLock<MemoryState>,
}

impl InMemoryBackend {
    pub fn new(payload: GridPayload, teachers: Vec<Teacher>) -> Self {
        let next_shift_id = payload.shifts.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        Self {
            state: RwLock::new(MemoryState {
                payload,
                teachers,
                next_shift_id,
                unavailable: None,
            }),
        }
    }

    pub fn snapshot(&self) -> GridPayload {
        let state = self.state.read();
        let mut payload = state.payload.clone();
        sort_shifts(&mut payload);
        payload
    }

    pub fn teachers(&self) -> Vec<Teacher> {
        self.state.read().teachers.clone()
    }

    pub fn replace_payload(&self, payload: GridPayload) {
        let mut state = self.state.write();
        state.next_shift_id = payload.shifts.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        state.payload = payload;
    }

    /// Makes every call fail with [`BackendError::Transport`] until cleared.
    pub fn set_unavailable(&self, reason: Option<String>) {
        self.state.write().unavailable = reason;
    }

    pub fn grid(&self, school_id: SchoolId) -> BackendResult<GridPayload> {
        {
            let state = self.state.read();
            state.reachable()?;
            state.check_school(school_id)?;
        }
        Ok(self.snapshot())
    }

    pub fn availability(
        &self,
        query: &AvailabilityQuery,
    ) -> BackendResult<Vec<AvailableTeacher>> {
        let state = self.state.read();
        state.reachable()?;
        state.check_school(query.school_id)?;

        let range = TimeRange::new(query.start_time, query.end_time)
            .map_err(|err| BackendError::Rejected(err.to_string()))?;
        if !state.payload.days.is_empty() && state.payload.day(query.day_id).is_none() {
            return Err(BackendError::NotFound(format!("day {}", query.day_id)));
        }
        if let Some(place_id) = query.place_id {
            if !state.payload.places.is_empty() && state.payload.place(place_id).is_none() {
                return Err(BackendError::NotFound(format!("place {place_id}")));
            }
        }

        let mut candidates: Vec<&Teacher> = state
            .teachers
            .iter()
            .filter(|teacher| teacher.can_be_assigned())
            .filter(|teacher| query.place_id.is_none_or(|place| teacher.can_teach_at(place)))
            .collect();
        candidates.sort_by(|a, b| {
            (&a.last_name, &a.first_name, &a.username).cmp(&(
                &b.last_name,
                &b.first_name,
                &b.username,
            ))
        });

        let result = candidates
            .into_iter()
            .map(|teacher| {
                let current_shifts: Vec<CurrentShift> = state
                    .payload
                    .shifts_for_day(query.day_id)
                    .filter(|shift| Some(shift.id) != query.exclude_shift)
                    .filter(|shift| shift.teacher.contains(&teacher.id))
                    .filter(|shift| shift_overlaps(shift, &range))
                    .map(CurrentShift::from_shift)
                    .collect();
                AvailableTeacher {
                    id: teacher.id,
                    username: teacher.username.clone(),
                    full_name: teacher.full_name(),
                    is_available: current_shifts.is_empty(),
                    // candidates are already limited to the place
                    can_teach_at_place: true,
                    current_shifts,
                    role_display: teacher.role_display(),
                    is_teacher: teacher.is_teacher,
                    is_owner: teacher.is_owner,
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            day = query.day_id,
            start = %query.start_time,
            end = %query.end_time,
            candidates = result.len(),
            "availability computed"
        );
        Ok(result)
    }

    pub fn create(&self, school_id: SchoolId, request: &ShiftRequest) -> BackendResult<FixedShift> {
        let mut state = self.state.write();
        state.reachable()?;
        state.check_school(school_id)?;
        state.check_request(request, None)?;

        let id = state.next_shift_id;
        state.next_shift_id += 1;
        let mut shift = FixedShift::new(
            id,
            request.day,
            request.place,
            request.start_time,
            request.end_time,
        );
        state.fill_shift(&mut shift, request);
        state.payload.shifts.push(shift.clone());

        tracing::info!(shift = id, day = request.day, place = request.place, "shift created");
        Ok(shift)
    }

    pub fn update(&self, shift_id: ShiftId, request: &ShiftRequest) -> BackendResult<FixedShift> {
        let mut state = self.state.write();
        state.reachable()?;
        let index = state
            .payload
            .shifts
            .iter()
            .position(|shift| shift.id == shift_id)
            .ok_or_else(|| BackendError::NotFound(format!("shift {shift_id}")))?;
        state.check_request(request, Some(shift_id))?;

        let mut shift = FixedShift::new(
            shift_id,
            request.day,
            request.place,
            request.start_time,
            request.end_time,
        );
        state.fill_shift(&mut shift, request);
        state.payload.shifts[index] = shift.clone();

        tracing::info!(shift = shift_id, "shift updated");
        Ok(shift)
    }

    pub fn delete(&self, shift_id: ShiftId) -> BackendResult<()> {
        let mut state = self.state.write();
        state.reachable()?;
        let before = state.payload.shifts.len();
        state.payload.shifts.retain(|shift| shift.id != shift_id);
        if state.payload.shifts.len() == before {
            return Err(BackendError::NotFound(format!("shift {shift_id}")));
        }
        tracing::info!(shift = shift_id, "shift deleted");
        Ok(())
    }

    /// Teachers booked on two overlapping shifts of the same day, one entry per
    /// clashing pair.
    pub fn conflict_report(&self, school_id: SchoolId) -> BackendResult<Vec<ConflictReport>> {
        let state = self.state.read();
        state.reachable()?;
        state.check_school(school_id)?;

        let mut payload = state.payload.clone();
        sort_shifts(&mut payload);

        let mut reports = Vec::new();
        for day in payload.sorted_days() {
            let shifts: Vec<&FixedShift> = payload.shifts_for_day(day.id).collect();
            for (i, first) in shifts.iter().enumerate() {
                for second in &shifts[i + 1..] {
                    if !times_overlap(first, second) {
                        continue;
                    }
                    let shared = first
                        .teacher
                        .iter()
                        .filter(|id| second.teacher.contains(*id));
                    for teacher_id in shared {
                        let teacher_name = state
                            .teachers
                            .iter()
                            .find(|t| t.id == *teacher_id)
                            .map(|t| t.username.clone())
                            .unwrap_or_else(|| teacher_id.to_string());
                        reports.push(ConflictReport {
                            teacher_id: *teacher_id,
                            teacher_name,
                            day_name: day.name.clone(),
                            conflicting_shifts: vec![
                                CurrentShift::from_shift(first),
                                CurrentShift::from_shift(second),
                            ],
                        });
                    }
                }
            }
        }
        if !reports.is_empty() {
            tracing::warn!(count = reports.len(), "double-booked teachers found");
        }
        Ok(reports)
    }
}

impl MemoryState {
    fn reachable(&self) -> BackendResult<()> {
        match &self.unavailable {
            Some(reason) => Err(BackendError::Transport(reason.clone())),
            None => Ok(()),
        }
    }

    fn check_school(&self, school_id: SchoolId) -> BackendResult<()> {
        match self.payload.school_id {
            Some(id) if id != school_id => {
                Err(BackendError::NotFound(format!("school {school_id}")))
            }
            _ => Ok(()),
        }
    }

    fn check_request(&self, request: &ShiftRequest, editing: Option<ShiftId>) -> BackendResult<()> {
        let hours = self.payload.operating_hours();
        let range = validate_request(request, hours.as_ref())
            .map_err(|err| BackendError::Rejected(err.to_string()))?;

        if !self.payload.days.is_empty() && self.payload.day(request.day).is_none() {
            return Err(BackendError::Rejected(format!("unknown day {}", request.day)));
        }
        if !self.payload.places.is_empty() && self.payload.place(request.place).is_none() {
            return Err(BackendError::Rejected(format!("unknown place {}", request.place)));
        }

        for teacher_id in &request.teacher_ids {
            let teacher = self
                .teachers
                .iter()
                .find(|t| t.id == *teacher_id)
                .ok_or_else(|| BackendError::Rejected(format!("unknown teacher {teacher_id}")))?;
            if !teacher.can_be_assigned() {
                return Err(BackendError::Rejected(format!(
                    "{} is not a teacher or owner",
                    teacher.username
                )));
            }
            if !teacher.can_teach_at(request.place) {
                return Err(BackendError::Rejected(format!(
                    "{} cannot teach at place {}",
                    teacher.username, request.place
                )));
            }
            let clash = self
                .payload
                .shifts_for_day(request.day)
                .filter(|shift| Some(shift.id) != editing)
                .filter(|shift| shift.teacher.contains(teacher_id))
                .find(|shift| shift_overlaps(shift, &range));
            if let Some(clash) = clash {
                return Err(BackendError::Rejected(format!(
                    "{} already has a shift {} at {}",
                    teacher.username,
                    clash.label(),
                    clash.place_name
                )));
            }
        }
        Ok(())
    }

    fn fill_shift(&self, shift: &mut FixedShift, request: &ShiftRequest) {
        shift.day_name = self
            .payload
            .day(request.day)
            .map(|day| day.name.clone())
            .unwrap_or_default();
        shift.place_name = self
            .payload
            .place(request.place)
            .map(|place| place.name.clone())
            .unwrap_or_default();
        shift.teacher = request.teacher_ids.clone();
        shift.teacher_names = request
            .teacher_ids
            .iter()
            .map(|id| {
                self.teachers
                    .iter()
                    .find(|t| t.id == *id)
                    .map(Teacher::full_name)
                    .unwrap_or_else(|| id.to_string())
            })
            .collect();
        shift.description = request
            .description
            .as_ref()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
    }
}

fn shift_overlaps(shift: &FixedShift, range: &TimeRange) -> bool {
    shift.start_time < range.end && range.start < shift.end_time
}

fn times_overlap(a: &FixedShift, b: &FixedShift) -> bool {
    a.start_time < b.end_time && b.start_time < a.end_time
}

/// Day order, then start time, then place name.
fn sort_shifts(payload: &mut GridPayload) {
    let shifts = std::mem::take(&mut payload.shifts);
    let day_order = |day_id| payload.day(day_id).map(|day| day.order).unwrap_or(i32::MAX);
    let mut keyed: Vec<_> = shifts
        .into_iter()
        .map(|shift| {
            let key = (day_order(shift.day), shift.start_time, shift.place_name.clone());
            (key, shift)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    payload.shifts = keyed.into_iter().map(|(_, shift)| shift).collect();
}

impl ShiftBackend for InMemoryBackend {
    fn fetch_grid(
        &self,
        school_id: SchoolId,
    ) -> impl Future<Output = BackendResult<GridPayload>> + Send {
        ready(self.grid(school_id))
    }

    fn available_teachers(
        &self,
        query: &AvailabilityQuery,
    ) -> impl Future<Output = BackendResult<Vec<AvailableTeacher>>> + Send {
        ready(self.availability(query))
    }

    fn create_shift(
        &self,
        school_id: SchoolId,
        request: &ShiftRequest,
    ) -> impl Future<Output = BackendResult<FixedShift>> + Send {
        ready(self.create(school_id, request))
    }

    fn update_shift(
        &self,
        shift_id: ShiftId,
        request: &ShiftRequest,
    ) -> impl Future<Output = BackendResult<FixedShift>> + Send {
        ready(self.update(shift_id, request))
    }

    fn delete_shift(&self, shift_id: ShiftId) -> impl Future<Output = BackendResult<()>> + Send {
        ready(self.delete(shift_id))
    }

    fn conflicts(
        &self,
        school_id: SchoolId,
    ) -> impl Future<Output = BackendResult<Vec<ConflictReport>>> + Send {
        ready(self.conflict_report(school_id))
    }
}
