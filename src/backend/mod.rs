//! Contract with the scheduling backend. The grid never talks to storage
//! directly; everything it needs arrives through [`ShiftBackend`].

use crate::model::{
    AvailableTeacher, CurrentShift, DayId, FixedShift, GridPayload, PlaceId, SchoolId, ShiftId,
    ShiftRequest, TeacherId,
};
use crate::time::TimeOfDay;
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

pub mod memory;

pub use memory::InMemoryBackend;

/// "Which teachers could take `[start_time, end_time)` on this day at this place?"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub school_id: SchoolId,
    pub day_id: DayId,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<PlaceId>,
    /// Shift under edit; its own assignments do not count as clashes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_shift: Option<ShiftId>,
}

/// One teacher booked on two overlapping shifts of the same day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub teacher_id: TeacherId,
    pub teacher_name: String,
    pub day_name: String,
    pub conflicting_shifts: Vec<CurrentShift>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("request failed: {0}")]
    Transport(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

pub trait ShiftBackend {
    fn fetch_grid(
        &self,
        school_id: SchoolId,
    ) -> impl Future<Output = BackendResult<GridPayload>> + Send;

    fn available_teachers(
        &self,
        query: &AvailabilityQuery,
    ) -> impl Future<Output = BackendResult<Vec<AvailableTeacher>>> + Send;

    fn create_shift(
        &self,
        school_id: SchoolId,
        request: &ShiftRequest,
    ) -> impl Future<Output = BackendResult<FixedShift>> + Send;

    fn update_shift(
        &self,
        shift_id: ShiftId,
        request: &ShiftRequest,
    ) -> impl Future<Output = BackendResult<FixedShift>> + Send;

    fn delete_shift(&self, shift_id: ShiftId) -> impl Future<Output = BackendResult<()>> + Send;

    fn conflicts(
        &self,
        school_id: SchoolId,
    ) -> impl Future<Output = BackendResult<Vec<ConflictReport>>> + Send;
}
