pub mod backend;
pub mod config;
pub mod editor;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod layout;
pub mod model;
pub mod persistence;
pub mod slot;
pub mod time;
pub mod toast;
pub mod validation;

pub use backend::{
    AvailabilityQuery, BackendError, BackendResult, ConflictReport, InMemoryBackend, ShiftBackend,
};
pub use config::{ConfigError, GridConfig};
pub use editor::{
    EditorError, EditorMode, EditorState, PendingQuery, ShiftEditor, TeacherOption, TeacherStatus,
};
pub use layout::{
    BlockTone, ColumnPacker, DayLayout, PlaceColumn, ShiftBlock, ShiftPosition, TimeSlot,
    VerticalSpan, WeekLayout, layout_day, layout_place, layout_week, time_slots, vertical_span,
};
pub use model::{
    AvailableTeacher, CurrentShift, Day, DayId, FixedShift, GridPayload, Place, PlaceId, SchoolId,
    ShiftId, ShiftRequest, Teacher, TeacherId,
};
pub use persistence::{
    PersistenceError, load_payload_from_json, load_shifts_from_csv, load_teachers_from_json,
    save_payload_to_json, save_shifts_to_csv, save_teachers_to_json,
};
pub use slot::{
    CandidateSlot, DraftTimes, TimePickerOptions, click_ratio, resolve_click, resolve_grid_click,
};
pub use time::{OperatingHours, TimeOfDay, TimeParseError, TimeRange, TimeRangeError, TimeWindow};
pub use toast::{Notifier, Toast, ToastKind, ToastStore};
pub use validation::{
    ShiftValidationError, validate_payload, validate_request, validate_time_range,
};
