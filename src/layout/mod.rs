pub mod overlap;
pub mod position;
pub mod slots;
pub mod view;

pub use overlap::{
    ColumnPacker, PACKED_COLUMNS, ShiftPosition, layout_place_shifts, max_columns,
    overlap_groups, spans_overlap,
};
pub use position::{VerticalSpan, axis_percent, vertical_span};
pub use slots::{TimeSlot, time_slots};
pub use view::{
    BlockTone, DayLayout, PlaceColumn, ShiftBlock, WeekLayout, layout_day, layout_place,
    layout_week,
};
