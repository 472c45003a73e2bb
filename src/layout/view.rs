use super::overlap::{ColumnPacker, ShiftPosition, max_columns};
use super::slots::{TimeSlot, time_slots};
use crate::config::GridConfig;
use crate::model::{Day, DayId, FixedShift, GridPayload, Place, ShiftId};
use crate::time::TimeWindow;
use rayon::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockTone {
    Normal,
    Overlapped,
    Conflict,
}

/// A shift block ready to be drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShiftBlock {
    pub shift: FixedShift,
    pub position: ShiftPosition,
    pub label: String,
    pub teacher_count: usize,
    pub show_description: bool,
    /// `"1/2"` style marker for packed blocks.
    pub column_label: Option<String>,
    pub z_index: u32,
    pub tone: BlockTone,
}

impl ShiftBlock {
    fn new(shift: &FixedShift, position: ShiftPosition, config: &GridConfig) -> Self {
        let tone = if position.has_conflict {
            BlockTone::Conflict
        } else if position.is_overlapped {
            BlockTone::Overlapped
        } else {
            BlockTone::Normal
        };
        let z_index = match (position.has_conflict, position.is_overlapped, position.column) {
            (true, _, _) => 20,
            (false, true, Some(column)) => 10 + column as u32,
            _ => 1,
        };
        let column_label = match position.column {
            Some(column) if position.is_packed() && position.total_columns > 1 => {
                Some(format!("{}/{}", column + 1, position.total_columns))
            }
            _ => None,
        };
        let show_description = !shift.description_text().is_empty()
            && position.height > config.description_min_height;

        Self {
            label: shift.label(),
            teacher_count: shift.teacher.len(),
            shift: shift.clone(),
            position,
            show_description,
            column_label,
            z_index,
            tone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceColumn {
    pub place: Place,
    pub width_px: u32,
    /// Drives the "overlap" badge in the column header.
    pub has_overlap: bool,
    pub max_columns: usize,
    pub blocks: Vec<ShiftBlock>,
}

impl PlaceColumn {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn conflict_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|block| block.position.has_conflict)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayLayout {
    pub day: Day,
    pub window: TimeWindow,
    pub time_slots: Vec<TimeSlot>,
    pub places: Vec<PlaceColumn>,
}

impl DayLayout {
    pub fn block(&self, shift_id: ShiftId) -> Option<&ShiftBlock> {
        self.places
            .iter()
            .flat_map(|column| column.blocks.iter())
            .find(|block| block.shift.id == shift_id)
    }

    pub fn column(&self, place_id: i64) -> Option<&PlaceColumn> {
        self.places.iter().find(|column| column.place.id == place_id)
    }

    pub fn conflict_count(&self) -> usize {
        self.places.iter().map(PlaceColumn::conflict_count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekLayout {
    pub days: Vec<DayLayout>,
}

/// Lays out one place column for `day` against `window`.
pub fn layout_place(
    payload: &GridPayload,
    day_id: DayId,
    place: &Place,
    window: &TimeWindow,
    config: &GridConfig,
) -> PlaceColumn {
    let shifts = payload.shifts_at(day_id, place.id);
    let positions = ColumnPacker::new(window, config).execute(&shifts);
    let max_columns = max_columns(&positions);
    let has_overlap = max_columns > 1;

    let blocks = shifts
        .iter()
        .zip(positions)
        .map(|(shift, position)| ShiftBlock::new(shift, position, config))
        .collect();

    PlaceColumn {
        place: place.clone(),
        width_px: if has_overlap {
            config.overlapped_column_width_px
        } else {
            config.column_width_px
        },
        has_overlap,
        max_columns,
        blocks,
    }
}

/// Full grid for one weekday, or `None` if the payload has no such day.
pub fn layout_day(payload: &GridPayload, day_id: DayId, config: &GridConfig) -> Option<DayLayout> {
    let day = payload.day(day_id)?;
    let window = payload.time_window(config);
    let places = payload
        .places
        .iter()
        .map(|place| layout_place(payload, day_id, place, &window, config))
        .collect();

    Some(DayLayout {
        day: day.clone(),
        window,
        time_slots: time_slots(&window),
        places,
    })
}

/// Every day of the payload in display order. Days are independent, so they
/// are laid out in parallel.
pub fn layout_week(payload: &GridPayload, config: &GridConfig) -> WeekLayout {
    let day_ids: Vec<DayId> = payload.sorted_days().iter().map(|day| day.id).collect();
    let days = day_ids
        .par_iter()
        .filter_map(|day_id| layout_day(payload, *day_id, config))
        .collect();
    WeekLayout { days }
}
