use super::position::{VerticalSpan, vertical_span};
use crate::config::GridConfig;
use crate::model::{FixedShift, ShiftId};
use crate::time::TimeWindow;
use petgraph::unionfind::UnionFind;
use serde::Serialize;

/// Concurrent shifts beyond this many in one group are flagged instead of packed.
pub const PACKED_COLUMNS: usize = 2;

/// Final rectangle for one shift inside its place column. All lengths are percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShiftPosition {
    pub shift_id: ShiftId,
    pub top: f64,
    pub height: f64,
    pub left_offset: f64,
    pub width: f64,
    /// Packed column, `None` for blocks rendered full width.
    pub column: Option<usize>,
    pub total_columns: usize,
    pub is_overlapped: bool,
    pub has_conflict: bool,
}

impl ShiftPosition {
    fn full_width(shift_id: ShiftId, span: VerticalSpan) -> Self {
        Self {
            shift_id,
            top: span.top,
            height: span.height,
            left_offset: 0.0,
            width: 100.0,
            column: Some(0),
            total_columns: 1,
            is_overlapped: false,
            has_conflict: false,
        }
    }

    pub fn right_edge(&self) -> f64 {
        self.left_offset + self.width
    }

    pub fn is_packed(&self) -> bool {
        self.is_overlapped && !self.has_conflict
    }
}

/// Whether two blocks touch once `margin` is added below each of them.
pub fn spans_overlap(a: &VerticalSpan, b: &VerticalSpan, margin: f64) -> bool {
    !(a.bottom() + margin <= b.top || b.bottom() + margin <= a.top)
}

/// Connected components of the pairwise overlap relation.
///
/// Groups are ordered by their first member and members keep input order.
pub fn overlap_groups(spans: &[VerticalSpan], margin: f64) -> Vec<Vec<usize>> {
    let mut sets = UnionFind::<usize>::new(spans.len());
    for i in 0..spans.len() {
        for j in (i + 1)..spans.len() {
            if spans_overlap(&spans[i], &spans[j], margin) {
                sets.union(i, j);
            }
        }
    }

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut group_of_root: Vec<Option<usize>> = vec![None; spans.len()];
    for idx in 0..spans.len() {
        let root = sets.find(idx);
        match group_of_root[root] {
            Some(group) => groups[group].push(idx),
            None => {
                group_of_root[root] = Some(groups.len());
                groups.push(vec![idx]);
            }
        }
    }
    groups
}

/// Lays out the shifts of a single place on a single day.
pub struct ColumnPacker<'a> {
    window: &'a TimeWindow,
    config: &'a GridConfig,
}

impl<'a> ColumnPacker<'a> {
    pub fn new(window: &'a TimeWindow, config: &'a GridConfig) -> Self {
        Self { window, config }
    }

    /// Returns one position per input shift, in input order.
    pub fn execute(&self, shifts: &[&FixedShift]) -> Vec<ShiftPosition> {
        let spans: Vec<VerticalSpan> = shifts
            .iter()
            .map(|shift| {
                vertical_span(
                    self.window,
                    shift.start_time,
                    shift.end_time,
                    self.config.min_block_height,
                )
            })
            .collect();

        let mut positions: Vec<ShiftPosition> = shifts
            .iter()
            .zip(&spans)
            .map(|(shift, span)| ShiftPosition::full_width(shift.id, *span))
            .collect();

        for group in overlap_groups(&spans, self.config.overlap_margin) {
            if group.len() < 2 {
                continue;
            }
            self.pack_group(&group, &mut positions);
        }
        positions
    }

    fn pack_group(&self, group: &[usize], positions: &mut [ShiftPosition]) {
        let packed = group.len().min(PACKED_COLUMNS);
        let column_width = 100.0 / packed as f64;

        for (column, &idx) in group.iter().take(packed).enumerate() {
            let position = &mut positions[idx];
            position.left_offset = column as f64 * column_width;
            position.width = column_width - self.config.column_gutter;
            position.column = Some(column);
            position.total_columns = packed;
            position.is_overlapped = true;
        }

        for &idx in group.iter().skip(packed) {
            let position = &mut positions[idx];
            position.left_offset = 0.0;
            position.width = self.config.conflict_width;
            position.column = None;
            position.total_columns = 1;
            position.is_overlapped = true;
            position.has_conflict = true;
        }

        if group.len() > packed {
            tracing::debug!(
                group_size = group.len(),
                conflicts = group.len() - packed,
                "overlap group exceeds packed columns"
            );
        }
    }
}

/// Convenience wrapper around [`ColumnPacker`].
pub fn layout_place_shifts(
    shifts: &[&FixedShift],
    window: &TimeWindow,
    config: &GridConfig,
) -> Vec<ShiftPosition> {
    ColumnPacker::new(window, config).execute(shifts)
}

/// Widest packed column count at a place, never more than [`PACKED_COLUMNS`].
pub fn max_columns(positions: &[ShiftPosition]) -> usize {
    positions
        .iter()
        .map(|p| p.total_columns)
        .max()
        .unwrap_or(1)
        .clamp(1, PACKED_COLUMNS)
}
