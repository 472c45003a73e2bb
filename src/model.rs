use crate::config::GridConfig;
use crate::time::{OperatingHours, TimeOfDay, TimeRange, TimeRangeError, TimeWindow};
use serde::{Deserialize, Serialize};

pub type SchoolId = i64;
pub type DayId = i64;
pub type PlaceId = i64;
pub type ShiftId = i64;
pub type TeacherId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    pub id: DayId,
    pub name: String,
    /// Display position in the weekday selector.
    pub order: i32,
}

impl Day {
    pub fn new(id: DayId, name: impl Into<String>, order: i32) -> Self {
        Self {
            id,
            name: name.into(),
            order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    pub name: String,
    pub school: SchoolId,
}

impl Place {
    pub fn new(id: PlaceId, name: impl Into<String>, school: SchoolId) -> Self {
        Self {
            id,
            name: name.into(),
            school,
        }
    }
}

/// A recurring weekly assignment: one place, one weekday, one time range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedShift {
    pub id: ShiftId,
    pub day: DayId,
    #[serde(default)]
    pub day_name: String,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub place: PlaceId,
    #[serde(default)]
    pub place_name: String,
    #[serde(default)]
    pub teacher: Vec<TeacherId>,
    #[serde(default)]
    pub teacher_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FixedShift {
    pub fn new(
        id: ShiftId,
        day: DayId,
        place: PlaceId,
        start_time: TimeOfDay,
        end_time: TimeOfDay,
    ) -> Self {
        Self {
            id,
            day,
            day_name: String::new(),
            start_time,
            end_time,
            place,
            place_name: String::new(),
            teacher: Vec::new(),
            teacher_names: Vec::new(),
            description: None,
        }
    }

    pub fn time_range(&self) -> Result<TimeRange, TimeRangeError> {
        TimeRange::new(self.start_time, self.end_time)
    }

    pub fn duration_minutes(&self) -> u32 {
        self.end_time
            .minutes()
            .saturating_sub(self.start_time.minutes())
    }

    pub fn label(&self) -> String {
        format!("{} - {}", self.start_time, self.end_time)
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

fn default_start_hour() -> u32 {
    8
}

fn default_end_hour() -> u32 {
    18
}

/// Everything the grid needs for one school, as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_id: Option<SchoolId>,
    #[serde(default)]
    pub days: Vec<Day>,
    #[serde(default)]
    pub places: Vec<Place>,
    #[serde(default)]
    pub shifts: Vec<FixedShift>,
    #[serde(default = "default_start_hour")]
    pub start_hour: u32,
    #[serde(default = "default_end_hour")]
    pub end_hour: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_start_time: Option<TimeOfDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_end_time: Option<TimeOfDay>,
}

impl Default for GridPayload {
    fn default() -> Self {
        Self {
            school_id: None,
            days: Vec::new(),
            places: Vec::new(),
            shifts: Vec::new(),
            start_hour: default_start_hour(),
            end_hour: default_end_hour(),
            school_start_time: None,
            school_end_time: None,
        }
    }
}

impl GridPayload {
    pub fn operating_hours(&self) -> Option<OperatingHours> {
        match (self.school_start_time, self.school_end_time) {
            (Some(open), Some(close)) => OperatingHours::new(open, close).ok(),
            _ => None,
        }
    }

    /// Axis for the grid: the school's hours widened to whole hours, else the
    /// payload's hour bounds, else the configured fallback.
    pub fn time_window(&self, config: &GridConfig) -> TimeWindow {
        if let Some(hours) = self.operating_hours() {
            return TimeWindow::covering(&hours);
        }
        TimeWindow::from_hours(self.start_hour, self.end_hour)
            .unwrap_or_else(|_| config.fallback_window())
    }

    pub fn sorted_days(&self) -> Vec<&Day> {
        let mut days: Vec<&Day> = self.days.iter().collect();
        days.sort_by_key(|day| (day.order, day.id));
        days
    }

    pub fn first_day(&self) -> Option<&Day> {
        self.sorted_days().into_iter().next()
    }

    pub fn day(&self, day_id: DayId) -> Option<&Day> {
        self.days.iter().find(|day| day.id == day_id)
    }

    pub fn place(&self, place_id: PlaceId) -> Option<&Place> {
        self.places.iter().find(|place| place.id == place_id)
    }

    pub fn find_shift(&self, shift_id: ShiftId) -> Option<&FixedShift> {
        self.shifts.iter().find(|shift| shift.id == shift_id)
    }

    pub fn shifts_for_day(&self, day_id: DayId) -> impl Iterator<Item = &FixedShift> {
        self.shifts.iter().filter(move |shift| shift.day == day_id)
    }

    pub fn shifts_at(&self, day_id: DayId, place_id: PlaceId) -> Vec<&FixedShift> {
        self.shifts_for_day(day_id)
            .filter(|shift| shift.place == place_id)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_teacher: bool,
    #[serde(default)]
    pub is_owner: bool,
    /// Places this teacher is qualified to teach at. Owners may teach anywhere.
    #[serde(default)]
    pub places: Vec<PlaceId>,
}

impl Teacher {
    pub fn new(id: TeacherId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            is_teacher: true,
            is_owner: false,
            places: Vec::new(),
        }
    }

    pub fn full_name(&self) -> String {
        if !self.last_name.is_empty() && !self.first_name.is_empty() {
            format!("{} {}", self.last_name, self.first_name)
        } else {
            self.username.clone()
        }
    }

    pub fn role_display(&self) -> String {
        let mut roles = Vec::new();
        if self.is_owner {
            roles.push("Owner");
        }
        if self.is_teacher {
            roles.push("Teacher");
        }
        if roles.is_empty() {
            "General".to_string()
        } else {
            roles.join(" / ")
        }
    }

    pub fn can_be_assigned(&self) -> bool {
        self.is_teacher || self.is_owner
    }

    pub fn can_teach_at(&self, place_id: PlaceId) -> bool {
        self.is_owner || self.places.contains(&place_id)
    }
}

/// A shift a teacher already holds that overlaps the queried range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentShift {
    pub shift_id: ShiftId,
    pub place_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

impl CurrentShift {
    pub fn from_shift(shift: &FixedShift) -> Self {
        Self {
            shift_id: shift.id,
            place_name: shift.place_name.clone(),
            description: shift.description.clone(),
            start_time: shift.start_time,
            end_time: shift.end_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableTeacher {
    pub id: TeacherId,
    pub username: String,
    pub full_name: String,
    pub is_available: bool,
    #[serde(default = "default_true")]
    pub can_teach_at_place: bool,
    #[serde(default)]
    pub current_shifts: Vec<CurrentShift>,
    #[serde(default)]
    pub role_display: String,
    #[serde(default)]
    pub is_teacher: bool,
    #[serde(default)]
    pub is_owner: bool,
}

fn default_true() -> bool {
    true
}

impl AvailableTeacher {
    /// Entry for a teacher who is assigned to the shift under edit but was not
    /// returned by the availability query.
    pub fn assigned_placeholder(id: TeacherId, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            username: name.clone(),
            full_name: name,
            is_available: false,
            can_teach_at_place: true,
            current_shifts: Vec::new(),
            role_display: String::new(),
            is_teacher: true,
            is_owner: false,
        }
    }
}

/// Body of a create or update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRequest {
    pub day: DayId,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub place: PlaceId,
    #[serde(default)]
    pub teacher_ids: Vec<TeacherId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ShiftRequest {
    pub fn time_range(&self) -> Result<TimeRange, TimeRangeError> {
        TimeRange::new(self.start_time, self.end_time)
    }
}
