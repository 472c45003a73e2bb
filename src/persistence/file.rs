use super::{PersistenceError, PersistenceResult};
use crate::model::{FixedShift, GridPayload, Teacher};
use crate::time::TimeOfDay;
use crate::validation::validate_payload;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

pub fn save_payload_to_json<P: AsRef<Path>>(payload: &GridPayload, path: P) -> PersistenceResult<()> {
    validate_payload(payload)?;
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, payload)?;
    tracing::debug!(path = %path.as_ref().display(), shifts = payload.shifts.len(), "grid saved");
    Ok(())
}

pub fn load_payload_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<GridPayload> {
    let file = File::open(path.as_ref())?;
    let payload: GridPayload = serde_json::from_reader(file)?;
    validate_payload(&payload)?;
    tracing::debug!(path = %path.as_ref().display(), shifts = payload.shifts.len(), "grid loaded");
    Ok(payload)
}

pub fn save_teachers_to_json<P: AsRef<Path>>(teachers: &[Teacher], path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, teachers)?;
    Ok(())
}

pub fn load_teachers_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<Teacher>> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

#[derive(Serialize, Deserialize)]
struct ShiftCsvRecord {
    id: i64,
    day: i64,
    day_name: String,
    place: i64,
    place_name: String,
    start_time: String,
    end_time: String,
    teacher_ids: String,
    teacher_names: String,
    description: String,
}

impl From<&FixedShift> for ShiftCsvRecord {
    fn from(shift: &FixedShift) -> Self {
        Self {
            id: shift.id,
            day: shift.day,
            day_name: shift.day_name.clone(),
            place: shift.place,
            place_name: shift.place_name.clone(),
            start_time: shift.start_time.to_string(),
            end_time: shift.end_time.to_string(),
            teacher_ids: join_ids(&shift.teacher),
            teacher_names: shift.teacher_names.join(";"),
            description: shift.description.clone().unwrap_or_default(),
        }
    }
}

impl ShiftCsvRecord {
    fn into_shift(self) -> PersistenceResult<FixedShift> {
        let start = parse_time(&self.start_time)?;
        let end = parse_time(&self.end_time)?;
        let mut shift = FixedShift::new(self.id, self.day, self.place, start, end);
        shift.day_name = self.day_name;
        shift.place_name = self.place_name;
        shift.teacher = split_ids(&self.teacher_ids)?;
        shift.teacher_names = split_strings(&self.teacher_names);
        shift.description = parse_string_option(self.description);
        Ok(shift)
    }
}

pub fn save_shifts_to_csv<P: AsRef<Path>>(shifts: &[FixedShift], path: P) -> PersistenceResult<()> {
    super::validate_shifts(shifts)?;
    check_teacher_names(shifts)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for shift in shifts {
        writer.serialize(ShiftCsvRecord::from(shift))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_shifts_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<FixedShift>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut shifts = Vec::new();
    for record in reader.deserialize::<ShiftCsvRecord>() {
        let record = record?;
        shifts.push(record.into_shift()?);
    }

    if shifts.is_empty() {
        return Err(PersistenceError::InvalidData(
            "CSV file contained no shifts".into(),
        ));
    }

    super::validate_shifts(&shifts)?;
    Ok(shifts)
}

/// Names are stored `;`-joined in one column, so a name may not contain `;`.
fn check_teacher_names(shifts: &[FixedShift]) -> PersistenceResult<()> {
    for shift in shifts {
        if let Some(name) = shift.teacher_names.iter().find(|name| name.contains(';')) {
            return Err(PersistenceError::InvalidData(format!(
                "teacher name '{name}' on shift {} contains ';'",
                shift.id
            )));
        }
    }
    Ok(())
}

fn parse_time(input: &str) -> PersistenceResult<TimeOfDay> {
    TimeOfDay::parse(input.trim())
        .map_err(|e| PersistenceError::InvalidData(format!("invalid time '{input}': {e}")))
}

fn join_ids(values: &[i64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(";")
}

fn split_ids(input: &str) -> PersistenceResult<Vec<i64>> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    input
        .split(';')
        .map(|part| {
            part.trim()
                .parse::<i64>()
                .map_err(|e| PersistenceError::InvalidData(format!("invalid teacher id '{part}': {e}")))
        })
        .collect()
}

fn split_strings(input: &str) -> Vec<String> {
    if input.trim().is_empty() {
        return Vec::new();
    }
    input.split(';').map(|s| s.trim().to_string()).collect()
}

fn parse_string_option(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
