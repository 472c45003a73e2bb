use crate::model::FixedShift;
use crate::validation::{ShiftValidationError, validate_shift};
use std::collections::HashSet;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid shift: {0}")]
    Validation(#[from] ShiftValidationError),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub fn validate_shifts(shifts: &[FixedShift]) -> PersistenceResult<()> {
    let mut seen_ids = HashSet::with_capacity(shifts.len());
    for shift in shifts {
        if !seen_ids.insert(shift.id) {
            return Err(PersistenceError::InvalidData(format!(
                "duplicate shift id {}",
                shift.id
            )));
        }
        validate_shift(shift)?;
    }
    Ok(())
}

pub mod file;

pub use file::{
    load_payload_from_json, load_shifts_from_csv, load_teachers_from_json, save_payload_to_json,
    save_shifts_to_csv, save_teachers_to_json,
};
