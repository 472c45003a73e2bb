use shift_grid::model::{Day, Place};
use shift_grid::{
    FixedShift, GridPayload, OperatingHours, ShiftRequest, ShiftValidationError, TimeOfDay,
    validate_payload, validate_request, validate_time_range,
};

fn t(s: &str) -> TimeOfDay {
    TimeOfDay::parse(s).unwrap()
}

fn school() -> OperatingHours {
    OperatingHours::new(t("09:00"), t("18:00")).unwrap()
}

#[test]
fn end_must_follow_start() {
    let err = validate_time_range(t("10:00"), t("10:00"), None).unwrap_err();
    assert_eq!(
        err,
        ShiftValidationError::EndNotAfterStart {
            start: t("10:00"),
            end: t("10:00")
        }
    );
    assert!(validate_time_range(t("11:00"), t("10:00"), Some(&school())).is_err());
}

#[test]
fn range_must_fit_operating_hours() {
    let err = validate_time_range(t("08:30"), t("09:30"), Some(&school())).unwrap_err();
    assert!(matches!(err, ShiftValidationError::OutsideOperatingHours { .. }));
    assert!(err.to_string().contains("09:00 - 18:00"));

    let range = validate_time_range(t("09:00"), t("18:00"), Some(&school())).unwrap();
    assert_eq!(range.duration_minutes(), 540);
}

#[test]
fn requests_reject_repeated_teachers() {
    let request = ShiftRequest {
        day: 1,
        start_time: t("10:00"),
        end_time: t("11:00"),
        place: 1,
        teacher_ids: vec![4, 5, 4],
        description: None,
    };
    assert_eq!(
        validate_request(&request, None),
        Err(ShiftValidationError::DuplicateTeacher(4))
    );
}

#[test]
fn payload_references_must_resolve() {
    let mut payload = GridPayload {
        days: vec![Day::new(1, "Monday", 0)],
        places: vec![Place::new(1, "Room A", 1)],
        shifts: vec![FixedShift::new(1, 1, 1, t("09:00"), t("10:00"))],
        ..GridPayload::default()
    };
    assert_eq!(validate_payload(&payload), Ok(()));

    payload.shifts.push(FixedShift::new(1, 1, 1, t("11:00"), t("12:00")));
    assert_eq!(
        validate_payload(&payload),
        Err(ShiftValidationError::DuplicateShiftId(1))
    );

    payload.shifts[1].id = 2;
    payload.shifts[1].place = 9;
    assert_eq!(
        validate_payload(&payload),
        Err(ShiftValidationError::UnknownPlace(9))
    );

    payload.shifts[1].place = 1;
    payload.shifts[1].day = 3;
    assert_eq!(validate_payload(&payload), Err(ShiftValidationError::UnknownDay(3)));
}

#[test]
fn payload_without_reference_lists_only_checks_shapes() {
    let payload = GridPayload {
        shifts: vec![FixedShift::new(1, 5, 7, t("09:00"), t("10:00"))],
        ..GridPayload::default()
    };
    assert_eq!(validate_payload(&payload), Ok(()));
}
