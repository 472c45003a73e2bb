use shift_grid::model::{Day, Place};
use shift_grid::{
    FixedShift, GridPayload, PersistenceError, Teacher, TimeOfDay, load_payload_from_json,
    load_shifts_from_csv, load_teachers_from_json, save_payload_to_json, save_shifts_to_csv,
    save_teachers_to_json,
};
use tempfile::NamedTempFile;

fn t(s: &str) -> TimeOfDay {
    TimeOfDay::parse(s).unwrap()
}

fn build_sample_payload() -> GridPayload {
    let mut first = FixedShift::new(1, 1, 1, t("09:00"), t("10:30"));
    first.day_name = "Monday".into();
    first.place_name = "Room A".into();
    first.teacher = vec![2, 3];
    first.teacher_names = vec!["Suzuki Hana".into(), "Tanaka Ken".into()];
    first.description = Some("Reading, group B".into());

    let mut second = FixedShift::new(2, 2, 2, t("13:00"), t("14:00"));
    second.day_name = "Tuesday".into();
    second.place_name = "Room B".into();

    GridPayload {
        school_id: Some(1),
        days: vec![Day::new(1, "Monday", 0), Day::new(2, "Tuesday", 1)],
        places: vec![Place::new(1, "Room A", 1), Place::new(2, "Room B", 1)],
        shifts: vec![first, second],
        school_start_time: Some(t("09:00")),
        school_end_time: Some(t("18:00")),
        ..GridPayload::default()
    }
}

#[test]
fn json_round_trip_preserves_payload() {
    let payload = build_sample_payload();
    let tmp = NamedTempFile::new().expect("create temp file");
    save_payload_to_json(&payload, tmp.path()).expect("save json");
    let loaded = load_payload_from_json(tmp.path()).expect("load json");
    assert_eq!(loaded, payload);
}

#[test]
fn backend_payload_with_seconds_and_defaults_loads() {
    let tmp = NamedTempFile::new().unwrap();
    let raw = r#"{
        "days": [{"id": 1, "name": "Monday", "order": 0}],
        "places": [{"id": 4, "name": "Hall", "school": 1}],
        "shifts": [{
            "id": 10, "day": 1, "start_time": "10:00:00", "end_time": "11:15:00",
            "place": 4, "teacher": [7], "description": null
        }],
        "school_start_time": "09:30:00",
        "school_end_time": "17:00:00"
    }"#;
    std::fs::write(tmp.path(), raw).unwrap();

    let payload = load_payload_from_json(tmp.path()).unwrap();
    assert_eq!(payload.start_hour, 8);
    assert_eq!(payload.end_hour, 18);
    assert_eq!(payload.shifts[0].end_time, t("11:15"));
    assert_eq!(payload.shifts[0].description, None);
    assert_eq!(payload.operating_hours().unwrap().open, t("09:30"));
}

#[test]
fn json_with_broken_references_is_rejected() {
    let mut payload = build_sample_payload();
    payload.shifts[1].place = 42;
    let tmp = NamedTempFile::new().unwrap();
    let err = save_payload_to_json(&payload, tmp.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::Validation(_)));
}

#[test]
fn csv_round_trip_preserves_shifts() {
    let payload = build_sample_payload();
    let tmp = NamedTempFile::new().expect("create temp file");
    save_shifts_to_csv(&payload.shifts, tmp.path()).expect("save csv");

    let contents = std::fs::read_to_string(tmp.path()).unwrap();
    assert!(contents.contains("2;3"));
    assert!(contents.contains("\"Reading, group B\""));

    let loaded = load_shifts_from_csv(tmp.path()).expect("load csv");
    assert_eq!(loaded, payload.shifts);
}

#[test]
fn csv_refuses_teacher_names_with_the_list_separator() {
    let mut payload = build_sample_payload();
    payload.shifts[0].teacher_names[1] = "Tanaka; Ken".into();
    let tmp = NamedTempFile::new().unwrap();

    let err = save_shifts_to_csv(&payload.shifts, tmp.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(msg) if msg.contains("Tanaka; Ken")));
    assert!(std::fs::read_to_string(tmp.path()).unwrap().is_empty());
}

#[test]
fn csv_rejects_bad_rows() {
    let tmp = NamedTempFile::new().unwrap();
    let header = "id,day,day_name,place,place_name,start_time,end_time,teacher_ids,teacher_names,description\n";

    std::fs::write(tmp.path(), format!("{header}1,1,Mon,1,A,10:00,09:00,,,\n")).unwrap();
    assert!(matches!(
        load_shifts_from_csv(tmp.path()),
        Err(PersistenceError::Validation(_))
    ));

    std::fs::write(tmp.path(), format!("{header}1,1,Mon,1,A,10:00,11:00,2;x,,\n")).unwrap();
    assert!(matches!(
        load_shifts_from_csv(tmp.path()),
        Err(PersistenceError::InvalidData(_))
    ));

    std::fs::write(tmp.path(), format!("{header}1,1,Mon,1,A,ten,11:00,,,\n")).unwrap();
    assert!(matches!(
        load_shifts_from_csv(tmp.path()),
        Err(PersistenceError::InvalidData(_))
    ));

    std::fs::write(tmp.path(), header).unwrap();
    assert!(matches!(
        load_shifts_from_csv(tmp.path()),
        Err(PersistenceError::InvalidData(_))
    ));
}

#[test]
fn teacher_roster_round_trip() {
    let mut owner = Teacher::new(1, "sato");
    owner.is_owner = true;
    let mut teacher = Teacher::new(2, "suzuki");
    teacher.places = vec![1, 2];
    let roster = vec![owner, teacher];

    let tmp = NamedTempFile::new().unwrap();
    save_teachers_to_json(&roster, tmp.path()).unwrap();
    assert_eq!(load_teachers_from_json(tmp.path()).unwrap(), roster);
}
