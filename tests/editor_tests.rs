use shift_grid::model::{Day, Place};
use shift_grid::{
    AvailabilityQuery, AvailableTeacher, BackendError, BackendResult, ConflictReport, DraftTimes,
    EditorError, EditorState, FixedShift, GridPayload, InMemoryBackend, OperatingHours,
    ShiftBackend, ShiftEditor, ShiftRequest, Teacher, TeacherStatus, TimeOfDay, ToastKind,
    ToastStore,
};
use std::future::{Future, pending};
use std::time::Duration;

fn t(s: &str) -> TimeOfDay {
    TimeOfDay::parse(s).unwrap()
}

fn school_hours() -> OperatingHours {
    OperatingHours::new(t("09:00"), t("18:00")).unwrap()
}

fn backend() -> InMemoryBackend {
    let mut owner = Teacher::new(1, "sato");
    owner.is_owner = true;
    let mut suzuki = Teacher::new(2, "suzuki");
    suzuki.places = vec![1];
    let mut tanaka = Teacher::new(3, "tanaka");
    tanaka.places = vec![2];

    let mut existing = FixedShift::new(10, 1, 1, t("10:00"), t("11:00"));
    existing.place_name = "Room A".into();
    existing.teacher = vec![2];
    let mut legacy = FixedShift::new(11, 1, 1, t("15:00"), t("16:00"));
    legacy.teacher = vec![3];
    legacy.teacher_names = vec!["tanaka".into()];

    let payload = GridPayload {
        school_id: Some(1),
        days: vec![Day::new(1, "Monday", 0)],
        places: vec![Place::new(1, "Room A", 1), Place::new(2, "Room B", 1)],
        shifts: vec![existing, legacy],
        school_start_time: Some(t("09:00")),
        school_end_time: Some(t("18:00")),
        ..GridPayload::default()
    };
    InMemoryBackend::new(payload, vec![owner, suzuki, tanaka])
}

fn create_editor(toasts: &ToastStore, start: &str, end: &str) -> ShiftEditor {
    ShiftEditor::create(
        1,
        1,
        1,
        DraftTimes {
            start: t(start),
            end: t(end),
        },
        Some(school_hours()),
        toasts.notifier(),
    )
}

fn teacher(id: i64, name: &str) -> AvailableTeacher {
    AvailableTeacher {
        id,
        username: name.into(),
        full_name: name.into(),
        is_available: true,
        can_teach_at_place: true,
        current_shifts: Vec::new(),
        role_display: "Teacher".into(),
        is_teacher: true,
        is_owner: false,
    }
}

/// Backend whose calls never complete.
struct StalledBackend;

impl ShiftBackend for StalledBackend {
    fn fetch_grid(&self, _: i64) -> impl Future<Output = BackendResult<GridPayload>> + Send {
        pending()
    }

    fn available_teachers(
        &self,
        _: &AvailabilityQuery,
    ) -> impl Future<Output = BackendResult<Vec<AvailableTeacher>>> + Send {
        pending()
    }

    fn create_shift(
        &self,
        _: i64,
        _: &ShiftRequest,
    ) -> impl Future<Output = BackendResult<FixedShift>> + Send {
        pending()
    }

    fn update_shift(
        &self,
        _: i64,
        _: &ShiftRequest,
    ) -> impl Future<Output = BackendResult<FixedShift>> + Send {
        pending()
    }

    fn delete_shift(&self, _: i64) -> impl Future<Output = BackendResult<()>> + Send {
        pending()
    }

    fn conflicts(&self, _: i64) -> impl Future<Output = BackendResult<Vec<ConflictReport>>> + Send {
        pending()
    }
}

#[test]
fn changing_the_range_revalidates() {
    let toasts = ToastStore::new(Duration::from_secs(4));
    let mut editor = create_editor(&toasts, "13:00", "14:00");
    assert_eq!(editor.state(), &EditorState::Idle);

    assert!(matches!(editor.validate(), EditorState::Valid(_)));
    assert!(matches!(editor.set_end(t("12:30")), EditorState::Invalid(_)));
    assert!(editor.begin_teacher_query().is_none());

    assert!(matches!(editor.set_end(t("18:30")), EditorState::Invalid(msg) if msg.contains("operating hours")));
    assert!(matches!(editor.set_range(t("16:00"), t("17:00")), EditorState::Valid(_)));
}

#[tokio::test]
async fn invalid_range_never_reaches_the_backend() {
    let backend = backend();
    let toasts = ToastStore::new(Duration::from_secs(4));
    let mut editor = create_editor(&toasts, "14:00", "13:00");

    let err = editor.submit(&backend).await.unwrap_err();
    assert!(matches!(err, EditorError::Validation(_)));
    assert!(matches!(editor.state(), EditorState::Invalid(_)));
    assert_eq!(backend.snapshot().shifts.len(), 2);
}

#[tokio::test]
async fn valid_range_loads_and_annotates_teachers() {
    let backend = backend();
    let toasts = ToastStore::new(Duration::from_secs(4));
    let mut editor = create_editor(&toasts, "10:30", "11:30");
    editor.validate();

    assert!(editor.refresh_teachers(&backend).await);
    let options = editor.teacher_options();
    assert_eq!(options.len(), 2);
    assert_eq!(options[0].teacher.username, "sato");
    assert_eq!(options[0].status, TeacherStatus::Available);
    match &options[1].status {
        TeacherStatus::Busy { current_shifts } => assert_eq!(current_shifts[0].shift_id, 10),
        other => panic!("expected busy, got {other:?}"),
    }
}

#[test]
fn stale_availability_responses_are_dropped() {
    let toasts = ToastStore::new(Duration::from_secs(4));
    let mut editor = create_editor(&toasts, "13:00", "14:00");
    editor.validate();

    let first = editor.begin_teacher_query().unwrap();
    editor.set_end(t("15:00"));
    let second = editor.begin_teacher_query().unwrap();
    assert!(second.generation > first.generation);
    assert_eq!(second.query.end_time, t("15:00"));

    assert!(editor.finish_teacher_query(second, Ok(vec![teacher(1, "fresh")])));
    assert!(!editor.finish_teacher_query(first, Ok(vec![teacher(2, "stale")])));
    assert_eq!(editor.teachers()[0].username, "fresh");
}

#[test]
fn responses_for_an_abandoned_range_are_dropped() {
    let toasts = ToastStore::new(Duration::from_secs(4));
    let mut editor = create_editor(&toasts, "13:00", "14:00");
    editor.validate();

    let pending = editor.begin_teacher_query().unwrap();
    assert!(matches!(editor.set_range(t("14:00"), t("13:00")), EditorState::Invalid(_)));
    assert!(!editor.finish_teacher_query(pending, Ok(vec![teacher(1, "late")])));
    assert!(editor.teachers().is_empty());

    editor.set_range(t("13:00"), t("14:00"));
    let pending = editor.begin_teacher_query().unwrap();
    editor.set_place(2);
    assert!(!editor.finish_teacher_query(pending, Ok(vec![teacher(1, "late")])));
    assert!(editor.teachers().is_empty());
}

#[test]
fn failed_lookup_keeps_the_previous_list_and_warns() {
    let mut toasts = ToastStore::new(Duration::from_secs(4));
    let mut editor = create_editor(&toasts, "13:00", "14:00");
    editor.validate();

    let pending = editor.begin_teacher_query().unwrap();
    editor.finish_teacher_query(pending, Ok(vec![teacher(1, "kept")]));

    let pending = editor.begin_teacher_query().unwrap();
    let applied = editor.finish_teacher_query(pending, Err(BackendError::Transport("timeout".into())));
    assert!(!applied);
    assert_eq!(editor.teachers()[0].username, "kept");
    assert!(editor.is_open());

    toasts.drain();
    let toast = toasts.latest().unwrap();
    assert_eq!(toast.kind, ToastKind::Error);
    assert!(toast.message.contains("timeout"));
}

#[test]
fn unqualified_teachers_are_marked() {
    let toasts = ToastStore::new(Duration::from_secs(4));
    let mut editor = create_editor(&toasts, "13:00", "14:00");
    editor.validate();
    let pending = editor.begin_teacher_query().unwrap();
    let mut outsider = teacher(5, "outsider");
    outsider.can_teach_at_place = false;
    outsider.is_available = false;
    editor.finish_teacher_query(pending, Ok(vec![outsider]));

    assert_eq!(editor.teacher_options()[0].status, TeacherStatus::NotQualified);
}

#[tokio::test]
async fn successful_submit_closes_the_editor() {
    let backend = backend();
    let mut toasts = ToastStore::new(Duration::from_secs(4));
    let mut editor = create_editor(&toasts, "13:00", "14:00");
    editor.set_description("Homework help");
    assert!(editor.toggle_teacher(2));

    let shift = editor.submit(&backend).await.unwrap();
    assert_eq!(shift.teacher, vec![2]);
    assert_eq!(shift.description.as_deref(), Some("Homework help"));
    assert_eq!(editor.state(), &EditorState::Success);
    assert!(!editor.is_open());
    assert!(backend.snapshot().find_shift(shift.id).is_some());

    toasts.drain();
    assert_eq!(toasts.latest().unwrap().kind, ToastKind::Success);

    assert!(matches!(editor.submit(&backend).await, Err(EditorError::Closed)));
}

#[tokio::test]
async fn rejected_submit_keeps_the_editor_open() {
    let backend = backend();
    let mut toasts = ToastStore::new(Duration::from_secs(4));
    let mut editor = create_editor(&toasts, "10:30", "11:30");
    editor.toggle_teacher(2);

    let err = editor.submit(&backend).await.unwrap_err();
    assert!(matches!(err, EditorError::Backend(BackendError::Rejected(_))));
    assert!(matches!(editor.state(), EditorState::Failure(_)));
    assert!(editor.is_open());
    toasts.drain();
    assert_eq!(toasts.latest().unwrap().kind, ToastKind::Error);

    editor.set_range(t("11:00"), t("12:00"));
    assert!(editor.submit(&backend).await.is_ok());
}

#[tokio::test]
async fn cancelled_submit_leaves_the_editor_usable() {
    let backend = backend();
    let toasts = ToastStore::new(Duration::from_secs(4));
    let mut editor = create_editor(&toasts, "13:00", "14:00");

    tokio::select! {
        biased;
        _ = editor.submit(&StalledBackend) => panic!("stalled backend answered"),
        _ = std::future::ready(()) => {}
    }
    assert_eq!(editor.state(), &EditorState::Failure("cancelled".into()));
    assert!(editor.is_open());

    assert!(matches!(editor.set_range(t("11:00"), t("12:00")), EditorState::Valid(_)));
    let shift = editor.submit(&backend).await.unwrap();
    assert_eq!(shift.start_time, t("11:00"));
    assert_eq!(editor.state(), &EditorState::Success);
}

#[tokio::test]
async fn cancelled_delete_can_be_retried() {
    let backend = backend();
    let toasts = ToastStore::new(Duration::from_secs(4));
    let shift = backend.snapshot().find_shift(10).cloned().unwrap();
    let mut editor = ShiftEditor::edit(1, &shift, Some(school_hours()), toasts.notifier());

    tokio::select! {
        biased;
        _ = editor.delete(&StalledBackend) => panic!("stalled backend answered"),
        _ = std::future::ready(()) => {}
    }
    assert!(matches!(editor.state(), EditorState::Failure(_)));

    editor.delete(&backend).await.unwrap();
    assert!(backend.snapshot().find_shift(10).is_none());
}

#[tokio::test]
async fn edit_keeps_assigned_teachers_missing_from_results() {
    let backend = backend();
    let toasts = ToastStore::new(Duration::from_secs(4));
    let shift = backend.snapshot().find_shift(11).cloned().unwrap();
    let mut editor = ShiftEditor::edit(1, &shift, Some(school_hours()), toasts.notifier());
    editor.validate();
    editor.refresh_teachers(&backend).await;

    let options = editor.teacher_options();
    let tanaka = options.iter().find(|o| o.teacher.id == 3).unwrap();
    assert_eq!(tanaka.status, TeacherStatus::AssignedButUnavailable);
    assert!(tanaka.selected);
    assert!(!tanaka.teacher.is_available);
    assert_eq!(tanaka.teacher.full_name, "tanaka");
}

#[test]
fn busy_assigned_teachers_are_not_flagged_as_conflicts() {
    let backend = backend();
    let toasts = ToastStore::new(Duration::from_secs(4));
    let shift = backend.snapshot().find_shift(10).cloned().unwrap();
    let mut editor = ShiftEditor::edit(1, &shift, Some(school_hours()), toasts.notifier());
    editor.validate();

    let clash = FixedShift::new(12, 1, 2, t("10:30"), t("11:30"));
    let mut suzuki = teacher(2, "suzuki");
    suzuki.is_available = false;
    suzuki.current_shifts = vec![shift_grid::CurrentShift::from_shift(&clash)];
    let mut other = teacher(4, "ito");
    other.is_available = false;
    other.current_shifts = suzuki.current_shifts.clone();

    let pending = editor.begin_teacher_query().unwrap();
    assert!(editor.finish_teacher_query(pending, Ok(vec![suzuki, other])));

    let options = editor.teacher_options();
    assert_eq!(options.len(), 2);
    assert_eq!(options[0].status, TeacherStatus::AssignedButUnavailable);
    assert!(options[0].selected);
    assert_eq!(options[0].teacher.current_shifts.len(), 1);
    assert!(matches!(
        &options[1].status,
        TeacherStatus::Busy { current_shifts } if current_shifts.len() == 1
    ));
    assert!(!options[1].selected);
}

#[tokio::test]
async fn edit_updates_and_deletes_through_the_backend() {
    let backend = backend();
    let toasts = ToastStore::new(Duration::from_secs(4));
    let shift = backend.snapshot().find_shift(10).cloned().unwrap();

    let mut editor = ShiftEditor::edit(1, &shift, Some(school_hours()), toasts.notifier());
    editor.set_range(t("10:30"), t("11:30"));
    let updated = editor.submit(&backend).await.unwrap();
    assert_eq!(updated.start_time, t("10:30"));
    assert_eq!(updated.teacher, vec![2]);

    let mut editor = ShiftEditor::edit(1, &updated, Some(school_hours()), toasts.notifier());
    editor.delete(&backend).await.unwrap();
    assert!(backend.snapshot().find_shift(10).is_none());

    let mut creator = create_editor(&toasts, "13:00", "14:00");
    assert!(matches!(creator.delete(&backend).await, Err(EditorError::NotEditing)));
}
