use shift_grid::{
    DayId, DayLayout, DraftTimes, EditorState, GridConfig, GridPayload, InMemoryBackend,
    ShiftBackend, ShiftEditor, Teacher, TeacherStatus, TimeOfDay, ToastKind, ToastStore,
    layout_day, layout_week, load_payload_from_json, load_shifts_from_csv,
    load_teachers_from_json, resolve_grid_click, save_payload_to_json, save_shifts_to_csv,
};
use shift_grid::model::{Day, Place};
use std::io::{self, Write};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            if cell.len() > widths[ci] {
                widths[ci] = cell.len();
            }
        }
    }

    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');

    out.push('|');
    for (i, name) in headers.iter().enumerate() {
        out.push(' ');
        out.push_str(name);
        out.push_str(&" ".repeat(widths[i] - name.len()));
        out.push_str(" |");
    }
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');

    for row in rows {
        out.push('|');
        for (ci, cell) in row.iter().enumerate() {
            out.push(' ');
            out.push_str(cell);
            out.push_str(&" ".repeat(widths[ci].saturating_sub(cell.len())));
            out.push_str(" |");
        }
        out.push('\n');
    }

    out.push_str(&sep);
    out.push('\n');
    out
}

fn render_day(layout: &DayLayout) -> String {
    let headers = [
        "id", "place", "time", "top", "height", "left", "width", "col", "tone", "teachers",
    ];
    let mut rows = Vec::new();
    for column in &layout.places {
        for block in &column.blocks {
            let position = &block.position;
            rows.push(vec![
                block.shift.id.to_string(),
                column.place.name.clone(),
                block.label.clone(),
                format!("{:.1}", position.top),
                format!("{:.1}", position.height),
                format!("{:.1}", position.left_offset),
                format!("{:.1}", position.width),
                block.column_label.clone().unwrap_or_else(|| "-".to_string()),
                format!("{:?}", block.tone).to_lowercase(),
                block.shift.teacher_names.join(", "),
            ]);
        }
    }
    format!(
        "{} ({} - {})\n{}",
        layout.day.name,
        layout.window.start(),
        layout.window.end(),
        render_text_table(&headers, &rows)
    )
}

fn print_help() {
    println!(
        "Commands:\n  help                                       Show this help\n  days                                       List weekdays\n  day <id>                                   Select a weekday and show its grid\n  show                                       Show the grid for the selected day\n  week                                       Summarise every day\n  click <place_id> <ratio>                   Resolve a click (0..1 down the axis)\n  teachers <place_id> <HH:MM> <HH:MM>        List candidate teachers\n  add <place_id> <HH:MM> <HH:MM> [ids_csv] [description...]\n                                             Create a shift on the selected day\n  edit <shift_id> <HH:MM> <HH:MM> [ids_csv]  Change a shift's times and teachers\n  delete <shift_id>                          Delete a shift\n  conflicts                                  List double-booked teachers\n  save <json|csv> <path>                     Write the grid to disk\n  load <json|csv> <path>                     Read the grid from disk\n  quit|exit                                  Exit"
    );
}

/// A week with two rooms and three staff so the CLI is usable without files.
fn sample_grid() -> (GridPayload, Vec<Teacher>) {
    let days = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
        .iter()
        .enumerate()
        .map(|(i, name)| Day::new(i as i64 + 1, *name, i as i32))
        .collect();
    let places = vec![Place::new(1, "Room A", 1), Place::new(2, "Room B", 1)];
    let payload = GridPayload {
        school_id: Some(1),
        days,
        places,
        school_start_time: TimeOfDay::from_hm(9, 0),
        school_end_time: TimeOfDay::from_hm(18, 0),
        ..GridPayload::default()
    };

    let mut owner = Teacher::new(1, "sato");
    owner.is_owner = true;
    let mut suzuki = Teacher::new(2, "suzuki");
    suzuki.places = vec![1];
    let mut tanaka = Teacher::new(3, "tanaka");
    tanaka.places = vec![2];
    (payload, vec![owner, suzuki, tanaka])
}

fn parse_ids(input: &str) -> Vec<i64> {
    input
        .split(',')
        .filter_map(|p| p.trim().parse::<i64>().ok())
        .collect()
}

fn parse_time(input: Option<&str>) -> Option<TimeOfDay> {
    input.and_then(|s| TimeOfDay::parse(s).ok())
}

fn print_toasts(toasts: &mut ToastStore) {
    toasts.drain();
    for toast in toasts.toasts() {
        let tag = match toast.kind {
            ToastKind::Success => "ok",
            ToastKind::Error => "error",
            ToastKind::Info => "info",
            ToastKind::Warning => "warn",
        };
        println!("[{tag}] {}", toast.message);
    }
    toasts.clear();
}

struct Session {
    backend: InMemoryBackend,
    config: GridConfig,
    toasts: ToastStore,
    runtime: Runtime,
    day: Option<DayId>,
}

impl Session {
    fn school_id(&self) -> i64 {
        self.backend.snapshot().school_id.unwrap_or(1)
    }

    fn show(&self) {
        let payload = self.backend.snapshot();
        let day = self.day.or_else(|| payload.first_day().map(|d| d.id));
        match day.and_then(|day| layout_day(&payload, day, &self.config)) {
            Some(layout) => println!("{}", render_day(&layout)),
            None => println!("No day selected."),
        }
    }

    fn submit(&mut self, mut editor: ShiftEditor, teacher_ids: &[i64]) {
        if let EditorState::Invalid(message) = editor.validate() {
            println!("Invalid shift: {message}");
            return;
        }
        self.runtime.block_on(editor.refresh_teachers(&self.backend));
        for id in teacher_ids {
            if !editor.selected_teachers().contains(id) {
                editor.toggle_teacher(*id);
            }
        }
        match self.runtime.block_on(editor.submit(&self.backend)) {
            Ok(shift) => println!("Saved shift {} ({}).", shift.id, shift.label()),
            Err(e) => println!("Error: {e}"),
        }
        print_toasts(&mut self.toasts);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let config = GridConfig::from_env()?;
    let (payload, teachers) = sample_grid();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let payload = match args.first() {
        Some(path) => load_payload_from_json(path)?,
        None => payload,
    };
    let teachers = match args.get(1) {
        Some(path) => load_teachers_from_json(path)?,
        None => teachers,
    };

    let mut session = Session {
        backend: InMemoryBackend::new(payload, teachers),
        toasts: ToastStore::new(config.toast_duration()),
        config,
        runtime: tokio::runtime::Builder::new_current_thread().build()?,
        day: None,
    };

    println!("Shift Grid (CLI) - type 'help' for commands\n");
    session.show();

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => session.show(),
            "days" => {
                let payload = session.backend.snapshot();
                for day in payload.sorted_days() {
                    let count = payload.shifts_for_day(day.id).count();
                    println!("  {:<4} {:<12} {} shift(s)", day.id, day.name, count);
                }
            }
            "day" => match parts.next().and_then(|s| s.parse::<i64>().ok()) {
                Some(id) if session.backend.snapshot().day(id).is_some() => {
                    session.day = Some(id);
                    session.show();
                }
                Some(id) => println!("Day {id} not found."),
                None => println!("Usage: day <id>"),
            },
            "week" => {
                let payload = session.backend.snapshot();
                let week = layout_week(&payload, &session.config);
                for day in &week.days {
                    let shifts: usize = day.places.iter().map(|c| c.blocks.len()).sum();
                    println!(
                        "  {:<12} {} shift(s), {} conflict(s)",
                        day.day.name,
                        shifts,
                        day.conflict_count()
                    );
                }
            }
            "click" => {
                let place = parts.next().and_then(|s| s.parse::<i64>().ok());
                let ratio = parts.next().and_then(|s| s.parse::<f64>().ok());
                match (place, ratio) {
                    (Some(place), Some(ratio)) => {
                        let payload = session.backend.snapshot();
                        let hours = payload.operating_hours();
                        let window = payload.time_window(&session.config);
                        let slot = resolve_grid_click(ratio, &window, hours.as_ref(), &session.config);
                        let draft = DraftTimes::from_slot(slot, hours.as_ref(), &session.config);
                        println!(
                            "Place {place}: slot {} -> draft {} - {}",
                            slot.time(),
                            draft.start,
                            draft.end
                        );
                    }
                    _ => println!("Usage: click <place_id> <ratio>"),
                }
            }
            "teachers" => {
                let place = parts.next().and_then(|s| s.parse::<i64>().ok());
                let start = parse_time(parts.next());
                let end = parse_time(parts.next());
                let Some(day) = session.day.or_else(|| session.backend.snapshot().first_day().map(|d| d.id)) else {
                    println!("No day selected.");
                    continue;
                };
                match (place, start, end) {
                    (Some(place), Some(start), Some(end)) => {
                        let hours = session.backend.snapshot().operating_hours();
                        let mut editor = ShiftEditor::create(
                            session.school_id(),
                            day,
                            place,
                            DraftTimes { start, end },
                            hours,
                            session.toasts.notifier(),
                        );
                        if let EditorState::Invalid(message) = editor.validate() {
                            println!("Invalid range: {message}");
                            continue;
                        }
                        session.runtime.block_on(editor.refresh_teachers(&session.backend));
                        let rows: Vec<Vec<String>> = editor
                            .teacher_options()
                            .into_iter()
                            .map(|option| {
                                let status = match option.status {
                                    TeacherStatus::Available => "available".to_string(),
                                    TeacherStatus::Busy { current_shifts } => format!(
                                        "busy ({})",
                                        current_shifts
                                            .iter()
                                            .map(|s| format!("{} - {} {}", s.start_time, s.end_time, s.place_name))
                                            .collect::<Vec<_>>()
                                            .join(", ")
                                    ),
                                    TeacherStatus::NotQualified => "not qualified".to_string(),
                                    TeacherStatus::AssignedButUnavailable => "assigned".to_string(),
                                };
                                vec![
                                    option.teacher.id.to_string(),
                                    option.teacher.full_name,
                                    option.teacher.role_display,
                                    status,
                                ]
                            })
                            .collect();
                        println!("{}", render_text_table(&["id", "name", "role", "status"], &rows));
                        print_toasts(&mut session.toasts);
                    }
                    _ => println!("Usage: teachers <place_id> <HH:MM> <HH:MM>"),
                }
            }
            "add" => {
                let place = parts.next().and_then(|s| s.parse::<i64>().ok());
                let start = parse_time(parts.next());
                let end = parse_time(parts.next());
                let ids = parts.next().map(parse_ids).unwrap_or_default();
                let description = parts.collect::<Vec<_>>().join(" ");
                let Some(day) = session.day.or_else(|| session.backend.snapshot().first_day().map(|d| d.id)) else {
                    println!("No day selected.");
                    continue;
                };
                match (place, start, end) {
                    (Some(place), Some(start), Some(end)) => {
                        let hours = session.backend.snapshot().operating_hours();
                        let mut editor = ShiftEditor::create(
                            session.school_id(),
                            day,
                            place,
                            DraftTimes { start, end },
                            hours,
                            session.toasts.notifier(),
                        );
                        editor.set_description(description);
                        session.submit(editor, &ids);
                    }
                    _ => println!("Usage: add <place_id> <HH:MM> <HH:MM> [ids_csv] [description...]"),
                }
            }
            "edit" => {
                let id = parts.next().and_then(|s| s.parse::<i64>().ok());
                let start = parse_time(parts.next());
                let end = parse_time(parts.next());
                let ids = parts.next().map(parse_ids);
                match (id, start, end) {
                    (Some(id), Some(start), Some(end)) => {
                        let payload = session.backend.snapshot();
                        let Some(shift) = payload.find_shift(id) else {
                            println!("Shift {id} not found.");
                            continue;
                        };
                        let mut editor = ShiftEditor::edit(
                            session.school_id(),
                            shift,
                            payload.operating_hours(),
                            session.toasts.notifier(),
                        );
                        editor.set_range(start, end);
                        if let Some(ids) = ids {
                            for current in editor.selected_teachers().to_vec() {
                                editor.toggle_teacher(current);
                            }
                            session.submit(editor, &ids);
                        } else {
                            session.submit(editor, &[]);
                        }
                    }
                    _ => println!("Usage: edit <shift_id> <HH:MM> <HH:MM> [ids_csv]"),
                }
            }
            "delete" => match parts.next().and_then(|s| s.parse::<i64>().ok()) {
                Some(id) => match session.runtime.block_on(session.backend.delete_shift(id)) {
                    Ok(()) => println!("Deleted shift {id}."),
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: delete <shift_id>"),
            },
            "conflicts" => {
                let school_id = session.school_id();
                match session.runtime.block_on(session.backend.conflicts(school_id)) {
                    Ok(reports) if reports.is_empty() => println!("No conflicts."),
                    Ok(reports) => {
                        for report in reports {
                            let shifts = report
                                .conflicting_shifts
                                .iter()
                                .map(|s| format!("{} - {} {}", s.start_time, s.end_time, s.place_name))
                                .collect::<Vec<_>>()
                                .join(" / ");
                            println!("  {} on {}: {}", report.teacher_name, report.day_name, shifts);
                        }
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }
            "save" => {
                let fmt = parts.next();
                let path = parts.next();
                match (fmt, path) {
                    (Some("json"), Some(path)) => {
                        match save_payload_to_json(&session.backend.snapshot(), path) {
                            Ok(()) => println!("Grid saved to {path}."),
                            Err(e) => println!("Error saving grid: {e}"),
                        }
                    }
                    (Some("csv"), Some(path)) => {
                        match save_shifts_to_csv(&session.backend.snapshot().shifts, path) {
                            Ok(()) => println!("Shifts saved to {path}."),
                            Err(e) => println!("Error saving shifts: {e}"),
                        }
                    }
                    _ => println!("Usage: save <json|csv> <path>"),
                }
            }
            "load" => {
                let fmt = parts.next();
                let path = parts.next();
                match (fmt, path) {
                    (Some("json"), Some(path)) => match load_payload_from_json(path) {
                        Ok(payload) => {
                            session.backend.replace_payload(payload);
                            println!("Grid loaded from {path}.");
                            session.show();
                        }
                        Err(e) => println!("Error loading grid: {e}"),
                    },
                    (Some("csv"), Some(path)) => match load_shifts_from_csv(path) {
                        Ok(shifts) => {
                            let mut payload = session.backend.snapshot();
                            payload.shifts = shifts;
                            session.backend.replace_payload(payload);
                            println!("Shifts loaded from {path}.");
                            session.show();
                        }
                        Err(e) => println!("Error loading shifts: {e}"),
                    },
                    _ => println!("Usage: load <json|csv> <path>"),
                }
            }
            other => println!("Unknown command '{other}'. Type 'help'."),
        }
    }
    Ok(())
}
