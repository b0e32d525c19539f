//! End-to-end gesture scenarios driven through the public engine API with a
//! recording host.

use timeline_edit::{
    Direction, EditorHost, EditorOptions, InteractionEngine, PointerInput, Response,
    TimelineAction, TimelineRow, Viewport,
};

#[derive(Default)]
struct RecordingHost {
    veto_moves: bool,
    veto_resizes: bool,
    committed: Option<Vec<TimelineRow>>,
    scroll_deltas: Vec<f64>,
    scale_counts: Vec<usize>,
    events: Vec<String>,
}

impl EditorHost for RecordingHost {
    fn on_move_start(&mut self, action: &TimelineAction, row: &TimelineRow) {
        self.events.push(format!("move_start:{}@{}", action.id, row.id));
    }

    fn on_moving(&mut self, row: &TimelineRow, start: f64, end: f64) -> Response {
        self.events
            .push(format!("moving:{}:{start:.3}..{end:.3}", row.id));
        if self.veto_moves {
            Response::Reject
        } else {
            Response::Accept
        }
    }

    fn on_move_end(&mut self, row: &TimelineRow, start: f64, end: f64) {
        self.events
            .push(format!("move_end:{}:{start:.3}..{end:.3}", row.id));
    }

    fn on_resize_start(&mut self, action: &TimelineAction, _row: &TimelineRow, dir: Direction) {
        self.events.push(format!("resize_start:{}:{dir:?}", action.id));
    }

    fn on_resizing(&mut self, dir: Direction, start: f64, end: f64) -> Response {
        self.events
            .push(format!("resizing:{dir:?}:{start:.3}..{end:.3}"));
        if self.veto_resizes {
            Response::Reject
        } else {
            Response::Accept
        }
    }

    fn on_resize_end(&mut self, dir: Direction, start: f64, end: f64) {
        self.events
            .push(format!("resize_end:{dir:?}:{start:.3}..{end:.3}"));
    }

    fn set_editor_data(&mut self, rows: Vec<TimelineRow>) {
        self.events.push("set_editor_data".to_string());
        self.committed = Some(rows);
    }

    fn delta_scroll_left(&mut self, delta: f64) {
        self.scroll_deltas.push(delta);
    }

    fn set_scale_count(&mut self, count: usize) {
        self.scale_counts.push(count);
    }
}

fn two_rows() -> Vec<TimelineRow> {
    let mut r0 = TimelineRow::new("r0");
    r0.actions.push(TimelineAction::new("a", "fx", 0.0, 2.0));
    let mut r1 = TimelineRow::new("r1");
    r1.actions.push(TimelineAction::new("b", "fx", 6.0, 7.0));
    vec![r0, r1]
}

fn grid_options() -> EditorOptions {
    // scale=1, scaleWidth=160, startLeft=20, gridSnap on => 16px grid.
    EditorOptions {
        grid_snap: true,
        ..EditorOptions::default()
    }
}

fn viewport() -> Viewport {
    Viewport {
        width: 800.0,
        scroll_left: 0.0,
        scroll_top: 0.0,
    }
}

fn move_by(engine: &mut InteractionEngine, rows: &[TimelineRow], host: &mut RecordingHost, dx: f64, y: f64) {
    engine.pointer_move(
        rows,
        PointerInput {
            delta_x: dx,
            x: 400.0,
            y,
        },
        &viewport(),
        host,
    );
}

#[test]
fn drag_by_one_scale_width_shifts_one_time_unit() {
    // {start:0,end:2} dragged +160px with a 16px grid and no guide lines.
    let rows = two_rows();
    let mut host = RecordingHost::default();
    let mut engine = InteractionEngine::new(grid_options());

    assert!(engine.begin_drag(&rows, "a", &mut host));
    move_by(&mut engine, &rows, &mut host, 160.0, 10.0);
    engine.pointer_up(&rows, &mut host);

    let committed = host.committed.expect("commit");
    let action = &committed[0].actions[0];
    assert!((action.start - 1.0).abs() < 1e-9);
    assert!((action.end - 3.0).abs() < 1e-9);
    // Source rows were never mutated in place.
    assert_eq!(rows[0].actions[0].start, 0.0);

    assert_eq!(host.events[0], "move_start:a@r0");
    assert!(host.events.contains(&"moving:r0:1.000..3.000".to_string()));
    let commit_at = host.events.iter().position(|e| e == "set_editor_data").unwrap();
    let end_at = host.events.iter().position(|e| e.starts_with("move_end")).unwrap();
    assert!(commit_at < end_at);
}

#[test]
fn committed_drag_lands_on_the_grid() {
    let rows = two_rows();
    let mut host = RecordingHost::default();
    let mut engine = InteractionEngine::new(grid_options());

    engine.begin_drag(&rows, "a", &mut host);
    // Awkward deltas; the committed left edge must still sit on the grid.
    for dx in [23.0, 9.0, 41.0, 7.0] {
        move_by(&mut engine, &rows, &mut host, dx, 10.0);
    }
    engine.pointer_up(&rows, &mut host);

    let committed = host.committed.expect("commit");
    let start = committed[0].actions[0].start;
    // left = 20 + start*160; (left - 20) % 16 == 0 <=> start*160 % 16 == 0.
    let left_offset = start * 160.0;
    assert!((left_offset % 16.0).abs() < 1e-9, "offset {left_offset}");
}

#[test]
fn sub_threshold_resize_commits_no_change() {
    // Resizing the right edge by +8px (< 16px grid) changes nothing.
    let rows = two_rows();
    let mut host = RecordingHost::default();
    let mut engine = InteractionEngine::new(grid_options());

    engine.begin_resize(&rows, "a", Direction::Right, &mut host);
    move_by(&mut engine, &rows, &mut host, 8.0, 10.0);
    engine.pointer_up(&rows, &mut host);

    let committed = host.committed.expect("commit");
    assert_eq!(committed[0].actions[0].end, 2.0);
    assert!(!host.events.iter().any(|e| e.starts_with("resizing")));
}

#[test]
fn full_grid_step_resize_extends_end_by_a_tenth() {
    // +16px on a 160px scale width moves the end by 0.1 time units.
    let rows = two_rows();
    let mut host = RecordingHost::default();
    let mut engine = InteractionEngine::new(grid_options());

    engine.begin_resize(&rows, "a", Direction::Right, &mut host);
    move_by(&mut engine, &rows, &mut host, 16.0, 10.0);
    engine.pointer_up(&rows, &mut host);

    let committed = host.committed.expect("commit");
    let action = &committed[0].actions[0];
    assert!((action.start - 0.0).abs() < 1e-9);
    assert!((action.end - 2.1).abs() < 1e-9);
    assert_eq!(host.events[0], "resize_start:a:Right");
    assert!(host
        .events
        .iter()
        .any(|e| e.starts_with("resize_end:Right:0.000..2.100")));
}

#[test]
fn cross_track_drag_relocates_on_release() {
    // Uniform 32px rows, pointer at y=40 => row index 1.
    let rows = two_rows();
    let mut host = RecordingHost::default();
    let mut engine = InteractionEngine::new(EditorOptions {
        cross_track: true,
        ..grid_options()
    });

    engine.begin_drag(&rows, "a", &mut host);
    move_by(&mut engine, &rows, &mut host, 0.0, 40.0);

    // Mid-gesture: the ghost targets r1 but committed data is untouched and
    // the action exists in exactly one row.
    let ghost = engine.ghost().expect("ghost");
    assert_eq!(ghost.row_index, 1);
    assert_eq!(ghost.action.id, "a-ghost");
    assert!(host.committed.is_none());
    let occurrences: usize = rows
        .iter()
        .map(|row| row.actions.iter().filter(|a| a.id == "a").count())
        .sum();
    assert_eq!(occurrences, 1);

    engine.pointer_up(&rows, &mut host);
    let committed = host.committed.expect("commit");
    assert!(!committed[0].actions.iter().any(|a| a.id == "a"));
    assert!(committed[1].actions.iter().any(|a| a.id == "a"));
    // Target row stays sorted by start.
    let starts: Vec<f64> = committed[1].actions.iter().map(|a| a.start).collect();
    assert_eq!(starts, vec![0.0, 6.0]);
    assert!(host.events.iter().any(|e| e.starts_with("move_end:r1")));
}

#[test]
fn rejected_row_change_keeps_the_previous_ghost_row() {
    let rows = two_rows();
    let mut host = RecordingHost::default();
    let mut engine = InteractionEngine::new(EditorOptions {
        cross_track: true,
        ..grid_options()
    });

    engine.begin_drag(&rows, "a", &mut host);
    host.veto_moves = true;
    move_by(&mut engine, &rows, &mut host, 0.0, 40.0);
    assert_eq!(engine.ghost().unwrap().row_index, 0);

    host.veto_moves = false;
    engine.pointer_up(&rows, &mut host);
    // Never relocated, so the commit stays in r0.
    let committed = host.committed.expect("commit");
    assert!(committed[0].actions.iter().any(|a| a.id == "a"));
    assert_eq!(committed[1], rows[1]);
}

#[test]
fn permanent_veto_is_a_no_op() {
    let rows = two_rows();
    let mut host = RecordingHost {
        veto_moves: true,
        ..RecordingHost::default()
    };
    let mut engine = InteractionEngine::new(grid_options());

    engine.begin_drag(&rows, "a", &mut host);
    for dx in [160.0, 320.0, -80.0] {
        move_by(&mut engine, &rows, &mut host, dx, 10.0);
    }
    engine.pointer_up(&rows, &mut host);

    // Every tick was rejected, so the committed data equals the input.
    assert_eq!(host.committed.expect("commit"), rows);
}

#[test]
fn guide_line_overrides_the_grid() {
    // b starts at t=6 => 980px. Dragging a's right edge near it adsorbs.
    let rows = two_rows();
    let mut host = RecordingHost::default();
    let mut engine = InteractionEngine::new(EditorOptions {
        drag_line: true,
        hide_cursor: true,
        ..grid_options()
    });

    engine.begin_drag(&rows, "a", &mut host);
    // +645px consumes 40 grid steps => left 660, right edge 980: dead on
    // b's start guide, so the magnetic match wins over the grid.
    move_by(&mut engine, &rows, &mut host, 645.0, 10.0);
    engine.pointer_up(&rows, &mut host);

    let committed = host.committed.expect("commit");
    let action = &committed[0].actions[0];
    assert!((action.end - 6.0).abs() < 1e-9, "end {}", action.end);
    assert!((action.start - 4.0).abs() < 1e-9);
}

#[test]
fn auto_scroll_moves_the_action_and_stops_on_release() {
    let rows = two_rows();
    let mut host = RecordingHost::default();
    let mut engine = InteractionEngine::new(EditorOptions::default());

    engine.begin_drag(&rows, "a", &mut host);
    // Pointer parked hard against the right edge of an 800px viewport.
    engine.pointer_move(
        &rows,
        PointerInput {
            delta_x: 0.0,
            x: 800.0,
            y: 10.0,
        },
        &viewport(),
        &mut host,
    );

    for _ in 0..4 {
        engine.auto_scroll_tick(&rows, &mut host);
    }
    assert_eq!(host.scroll_deltas.len(), 4);
    assert!(host.scroll_deltas.iter().all(|d| *d > 0.0));
    let moved = engine.gesture_transform().unwrap();
    assert!(moved.left > 20.0);

    engine.pointer_up(&rows, &mut host);
    let after_release = host.scroll_deltas.len();
    for _ in 0..8 {
        engine.auto_scroll_tick(&rows, &mut host);
    }
    assert_eq!(host.scroll_deltas.len(), after_release);
}

#[test]
fn dragging_past_the_end_grows_the_scale_count() {
    let rows = two_rows();
    let mut host = RecordingHost::default();
    let mut engine = InteractionEngine::new(grid_options());

    engine.begin_drag(&rows, "a", &mut host);
    move_by(&mut engine, &rows, &mut host, 10_000.0, 10.0);
    engine.pointer_up(&rows, &mut host);

    // Right edge 10340px => ceil(10320/160) + 5 = 70 marks.
    assert_eq!(host.scale_counts.last().copied(), Some(70));
}

#[test]
fn scale_count_growth_respects_the_ceiling() {
    let rows = two_rows();
    let mut host = RecordingHost::default();
    let mut engine = InteractionEngine::new(EditorOptions {
        max_scale_count: 30,
        ..grid_options()
    });

    engine.begin_drag(&rows, "a", &mut host);
    move_by(&mut engine, &rows, &mut host, 10_000.0, 10.0);

    assert!(host.scale_counts.iter().all(|count| *count <= 30));
    // The transform itself is clamped by the scale-count pixel bound.
    let transform = engine.gesture_transform().unwrap();
    assert!(transform.right() <= 30.0 * 160.0 + 20.0 + 1e-9);
    engine.pointer_up(&rows, &mut host);
}

#[test]
fn large_editor_data_commits_only_the_touched_rows() {
    let mut rows: Vec<TimelineRow> = (0..16)
        .map(|index| {
            let mut row = TimelineRow::new(format!("row-{index}"));
            let id = uuid::Uuid::new_v4().to_string();
            row.actions
                .push(TimelineAction::new(id, "fx", index as f64, index as f64 + 1.0));
            row
        })
        .collect();
    let target = TimelineAction::new("target", "fx", 0.0, 2.0);
    rows[3].actions.push(target);

    let mut host = RecordingHost::default();
    let mut engine = InteractionEngine::new(grid_options());
    engine.begin_drag(&rows, "target", &mut host);
    move_by(&mut engine, &rows, &mut host, 160.0, 10.0);
    engine.pointer_up(&rows, &mut host);

    let committed = host.committed.expect("commit");
    for (index, row) in committed.iter().enumerate() {
        if index == 3 {
            let moved = row.actions.iter().find(|a| a.id == "target").unwrap();
            assert!((moved.start - 1.0).abs() < 1e-9);
        } else {
            assert_eq!(*row, rows[index]);
        }
    }
}
