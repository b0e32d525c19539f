//! The per-gesture drag/resize state machine.
//!
//! The engine owns a single [`GestureState`] tagged union. A gesture starts
//! on pointer-down (`begin_drag`/`begin_resize`), consumes pointer deltas and
//! auto-scroll ticks while active, and ends on pointer-up with one atomic
//! copy-on-write commit handed to the host, or on `cancel` with no commit at
//! all. Host vetoes drop a tick entirely, so the stored transform always
//! reflects the last accepted state.

use tracing::{debug, warn};

use crate::{
    assist_positions, commit_in_row, commit_move, find_action, row_index_at,
    scale_count_from_pixel, time_range_to_transform, time_to_pixel, transform_to_time_range,
    AutoScrollController, Bounds, DragLineData, DragLines, Ghost, ScaleConfig, SnapParams,
    SnapResolver, TimeRange, TimelineAction, TimelineRow, Transform, DEFAULT_MOVE_GRID,
    MIN_SCALE_COUNT,
};

/// Which edge a resize gesture moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Host verdict for one gesture tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Accept,
    Reject,
}

/// Callback surface the engine drives. The host applies committed data via
/// `set_editor_data` (always a whole replacement) and may veto individual
/// ticks from `on_moving`/`on_resizing`.
pub trait EditorHost {
    fn on_move_start(&mut self, _action: &TimelineAction, _row: &TimelineRow) {}
    fn on_moving(&mut self, _row: &TimelineRow, _start: f64, _end: f64) -> Response {
        Response::Accept
    }
    fn on_move_end(&mut self, _row: &TimelineRow, _start: f64, _end: f64) {}
    fn on_resize_start(&mut self, _action: &TimelineAction, _row: &TimelineRow, _dir: Direction) {}
    fn on_resizing(&mut self, _dir: Direction, _start: f64, _end: f64) -> Response {
        Response::Accept
    }
    fn on_resize_end(&mut self, _dir: Direction, _start: f64, _end: f64) {}
    fn set_editor_data(&mut self, rows: Vec<TimelineRow>);
    fn delta_scroll_left(&mut self, _delta: f64) {}
    fn set_scale_count(&mut self, _count: usize) {}
}

/// Static per-render configuration supplied by the host.
#[derive(Debug, Clone)]
pub struct EditorOptions {
    /// Time units per tick mark.
    pub scale: f64,
    /// Pixel width of a tick mark.
    pub scale_width: f64,
    /// Grid subdivisions per tick mark.
    pub scale_split_count: u32,
    /// Pixel offset of time zero.
    pub start_left: f64,
    /// Default row height, px.
    pub row_height: f64,
    /// Snap moves/resizes to the subdivision grid.
    pub grid_snap: bool,
    /// Current number of rendered tick marks.
    pub scale_count: usize,
    /// Hard ceiling on tick marks (bounds rightward drags).
    pub max_scale_count: usize,
    /// Magnetic snap distance, px.
    pub adsorption_distance: f64,
    /// Compute magnetic guide lines from sibling actions.
    pub drag_line: bool,
    /// Restrict which actions contribute guide lines.
    pub assist_action_ids: Option<Vec<String>>,
    /// Skip the playhead guide line.
    pub hide_cursor: bool,
    /// Playhead time, used as a guide line unless hidden.
    pub cursor_time: f64,
    /// Globally disable drag and resize.
    pub disable_drag: bool,
    /// Allow dragging actions across rows.
    pub cross_track: bool,
    /// Whether a left-edge resize searches the guide-line set.
    pub magnet_left_edge: bool,
    /// Auto-scroll margin at the viewport edges, px.
    pub scroll_margin: f64,
    /// Auto-scroll ceiling, px per tick.
    pub scroll_speed: f64,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            scale: crate::DEFAULT_SCALE,
            scale_width: crate::DEFAULT_SCALE_WIDTH,
            scale_split_count: crate::DEFAULT_SCALE_SPLIT_COUNT,
            start_left: crate::DEFAULT_START_LEFT,
            row_height: crate::DEFAULT_ROW_HEIGHT,
            grid_snap: false,
            scale_count: MIN_SCALE_COUNT,
            max_scale_count: usize::MAX,
            adsorption_distance: crate::DEFAULT_ADSORPTION_DISTANCE,
            drag_line: false,
            assist_action_ids: None,
            hide_cursor: false,
            cursor_time: 0.0,
            disable_drag: false,
            cross_track: false,
            magnet_left_edge: true,
            scroll_margin: crate::DEFAULT_SCROLL_MARGIN,
            scroll_speed: crate::DEFAULT_MAX_SCROLL_SPEED,
        }
    }
}

impl EditorOptions {
    pub fn scale_config(&self) -> ScaleConfig {
        ScaleConfig {
            start_left: self.start_left,
            scale: self.scale,
            scale_width: self.scale_width,
        }
    }

    /// Effective grid step: one subdivision under `grid_snap`, otherwise the
    /// 1px free-movement grid.
    pub fn grid_size(&self) -> f64 {
        if self.grid_snap && self.scale_split_count > 0 {
            self.scale_width / self.scale_split_count as f64
        } else {
            DEFAULT_MOVE_GRID
        }
    }

    /// Magnetic distance, widened to half a grid cell under `grid_snap`.
    pub fn snap_distance(&self) -> f64 {
        if self.grid_snap {
            (self.grid_size() / 2.0).max(self.adsorption_distance)
        } else {
            self.adsorption_distance
        }
    }
}

/// Scrollable-area geometry for one pointer event or tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub scroll_left: f64,
    pub scroll_top: f64,
}

/// One pointer-move sample, in viewport-relative coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    /// Horizontal movement since the previous sample, px.
    pub delta_x: f64,
    /// Pointer x from the viewport's left edge.
    pub x: f64,
    /// Pointer y from the viewport's top edge.
    pub y: f64,
}

impl PointerInput {
    fn is_finite(&self) -> bool {
        self.delta_x.is_finite() && self.x.is_finite() && self.y.is_finite()
    }
}

/// State captured at gesture start and updated tick by tick.
#[derive(Debug, Clone)]
pub struct GestureData {
    pub action_id: String,
    /// Row owning the action at gesture start.
    pub row_id: String,
    /// Last accepted pixel transform.
    pub transform: Transform,
    /// Live tick-mark count, grown as the action is dragged past the end.
    pub scale_count: usize,
    /// Present only for cross-track drags.
    pub ghost: Option<Ghost>,
    snap: SnapResolver,
}

/// The one active gesture, or `Idle`.
#[derive(Debug, Clone, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging(GestureData),
    Resizing {
        dir: Direction,
        data: GestureData,
    },
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, GestureState::Idle)
    }
}

/// Owns the gesture lifecycle for a timeline's actions. At most one gesture
/// is active at a time; `cancel` and `pointer_up` always return to `Idle`
/// with auto-scroll stopped.
#[derive(Debug, Default)]
pub struct InteractionEngine {
    options: EditorOptions,
    state: GestureState,
    auto_scroll: AutoScrollController,
    drag_lines: DragLines,
}

impl InteractionEngine {
    pub fn new(options: EditorOptions) -> Self {
        let auto_scroll = AutoScrollController::new(options.scroll_margin, options.scroll_speed);
        Self {
            options,
            state: GestureState::Idle,
            auto_scroll,
            drag_lines: DragLines::default(),
        }
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// The live transform of the gesturing action, for host rendering.
    pub fn gesture_transform(&self) -> Option<Transform> {
        match &self.state {
            GestureState::Idle => None,
            GestureState::Dragging(data) | GestureState::Resizing { data, .. } => {
                Some(data.transform)
            }
        }
    }

    /// The cross-track preview ghost, if a cross-track drag is active.
    pub fn ghost(&self) -> Option<&Ghost> {
        match &self.state {
            GestureState::Dragging(data) => data.ghost.as_ref(),
            _ => None,
        }
    }

    pub fn drag_line_data(&self) -> &DragLineData {
        self.drag_lines.data()
    }

    /// Assist guide lines currently hit by the moving edges.
    pub fn active_guide_positions(&self) -> Vec<f64> {
        self.drag_lines.active_positions()
    }

    /// Starts a drag on `action_id`. Returns false (and stays `Idle`) when a
    /// gesture is already active or the action is not movable.
    pub fn begin_drag<H: EditorHost>(
        &mut self,
        rows: &[TimelineRow],
        action_id: &str,
        host: &mut H,
    ) -> bool {
        if !self.state.is_idle() || self.options.disable_drag {
            return false;
        }
        let Some((row_index, row, action)) = find_action(rows, action_id) else {
            return false;
        };
        if action.disable || !action.movable {
            return false;
        }

        let data = self.capture(rows, row, action);
        let ghost = self
            .options
            .cross_track
            .then(|| Ghost::new(action, row, row_index));
        self.auto_scroll.start();
        host.on_move_start(action, row);
        self.state = GestureState::Dragging(GestureData { ghost, ..data });
        true
    }

    /// Starts a resize of the given edge. Returns false when a gesture is
    /// already active or the action is not flexible.
    pub fn begin_resize<H: EditorHost>(
        &mut self,
        rows: &[TimelineRow],
        action_id: &str,
        dir: Direction,
        host: &mut H,
    ) -> bool {
        if !self.state.is_idle() || self.options.disable_drag {
            return false;
        }
        let Some((_, row, action)) = find_action(rows, action_id) else {
            return false;
        };
        if action.disable || !action.flexible {
            return false;
        }

        let data = self.capture(rows, row, action);
        self.auto_scroll.start();
        host.on_resize_start(action, row, dir);
        self.state = GestureState::Resizing { dir, data };
        true
    }

    /// Feeds one pointer-move sample into the active gesture. Non-finite
    /// input (a malformed pointer event) drops the tick and keeps the
    /// previous state; the gesture itself continues.
    pub fn pointer_move<H: EditorHost>(
        &mut self,
        rows: &[TimelineRow],
        input: PointerInput,
        viewport: &Viewport,
        host: &mut H,
    ) {
        if !input.is_finite() {
            warn!(?input, "dropping pointer sample with non-finite geometry");
            return;
        }
        match &mut self.state {
            GestureState::Idle => {}
            GestureState::Dragging(data) => {
                self.auto_scroll.update_pointer(input.x, viewport.width);
                data.snap.accumulate(input.delta_x);
                Self::drag_step(&self.options, &mut self.drag_lines, data, rows, host);
                if data.ghost.is_some() {
                    let y = input.y + viewport.scroll_top;
                    Self::update_ghost_row(&self.options, data, rows, y, host);
                }
            }
            GestureState::Resizing { dir, data } => {
                self.auto_scroll.update_pointer(input.x, viewport.width);
                data.snap.accumulate(input.delta_x);
                Self::resize_step(&self.options, &mut self.drag_lines, *dir, data, rows, host);
            }
        }
    }

    /// Advances the auto-scroll timer by one tick. The host calls this every
    /// frame while a gesture is active; after the gesture ends it yields
    /// nothing and invokes no callbacks.
    pub fn auto_scroll_tick<H: EditorHost>(&mut self, rows: &[TimelineRow], host: &mut H) {
        let Some(delta) = self.auto_scroll.tick() else {
            return;
        };
        host.delta_scroll_left(delta);
        match &mut self.state {
            GestureState::Idle => {}
            GestureState::Dragging(data) => {
                data.snap.accumulate(delta);
                Self::drag_step(&self.options, &mut self.drag_lines, data, rows, host);
            }
            GestureState::Resizing { dir, data } => {
                data.snap.accumulate(delta);
                Self::resize_step(&self.options, &mut self.drag_lines, *dir, data, rows, host);
            }
        }
    }

    /// Ends the gesture: stops auto-scroll, clears guide lines, and hands the
    /// host one copy-on-write replacement of the row collection.
    pub fn pointer_up<H: EditorHost>(&mut self, rows: &[TimelineRow], host: &mut H) {
        self.auto_scroll.stop();
        self.drag_lines.dispose();
        let state = std::mem::take(&mut self.state);
        let cfg = self.options.scale_config();

        match state {
            GestureState::Idle => {}
            GestureState::Dragging(data) => {
                let range = transform_to_time_range(data.transform, &cfg);
                let relocated = data.ghost.as_ref().is_some_and(Ghost::relocated);
                let commit = match &data.ghost {
                    Some(ghost) if relocated => commit_move(
                        rows,
                        &data.action_id,
                        &ghost.source_row_id,
                        ghost.row_index,
                        range,
                    ),
                    _ => commit_in_row(rows, &data.row_id, &data.action_id, range),
                };
                match commit {
                    Ok(next) => {
                        let target_index = match &data.ghost {
                            Some(ghost) if relocated => {
                                ghost.row_index.min(next.len().saturating_sub(1))
                            }
                            _ => next
                                .iter()
                                .position(|row| row.id == data.row_id)
                                .unwrap_or(0),
                        };
                        let row_snapshot = next.get(target_index).cloned();
                        debug!(
                            action = %data.action_id,
                            start = range.start,
                            end = range.end,
                            "drag committed"
                        );
                        host.set_editor_data(next);
                        if let Some(row) = row_snapshot {
                            host.on_move_end(&row, range.start, range.end);
                        }
                    }
                    Err(err) => warn!(error = %err, "drag commit dropped"),
                }
            }
            GestureState::Resizing { dir, data } => {
                let range = transform_to_time_range(data.transform, &cfg);
                match commit_in_row(rows, &data.row_id, &data.action_id, range) {
                    Ok(next) => {
                        debug!(
                            action = %data.action_id,
                            start = range.start,
                            end = range.end,
                            "resize committed"
                        );
                        host.set_editor_data(next);
                        host.on_resize_end(dir, range.start, range.end);
                    }
                    Err(err) => warn!(error = %err, "resize commit dropped"),
                }
            }
        }
    }

    /// Aborts the gesture (focus loss, escape): back to `Idle`, auto-scroll
    /// stopped, ghost discarded, editor data untouched.
    pub fn cancel(&mut self) {
        self.auto_scroll.stop();
        self.drag_lines.dispose();
        self.state = GestureState::Idle;
    }

    fn capture(
        &mut self,
        rows: &[TimelineRow],
        row: &TimelineRow,
        action: &TimelineAction,
    ) -> GestureData {
        let cfg = self.options.scale_config();
        let transform = time_range_to_transform(
            TimeRange {
                start: action.start,
                end: action.end,
            },
            &cfg,
        );
        let guides = if self.options.drag_line {
            let cursor_left =
                (!self.options.hide_cursor).then(|| time_to_pixel(self.options.cursor_time, &cfg));
            assist_positions(
                rows,
                &action.id,
                self.options.assist_action_ids.as_deref(),
                cursor_left,
                &cfg,
            )
        } else {
            Vec::new()
        };
        self.drag_lines.init(guides.clone());

        let snap = SnapResolver::new(SnapParams {
            grid: self.options.grid_size(),
            adsorption_distance: self.options.snap_distance(),
            start_left: self.options.start_left,
            bounds: self.action_bounds(action),
            guide_positions: guides,
            magnet_left_edge: self.options.magnet_left_edge,
        });

        GestureData {
            action_id: action.id.clone(),
            row_id: row.id.clone(),
            transform,
            scale_count: self.options.scale_count.max(MIN_SCALE_COUNT),
            ghost: None,
            snap,
        }
    }

    /// Pixel limits from `min_start`/`max_end` and the scale-count ceiling.
    fn action_bounds(&self, action: &TimelineAction) -> Bounds {
        let cfg = self.options.scale_config();
        let left = time_to_pixel(action.min_start.unwrap_or(0.0), &cfg);
        let scale_limit =
            self.options.max_scale_count as f64 * self.options.scale_width + self.options.start_left;
        let right = match action.max_end {
            Some(max_end) => time_to_pixel(max_end, &cfg).min(scale_limit),
            None => scale_limit,
        };
        Bounds { left, right }
    }

    fn active_row<'a>(data: &GestureData, rows: &'a [TimelineRow]) -> Option<&'a TimelineRow> {
        match &data.ghost {
            Some(ghost) => rows.get(ghost.row_index.min(rows.len().saturating_sub(1))),
            None => rows.iter().find(|row| row.id == data.row_id),
        }
    }

    fn drag_step<H: EditorHost>(
        options: &EditorOptions,
        drag_lines: &mut DragLines,
        data: &mut GestureData,
        rows: &[TimelineRow],
        host: &mut H,
    ) {
        let Some(left) = data.snap.snap_move(data.transform.left, data.transform.width) else {
            return;
        };
        let candidate = Transform {
            left,
            width: data.transform.width,
        };
        let cfg = options.scale_config();
        let range = transform_to_time_range(candidate, &cfg);
        let Some(row) = Self::active_row(data, rows) else {
            return;
        };
        if host.on_moving(row, range.start, range.end) == Response::Reject {
            return;
        }
        data.transform = candidate;
        drag_lines.update(vec![candidate.left, candidate.right()]);
        Self::grow_scale_count(options, data, candidate.right(), host);
    }

    fn resize_step<H: EditorHost>(
        options: &EditorOptions,
        drag_lines: &mut DragLines,
        dir: Direction,
        data: &mut GestureData,
        rows: &[TimelineRow],
        host: &mut H,
    ) {
        let Some(candidate) = data
            .snap
            .snap_resize(dir, data.transform.left, data.transform.width)
        else {
            return;
        };
        let cfg = options.scale_config();
        let range = transform_to_time_range(candidate, &cfg);
        if Self::active_row(data, rows).is_none() {
            return;
        }
        if host.on_resizing(dir, range.start, range.end) == Response::Reject {
            return;
        }
        data.transform = candidate;
        let moving_edge = match dir {
            Direction::Left => candidate.left,
            Direction::Right => candidate.right(),
        };
        drag_lines.update(vec![moving_edge]);
        Self::grow_scale_count(options, data, candidate.right(), host);
    }

    fn update_ghost_row<H: EditorHost>(
        options: &EditorOptions,
        data: &mut GestureData,
        rows: &[TimelineRow],
        y: f64,
        host: &mut H,
    ) {
        let candidate = row_index_at(y, rows, options.row_height);
        let Some(current) = data.ghost.as_ref().map(|ghost| ghost.row_index) else {
            return;
        };
        if candidate == current {
            return;
        }
        let Some(row) = rows.get(candidate) else {
            return;
        };
        let cfg = options.scale_config();
        let range = transform_to_time_range(data.transform, &cfg);
        if host.on_moving(row, range.start, range.end) == Response::Reject {
            return;
        }
        if let Some(ghost) = data.ghost.as_mut() {
            ghost.row_index = candidate;
        }
    }

    fn grow_scale_count<H: EditorHost>(
        options: &EditorOptions,
        data: &mut GestureData,
        right_edge: f64,
        host: &mut H,
    ) {
        let count = scale_count_from_pixel(
            right_edge,
            options.start_left,
            options.scale_width,
            data.scale_count,
        )
        .min(options.max_scale_count);
        if count != data.scale_count {
            data.scale_count = count;
            host.set_scale_count(count);
        }
    }
}
