//! Interactive manipulation engine for a timeline-editing widget.
//!
//! Rows of time-bounded actions sit on a horizontal time axis; this crate
//! owns the coordinate mapping between time and pixels, grid/magnetic
//! snapping, the drag/resize state machine, edge auto-scroll, and the
//! cross-row relocation protocol. Rendering, virtualization, and scrollbar
//! sync are the host's job: the host feeds pointer events in and receives
//! committed row data back through [`EditorHost`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod auto_scroll;
pub use auto_scroll::*;
mod coords;
pub use coords::*;
mod gesture;
pub use gesture::*;
mod guide_lines;
pub use guide_lines::*;
mod relocate;
pub use relocate::*;
mod snap;
pub use snap::*;

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("action start time cannot be less than 0: {0}")]
    StartTimeLessThanZero(String),
    #[error("action end time cannot be less than start time: {0}")]
    EndTimeLessThanStartTime(String),
    #[error("row not found: {0}")]
    RowNotFound(String),
    #[error("action not found: {0}")]
    ActionNotFound(String),
}

/// Default scale (time units per tick mark).
pub const DEFAULT_SCALE: f64 = 1.0;
/// Default number of grid subdivisions per tick mark.
pub const DEFAULT_SCALE_SPLIT_COUNT: u32 = 10;
/// Default display width of a single tick mark, px.
pub const DEFAULT_SCALE_WIDTH: f64 = 160.0;
/// Default left margin before the first tick mark, px.
pub const DEFAULT_START_LEFT: f64 = 20.0;
/// Default minimum pixel movement when grid snapping is off.
pub const DEFAULT_MOVE_GRID: f64 = 1.0;
/// Default magnetic snap distance, px.
pub const DEFAULT_ADSORPTION_DISTANCE: f64 = 8.0;
/// Default row height, px.
pub const DEFAULT_ROW_HEIGHT: f64 = 32.0;
/// Minimum number of visible tick marks.
pub const MIN_SCALE_COUNT: usize = 20;
/// Tick marks appended when an action is dragged past the current end.
pub const ADD_SCALE_COUNT: usize = 5;

fn default_true() -> bool {
    true
}

/// A time-bounded item placed on a row. `start`/`end` are in abstract time
/// units; pixel position is always derived via [`ScaleConfig`], never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineAction {
    pub id: String,
    pub start: f64,
    pub end: f64,
    pub effect_id: String,

    #[serde(default)]
    pub selected: bool,
    /// Whether the action can be resized.
    #[serde(default = "default_true")]
    pub flexible: bool,
    /// Whether the action can be moved.
    #[serde(default = "default_true")]
    pub movable: bool,
    #[serde(default)]
    pub disable: bool,

    /// Minimum start time the action may be dragged/resized to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_start: Option<f64>,
    /// Maximum end time the action may be dragged/resized to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_end: Option<f64>,
}

impl TimelineAction {
    pub fn new(id: impl Into<String>, effect_id: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            effect_id: effect_id.into(),
            selected: false,
            flexible: true,
            movable: true,
            disable: false,
            min_start: None,
            max_end: None,
        }
    }
}

/// An ordered lane holding zero or more actions. An action belongs to exactly
/// one row at rest; the ordering of `actions` is the caller's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineRow {
    pub id: String,
    #[serde(default)]
    pub actions: Vec<TimelineAction>,
    /// Per-row height override, px.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_height: Option<f64>,
    #[serde(default)]
    pub selected: bool,
}

impl TimelineRow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            actions: Vec::new(),
            row_height: None,
            selected: false,
        }
    }
}

/// The single source of truth, owned by the host. The engine never keeps a
/// persistent copy; it only reads rows to compute geometry and hands a full
/// replacement back through [`EditorHost::set_editor_data`] on commit.
pub type EditorData = Vec<TimelineRow>;

/// Checks host-supplied rows for times the engine cannot work with.
pub fn validate_editor_data(rows: &[TimelineRow]) -> Result<(), TimelineError> {
    for row in rows {
        for action in &row.actions {
            if action.start < 0.0 {
                return Err(TimelineError::StartTimeLessThanZero(action.id.clone()));
            }
            if action.end < action.start {
                return Err(TimelineError::EndTimeLessThanStartTime(action.id.clone()));
            }
        }
    }
    Ok(())
}

/// Looks up an action by id across all rows.
pub fn find_action<'a>(
    rows: &'a [TimelineRow],
    action_id: &str,
) -> Option<(usize, &'a TimelineRow, &'a TimelineAction)> {
    rows.iter().enumerate().find_map(|(index, row)| {
        row.actions
            .iter()
            .find(|action| action.id == action_id)
            .map(|action| (index, row, action))
    })
}
