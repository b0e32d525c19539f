//! Magnetic guide-line bookkeeping.
//!
//! At gesture start the assist set is computed once and frozen: the start/end
//! pixel positions of every other action the host did not exclude, plus the
//! playhead unless hidden. During the gesture only the moving action's edge
//! positions are refreshed, so the host can highlight whichever assist lines
//! are currently hit.

use crate::{time_to_pixel, ScaleConfig, TimelineRow};

const MATCH_EPS: f64 = 1e-6;

/// Guide-line pixel positions for the current gesture: the frozen assist set
/// and the moving action's live edge positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragLineData {
    pub assist_positions: Vec<f64>,
    pub move_positions: Vec<f64>,
    pub is_moving: bool,
}

/// Computes the frozen assist set for one gesture. `assist_action_ids`
/// overrides which actions contribute; by default every action other than the
/// moving one does. `cursor_left` is the playhead pixel position, `None` when
/// the host hides the cursor.
pub fn assist_positions(
    rows: &[TimelineRow],
    moving_action_id: &str,
    assist_action_ids: Option<&[String]>,
    cursor_left: Option<f64>,
    cfg: &ScaleConfig,
) -> Vec<f64> {
    let mut positions = Vec::new();
    if let Some(cursor) = cursor_left {
        positions.push(cursor);
    }
    for row in rows {
        for action in &row.actions {
            if action.id == moving_action_id {
                continue;
            }
            if let Some(ids) = assist_action_ids {
                if !ids.iter().any(|id| id == &action.id) {
                    continue;
                }
            }
            positions.push(time_to_pixel(action.start, cfg));
            positions.push(time_to_pixel(action.end, cfg));
        }
    }
    positions.sort_by(f64::total_cmp);
    positions.dedup();
    positions
}

/// Lifecycle holder for [`DragLineData`], rebuilt at every gesture start and
/// cleared at every gesture end.
#[derive(Debug, Clone, Default)]
pub struct DragLines {
    data: DragLineData,
}

impl DragLines {
    pub fn init(&mut self, assist_positions: Vec<f64>) {
        self.data = DragLineData {
            assist_positions,
            move_positions: Vec::new(),
            is_moving: true,
        };
    }

    pub fn update(&mut self, move_positions: Vec<f64>) {
        if self.data.is_moving {
            self.data.move_positions = move_positions;
        }
    }

    pub fn dispose(&mut self) {
        self.data = DragLineData::default();
    }

    pub fn data(&self) -> &DragLineData {
        &self.data
    }

    /// Assist lines currently matched by a moving edge, for highlighting.
    pub fn active_positions(&self) -> Vec<f64> {
        self.data
            .assist_positions
            .iter()
            .copied()
            .filter(|assist| {
                self.data
                    .move_positions
                    .iter()
                    .any(|edge| (edge - assist).abs() < MATCH_EPS)
            })
            .collect()
    }
}
