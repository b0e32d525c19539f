//! Cross-row relocation: ghost bookkeeping, vertical row resolution, and the
//! copy-on-write commit helpers used at gesture end.
//!
//! Commits never mutate the host's rows in place. They build a fresh
//! `Vec<TimelineRow>` with fresh row/action values, so the host can detect
//! the change by value comparison and a mid-gesture snapshot never observes
//! an action in two rows at once.

use crate::{TimeRange, TimelineAction, TimelineError, TimelineRow};

/// Transient preview clone of an action while it is dragged across rows.
/// Never part of committed editor data; discarded on abort.
#[derive(Debug, Clone, PartialEq)]
pub struct Ghost {
    /// Clone of the source action under a derived id.
    pub action: TimelineAction,
    pub source_row_id: String,
    pub source_row_index: usize,
    /// Candidate target row, updated as the pointer crosses rows.
    pub row_index: usize,
}

impl Ghost {
    pub fn new(action: &TimelineAction, row: &TimelineRow, row_index: usize) -> Self {
        let mut clone = action.clone();
        clone.id = ghost_id(&action.id);
        Self {
            action: clone,
            source_row_id: row.id.clone(),
            source_row_index: row_index,
            row_index,
        }
    }

    /// Whether the ghost currently targets a row other than its source.
    pub fn relocated(&self) -> bool {
        self.row_index != self.source_row_index
    }
}

pub fn ghost_id(action_id: &str) -> String {
    format!("{action_id}-ghost")
}

/// Maps a vertical content offset to a row index by accumulating row heights
/// top-down. Offsets past the last row clamp to the last row.
pub fn row_index_at(y: f64, rows: &[TimelineRow], default_row_height: f64) -> usize {
    let mut bottom = 0.0;
    for (index, row) in rows.iter().enumerate() {
        bottom += row.row_height.unwrap_or(default_row_height);
        if y < bottom {
            return index;
        }
    }
    rows.len().saturating_sub(1)
}

/// Vertical content offset of the top of `row_index`.
pub fn row_top(rows: &[TimelineRow], row_index: usize, default_row_height: f64) -> f64 {
    rows.iter()
        .take(row_index)
        .map(|row| row.row_height.unwrap_or(default_row_height))
        .sum()
}

/// Commits a new time range for an action that stayed in its row.
pub fn commit_in_row(
    rows: &[TimelineRow],
    row_id: &str,
    action_id: &str,
    range: TimeRange,
) -> Result<Vec<TimelineRow>, TimelineError> {
    let row = rows
        .iter()
        .find(|row| row.id == row_id)
        .ok_or_else(|| TimelineError::RowNotFound(row_id.to_string()))?;
    if !row.actions.iter().any(|action| action.id == action_id) {
        return Err(TimelineError::ActionNotFound(action_id.to_string()));
    }

    Ok(rows
        .iter()
        .map(|row| {
            if row.id != row_id {
                return row.clone();
            }
            let mut next = row.clone();
            for action in &mut next.actions {
                if action.id == action_id {
                    action.start = range.start;
                    action.end = range.end;
                }
            }
            next
        })
        .collect())
}

/// Commits a move of an action from its source row into `target_index` with
/// the final time range. The action is removed from the source and appended
/// to the target (re-sorted by start) in a single pass; a target index past
/// the end clamps to the last row. A target equal to the source degenerates
/// to [`commit_in_row`].
pub fn commit_move(
    rows: &[TimelineRow],
    action_id: &str,
    source_row_id: &str,
    target_index: usize,
    range: TimeRange,
) -> Result<Vec<TimelineRow>, TimelineError> {
    let source = rows
        .iter()
        .find(|row| row.id == source_row_id)
        .ok_or_else(|| TimelineError::RowNotFound(source_row_id.to_string()))?;
    let action = source
        .actions
        .iter()
        .find(|action| action.id == action_id)
        .ok_or_else(|| TimelineError::ActionNotFound(action_id.to_string()))?;

    let target_index = target_index.min(rows.len().saturating_sub(1));
    if rows[target_index].id == source_row_id {
        return commit_in_row(rows, source_row_id, action_id, range);
    }

    let mut moved = action.clone();
    moved.start = range.start;
    moved.end = range.end;

    Ok(rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            if row.id == source_row_id {
                let mut next = row.clone();
                next.actions.retain(|action| action.id != action_id);
                next
            } else if index == target_index {
                let mut next = row.clone();
                next.actions.push(moved.clone());
                next.actions.sort_by(|a, b| a.start.total_cmp(&b.start));
                next
            } else {
                row.clone()
            }
        })
        .collect())
}
