//! Per-point state machine.
//!
//! ```text
//!            start_edit                     reset_view / complete_save
//!  Display ──────────────► Editing(Idle) ───────────────────────────► Display
//!                            │    ▲
//!          set_saving /      │    │ set_aborting (shake, inputs back)
//!          set_deleting      ▼    │
//!                        Editing(Saving | Deleting)
//! ```
//!
//! Favorite toggles start in `Display` only and are optimistic: the shown
//! flag flips at once and is reverted by
//! [`ItemController::abort_favorite_toggle`]. The in-flight flag lives on the
//! controller, not on the mode, so opening and closing the form while a
//! toggle is pending does not allow a second one.

use std::sync::Arc;

use serde::Serialize;
use tripboard_core::{Point, PointDraft, PointId};

use crate::error::{BoardError, BoardResult};
use crate::keys::{CaptureOwner, KeyCapture, KeyCaptureRegistry};

/// What an open form is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BusyState {
    Idle,
    Saving,
    Deleting,
}

struct EditState {
    draft: PointDraft,
    busy: BusyState,
    _capture: KeyCapture,
}

enum ItemMode {
    Display,
    Editing(EditState),
}

/// Render state of one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum ItemView {
    #[serde(rename_all = "camelCase")]
    Display {
        point: Point,
        is_favorite: bool,
        favorite_pending: bool,
        shake: bool,
    },
    #[serde(rename_all = "camelCase")]
    Editing {
        point_id: PointId,
        draft: PointDraft,
        busy: BusyState,
        /// Inputs are disabled while a command is in flight.
        is_disabled: bool,
        shake: bool,
    },
}

impl ItemView {
    pub fn is_editing(&self) -> bool {
        matches!(self, ItemView::Editing { .. })
    }
}

pub struct ItemController {
    point: Point,
    mode: ItemMode,
    shown_favorite: bool,
    favorite_pending: bool,
    shake: bool,
    keys: Arc<KeyCaptureRegistry>,
}

impl ItemController {
    pub fn new(point: Point, keys: Arc<KeyCaptureRegistry>) -> Self {
        let shown_favorite = point.is_favorite;
        Self {
            point,
            mode: ItemMode::Display,
            shown_favorite,
            favorite_pending: false,
            shake: false,
            keys,
        }
    }

    pub fn id(&self) -> &PointId {
        &self.point.id
    }

    pub fn point(&self) -> &Point {
        &self.point
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, ItemMode::Editing(_))
    }

    pub fn busy(&self) -> Option<BusyState> {
        match &self.mode {
            ItemMode::Editing(edit) => Some(edit.busy),
            ItemMode::Display => None,
        }
    }

    /// `true` while the form has a save or delete queued or in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self.busy(), Some(BusyState::Saving | BusyState::Deleting))
    }

    /// Re-render with a newer version of the point.
    ///
    /// The shown favorite follows the new point unless a toggle is in
    /// flight. An open edit form keeps the user's draft.
    pub fn init(&mut self, point: Point) {
        if !self.favorite_pending {
            self.shown_favorite = point.is_favorite;
        }
        self.point = point;
    }

    /// Switch to the edit form. Returns `false` when already editing.
    pub fn start_edit(&mut self) -> bool {
        if self.is_editing() {
            return false;
        }
        let capture = self.keys.acquire(CaptureOwner::Item(self.point.id.clone()));
        self.mode = ItemMode::Editing(EditState {
            draft: PointDraft::from_point(&self.point),
            busy: BusyState::Idle,
            _capture: capture,
        });
        self.shake = false;
        tracing::debug!(point_id = %self.point.id, "Item opened for editing");
        true
    }

    /// Drop any open form and its unsaved edits.
    pub fn reset_view(&mut self) {
        if self.is_editing() {
            self.mode = ItemMode::Display;
            tracing::debug!(point_id = %self.point.id, "Item edit closed");
        }
    }

    /// Close the form after a successful save.
    pub fn complete_save(&mut self) {
        self.reset_view();
    }

    /// Release every resource before the item is discarded.
    pub fn destroy(mut self) {
        self.reset_view();
    }

    pub fn draft(&self) -> BoardResult<&PointDraft> {
        match &self.mode {
            ItemMode::Editing(edit) => Ok(&edit.draft),
            ItemMode::Display => Err(BoardError::NotEditing(self.point.id.clone())),
        }
    }

    /// Mutable access to the draft. Refused while a command is in flight.
    pub fn draft_mut(&mut self) -> BoardResult<&mut PointDraft> {
        match &mut self.mode {
            ItemMode::Editing(edit) if edit.busy == BusyState::Idle => {
                self.shake = false;
                Ok(&mut edit.draft)
            }
            ItemMode::Editing(_) => Err(BoardError::Busy),
            ItemMode::Display => Err(BoardError::NotEditing(self.point.id.clone())),
        }
    }

    pub fn set_saving(&mut self) {
        self.set_busy(BusyState::Saving);
    }

    pub fn set_deleting(&mut self) {
        self.set_busy(BusyState::Deleting);
    }

    /// A save or delete for this item failed.
    ///
    /// The edit form re-enables its inputs and keeps the user's edits.
    pub fn set_aborting(&mut self) {
        if let ItemMode::Editing(edit) = &mut self.mode {
            edit.busy = BusyState::Idle;
        }
        self.shake = true;
    }

    /// Flip the shown favorite and return the point to send.
    ///
    /// Returns `None` while a previous toggle is still in flight or the item
    /// is being edited.
    pub fn begin_favorite_toggle(&mut self) -> Option<Point> {
        if self.is_editing() || self.favorite_pending {
            return None;
        }
        self.shown_favorite = !self.shown_favorite;
        self.favorite_pending = true;
        self.shake = false;
        let mut update = self.point.clone();
        update.is_favorite = self.shown_favorite;
        Some(update)
    }

    pub fn finish_favorite_toggle(&mut self) {
        self.favorite_pending = false;
    }

    /// The in-flight favorite toggle failed: show the stored flag again.
    ///
    /// Only the card shakes. An edit form opened meanwhile is left alone.
    pub fn abort_favorite_toggle(&mut self) {
        self.favorite_pending = false;
        self.shown_favorite = self.point.is_favorite;
        if !self.is_editing() {
            self.shake = true;
        }
    }

    pub fn view(&self) -> ItemView {
        match &self.mode {
            ItemMode::Display => ItemView::Display {
                point: self.point.clone(),
                is_favorite: self.shown_favorite,
                favorite_pending: self.favorite_pending,
                shake: self.shake,
            },
            ItemMode::Editing(edit) => ItemView::Editing {
                point_id: self.point.id.clone(),
                draft: edit.draft.clone(),
                busy: edit.busy,
                is_disabled: edit.busy != BusyState::Idle,
                shake: self.shake,
            },
        }
    }

    fn set_busy(&mut self, busy: BusyState) {
        if let ItemMode::Editing(edit) = &mut self.mode {
            edit.busy = busy;
            self.shake = false;
        }
    }
}
