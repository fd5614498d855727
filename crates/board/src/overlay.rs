use std::sync::Arc;

use serde::Serialize;
use tripboard_core::PointDraft;

use crate::error::{BoardError, BoardResult};
use crate::item::BusyState;
use crate::keys::{CaptureOwner, KeyCapture, KeyCaptureRegistry};

/// The "new point" form mounted at the head of the list.
pub struct CreateOverlay {
    draft: PointDraft,
    busy: BusyState,
    shake: bool,
    _capture: KeyCapture,
}

/// Render state of the create overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayView {
    pub draft: PointDraft,
    pub busy: BusyState,
    pub is_disabled: bool,
    pub shake: bool,
}

impl CreateOverlay {
    pub fn open(keys: &Arc<KeyCaptureRegistry>) -> Self {
        Self {
            draft: PointDraft::blank(),
            busy: BusyState::Idle,
            shake: false,
            _capture: keys.acquire(CaptureOwner::Overlay),
        }
    }

    pub fn draft(&self) -> &PointDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> BoardResult<&mut PointDraft> {
        if self.busy != BusyState::Idle {
            return Err(BoardError::Busy);
        }
        self.shake = false;
        Ok(&mut self.draft)
    }

    pub fn busy(&self) -> BusyState {
        self.busy
    }

    pub fn is_busy(&self) -> bool {
        self.busy != BusyState::Idle
    }

    pub fn set_saving(&mut self) {
        self.busy = BusyState::Saving;
        self.shake = false;
    }

    pub fn set_aborting(&mut self) {
        self.busy = BusyState::Idle;
        self.shake = true;
    }

    pub fn view(&self) -> OverlayView {
        OverlayView {
            draft: self.draft.clone(),
            busy: self.busy,
            is_disabled: self.busy != BusyState::Idle,
            shake: self.shake,
        }
    }
}
