//! Scoped Escape-key captures.
//!
//! A form that is open registers a capture and keeps the returned
//! [`KeyCapture`] for as long as it listens. Dropping the guard releases the
//! capture, so every way a form closes (submit, cancel, rebuild, destroy)
//! releases it exactly once.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tripboard_core::PointId;

/// Which form holds a capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "pointId", rename_all = "lowercase")]
pub enum CaptureOwner {
    Item(PointId),
    Overlay,
}

/// Registry of live Escape captures, most recent last.
#[derive(Debug, Default)]
pub struct KeyCaptureRegistry {
    active: Mutex<Vec<(u64, CaptureOwner)>>,
    next_token: AtomicU64,
}

impl KeyCaptureRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn acquire(self: &Arc<Self>, owner: CaptureOwner) -> KeyCapture {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        self.entries().push((token, owner.clone()));
        tracing::trace!(?owner, "Escape capture acquired");
        KeyCapture {
            registry: Arc::clone(self),
            token,
            owner,
        }
    }

    /// The capture that receives the next Escape press.
    pub fn top(&self) -> Option<CaptureOwner> {
        self.entries().last().map(|(_, owner)| owner.clone())
    }

    pub fn active_owners(&self) -> Vec<CaptureOwner> {
        self.entries().iter().map(|(_, owner)| owner.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn release(&self, token: u64) {
        self.entries().retain(|(t, _)| *t != token);
    }

    fn entries(&self) -> MutexGuard<'_, Vec<(u64, CaptureOwner)>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A live Escape capture. Released on drop.
#[derive(Debug)]
pub struct KeyCapture {
    registry: Arc<KeyCaptureRegistry>,
    token: u64,
    owner: CaptureOwner,
}

impl KeyCapture {
    pub fn owner(&self) -> &CaptureOwner {
        &self.owner
    }
}

impl Drop for KeyCapture {
    fn drop(&mut self) {
        self.registry.release(self.token);
        tracing::trace!(owner = ?self.owner, "Escape capture released");
    }
}
