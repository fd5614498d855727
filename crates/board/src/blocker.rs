//! Blocking gate for mutating commands.
//!
//! [`UiBlocker`] lets at most one board command talk to the backend at a
//! time. Later callers of [`UiBlocker::block`] wait in FIFO order until the
//! current [`BlockGuard`] is dropped.
//!
//! The lock indicator is delayed so fast responses never flash it:
//!
//! | Time held                   | [`LockIndicator`] |
//! |-----------------------------|-------------------|
//! | below `lower_limit`         | `Hidden`          |
//! | `lower_limit..upper_limit`  | `Shown`           |
//! | from `upper_limit`          | `Escalated`       |
//!
//! Dropping the guard hides the indicator immediately.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{watch, Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;

/// Timing bounds for the lock indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockerConfig {
    /// Hold time after which the indicator is shown (default: 350 ms).
    pub lower_limit: Duration,
    /// Hold time after which the indicator escalates (default: 1000 ms).
    pub upper_limit: Duration,
}

impl Default for BlockerConfig {
    fn default() -> Self {
        Self {
            lower_limit: Duration::from_millis(350),
            upper_limit: Duration::from_millis(1000),
        }
    }
}

/// What the rendering layer should show while the gate is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LockIndicator {
    Hidden,
    Shown,
    Escalated,
}

/// FIFO gate with a delayed lock indicator.
pub struct UiBlocker {
    gate: Arc<Mutex<()>>,
    config: BlockerConfig,
    indicator: Arc<watch::Sender<LockIndicator>>,
    /// Bumped on every release so a stale timer cannot resurrect the
    /// indicator of a guard that is already gone.
    epoch: Arc<AtomicU64>,
}

impl UiBlocker {
    pub fn new(config: BlockerConfig) -> Self {
        let (indicator, _) = watch::channel(LockIndicator::Hidden);
        Self {
            gate: Arc::new(Mutex::new(())),
            config,
            indicator: Arc::new(indicator),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Wait for the gate, then hold it until the returned guard is dropped.
    pub async fn block(&self) -> BlockGuard {
        let permit = Arc::clone(&self.gate).lock_owned().await;
        let epoch = self.epoch.load(Ordering::SeqCst);

        let indicator = Arc::clone(&self.indicator);
        let current_epoch = Arc::clone(&self.epoch);
        let BlockerConfig {
            lower_limit,
            upper_limit,
        } = self.config;

        let timer = tokio::spawn(async move {
            tokio::time::sleep(lower_limit).await;
            set_if_current(&indicator, &current_epoch, epoch, LockIndicator::Shown);

            tokio::time::sleep(upper_limit.saturating_sub(lower_limit)).await;
            if set_if_current(&indicator, &current_epoch, epoch, LockIndicator::Escalated) {
                tracing::warn!(
                    upper_limit_ms = upper_limit.as_millis() as u64,
                    "Board still blocked past the upper limit",
                );
            }
        });

        BlockGuard {
            _permit: permit,
            timer,
            indicator: Arc::clone(&self.indicator),
            epoch: Arc::clone(&self.epoch),
        }
    }

    /// Current indicator state.
    pub fn indicator(&self) -> LockIndicator {
        *self.indicator.borrow()
    }

    /// Subscribe to indicator changes.
    pub fn watch_indicator(&self) -> watch::Receiver<LockIndicator> {
        self.indicator.subscribe()
    }

    /// Returns `true` while some command holds the gate.
    pub fn is_blocked(&self) -> bool {
        self.gate.try_lock().is_err()
    }

    pub fn config(&self) -> BlockerConfig {
        self.config
    }
}

impl Default for UiBlocker {
    fn default() -> Self {
        Self::new(BlockerConfig::default())
    }
}

fn set_if_current(
    indicator: &watch::Sender<LockIndicator>,
    current_epoch: &AtomicU64,
    epoch: u64,
    value: LockIndicator,
) -> bool {
    indicator.send_if_modified(|state| {
        if current_epoch.load(Ordering::SeqCst) != epoch || *state == value {
            return false;
        }
        *state = value;
        true
    })
}

/// Holds the gate. Dropping it releases the gate and hides the indicator.
pub struct BlockGuard {
    _permit: OwnedMutexGuard<()>,
    timer: JoinHandle<()>,
    indicator: Arc<watch::Sender<LockIndicator>>,
    epoch: Arc<AtomicU64>,
}

impl Drop for BlockGuard {
    fn drop(&mut self) {
        self.timer.abort();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.indicator.send_replace(LockIndicator::Hidden);
    }
}
