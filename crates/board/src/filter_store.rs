use tokio::sync::watch;
use tripboard_core::{Clock, FilterKind, Timestamp};
use tripboard_events::{SignalBus, SignalReceiver, UpdateScope};

/// Holds the active filter and the instant filters are evaluated at.
///
/// The instant is captured once from the [`Clock`] when the store is
/// created, so every projection and every tab count agrees on "now".
pub struct FilterStore {
    current: watch::Sender<FilterKind>,
    now: Timestamp,
    bus: SignalBus<FilterKind>,
}

impl FilterStore {
    pub fn new(clock: &dyn Clock, signal_capacity: usize) -> Self {
        let (current, _) = watch::channel(FilterKind::default());
        Self {
            current,
            now: clock.now(),
            bus: SignalBus::new(signal_capacity),
        }
    }

    pub fn filter(&self) -> FilterKind {
        *self.current.borrow()
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// Store `kind` and emit one signal with `scope`, even when `kind` is
    /// already active.
    pub fn set_filter(&self, scope: UpdateScope, kind: FilterKind) {
        self.current.send_replace(kind);
        self.bus.publish(scope, kind);
        tracing::debug!(filter = kind.label(), ?scope, "Filter changed");
    }

    pub fn subscribe(&self) -> SignalReceiver<FilterKind> {
        self.bus.subscribe()
    }
}
