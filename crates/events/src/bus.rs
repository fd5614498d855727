//! Typed in-process signal bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`SignalBus`] is the publish/subscribe hub used by the observable stores.
//! Every [`Signal`] carries an [`UpdateScope`] telling observers how much of
//! their derived state must be rebuilt, plus a store-specific payload.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

// ---------------------------------------------------------------------------
// UpdateScope / Signal
// ---------------------------------------------------------------------------

/// How far a change reaches into the observers' derived state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UpdateScope {
    /// Initial load finished, successfully or not.
    Init,
    /// One entity changed in place; no structural change.
    Patch,
    /// Structural change that keeps the current sort.
    Minor,
    /// Structural change that requires a full rebuild with defaults.
    Major,
}

/// A change notification emitted by a store.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal<P> {
    pub scope: UpdateScope,
    pub payload: P,
}

impl<P> Signal<P> {
    pub fn new(scope: UpdateScope, payload: P) -> Self {
        Self { scope, payload }
    }
}

// ---------------------------------------------------------------------------
// SignalBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
pub const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out bus for one payload type.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`Signal`].
///
/// # Usage
///
/// ```rust
/// use tripboard_events::{SignalBus, UpdateScope};
///
/// let bus: SignalBus<u32> = SignalBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(UpdateScope::Patch, 7);
/// assert_eq!(rx.drain().len(), 1);
/// ```
pub struct SignalBus<P> {
    sender: broadcast::Sender<Signal<P>>,
}

impl<P: Clone> SignalBus<P> {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unconsumed signals are dropped and
    /// slow receivers observe [`Received::Lagged`].
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish a signal to all current subscribers.
    ///
    /// Returns the number of subscribers that will see it. With no
    /// subscribers the signal is silently dropped.
    pub fn publish(&self, scope: UpdateScope, payload: P) -> usize {
        self.sender
            .send(Signal::new(scope, payload))
            .unwrap_or_default()
    }

    /// Subscribe to every signal published after this call.
    pub fn subscribe(&self) -> SignalReceiver<P> {
        SignalReceiver {
            rx: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<P: Clone> Default for SignalBus<P> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// SignalReceiver
// ---------------------------------------------------------------------------

/// One item read from a [`SignalReceiver`].
#[derive(Debug, Clone, PartialEq)]
pub enum Received<P> {
    Signal(Signal<P>),
    /// The receiver fell behind and this many signals were lost.
    Lagged(u64),
}

/// Receiving half of a [`SignalBus`] subscription.
pub struct SignalReceiver<P> {
    rx: broadcast::Receiver<Signal<P>>,
}

impl<P: Clone> SignalReceiver<P> {
    /// Wait for the next signal. Returns `None` once the bus is dropped.
    pub async fn recv(&mut self) -> Option<Received<P>> {
        match self.rx.recv().await {
            Ok(signal) => Some(Received::Signal(signal)),
            Err(RecvError::Lagged(missed)) => Some(Received::Lagged(missed)),
            Err(RecvError::Closed) => None,
        }
    }

    /// Take every signal already queued, without waiting.
    pub fn drain(&mut self) -> Vec<Received<P>> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(signal) => out.push(Received::Signal(signal)),
                Err(TryRecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Signal receiver lagged");
                    out.push(Received::Lagged(missed));
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
