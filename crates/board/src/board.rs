//! Board controller.
//!
//! Owns the visible list of [`ItemController`]s, the sort selection, the
//! create overlay and the empty/loading state. It subscribes to the points
//! store and the filter store at construction and reconciles in
//! [`BoardController::sync`], which every entry point calls before it
//! returns:
//!
//! | Signal scope      | Reaction                                          |
//! |-------------------|---------------------------------------------------|
//! | `Patch`           | re-render the one matching item, if visible       |
//! | `Minor` / lagged  | rebuild the list, keep the sort                   |
//! | `Major`           | rebuild the list, reset the sort to `Day`         |
//! | `Init`            | leave the loading state and render                |
//!
//! Mutating commands go through [`UiBlocker`], one at a time.

use std::future::Future;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use tokio::sync::Mutex;
use tripboard_core::filter::filter_tabs;
use tripboard_core::{
    project, Clock, Destination, FilterKind, FilterTab, OfferId, OffersByType, Point, PointDraft,
    PointId, SortKind, TripSummary,
};
use tripboard_events::{Received, Signal, SignalReceiver, UpdateScope};
use tripboard_remote::PointsApi;

use crate::blocker::{LockIndicator, UiBlocker};
use crate::config::BoardConfig;
use crate::error::{BoardError, BoardResult, StoreError};
use crate::filter_store::FilterStore;
use crate::item::{BusyState, ItemController, ItemView};
use crate::keys::{CaptureOwner, KeyCaptureRegistry};
use crate::overlay::{CreateOverlay, OverlayView};
use crate::store::{PointsStore, StoreChange, StoreSnapshot};

pub const LOADING_MESSAGE: &str = "Loading...";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load latest route information";

// ---------------------------------------------------------------------------
// Public views
// ---------------------------------------------------------------------------

/// Why the board shows a message instead of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "filter", rename_all = "camelCase")]
pub enum EmptyState {
    LoadFailed,
    NoPoints(FilterKind),
}

impl EmptyState {
    pub fn message(self) -> &'static str {
        match self {
            EmptyState::LoadFailed => LOAD_FAILED_MESSAGE,
            EmptyState::NoPoints(kind) => kind.empty_message(),
        }
    }
}

/// Which open form a draft edit is aimed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftTarget {
    Item(PointId),
    Overlay,
}

/// Everything a renderer needs to draw the board.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub loading: bool,
    /// Loading or empty-state message shown instead of the list.
    pub message: Option<&'static str>,
    pub empty: Option<EmptyState>,
    /// `None` while the sort control is not mounted.
    pub sort: Option<SortKind>,
    pub filter: FilterKind,
    pub filter_tabs: Vec<FilterTab>,
    pub items: Vec<ItemView>,
    pub overlay: Option<OverlayView>,
    pub new_point_enabled: bool,
    pub lock: LockIndicator,
    pub trip: Option<TripSummary>,
    pub destinations: Vec<Destination>,
    pub offers: OffersByType,
}

impl BoardSnapshot {
    /// Number of open edit forms, the overlay included.
    pub fn open_forms(&self) -> usize {
        self.items.iter().filter(|item| item.is_editing()).count() + usize::from(self.overlay.is_some())
    }
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

enum BoardEvent {
    Store(Signal<StoreChange>),
    Filter(Signal<FilterKind>),
    Lagged,
}

struct Inbox {
    store_rx: SignalReceiver<StoreChange>,
    filter_rx: SignalReceiver<FilterKind>,
}

impl Inbox {
    fn drain(&mut self) -> Vec<BoardEvent> {
        let store = self.store_rx.drain().into_iter().map(|received| match received {
            Received::Signal(signal) => BoardEvent::Store(signal),
            Received::Lagged(_) => BoardEvent::Lagged,
        });
        let filter = self.filter_rx.drain().into_iter().map(|received| match received {
            Received::Signal(signal) => BoardEvent::Filter(signal),
            Received::Lagged(_) => BoardEvent::Lagged,
        });
        store.chain(filter).collect()
    }
}

struct BoardState {
    loading: bool,
    sort: SortKind,
    list_mounted: bool,
    empty: Option<EmptyState>,
    items: IndexMap<PointId, ItemController>,
    overlay: Option<CreateOverlay>,
    /// Set from the moment creation starts until the overlay closes.
    creating: bool,
}

impl BoardState {
    fn item_mut(&mut self, id: &PointId) -> BoardResult<&mut ItemController> {
        self.items
            .get_mut(id)
            .ok_or_else(|| BoardError::UnknownItem(id.clone()))
    }

    /// `true` while any open form has a command queued or in flight.
    fn form_busy(&self) -> bool {
        self.items.values().any(ItemController::is_busy)
            || self
                .overlay
                .as_ref()
                .is_some_and(CreateOverlay::is_busy)
    }

    fn close_overlay(&mut self) -> bool {
        if self.overlay.take().is_none() {
            return false;
        }
        self.creating = false;
        tracing::debug!("New point form closed");
        true
    }
}

/// Which form a failed command aborts.
enum CommandTarget {
    Update(PointId),
    Favorite(PointId),
    Delete(PointId),
    Add,
}

// ---------------------------------------------------------------------------
// BoardController
// ---------------------------------------------------------------------------

pub struct BoardController {
    store: Arc<PointsStore>,
    filters: Arc<FilterStore>,
    blocker: Arc<UiBlocker>,
    keys: Arc<KeyCaptureRegistry>,
    inbox: Mutex<Inbox>,
    state: Mutex<BoardState>,
}

impl BoardController {
    pub fn new(
        store: Arc<PointsStore>,
        filters: Arc<FilterStore>,
        blocker: Arc<UiBlocker>,
        keys: Arc<KeyCaptureRegistry>,
    ) -> Self {
        let inbox = Inbox {
            store_rx: store.subscribe(),
            filter_rx: filters.subscribe(),
        };
        Self {
            store,
            filters,
            blocker,
            keys,
            inbox: Mutex::new(inbox),
            state: Mutex::new(BoardState {
                loading: true,
                sort: SortKind::default(),
                list_mounted: false,
                empty: None,
                items: IndexMap::new(),
                overlay: None,
                creating: false,
            }),
        }
    }

    /// Wire up a board with fresh stores for `api`.
    pub fn from_config(api: Arc<dyn PointsApi>, config: &BoardConfig, clock: &dyn Clock) -> Self {
        Self::new(
            Arc::new(PointsStore::new(api, config.signal_capacity)),
            Arc::new(FilterStore::new(clock, config.signal_capacity)),
            Arc::new(UiBlocker::new(config.blocker)),
            KeyCaptureRegistry::new(),
        )
    }

    pub fn store(&self) -> &Arc<PointsStore> {
        &self.store
    }

    pub fn filters(&self) -> &Arc<FilterStore> {
        &self.filters
    }

    pub fn blocker(&self) -> &Arc<UiBlocker> {
        &self.blocker
    }

    pub fn keys(&self) -> &Arc<KeyCaptureRegistry> {
        &self.keys
    }

    /// Load the store and render the result.
    pub async fn load(&self) {
        self.store.init().await;
        self.sync().await;
    }

    /// Apply every signal received since the last call.
    pub async fn sync(&self) {
        let mut inbox = self.inbox.lock().await;
        let events = inbox.drain();
        if events.is_empty() {
            return;
        }

        let data = self.store.snapshot().await;
        let mut state = self.state.lock().await;
        for event in events {
            self.apply(&mut state, &data, event);
        }
    }

    // -- list controls ------------------------------------------------------

    /// Change the sort. Returns `false` when nothing changed.
    pub async fn set_sort(&self, kind: SortKind) -> bool {
        self.sync().await;
        let data = self.store.snapshot().await;
        let mut state = self.state.lock().await;
        if state.sort == kind || !state.list_mounted {
            return false;
        }

        state.sort = kind;
        tracing::debug!(?kind, "Sort changed");
        self.rebuild(&mut state, &data, false);
        true
    }

    /// Change the filter. Returns `false` when `kind` is already active.
    pub async fn set_filter(&self, kind: FilterKind) -> bool {
        if self.filters.filter() == kind {
            return false;
        }
        self.filters.set_filter(UpdateScope::Major, kind);
        self.sync().await;
        true
    }

    // -- item edit forms ----------------------------------------------------

    /// Open the edit form of one item. Any other open form closes.
    ///
    /// Refused while another form has a command pending.
    pub async fn open_edit(&self, id: &PointId) -> BoardResult<()> {
        let mut state = self.state.lock().await;
        if state.item_mut(id)?.is_editing() {
            return Ok(());
        }
        if state.form_busy() {
            return Err(BoardError::Busy);
        }

        state.close_overlay();
        for item in state.items.values_mut() {
            item.reset_view();
        }
        state.item_mut(id)?.start_edit();
        Ok(())
    }

    /// Roll the edit form of one item back to its card, discarding edits.
    pub async fn close_edit(&self, id: &PointId) -> BoardResult<()> {
        let mut state = self.state.lock().await;
        let item = state.item_mut(id)?;
        if item.is_busy() {
            return Err(BoardError::Busy);
        }
        item.reset_view();
        Ok(())
    }

    /// Route an Escape press to the most recently opened form.
    pub async fn handle_escape(&self) -> bool {
        match self.keys.top() {
            Some(CaptureOwner::Overlay) => self.close_new_point().await,
            Some(CaptureOwner::Item(id)) => self.close_edit(&id).await.is_ok(),
            None => false,
        }
    }

    /// Apply `edit` to the draft of an open form.
    pub async fn edit_draft<R>(
        &self,
        target: &DraftTarget,
        edit: impl FnOnce(&mut PointDraft) -> R,
    ) -> BoardResult<R> {
        let mut state = self.state.lock().await;
        let draft = match target {
            DraftTarget::Item(id) => state.item_mut(id)?.draft_mut()?,
            DraftTarget::Overlay => state.overlay.as_mut().ok_or(BoardError::NoOverlay)?.draft_mut()?,
        };
        Ok(edit(draft))
    }

    /// Select or deselect an offer valid for the draft's type.
    pub async fn toggle_offer(&self, target: &DraftTarget, offer_id: &OfferId) -> BoardResult<()> {
        let offers = self.store.offers_by_type().await;
        self.edit_draft(target, |draft| draft.toggle_offer(offer_id, &offers))
            .await??;
        Ok(())
    }

    /// Pick a destination by its exact name. Unknown names clear it.
    pub async fn set_destination(&self, target: &DraftTarget, name: &str) -> BoardResult<()> {
        let destinations = self.store.destinations().await;
        self.edit_draft(target, |draft| draft.set_destination_by_name(name, &destinations))
            .await
    }

    /// Validate and save the edit form of `id`.
    ///
    /// The form is disabled from this call until the command settles. On
    /// success it closes. On failure it stays open with the user's edits and
    /// the error is returned.
    pub async fn submit_edit(&self, id: &PointId) -> BoardResult<Point> {
        let offers = self.store.offers_by_type().await;
        let update = {
            let mut state = self.state.lock().await;
            let item = state.item_mut(id)?;
            match item.busy() {
                Some(BusyState::Idle) => {}
                Some(_) => return Err(BoardError::Busy),
                None => return Err(BoardError::NotEditing(id.clone())),
            }
            let draft = item.draft()?;
            if let Err(e) = draft.validate(&offers) {
                item.set_aborting();
                return Err(e.into());
            }
            let update = draft.to_point()?;
            item.set_saving();
            update
        };

        let result = self
            .dispatch(CommandTarget::Update(id.clone()), self.store.update_point(&update))
            .await;
        self.sync().await;

        let saved = result?;
        if let Some(item) = self.state.lock().await.items.get_mut(id) {
            item.complete_save();
        }
        Ok(saved)
    }

    /// Delete the point behind the edit form of `id`.
    pub async fn delete_point(&self, id: &PointId) -> BoardResult<()> {
        let point = {
            let mut state = self.state.lock().await;
            let item = state.item_mut(id)?;
            match item.busy() {
                Some(BusyState::Idle) => {}
                Some(_) => return Err(BoardError::Busy),
                None => return Err(BoardError::NotEditing(id.clone())),
            }
            item.set_deleting();
            item.point().clone()
        };

        let result = self
            .dispatch(CommandTarget::Delete(id.clone()), self.store.delete_point(&point))
            .await;
        self.sync().await;
        result
    }

    /// Flip the favorite flag of a displayed item.
    ///
    /// Returns `Ok(false)` when ignored because a toggle for the same item
    /// is already in flight.
    pub async fn toggle_favorite(&self, id: &PointId) -> BoardResult<bool> {
        let update = {
            let mut state = self.state.lock().await;
            match state.item_mut(id)?.begin_favorite_toggle() {
                Some(update) => update,
                None => return Ok(false),
            }
        };

        let result = self
            .dispatch(CommandTarget::Favorite(id.clone()), self.store.update_point(&update))
            .await;
        if result.is_ok() {
            if let Some(item) = self.state.lock().await.items.get_mut(id) {
                item.finish_favorite_toggle();
            }
        }
        self.sync().await;
        result.map(|_| true)
    }

    // -- create overlay -----------------------------------------------------

    /// Open the "new point" form.
    ///
    /// Forces the `Everything` filter and the `Day` sort, closes any open
    /// item form and disables the new-point trigger. Returns `false` when a
    /// creation is already in progress.
    pub async fn create_point(&self) -> bool {
        {
            let mut state = self.state.lock().await;
            if state.creating || state.loading || state.form_busy() {
                return false;
            }
            state.creating = true;
            state.sort = SortKind::Day;
        }

        self.filters.set_filter(UpdateScope::Major, FilterKind::Everything);
        self.sync().await;

        let mut state = self.state.lock().await;
        for item in state.items.values_mut() {
            item.reset_view();
        }
        state.empty = None;
        state.overlay = Some(CreateOverlay::open(&self.keys));
        tracing::debug!("New point form opened");
        true
    }

    /// Validate and persist the overlay's draft.
    ///
    /// On success the board rebuilds and the overlay closes. On failure the
    /// overlay stays open with its draft.
    pub async fn submit_new_point(&self) -> BoardResult<Point> {
        let offers = self.store.offers_by_type().await;
        let draft = {
            let mut state = self.state.lock().await;
            let overlay = state.overlay.as_mut().ok_or(BoardError::NoOverlay)?;
            if overlay.is_busy() {
                return Err(BoardError::Busy);
            }
            if let Err(e) = overlay.draft().validate(&offers) {
                overlay.set_aborting();
                return Err(e.into());
            }
            let draft = overlay.draft().clone();
            overlay.set_saving();
            draft
        };

        let result = self
            .dispatch(CommandTarget::Add, self.store.add_point(&draft))
            .await;
        self.sync().await;
        result
    }

    /// Close the overlay without saving. Returns `false` when none is open
    /// or its draft is being saved.
    pub async fn close_new_point(&self) -> bool {
        let load_failed = self.store.is_load_failed().await;
        let mut state = self.state.lock().await;
        let saving = state
            .overlay
            .as_ref()
            .is_some_and(CreateOverlay::is_busy);
        if saving || !state.close_overlay() {
            return false;
        }
        if state.items.is_empty() && !state.loading {
            state.empty = Some(self.empty_state(load_failed));
        }
        true
    }

    // -- rendering ----------------------------------------------------------

    pub async fn snapshot(&self) -> BoardSnapshot {
        let data = self.store.snapshot().await;
        let state = self.state.lock().await;

        let message = if state.loading {
            Some(LOADING_MESSAGE)
        } else {
            state.empty.map(EmptyState::message)
        };

        BoardSnapshot {
            loading: state.loading,
            message,
            empty: state.empty,
            sort: state.list_mounted.then_some(state.sort),
            filter: self.filters.filter(),
            filter_tabs: filter_tabs(&data.points, self.filters.now()),
            items: state.items.values().map(ItemController::view).collect(),
            overlay: state.overlay.as_ref().map(CreateOverlay::view),
            new_point_enabled: !state.loading && !state.creating,
            lock: self.blocker.indicator(),
            trip: TripSummary::build(&data.points, &data.destinations, &data.offers),
            destinations: data.destinations,
            offers: data.offers,
        }
    }

    // ---- private helpers ----

    /// Run one mutating command behind the blocking gate.
    ///
    /// Callers mark the target form busy before calling, so it stays
    /// disabled while the command waits for the gate. A failed command
    /// aborts the target. The gate is released on every path.
    async fn dispatch<T>(
        &self,
        target: CommandTarget,
        command: impl Future<Output = Result<T, StoreError>>,
    ) -> BoardResult<T> {
        let _guard = self.blocker.block().await;

        let result = command.await;

        if let Err(e) = &result {
            tracing::warn!(error = %e, "Board command failed");
            let mut state = self.state.lock().await;
            match &target {
                CommandTarget::Update(id) | CommandTarget::Delete(id) => {
                    if let Some(item) = state.items.get_mut(id) {
                        item.set_aborting();
                    }
                }
                CommandTarget::Favorite(id) => {
                    if let Some(item) = state.items.get_mut(id) {
                        item.abort_favorite_toggle();
                    }
                }
                CommandTarget::Add => {
                    if let Some(overlay) = state.overlay.as_mut() {
                        overlay.set_aborting();
                    }
                }
            }
        }

        result.map_err(BoardError::from)
    }

    fn apply(&self, state: &mut BoardState, data: &StoreSnapshot, event: BoardEvent) {
        let scope = match event {
            BoardEvent::Store(Signal {
                scope: UpdateScope::Patch,
                payload: StoreChange::Updated(point),
            }) => {
                if let Some(item) = state.items.get_mut(&point.id) {
                    item.init(point);
                }
                return;
            }
            BoardEvent::Store(signal) => signal.scope,
            BoardEvent::Filter(signal) => signal.scope,
            BoardEvent::Lagged => UpdateScope::Minor,
        };

        match scope {
            UpdateScope::Init => {
                state.loading = false;
                self.rebuild(state, data, false);
            }
            UpdateScope::Major => self.rebuild(state, data, true),
            UpdateScope::Minor | UpdateScope::Patch => self.rebuild(state, data, false),
        }
    }

    fn rebuild(&self, state: &mut BoardState, data: &StoreSnapshot, reset_sort: bool) {
        // clear
        state.close_overlay();
        for (_, item) in state.items.drain(..) {
            item.destroy();
        }
        state.list_mounted = false;
        state.empty = None;
        if reset_sort {
            state.sort = SortKind::Day;
        }

        // render
        if state.loading {
            return;
        }
        let visible = project(
            &data.points,
            self.filters.filter(),
            state.sort,
            self.filters.now(),
        );
        if visible.is_empty() {
            state.empty = Some(self.empty_state(data.load_failed));
            return;
        }

        state.list_mounted = true;
        for point in visible {
            let item = ItemController::new(point, Arc::clone(&self.keys));
            state.items.insert(item.id().clone(), item);
        }
        tracing::debug!(items = state.items.len(), sort = ?state.sort, "Board rendered");
    }

    fn empty_state(&self, load_failed: bool) -> EmptyState {
        if load_failed {
            EmptyState::LoadFailed
        } else {
            EmptyState::NoPoints(self.filters.filter())
        }
    }
}
