//! The engine context: one instance per page activation, owning every
//! component and the shared selection state.

use crate::category::Category;
use crate::config::SidebarConfig;
use crate::discovery::DiscoveryOutcome;
use crate::discovery::EntityDiscovery;
use crate::filter::CategoryExtractor;
use crate::filter::FilterEngine;
use crate::filter::FilterReport;
use crate::filter::LastTokenExtractor;
use crate::host::HostDocument;
use crate::host::Location;
use crate::host::MutationBatch;
use crate::route::RouteGate;
use crate::route::RouteSubscription;
use crate::runtime::Scheduler;
use crate::sections::SectionReconciler;
use crate::selection::SelectOutcome;
use crate::selection::SelectionState;
use crate::store::KeyValueStore;
use crate::store::PersistenceStore;
use crate::view::RenderModel;
use crate::view::View;
use crate::view::ViewIntent;
use crate::watcher::ChangeWatcher;
use codex_async_utils::OrCancelExt;
use std::cell::Cell;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Callback a [`View`] uses to hand user intents back to the engine.
pub type IntentSink = Rc<dyn Fn(ViewIntent)>;

/// Wires discovery, selection, filtering and the view together.
///
/// Everything runs on the host's UI thread. State lives in `RefCell`s and
/// no borrow is held across an `.await`; the only suspension points are the
/// discovery poll and the mutation debounce.
pub struct SidebarEngine<D, V>
where
    D: HostDocument + 'static,
    V: View<Node = D::Node> + 'static,
{
    config: SidebarConfig,
    doc: Rc<D>,
    view: Rc<V>,
    scheduler: Rc<dyn Scheduler>,
    store: PersistenceStore,
    route: RouteGate,
    discovery: EntityDiscovery,
    filter: FilterEngine,
    sections: SectionReconciler,
    watcher: ChangeWatcher<D::Node>,
    state: RefCell<SelectionState>,
    /// Single-flight flag for discovery.
    updating: Cell<bool>,
    active: Cell<bool>,
    route_subscription: Cell<Option<RouteSubscription>>,
    shutdown: CancellationToken,
}

impl<D, V> SidebarEngine<D, V>
where
    D: HostDocument + 'static,
    V: View<Node = D::Node> + 'static,
{
    pub fn new(
        config: SidebarConfig,
        doc: Rc<D>,
        view: Rc<V>,
        backend: Rc<dyn KeyValueStore>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Rc<Self> {
        Self::with_extractor(
            config,
            doc,
            view,
            backend,
            scheduler,
            Box::new(LastTokenExtractor),
        )
    }

    pub fn with_extractor(
        config: SidebarConfig,
        doc: Rc<D>,
        view: Rc<V>,
        backend: Rc<dyn KeyValueStore>,
        scheduler: Rc<dyn Scheduler>,
        extractor: Box<dyn CategoryExtractor>,
    ) -> Rc<Self> {
        let store = PersistenceStore::new(backend, config.storage.clone());
        let state = SelectionState::restore(store.load_selection(), store.load_favorites());
        let route = RouteGate::new(&config.route, &doc.location());
        let discovery = EntityDiscovery::new(config.labels.clone(), config.timing);
        let watcher = ChangeWatcher::new(config.timing.debounce());
        Rc::new(Self {
            config,
            doc,
            view,
            scheduler,
            store,
            route,
            discovery,
            filter: FilterEngine::new(extractor),
            sections: SectionReconciler,
            watcher,
            state: RefCell::new(state),
            updating: Cell::new(false),
            active: Cell::new(false),
            route_subscription: Cell::new(None),
            shutdown: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &SidebarConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn selection(&self) -> Option<Category> {
        self.state.borrow().selected().cloned()
    }

    pub fn favorites(&self) -> BTreeSet<Category> {
        self.state.borrow().favorites().clone()
    }

    pub fn known_categories(&self) -> Vec<Category> {
        self.state.borrow().known().sorted_for_display()
    }

    /// Subscribes to navigations, activates for the current location and,
    /// when in scope, runs the start-up discovery sequence:
    ///
    /// 1. read a popover that is already open, without opening it;
    /// 2. otherwise fall back to the label on the host's disclosure control;
    /// 3. shortly after, force the popover open to fill in the full list.
    pub async fn start(self: &Rc<Self>) {
        if self.route_subscription.get().is_some() {
            debug!("sidebar engine already started");
            return;
        }
        let weak = Rc::downgrade(self);
        let subscription = self.route.subscribe(move |location| {
            if let Some(engine) = weak.upgrade() {
                engine.handle_route_change(location);
            }
        });
        self.route_subscription.set(Some(subscription));

        let location = self.doc.location();
        self.handle_route_change(&location);
        if !self.active.get() {
            info!(href = %location.href, "sidebar idle outside the codex task list");
            return;
        }

        self.refresh(false).await;
        self.seed_from_host_control();
        self.refilter_or_render();
        self.schedule_forced_refresh();
    }

    /// Shows and refreshes the panel in scope, hides it elsewhere.
    pub fn handle_route_change(&self, location: &Location) {
        if !self.route.is_in_scope(location) {
            if self.active.replace(false) {
                info!(href = %location.href, "left codex task list; hiding sidebar");
            }
            self.view.set_visible(false);
            return;
        }
        self.view.mount();
        self.watcher.regions().replace(self.view.owned_roots());
        if !self.active.replace(true) {
            info!(href = %location.href, "codex task list active; showing sidebar");
        }
        self.view.set_visible(true);
        self.refilter_or_render();
    }

    /// Feeds the current location to the route gate. Called from history
    /// hooks and from the mutation fallback.
    pub fn notify_navigation(&self) -> bool {
        self.route.observe(&self.doc.location())
    }

    /// Reads the popover and installs what it lists. Returns `None` when a
    /// discovery was already in flight.
    pub async fn refresh(&self, force_open: bool) -> Option<DiscoveryOutcome> {
        let Some(_flight) = FlightGuard::acquire(&self.updating) else {
            debug!("environment discovery already in flight");
            return None;
        };
        let outcome = self
            .discovery
            .discover(
                self.doc.as_ref(),
                self.scheduler.as_ref(),
                force_open,
                self.config.timing.discovery_timeout(),
            )
            .await;
        if let DiscoveryOutcome::Found(categories) = &outcome {
            self.install_categories(categories.clone());
        }
        Some(outcome)
    }

    /// Changes the active filter, then mirrors the choice into the host's
    /// own popover. Re-selecting the active category still mirrors it, which
    /// realigns a host control that drifted.
    pub async fn select(&self, category: Option<Category>) {
        let outcome = self.state.borrow_mut().select(category.clone());
        match outcome {
            SelectOutcome::Rejected => {
                warn!(
                    category = category.as_ref().map(Category::as_str),
                    "ignoring selection of unknown environment"
                );
                return;
            }
            SelectOutcome::Unchanged => {}
            SelectOutcome::Changed => self.store.save_selection(category.as_ref()),
        }
        self.refilter_or_render();

        if let Some(category) = category {
            self.discovery
                .mirror_selection(self.doc.as_ref(), self.scheduler.as_ref(), &category)
                .await;
        }
    }

    pub fn toggle_favorite(&self, category: &Category) {
        let toggled = self.state.borrow_mut().toggle_favorite(category);
        let Some(favorite) = toggled else {
            warn!(%category, "ignoring favorite toggle for unknown environment");
            return;
        };
        debug!(%category, favorite, "toggled favorite");
        self.store.save_favorites(self.state.borrow().favorites());
        self.refilter_or_render();
    }

    /// Re-filters the rows, reconciles section headers and re-renders.
    /// A no-op outside the task list.
    pub fn apply(&self) -> Option<FilterReport> {
        if !self.route.is_in_scope(&self.doc.location()) {
            return None;
        }
        let report = {
            let state = self.state.borrow();
            self.filter.apply(self.doc.as_ref(), state.selected())
        };
        self.sections.reconcile(self.doc.as_ref());
        self.view.render(&self.render_model(report.visible));
        Some(report)
    }

    pub fn render(&self) {
        let visible = self.filter.visible_item_count(self.doc.as_ref());
        self.view.render(&self.render_model(visible));
    }

    pub fn render_model(&self, visible_item_count: usize) -> RenderModel {
        let state = self.state.borrow();
        RenderModel {
            known_categories: state.known().sorted_for_display(),
            selection: state.selected().cloned(),
            favorites: state.favorites().clone(),
            visible_item_count,
        }
    }

    /// Entry point for the host's mutation observer.
    pub fn on_mutations(self: &Rc<Self>, batch: MutationBatch<D::Node>) {
        self.notify_navigation();
        if !self.active.get() || !self.watcher.is_relevant(self.doc.as_ref(), &batch) {
            return;
        }
        let ticket = self.watcher.arm();
        let quiet = self.scheduler.sleep(self.watcher.quiet_period());
        let engine = Rc::clone(self);
        self.scheduler.spawn_local(Box::pin(async move {
            if quiet.or_cancel(&engine.shutdown).await.is_err() || !ticket.is_current() {
                return;
            }
            engine.apply();
        }));
    }

    /// Entry point for clicks on the host page. When the user opens the
    /// environment popover themselves, read it while it is open.
    pub fn on_host_activation(self: &Rc<Self>, target: &D::Node) {
        if !self.active.get() {
            return;
        }
        let Some(control) = self.doc.disclosure_control() else {
            return;
        };
        if !self.doc.contains(&control, target) {
            return;
        }
        let engine = Rc::clone(self);
        self.scheduler.spawn_local(Box::pin(async move {
            engine.refresh(false).await;
        }));
    }

    pub fn handle_intent(self: &Rc<Self>, intent: ViewIntent) {
        match intent {
            ViewIntent::SelectCategory(category) => {
                let engine = Rc::clone(self);
                self.scheduler.spawn_local(Box::pin(async move {
                    engine.select(category).await;
                }));
            }
            ViewIntent::ToggleFavorite(category) => self.toggle_favorite(&category),
            ViewIntent::Refresh => {
                let engine = Rc::clone(self);
                self.scheduler.spawn_local(Box::pin(async move {
                    engine.refresh(true).await;
                }));
            }
        }
    }

    pub fn intent_sink(self: &Rc<Self>) -> IntentSink {
        let weak = Rc::downgrade(self);
        Rc::new(move |intent| {
            if let Some(engine) = weak.upgrade() {
                engine.handle_intent(intent);
            }
        })
    }

    /// Stops pending timers, detaches from navigation and hides the panel.
    /// Discovery polls already running finish on their own.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.watcher.cancel_pending();
        if let Some(subscription) = self.route_subscription.take() {
            self.route.unsubscribe(subscription);
        }
        self.active.set(false);
        self.view.set_visible(false);
    }

    fn install_categories(&self, categories: crate::category::CategorySet) {
        let Some(reconciliation) = self.state.borrow_mut().reconcile(categories) else {
            return;
        };
        {
            let state = self.state.borrow();
            if reconciliation.favorites_pruned {
                self.store.save_favorites(state.favorites());
            }
            if reconciliation.selection_reset {
                self.store.save_selection(None);
            }
            info!(
                known = state.known().len(),
                favorites_pruned = reconciliation.favorites_pruned,
                selection_reset = reconciliation.selection_reset,
                "environment list changed"
            );
        }
        self.refilter_or_render();
    }

    fn seed_from_host_control(&self) {
        let Some(control) = self.doc.disclosure_control() else {
            return;
        };
        let label = self.doc.text(&control);
        if self.state.borrow_mut().seed_from_host_label(&label) {
            debug!(label = label.trim(), "adopted host's current environment");
        }
    }

    fn schedule_forced_refresh(self: &Rc<Self>) {
        let delay = self.scheduler.sleep(self.config.timing.forced_refresh_delay());
        let engine = Rc::clone(self);
        self.scheduler.spawn_local(Box::pin(async move {
            if delay.or_cancel(&engine.shutdown).await.is_ok() {
                engine.refresh(true).await;
            }
        }));
    }

    fn refilter_or_render(&self) {
        if self.apply().is_none() {
            self.render();
        }
    }
}

/// Holds the single-flight flag for the duration of one discovery.
struct FlightGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self { flag })
        }
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}
