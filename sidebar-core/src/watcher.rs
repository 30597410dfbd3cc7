use crate::host::HostDocument;
use crate::host::MutationBatch;
use codex_async_utils::DebounceTicket;
use codex_async_utils::Debouncer;
use std::cell::RefCell;
use std::time::Duration;

/// Subtrees the sidebar renders itself. Mutations confined to them are our
/// own writes and must not schedule another filter pass.
#[derive(Debug)]
pub struct OwnedRegions<N> {
    roots: RefCell<Vec<N>>,
}

impl<N> Default for OwnedRegions<N> {
    fn default() -> Self {
        Self {
            roots: RefCell::new(Vec::new()),
        }
    }
}

impl<N: Clone + PartialEq> OwnedRegions<N> {
    /// Swaps in the view's current roots; a remounted panel's detached
    /// predecessor is forgotten.
    pub fn replace(&self, roots: impl IntoIterator<Item = N>) {
        let mut current = self.roots.borrow_mut();
        current.clear();
        for root in roots {
            if !current.contains(&root) {
                current.push(root);
            }
        }
    }

    pub fn is_owned<D: HostDocument<Node = N>>(&self, doc: &D, node: &N) -> bool {
        self.roots
            .borrow()
            .iter()
            .any(|root| doc.contains(root, node))
    }
}

/// Turns host mutation batches into debounced filter passes.
pub struct ChangeWatcher<N> {
    regions: OwnedRegions<N>,
    debouncer: Debouncer,
}

impl<N: Clone + PartialEq> ChangeWatcher<N> {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            regions: OwnedRegions::default(),
            debouncer: Debouncer::new(quiet_period),
        }
    }

    pub fn regions(&self) -> &OwnedRegions<N> {
        &self.regions
    }

    pub fn quiet_period(&self) -> Duration {
        self.debouncer.quiet_period()
    }

    /// False for empty batches and for batches whose every target lies in
    /// an owned region.
    pub fn is_relevant<D: HostDocument<Node = N>>(&self, doc: &D, batch: &MutationBatch<N>) -> bool {
        !batch.is_empty()
            && !batch
                .targets
                .iter()
                .all(|target| self.regions.is_owned(doc, target))
    }

    /// Starts (or restarts) the quiet period. The pass should only run if
    /// the ticket is still current once the period elapses.
    pub fn arm(&self) -> DebounceTicket {
        self.debouncer.arm()
    }

    pub fn cancel_pending(&self) {
        self.debouncer.cancel();
    }
}
