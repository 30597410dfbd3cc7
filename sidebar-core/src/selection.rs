use crate::category::Category;
use crate::category::CategorySet;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Changed,
    Unchanged,
    /// The category is not in the known set; nothing was modified.
    Rejected,
}

/// What a wholesale replacement of the known set had to repair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub favorites_pruned: bool,
    pub selection_reset: bool,
}

/// Known environments, the active filter and the user's favorites.
///
/// After every [`SelectionState::reconcile`] the selection is either
/// `None` or a known environment, and favorites are a subset of the known
/// set. A selection restored from storage is kept until the first
/// discovery decides whether it still exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    known: CategorySet,
    selected: Option<Category>,
    favorites: BTreeSet<Category>,
}

impl SelectionState {
    pub fn restore(selected: Option<Category>, favorites: BTreeSet<Category>) -> Self {
        Self {
            known: CategorySet::new(),
            selected,
            favorites,
        }
    }

    pub fn known(&self) -> &CategorySet {
        &self.known
    }

    pub fn selected(&self) -> Option<&Category> {
        self.selected.as_ref()
    }

    pub fn favorites(&self) -> &BTreeSet<Category> {
        &self.favorites
    }

    /// Before the first discovery nothing is known yet and any category is
    /// accepted; the next discovery validates it.
    pub fn select(&mut self, category: Option<Category>) -> SelectOutcome {
        if category.as_ref().is_some_and(|c| !self.accepts(c)) {
            return SelectOutcome::Rejected;
        }
        if self.selected == category {
            return SelectOutcome::Unchanged;
        }
        self.selected = category;
        SelectOutcome::Changed
    }

    /// Flips membership and returns the new state, or `None` when the
    /// category is unknown.
    pub fn toggle_favorite(&mut self, category: &Category) -> Option<bool> {
        if self.favorites.remove(category) {
            return Some(false);
        }
        if !self.accepts(category) {
            return None;
        }
        self.favorites.insert(category.clone());
        Some(true)
    }

    fn accepts(&self, category: &Category) -> bool {
        self.known.is_empty() || self.known.contains(category)
    }

    /// Installs a freshly discovered set. Returns `None` when it has the same
    /// members as the current one, in which case nothing changes.
    pub fn reconcile(&mut self, discovered: CategorySet) -> Option<Reconciliation> {
        if self.known.same_members(&discovered) {
            return None;
        }
        self.known = discovered;

        let before = self.favorites.len();
        let known = &self.known;
        self.favorites.retain(|favorite| known.contains(favorite));
        let favorites_pruned = self.favorites.len() != before;

        let selection_reset = match &self.selected {
            Some(selected) if !self.known.contains(selected) => {
                self.selected = None;
                true
            }
            _ => false,
        };

        Some(Reconciliation {
            favorites_pruned,
            selection_reset,
        })
    }

    /// Fallback used when the popover could not be read at start-up: trust
    /// the label the host shows on its own disclosure control.
    ///
    /// An empty known set is seeded with the label (and with a restored
    /// selection, which stays valid), and a missing selection adopts the
    /// label. A set filled by discovery is authoritative: the label is only
    /// adopted when it names a listed category. Returns whether the
    /// selection changed.
    pub fn seed_from_host_label(&mut self, label: &str) -> bool {
        let Some(category) = Category::from_label(label) else {
            return false;
        };
        if self.known.is_empty() {
            self.known.insert(category.clone());
            if let Some(selected) = &self.selected {
                self.known.insert(selected.clone());
            }
        } else if !self.known.contains(&category) {
            return false;
        }
        if self.selected.is_some() {
            return false;
        }
        self.selected = Some(category);
        true
    }
}
