use crate::category::Category;
use std::collections::BTreeSet;

/// User intents raised by the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewIntent {
    SelectCategory(Option<Category>),
    ToggleFavorite(Category),
    Refresh,
}

/// Everything the view needs for one render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderModel {
    /// Known environments in display order.
    pub known_categories: Vec<Category>,
    pub selection: Option<Category>,
    pub favorites: BTreeSet<Category>,
    pub visible_item_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarEntry {
    All {
        active: bool,
    },
    Category {
        category: Category,
        active: bool,
        favorite: bool,
    },
}

impl RenderModel {
    /// Favorites first, then the "all environments" entry, then the rest.
    pub fn entries(&self) -> Vec<SidebarEntry> {
        let entry = |category: &Category, favorite: bool| SidebarEntry::Category {
            category: category.clone(),
            active: self.selection.as_ref() == Some(category),
            favorite,
        };
        let mut entries: Vec<SidebarEntry> = self
            .known_categories
            .iter()
            .filter(|category| self.favorites.contains(*category))
            .map(|category| entry(category, true))
            .collect();
        entries.push(SidebarEntry::All {
            active: self.selection.is_none(),
        });
        entries.extend(
            self.known_categories
                .iter()
                .filter(|category| !self.favorites.contains(*category))
                .map(|category| entry(category, false)),
        );
        entries
    }
}

/// Rendering collaborator. Implementations deliver [`ViewIntent`]s through
/// the sink handed out by [`crate::SidebarEngine::intent_sink`].
pub trait View {
    type Node;

    /// Creates the panel if it does not exist yet. Idempotent.
    fn mount(&self);

    fn set_visible(&self, visible: bool);

    fn render(&self, model: &RenderModel);

    /// Roots of the subtrees this view writes to.
    fn owned_roots(&self) -> Vec<Self::Node>;
}
