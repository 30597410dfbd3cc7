use serde::Deserialize;
use serde::Serialize;
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

/// Environment labels are shaped like `owner/repo`.
pub const CATEGORY_SEPARATOR: char = '/';

/// True when `label`, once trimmed, is non-empty and carries the separator.
pub fn looks_like_category(label: &str) -> bool {
    let trimmed = label.trim();
    !trimmed.is_empty() && trimmed.contains(CATEGORY_SEPARATOR)
}

/// Opaque, host-assigned environment identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Builds a category from a raw host label, trimming it first. Returns
    /// `None` for labels that do not look like an environment.
    pub fn from_label(label: &str) -> Option<Self> {
        looks_like_category(label).then(|| Self(label.trim().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Category {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The set of environments last seen in the host popover.
///
/// Replaced wholesale on every successful discovery; never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySet {
    members: BTreeSet<Category>,
}

impl CategorySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, category: &Category) -> bool {
        self.members.contains(category)
    }

    pub fn insert(&mut self, category: Category) -> bool {
        self.members.insert(category)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.members.iter()
    }

    /// Same size and same members; the order discovery produced them in is
    /// irrelevant.
    pub fn same_members(&self, other: &CategorySet) -> bool {
        self.members.len() == other.members.len()
            && other.members.iter().all(|c| self.members.contains(c))
    }

    /// Presentation order: case-insensitive, ties broken by the raw label so
    /// the result is stable across renders.
    pub fn sorted_for_display(&self) -> Vec<Category> {
        let mut sorted: Vec<Category> = self.members.iter().cloned().collect();
        sorted.sort_by(|a, b| {
            a.as_str()
                .to_lowercase()
                .cmp(&b.as_str().to_lowercase())
                .then_with(|| a.cmp(b))
        });
        sorted
    }
}

impl FromIterator<Category> for CategorySet {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CategorySet {
    type Item = &'a Category;
    type IntoIter = std::collections::btree_set::Iter<'a, Category>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}
