use crate::category::CATEGORY_SEPARATOR;
use crate::category::Category;
use crate::host::HostDocument;
use tracing::debug;

/// Derives an item's environment from the texts found inside its row.
pub trait CategoryExtractor {
    fn extract(&self, fragments: &[String]) -> Option<Category>;
}

/// The last non-empty fragment that contains the separator and is not a
/// URL.
///
/// Rows also carry branch names and links, which is why the *last* match
/// wins: the environment badge is rendered after them. A row with several
/// path-like spans after the badge would be mis-attributed.
#[derive(Debug, Default, Clone, Copy)]
pub struct LastTokenExtractor;

impl CategoryExtractor for LastTokenExtractor {
    fn extract(&self, fragments: &[String]) -> Option<Category> {
        fragments
            .iter()
            .map(|fragment| fragment.trim())
            .rev()
            .find(|fragment| {
                !fragment.is_empty()
                    && fragment.contains(CATEGORY_SEPARATOR)
                    && !fragment.starts_with("http")
            })
            .map(Category::from)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub total: usize,
    pub visible: usize,
}

/// Applies the selection to the live rows. Nothing is cached between
/// passes; every call re-reads the rows and re-derives their environment.
pub struct FilterEngine {
    extractor: Box<dyn CategoryExtractor>,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new(Box::new(LastTokenExtractor))
    }
}

impl FilterEngine {
    pub fn new(extractor: Box<dyn CategoryExtractor>) -> Self {
        Self { extractor }
    }

    /// Rows without a recognisable environment can't be excluded by a
    /// positive match, so they always stay visible.
    pub fn is_visible(item: Option<&Category>, selection: Option<&Category>) -> bool {
        match (selection, item) {
            (None, _) | (_, None) => true,
            (Some(selected), Some(item)) => selected == item,
        }
    }

    pub fn category_of<D: HostDocument>(&self, doc: &D, row: &D::Node) -> Option<Category> {
        self.extractor.extract(&doc.row_fragments(row))
    }

    pub fn apply<D: HostDocument>(&self, doc: &D, selection: Option<&Category>) -> FilterReport {
        let rows = doc.rows();
        let mut report = FilterReport {
            total: rows.len(),
            visible: 0,
        };
        for row in &rows {
            let category = self.category_of(doc, row);
            let visible = Self::is_visible(category.as_ref(), selection);
            doc.set_hidden(row, !visible);
            if visible {
                report.visible += 1;
            }
        }
        debug!(
            total = report.total,
            visible = report.visible,
            selection = selection.map(Category::as_str),
            "applied environment filter"
        );
        report
    }

    pub fn visible_item_count<D: HostDocument>(&self, doc: &D) -> usize {
        doc.rows().iter().filter(|row| !doc.is_hidden(row)).count()
    }
}
