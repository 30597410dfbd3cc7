use std::fmt;
use url::Url;

/// The navigable location of the host document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub href: String,
    pub origin: String,
    pub pathname: String,
}

impl Location {
    pub fn parse(href: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(href)?;
        Ok(Self {
            href: url.as_str().to_string(),
            origin: url.origin().ascii_serialization(),
            pathname: url.path().to_string(),
        })
    }

    /// For hosts that already expose the parts separately, like
    /// `window.location`.
    pub fn from_parts(
        href: impl Into<String>,
        origin: impl Into<String>,
        pathname: impl Into<String>,
    ) -> Self {
        Self {
            href: href.into(),
            origin: origin.into(),
            pathname: pathname.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href)
    }
}

/// Read/annotate access to the host page.
///
/// Every query re-reads the live document; implementations must not hand
/// back cached node lists because the host replaces rows without notice.
/// Operations on nodes that have since been detached must be harmless.
pub trait HostDocument {
    type Node: Clone + PartialEq + fmt::Debug;

    fn location(&self) -> Location;

    /// The host control that opens the environment popover.
    fn disclosure_control(&self) -> Option<Self::Node>;

    /// Every popover-class overlay currently attached.
    fn overlays(&self) -> Vec<Self::Node>;

    /// Text content of `root` and of every element below it.
    fn subtree_texts(&self, root: &Self::Node) -> Vec<String>;

    /// Activation controls (buttons) below `root`, in document order.
    fn controls_within(&self, root: &Self::Node) -> Vec<Self::Node>;

    fn text(&self, node: &Self::Node) -> String;

    /// Click-equivalent activation.
    fn activate(&self, node: &Self::Node);

    /// Every task row, in document order.
    fn rows(&self) -> Vec<Self::Node>;

    /// Texts of the sub-elements of a row that may carry its environment.
    fn row_fragments(&self, row: &Self::Node) -> Vec<String>;

    /// Section headers, in document order.
    fn headers(&self) -> Vec<Self::Node>;

    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    fn is_header(&self, node: &Self::Node) -> bool;

    fn is_row(&self, node: &Self::Node) -> bool;

    /// Rows below `node`, excluding `node` itself.
    fn rows_within(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn is_hidden(&self, node: &Self::Node) -> bool;

    fn set_hidden(&self, node: &Self::Node, hidden: bool);

    /// True when `node` is `ancestor` or lies below it.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;
}

/// One observer callback's worth of structural changes.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationBatch<N> {
    /// The node each mutation record was reported against.
    pub targets: Vec<N>,
}

impl<N> MutationBatch<N> {
    pub fn new(targets: Vec<N>) -> Self {
        Self { targets }
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
